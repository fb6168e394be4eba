//! Adapts remote file handles to a generic resource contract.
//!
//! A remote store reached through [`davlink_client`] can be re-exported by
//! a higher-level server through the uniform [`FileResource`] interface:
//! whole-file copy, move, delete, download and replace-content, all backed
//! by the streaming transfer engine. The adapter holds a reference to the
//! remote handle and keeps no content state of its own.

mod adapter;
mod error;
mod resource;

pub use adapter::{FolderAdapter, RemoteFileAdapter};
pub use error::ResourceError;
pub use resource::{FileResource, FolderTarget, RemoteManager};
