//! The consumed subset of the generic resource contract.
//!
//! Only the operations the remote adapter must provide are declared here;
//! the full contract (listing, locking, property handling) belongs to the
//! consuming server.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use davlink_client::{ByteRange, ByteStream, HttpExchange, RemoteFile, RemoteFolder, TransferError};
use tokio::io::AsyncWrite;

use crate::error::ResourceError;

/// Destination collection that fronts a remote folder.
///
/// Copy and move targets are generic collection resources; this seam
/// recovers the remote folder behind one.
pub trait FolderTarget<C: HttpExchange>: Send + Sync {
    fn remote_folder(&self) -> &RemoteFolder<C>;
}

/// Collaborator performing whole-entity copy and move between remote
/// locations.
///
/// Bulk relocation stays off the byte-streaming path; how the manager
/// does it (server-side COPY/MOVE or read-then-write) is its business.
#[async_trait]
pub trait RemoteManager<C: HttpExchange>: Send + Sync {
    async fn copy_to(
        &self,
        source: &RemoteFile<C>,
        dest_name: &str,
        dest: &RemoteFolder<C>,
    ) -> Result<(), TransferError>;

    async fn move_to(
        &self,
        source: &RemoteFile<C>,
        dest_name: &str,
        dest: &RemoteFolder<C>,
    ) -> Result<(), TransferError>;
}

/// The subset of the generic resource interface a remote-backed file
/// provides.
#[async_trait]
pub trait FileResource<C: HttpExchange>: Send + Sync {
    fn content_type(&self, accepts: Option<&str>) -> Option<String>;

    fn content_length(&self) -> Option<u64>;

    fn create_date(&self) -> Option<DateTime<Utc>>;

    /// Cache lifetime hint; `None` means unknown.
    fn max_age_seconds(&self) -> Option<u64>;

    /// Stream the resource's content into `out`.
    async fn send_content(
        &self,
        out: &mut (dyn AsyncWrite + Send + Unpin),
        range: Option<ByteRange>,
        params: &HashMap<String, String>,
        content_type: Option<&str>,
    ) -> Result<(), ResourceError>;

    /// Replace the resource's content wholesale.
    async fn replace_content(
        &self,
        content: ByteStream,
        content_length: Option<u64>,
    ) -> Result<(), ResourceError>;

    async fn delete(&self) -> Result<(), ResourceError>;

    async fn copy_to(
        &self,
        dest: &dyn FolderTarget<C>,
        dest_name: &str,
    ) -> Result<(), ResourceError>;

    async fn move_to(
        &self,
        dest: &dyn FolderTarget<C>,
        dest_name: &str,
    ) -> Result<(), ResourceError>;

    /// Form processing; remote-backed resources never support it.
    fn process_form(&self, parameters: &HashMap<String, String>) -> Result<String, ResourceError>;
}
