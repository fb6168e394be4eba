//! I/O operations: the transport seam, stream wrappers, lifecycle
//! notification, the transfer engine and the remote handles built on it.

mod engine;
mod http;
mod listener;
mod memory;
mod remote;
mod stream;

pub use engine::{ContentReceiver, TransferEngine, WriterReceiver};
pub use http::{BodyStream, ByteStream, HttpExchange, Method, WireRequest, WireResponse};
pub use listener::{ConnectionListener, RequestNotifier};
pub use memory::{MemoryError, MemoryExchange, RecordedRequest};
pub use remote::{RemoteFile, RemoteFolder, RemoteMetadata};
pub use stream::{ContentStream, ProgressStream};

#[cfg(feature = "reqwest")]
pub use http::ReqwestExchange;
