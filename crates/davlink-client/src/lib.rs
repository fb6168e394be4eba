//! Streaming transfer client for a remote HTTP store.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - `data` - Immutable configuration and types
//! - `core` - Pure transformations
//! - `effects` - I/O operations with trait abstraction
//!
//! # Key Features
//!
//! - **Streaming**: request and response bodies move as chunk streams and
//!   are never buffered whole
//! - **Optimistic concurrency**: conditional writes via entity tags
//!   (`If-Match` to overwrite a known version, `If-None-Match: *` to create)
//! - **Progress & cancellation**: per-chunk byte counts with consumer-driven
//!   abort of the in-flight exchange
//! - **Mechanism-only**: no retry policy; every failure surfaces as a typed
//!   condition and the caller decides what to do with it

mod core;
mod data;
mod effects;
mod error;

pub use crate::core::range::{ByteRange, range_header_value, ranges_valid};
pub use crate::core::status::process_status;
pub use data::{Progress, ProgressSink, RequestContext, TransferResult};
pub use effects::{
    BodyStream, ByteStream, ConnectionListener, ContentReceiver, ContentStream, HttpExchange,
    MemoryError, MemoryExchange, Method, ProgressStream, RecordedRequest, RemoteFile,
    RemoteFolder, RemoteMetadata, RequestNotifier, TransferEngine, WireRequest, WireResponse,
    WriterReceiver,
};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestExchange;

pub use error::TransferError;
