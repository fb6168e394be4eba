//! Result of a completed store exchange.

use bytes::Bytes;

/// Terminal outcome of a store operation that was not rejected.
///
/// Produced exactly once per completed exchange and discarded once the
/// caller has consumed it.
#[derive(Debug, Clone)]
pub struct TransferResult {
    /// Final HTTP status code.
    pub status: u16,

    /// Entity tag the server issued for the stored content, if any.
    /// Callers keep this for the next conditional write.
    pub etag: Option<String>,

    /// Drained response entity; `None` when the server sent nothing back.
    pub body: Option<Bytes>,
}
