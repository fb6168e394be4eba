//! Error types for davlink-client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
    /// Low-level network or I/O failure during request execution. The
    /// exchange has been aborted; this layer never retries.
    #[error("transport failure for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The consumer asked for the transfer to stop while it was streaming.
    #[error("transfer cancelled by consumer")]
    Cancelled,

    #[error("not authorized: {url}")]
    NotAuthorized { url: String },

    #[error("bad request: {url}")]
    BadRequest { url: String },

    #[error("conflict: {url}")]
    Conflict { url: String },

    #[error("not found: {url}")]
    NotFound { url: String },

    /// Any other non-2xx status, carried verbatim.
    #[error("unexpected status {code} for {url}")]
    Status { code: u16, url: String },

    /// Rejected before any network call was made.
    #[error("precondition failed: {0}")]
    Precondition(&'static str),

    #[error("invalid byte range list")]
    InvalidRanges,
}

impl TransferError {
    pub(crate) fn transport(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        TransferError::Transport {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// True for the conditions derived from a response status code.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            TransferError::NotAuthorized { .. }
                | TransferError::BadRequest { .. }
                | TransferError::Conflict { .. }
                | TransferError::NotFound { .. }
                | TransferError::Status { .. }
        )
    }
}
