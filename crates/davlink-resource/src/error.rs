//! Error type at the resource boundary.

use davlink_client::TransferError;
use thiserror::Error;

/// Failure surfaced through the resource contract.
///
/// Transfer conditions pass through unchanged, so callers can still tell
/// cancellation, transport failure and the protocol conditions apart
/// instead of receiving one opaque wrapper.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The remote-backed resource cannot provide this capability.
    #[error("operation not supported by a remote-backed resource")]
    UnsupportedOperation,
}
