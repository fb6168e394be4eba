//! Pure transformations for the transfer protocol.
//!
//! Everything in here is side-effect free: byte-range rendering, response
//! header lookup and the shared status-to-outcome mapping used by every
//! exchange.

pub mod range;
pub mod status;
