//! Immutable data types shared across transfer operations.

pub mod context;
pub mod progress;
pub mod result;

pub use context::RequestContext;
pub use progress::{Progress, ProgressSink};
pub use result::TransferResult;
