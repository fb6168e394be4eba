//! Progress reporting for in-flight transfers.

/// A point-in-time snapshot of an in-flight transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Cumulative bytes moved so far for this operation. Monotonically
    /// increasing across the life of one exchange.
    pub bytes_transferred: u64,

    /// Total entity length, when the peer declared one.
    ///
    /// `None` for chunked content with no declared length.
    pub total_bytes: Option<u64>,
}

impl Progress {
    /// Completion percentage, when the total is known.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.bytes_transferred as f64 / total as f64) * 100.0
            }
        })
    }
}

/// Consumer of byte-count progress events.
///
/// `on_progress` is invoked synchronously on the transferring task after
/// every chunk, so a slow sink stalls the transfer. `cancelled` is polled
/// between chunks; once it turns true the in-flight exchange is aborted
/// and the operation ends with a `Cancelled` condition.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: Progress);

    fn cancelled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_unknown_without_total() {
        let progress = Progress {
            bytes_transferred: 10,
            total_bytes: None,
        };
        assert_eq!(progress.percentage(), None);
    }

    #[test]
    fn percentage_of_known_total() {
        let progress = Progress {
            bytes_transferred: 25,
            total_bytes: Some(100),
        };
        assert_eq!(progress.percentage(), Some(25.0));
    }

    #[test]
    fn empty_entity_is_complete() {
        let progress = Progress {
            bytes_transferred: 0,
            total_bytes: Some(0),
        };
        assert_eq!(progress.percentage(), Some(100.0));
    }
}
