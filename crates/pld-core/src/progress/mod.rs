//! Byte and query progress for a batch of concurrent transfers.
//!
//! - `tracker`: per-stream remaining-bytes → chunk accounting
//! - `aggregator`: all trackers of a batch, cumulative bytes, completion
//! - `hub`: channel consumer thread that owns the aggregator
//! - `query`: resolved-titles counter
//! - `observer`: display sink trait; `terminal` renders it with indicatif

mod aggregator;
mod hub;
mod observer;
mod query;
mod terminal;
mod tracker;

pub use aggregator::ProgressAggregator;
pub use hub::ProgressHub;
pub use observer::{NoopProgress, ProgressObserver};
pub use query::QueryProgress;
pub use terminal::TerminalProgress;
pub use tracker::StreamTracker;

/// Snapshot of a batch's byte progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteProgress {
    /// Bytes downloaded across all streams.
    pub downloaded_bytes: u64,
    /// Sum of all stream sizes.
    pub total_bytes: u64,
    pub streams_finished: usize,
    pub stream_count: usize,
    /// Progress notifications that had to be clamped.
    pub anomalies: u64,
}

impl ByteProgress {
    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        (self.downloaded_bytes as f64 / self.total_bytes as f64).min(1.0)
    }

    pub fn remaining_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.downloaded_bytes)
    }

    pub fn is_complete(&self) -> bool {
        self.streams_finished == self.stream_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_and_remaining() {
        let p = ByteProgress {
            downloaded_bytes: 1500,
            total_bytes: 6000,
            streams_finished: 1,
            stream_count: 3,
            anomalies: 0,
        };
        assert!((p.fraction() - 0.25).abs() < 1e-9);
        assert_eq!(p.remaining_bytes(), 4500);
        assert!(!p.is_complete());
    }

    #[test]
    fn empty_batch_is_complete() {
        let p = ByteProgress {
            downloaded_bytes: 0,
            total_bytes: 0,
            streams_finished: 0,
            stream_count: 0,
            anomalies: 0,
        };
        assert_eq!(p.fraction(), 1.0);
        assert!(p.is_complete());
    }
}
