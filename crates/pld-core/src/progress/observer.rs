//! Sink for query and byte progress (terminal bars, tests, nothing at all).

/// Receives the two progress signals of a batch. Every method defaults to a
/// no-op so implementors only override what they display.
///
/// Observers are injected per orchestrator; several batches may run side by
/// side with their own observers.
pub trait ProgressObserver: Send + Sync {
    /// The query phase begins with `total` titles to resolve.
    fn query_started(&self, _total: usize) {}

    /// One more title was resolved.
    fn query_advanced(&self, _resolved: usize, _total: usize) {}

    /// Byte tracking begins; `total_bytes` is the sum of all stream sizes.
    fn bytes_started(&self, _total_bytes: u64) {}

    /// A chunk was accounted; `downloaded` is the new cumulative total.
    fn bytes_advanced(&self, _chunk: u64, _downloaded: u64, _total: u64) {}

    /// Every stream reached its full size. Called at most once per batch.
    fn download_complete(&self) {}
}

/// Observer that ignores all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {}
