//! Merges every stream tracker of a batch into one byte-progress signal.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::DownloadError;
use crate::provider::{ProgressEvent, StreamHandle, StreamId};

use super::observer::ProgressObserver;
use super::tracker::StreamTracker;
use super::ByteProgress;

/// One tracker per stream, fixed at construction.
///
/// `cumulative_downloaded` always equals the sum of the trackers'
/// `downloaded_bytes`; completion is signalled to the observer exactly once.
pub struct ProgressAggregator {
    trackers: HashMap<StreamId, StreamTracker>,
    total_bytes: u64,
    cumulative_downloaded: u64,
    finished_streams: usize,
    completion_signalled: bool,
    observer: Arc<dyn ProgressObserver>,
}

impl ProgressAggregator {
    /// Builds the tracker set. Two handles with the same id would share a
    /// tracker and corrupt its accounting, so that is rejected.
    pub fn new<'a, I>(handles: I, observer: Arc<dyn ProgressObserver>) -> Result<Self, DownloadError>
    where
        I: IntoIterator<Item = &'a StreamHandle>,
    {
        let mut trackers = HashMap::new();
        let mut total_bytes = 0u64;
        for handle in handles {
            if trackers.contains_key(&handle.id) {
                return Err(DownloadError::invalid_state(format!(
                    "stream {} is tracked twice",
                    handle.id
                )));
            }
            total_bytes += handle.total_size;
            trackers.insert(
                handle.id.clone(),
                StreamTracker::new(handle.id.clone(), handle.total_size),
            );
        }
        let finished_streams = trackers.values().filter(|t| t.is_finished()).count();

        observer.bytes_started(total_bytes);

        Ok(Self {
            trackers,
            total_bytes,
            cumulative_downloaded: 0,
            finished_streams,
            completion_signalled: false,
            observer,
        })
    }

    /// Routes one notification to its tracker and folds the chunk into the total.
    /// Returns the chunk that was accounted.
    pub fn on_progress(&mut self, event: &ProgressEvent) -> Result<u64, DownloadError> {
        let tracker = self
            .trackers
            .get_mut(&event.stream_id)
            .ok_or_else(|| DownloadError::UnknownStream(event.stream_id.to_string()))?;

        let was_finished = tracker.is_finished();
        let chunk = tracker.update(event.remaining_bytes);
        if !was_finished && tracker.is_finished() {
            self.finished_streams += 1;
            tracing::debug!(stream = %event.stream_id, "stream finished");
        }
        self.cumulative_downloaded += chunk;

        debug_assert_eq!(
            self.cumulative_downloaded,
            self.trackers.values().map(StreamTracker::downloaded_bytes).sum::<u64>()
        );

        if chunk > 0 {
            self.observer
                .bytes_advanced(chunk, self.cumulative_downloaded, self.total_bytes);
        }
        if self.is_finished() {
            self.signal_complete();
        }
        Ok(chunk)
    }

    /// Signals completion for a batch that is finished without any pending
    /// notification (e.g. only zero-byte streams). Returns whether the batch is finished.
    pub fn close(&mut self) -> bool {
        let finished = self.is_finished();
        if finished {
            self.signal_complete();
        }
        finished
    }

    fn signal_complete(&mut self) {
        if self.completion_signalled {
            return;
        }
        self.completion_signalled = true;
        tracing::info!(
            streams = self.trackers.len(),
            bytes = self.total_bytes,
            "all streams downloaded"
        );
        self.observer.download_complete();
    }

    pub fn is_finished(&self) -> bool {
        self.finished_streams == self.trackers.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn cumulative_downloaded(&self) -> u64 {
        self.cumulative_downloaded
    }

    pub fn tracker(&self, id: &StreamId) -> Option<&StreamTracker> {
        self.trackers.get(id)
    }

    pub fn snapshot(&self) -> ByteProgress {
        ByteProgress {
            downloaded_bytes: self.cumulative_downloaded,
            total_bytes: self.total_bytes,
            streams_finished: self.finished_streams,
            stream_count: self.trackers.len(),
            anomalies: self.trackers.values().map(StreamTracker::anomalies).sum(),
        }
    }
}
