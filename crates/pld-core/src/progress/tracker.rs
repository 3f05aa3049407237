//! Per-stream byte accounting.

use crate::provider::StreamId;

/// Turns a provider's cumulative "remaining bytes" signal into increments.
///
/// `downloaded_bytes` never decreases and never exceeds `total_size`. A
/// notification that would violate either (a remaining count that went back
/// up, or one above the stream size) is clamped to a zero-size chunk and
/// counted as an anomaly.
#[derive(Debug, Clone)]
pub struct StreamTracker {
    stream_id: StreamId,
    total_size: u64,
    downloaded_bytes: u64,
    last_chunk_size: u64,
    anomalies: u64,
}

impl StreamTracker {
    pub fn new(stream_id: StreamId, total_size: u64) -> Self {
        Self {
            stream_id,
            total_size,
            downloaded_bytes: 0,
            last_chunk_size: 0,
            anomalies: 0,
        }
    }

    /// Applies one notification and returns the new chunk size.
    pub fn update(&mut self, remaining_bytes: u64) -> u64 {
        let reported = self.total_size.saturating_sub(remaining_bytes);
        let regressed = remaining_bytes > self.total_size || reported < self.downloaded_bytes;
        if regressed {
            self.anomalies += 1;
            tracing::warn!(
                stream = %self.stream_id,
                remaining_bytes,
                downloaded = self.downloaded_bytes,
                total = self.total_size,
                "remaining bytes went up; treating as empty chunk"
            );
        }

        let downloaded = reported.max(self.downloaded_bytes);
        self.last_chunk_size = downloaded - self.downloaded_bytes;
        self.downloaded_bytes = downloaded;
        self.last_chunk_size
    }

    pub fn is_finished(&self) -> bool {
        self.downloaded_bytes == self.total_size
    }

    pub fn stream_id(&self) -> &StreamId {
        &self.stream_id
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn downloaded_bytes(&self) -> u64 {
        self.downloaded_bytes
    }

    pub fn last_chunk_size(&self) -> u64 {
        self.last_chunk_size
    }

    /// Number of clamped notifications.
    pub fn anomalies(&self) -> u64 {
        self.anomalies
    }

    /// Percentage downloaded, 0..=100. A zero-size stream is 100%.
    pub fn downloaded_percentage(&self) -> u64 {
        if self.total_size == 0 {
            return 100;
        }
        100 * self.downloaded_bytes / self.total_size
    }
}
