//! Stream provider interface: title → stream, and the blocking transfer.
//!
//! The orchestration layer only depends on [`StreamProvider`]; the yt-dlp
//! backed implementation lives in [`ytdlp`].

pub mod ytdlp;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::DownloadError;

pub use ytdlp::YtDlpProvider;

/// Stable identity of a resolved stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(String);

impl StreamId {
    pub fn new(id: impl Into<String>) -> Self {
        StreamId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptor of one downloadable stream, as resolved by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHandle {
    pub id: StreamId,
    /// Title of the resolved media item (not the search string).
    pub title: String,
    /// Total size in bytes; fixed once resolved.
    pub total_size: u64,
    /// File extension / container, e.g. `m4a` or `webm`.
    pub extension: String,
    /// Provider-private: direct URL of the stream.
    pub source_url: String,
    /// Provider-private: headers required to perform the GET.
    pub headers: HashMap<String, String>,
}

/// One progress notification from a running transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub stream_id: StreamId,
    /// Bytes received since the previous notification (informational).
    pub chunk_bytes: u64,
    /// Bytes not yet received; non-increasing from `total_size` down to 0.
    pub remaining_bytes: u64,
}

/// Resolves titles to streams and performs transfers.
///
/// Implementations are shared by every worker thread.
pub trait StreamProvider: Send + Sync {
    /// Look up candidates for `title` and deterministically pick one.
    /// Returns `DownloadError::NotFound` when nothing is downloadable.
    fn resolve(&self, title: &str) -> Result<StreamHandle, DownloadError>;

    /// Download `handle` to `destination/filename` on the calling thread,
    /// calling `on_progress` as bytes arrive. Returns once the file is complete.
    fn transfer(
        &self,
        handle: &StreamHandle,
        destination: &Path,
        filename: &str,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> anyhow::Result<()>;
}
