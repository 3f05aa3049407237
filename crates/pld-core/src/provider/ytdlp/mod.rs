//! Stream provider backed by the `yt-dlp` CLI for search and curl for transfer.
//!
//! `resolve` runs `yt-dlp --dump-json ytsearchN:<title>`, picks a candidate
//! per [`SelectionPolicy`] and its best audio-only format. The transfer is a
//! plain HTTP GET of that format's URL, so progress comes straight from the
//! bytes we receive rather than from parsing yt-dlp's console output.

mod select;

pub use select::{parse_duration, select_candidate, MediaFormat, SearchEntry};

use anyhow::Context;
use std::path::Path;
use std::process::Command;

use crate::config::{HttpConfig, SearchConfig, SelectionPolicy};
use crate::error::DownloadError;
use crate::transfer::{head, HttpTransfer};

use super::{ProgressEvent, StreamHandle, StreamId, StreamProvider};

#[derive(Debug, Clone)]
pub struct YtDlpProvider {
    binary: String,
    candidate_limit: usize,
    selection: SelectionPolicy,
    http: HttpConfig,
}

impl YtDlpProvider {
    pub fn new(search: &SearchConfig, http: HttpConfig) -> Self {
        Self {
            binary: search.ytdlp_binary.clone(),
            candidate_limit: search.candidate_limit.max(1),
            selection: search.selection,
            http,
        }
    }

    /// Runs the search and parses one JSON document per stdout line.
    fn search(&self, title: &str) -> anyhow::Result<Vec<SearchEntry>> {
        let query = format!("ytsearch{}:{}", self.candidate_limit, title);
        tracing::debug!(binary = %self.binary, %query, "running yt-dlp search");
        let output = Command::new(&self.binary)
            .args(["--dump-json", "--skip-download", "--no-warnings", "--no-playlist"])
            .arg(&query)
            .output()
            .with_context(|| format!("failed to run {}", self.binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            );
        }

        Ok(parse_search_output(&String::from_utf8_lossy(&output.stdout)))
    }

    fn stream_size(&self, format: &MediaFormat, url: &str) -> Option<u64> {
        if let Some(size) = format.filesize {
            return Some(size);
        }
        match head::probe(url, &format.http_headers, &self.http) {
            Ok(h) => h.content_length,
            Err(e) => {
                tracing::warn!(format = %format.format_id, "size probe failed: {:#}", e);
                None
            }
        }
    }
}

/// Lines that are not search entries (yt-dlp notices, truncated output) are skipped.
fn parse_search_output(stdout: &str) -> Vec<SearchEntry> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| match serde_json::from_str::<SearchEntry>(l) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unparsable yt-dlp line: {}", e);
                None
            }
        })
        .collect()
}

impl StreamProvider for YtDlpProvider {
    fn resolve(&self, title: &str) -> Result<StreamHandle, DownloadError> {
        let entries = self.search(title)?;
        if entries.is_empty() {
            return Err(DownloadError::not_found(title, "no search results"));
        }

        let entry = select_candidate(&entries, self.selection).ok_or_else(|| {
            DownloadError::not_found(title, "no result offers an audio-only stream")
        })?;
        let format = entry
            .best_audio_format()
            .ok_or_else(|| DownloadError::not_found(title, "no audio-only stream"))?;
        let url = format
            .url
            .clone()
            .ok_or_else(|| DownloadError::not_found(title, "audio stream has no URL"))?;
        let total_size = self
            .stream_size(format, &url)
            .ok_or_else(|| DownloadError::not_found(title, "stream size unknown"))?;

        tracing::info!(
            %title,
            video = %entry.id,
            format = %format.format_id,
            total_size,
            "resolved stream"
        );

        Ok(StreamHandle {
            id: StreamId::new(format!("{}:{}", entry.id, format.format_id)),
            title: entry.title.clone(),
            total_size,
            extension: format.ext.clone(),
            source_url: url,
            headers: format.http_headers.clone(),
        })
    }

    fn transfer(
        &self,
        handle: &StreamHandle,
        destination: &Path,
        filename: &str,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> anyhow::Result<()> {
        let path = HttpTransfer::new(self.http)
            .fetch(handle, destination, filename, on_progress)
            .with_context(|| format!("transfer of {} failed", handle.id))?;
        tracing::debug!(stream = %handle.id, path = %path.display(), "transfer complete");
        Ok(())
    }
}
