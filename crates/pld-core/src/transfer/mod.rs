//! Single-stream HTTP GET to a `.part` file, with per-buffer progress events.

mod error;
pub mod head;

pub use error::TransferError;

use std::cell::Cell;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::HttpConfig;
use crate::provider::{ProgressEvent, StreamHandle};

/// Blocking downloader for one resolved stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransfer {
    opts: HttpConfig,
}

impl HttpTransfer {
    pub fn new(opts: HttpConfig) -> Self {
        Self { opts }
    }

    /// Download `handle.source_url` to `destination/filename`.
    ///
    /// Bytes go to `filename.part` first; the part file is renamed into place
    /// only after the status and the received length check out, and removed
    /// on failure. `on_progress` is called once per received buffer with the
    /// remaining byte count relative to `handle.total_size`.
    pub fn fetch(
        &self,
        handle: &StreamHandle,
        destination: &Path,
        filename: &str,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<PathBuf, TransferError> {
        let final_path = destination.join(filename);
        let part_path = destination.join(format!("{}.part", filename));

        let result = self.fetch_to_part(handle, &part_path, on_progress);
        if let Err(e) = result {
            let _ = fs::remove_file(&part_path);
            return Err(e);
        }

        fs::rename(&part_path, &final_path).map_err(TransferError::Storage)?;
        Ok(final_path)
    }

    fn fetch_to_part(
        &self,
        handle: &StreamHandle,
        part_path: &Path,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<(), TransferError> {
        let mut file = File::create(part_path).map_err(TransferError::Storage)?;
        let total = handle.total_size;
        let received = Cell::new(0u64);
        let status = Cell::new(0u32);
        let mut storage_error: Option<io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(&handle.source_url)?;
        easy.follow_location(true)?;
        easy.connect_timeout(Duration::from_secs(self.opts.connect_timeout_secs))?;
        // Low-speed abort instead of a wall-clock timeout: long streams on slow
        // links are fine as long as bytes keep coming.
        easy.low_speed_limit(self.opts.low_speed_limit_bytes)?;
        easy.low_speed_time(Duration::from_secs(self.opts.low_speed_time_secs))?;

        let mut list = curl::easy::List::new();
        for (k, v) in &handle.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        if !handle.headers.is_empty() {
            easy.http_headers(list)?;
        }

        let perform_result = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Some(code) = parse_status_line(data) {
                    status.set(code);
                }
                true
            })?;
            transfer.write_function(|data| {
                // Redirect and error bodies are not part of the stream.
                if !(200..300).contains(&status.get()) {
                    return Ok(data.len());
                }
                if let Err(e) = file.write_all(data) {
                    storage_error = Some(e);
                    return Ok(0);
                }
                let now = received.get() + data.len() as u64;
                received.set(now);
                on_progress(ProgressEvent {
                    stream_id: handle.id.clone(),
                    chunk_bytes: data.len() as u64,
                    remaining_bytes: total.saturating_sub(now),
                });
                Ok(data.len())
            })?;
            transfer.perform()
        };

        if let Err(e) = perform_result {
            if e.is_write_error() {
                if let Some(io_err) = storage_error.take() {
                    return Err(TransferError::Storage(io_err));
                }
            }
            return Err(TransferError::Curl(e));
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransferError::Http(code));
        }

        let received = received.get();
        if received < total {
            return Err(TransferError::PartialTransfer {
                expected: total,
                received,
            });
        }
        if received > total {
            tracing::warn!(
                stream = %handle.id,
                expected = total,
                received,
                "stream larger than its resolved size"
            );
        }

        file.sync_all().map_err(TransferError::Storage)?;
        Ok(())
    }
}

/// `HTTP/1.1 206 Partial Content` → 206
fn parse_status_line(data: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(data).ok()?;
    let rest = line.strip_prefix("HTTP/")?;
    rest.split_whitespace().nth(1)?.parse().ok()
}
