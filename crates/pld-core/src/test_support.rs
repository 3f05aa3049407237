//! In-memory provider used by unit tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::bail;

use crate::error::DownloadError;
use crate::provider::{ProgressEvent, StreamHandle, StreamId, StreamProvider};

pub(crate) struct FakeProvider {
    sizes: HashMap<String, u64>,
    chunk: u64,
    failing: Vec<String>,
    pub resolves: AtomicUsize,
    pub transfers: AtomicUsize,
    pub resolved_titles: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(streams: &[(&str, u64)]) -> Self {
        Self {
            sizes: streams.iter().map(|(t, s)| (t.to_string(), *s)).collect(),
            chunk: 256,
            failing: Vec::new(),
            resolves: AtomicUsize::new(0),
            transfers: AtomicUsize::new(0),
            resolved_titles: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_transfer(mut self, title: &str) -> Self {
        self.failing.push(title.to_string());
        self
    }

    pub fn with_chunk(mut self, chunk: u64) -> Self {
        self.chunk = chunk.max(1);
        self
    }
}

impl StreamProvider for FakeProvider {
    fn resolve(&self, title: &str) -> Result<StreamHandle, DownloadError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        self.resolved_titles.lock().unwrap().push(title.to_string());
        let size = *self
            .sizes
            .get(title)
            .ok_or_else(|| DownloadError::not_found(title, "no search results"))?;
        Ok(StreamHandle {
            id: StreamId::new(format!("fake:{title}")),
            title: title.to_string(),
            total_size: size,
            extension: "webm".to_string(),
            source_url: format!("fake://{title}"),
            headers: HashMap::new(),
        })
    }

    fn transfer(
        &self,
        handle: &StreamHandle,
        destination: &Path,
        filename: &str,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> anyhow::Result<()> {
        self.transfers.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|t| handle.title.starts_with(t.as_str())) {
            bail!("connection reset while fetching {}", handle.title);
        }
        let mut remaining = handle.total_size;
        while remaining > 0 {
            let chunk = remaining.min(self.chunk);
            remaining -= chunk;
            on_progress(ProgressEvent {
                stream_id: handle.id.clone(),
                chunk_bytes: chunk,
                remaining_bytes: remaining,
            });
        }
        std::fs::write(destination.join(filename), vec![0u8; handle.total_size as usize])?;
        Ok(())
    }
}
