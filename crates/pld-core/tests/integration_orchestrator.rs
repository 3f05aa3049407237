//! Integration test: a batch of titles served by local HTTP servers, driven
//! end to end through the orchestrator, the hub and HttpTransfer.

mod common;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use common::static_server;
use pld_core::config::HttpConfig;
use pld_core::transfer::{head, HttpTransfer};
use pld_core::{
    DownloadError, Orchestrator, ProgressEvent, ProgressObserver, StreamHandle, StreamId,
    StreamProvider, TitleList,
};
use tempfile::tempdir;

/// Title → URL table; sizes come from a HEAD probe, bytes from HttpTransfer.
struct LocalProvider {
    urls: HashMap<String, String>,
}

impl StreamProvider for LocalProvider {
    fn resolve(&self, title: &str) -> Result<StreamHandle, DownloadError> {
        let url = self.urls.get(title).ok_or_else(|| DownloadError::NotFound {
            title: title.to_string(),
            reason: "not served".to_string(),
        })?;
        let meta = head::probe(url, &HashMap::new(), &HttpConfig::default())?;
        Ok(StreamHandle {
            id: StreamId::new(format!("local:{title}")),
            title: title.to_string(),
            total_size: meta.content_length.unwrap_or(0),
            extension: "m4a".to_string(),
            source_url: url.clone(),
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
        HttpTransfer::default()
            .fetch(handle, destination, filename, on_progress)
            .with_context(|| format!("fetching {}", handle.title))?;
        Ok(())
    }
}

#[derive(Default)]
struct CountingObserver {
    query_total: AtomicUsize,
    resolved: AtomicUsize,
    bytes_total: AtomicU64,
    bytes_seen: AtomicU64,
    completions: AtomicUsize,
}

impl ProgressObserver for CountingObserver {
    fn query_started(&self, total: usize) {
        self.query_total.store(total, Ordering::SeqCst);
    }

    fn query_advanced(&self, resolved: usize, _total: usize) {
        self.resolved.store(resolved, Ordering::SeqCst);
    }

    fn bytes_started(&self, total_bytes: u64) {
        self.bytes_total.store(total_bytes, Ordering::SeqCst);
    }

    fn bytes_advanced(&self, chunk: u64, _downloaded: u64, _total: u64) {
        self.bytes_seen.fetch_add(chunk, Ordering::SeqCst);
    }

    fn download_complete(&self) {
        self.completions.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn batch_downloads_every_title_over_http() {
    let bodies: Vec<(&str, Vec<u8>)> = vec![
        ("First Song", vec![1u8; 1000]),
        ("Second Song", vec![2u8; 2000]),
        ("Third Song", (0u8..=255).cycle().take(300_000).collect()),
    ];
    let urls = bodies
        .iter()
        .map(|(title, body)| (title.to_string(), static_server::start(body.clone()).url))
        .collect();
    let provider = Arc::new(LocalProvider { urls });
    let observer = Arc::new(CountingObserver::default());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("Songs");

    let titles = TitleList::new(bodies.iter().map(|(t, _)| *t)).unwrap();
    let mut orch = Orchestrator::new(titles, &dest, provider, observer.clone()).unwrap();
    assert!(dest.is_dir());
    assert_eq!(orch.query_progress(), (3, 3));
    assert_eq!(observer.resolved.load(Ordering::SeqCst), 3);

    assert_eq!(orch.start_all().unwrap(), 3);
    let progress = orch.wait_until_finished().unwrap();

    assert_eq!(progress.total_bytes, 303_000);
    assert_eq!(progress.downloaded_bytes, 303_000);
    assert_eq!(progress.anomalies, 0);
    assert_eq!(observer.bytes_total.load(Ordering::SeqCst), 303_000);
    assert_eq!(observer.bytes_seen.load(Ordering::SeqCst), 303_000);
    assert_eq!(observer.completions.load(Ordering::SeqCst), 1);

    let paths = orch.file_paths().unwrap();
    assert_eq!(paths.len(), 3);
    for ((title, body), path) in bodies.iter().zip(&paths) {
        assert_eq!(*path, dest.join(format!("{title}.m4a")));
        assert_eq!(std::fs::read(path).unwrap(), *body);
    }
}

#[test]
fn unreachable_stream_aborts_resolution() {
    let good = static_server::start(vec![5u8; 500]).url;
    // Nothing listens on port 9 of the loopback interface in test environments.
    let dead = "http://127.0.0.1:9/stream".to_string();

    let provider = Arc::new(LocalProvider {
        urls: HashMap::from([("good".to_string(), good), ("dead".to_string(), dead)]),
    });
    let dir = tempdir().unwrap();
    let titles = TitleList::new(["good", "dead"]).unwrap();

    // The dead URL already fails its HEAD probe, so resolution aborts the batch.
    let err = Orchestrator::new(titles, dir.path(), provider, Arc::new(pld_core::NoopProgress))
        .err()
        .unwrap();
    assert!(matches!(err, DownloadError::Provider(_)));
}
