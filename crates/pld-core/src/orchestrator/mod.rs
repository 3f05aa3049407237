//! Batch orchestration: one worker per title, resolved up front, transferred
//! concurrently, progress fanned into a single hub.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;

use serde_json::Value;

use crate::error::DownloadError;
use crate::progress::{ByteProgress, ProgressAggregator, ProgressHub, ProgressObserver, QueryProgress};
use crate::provider::{ProgressEvent, StreamHandle, StreamId, StreamProvider};
use crate::title::TitleList;
use crate::worker::DownloadWorker;

pub struct Orchestrator {
    destination: PathBuf,
    workers: Vec<Arc<DownloadWorker>>,
    query: Arc<QueryProgress>,
    /// Dropped by `wait_until_finished` so the hub can drain and stop.
    events: Option<mpsc::Sender<ProgressEvent>>,
    hub: ProgressHub,
}

impl Orchestrator {
    /// Creates `destination` if needed and resolves every title, in order.
    /// The first resolution failure aborts construction; nothing is started.
    pub fn new(
        titles: TitleList,
        destination: impl Into<PathBuf>,
        provider: Arc<dyn StreamProvider>,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<Self, DownloadError> {
        let destination = destination.into();
        std::fs::create_dir_all(&destination).map_err(|source| DownloadError::Io {
            path: destination.clone(),
            source,
        })?;

        let query = Arc::new(QueryProgress::new(titles.len(), Arc::clone(&observer)));
        let workers: Vec<Arc<DownloadWorker>> = titles
            .iter()
            .enumerate()
            .map(|(index, title)| {
                Arc::new(DownloadWorker::new(
                    index,
                    title.as_str(),
                    destination.clone(),
                    Arc::clone(&provider),
                    Arc::clone(&query),
                ))
            })
            .collect();

        for worker in &workers {
            worker.resolve()?;
        }
        let handles = disambiguate_streams(&workers);

        let aggregator = ProgressAggregator::new(&handles, observer)?;
        let (events, hub) = ProgressHub::spawn(aggregator)?;
        tracing::info!(
            titles = workers.len(),
            total_bytes = handles.iter().map(|h| h.total_size).sum::<u64>(),
            destination = %destination.display(),
            "batch resolved"
        );

        Ok(Self {
            destination,
            workers,
            query,
            events: Some(events),
            hub,
        })
    }

    /// Same as [`Orchestrator::new`] for a JSON array of titles.
    pub fn from_json(
        titles: &Value,
        destination: impl Into<PathBuf>,
        provider: Arc<dyn StreamProvider>,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<Self, DownloadError> {
        let titles = TitleList::from_json(titles)?;
        Self::new(titles, destination, provider, observer)
    }

    fn sender(&self) -> Result<&mpsc::Sender<ProgressEvent>, DownloadError> {
        self.events
            .as_ref()
            .ok_or_else(|| DownloadError::invalid_state("batch has already been waited on"))
    }

    /// Starts every worker that has not been started yet. Does not block.
    /// Returns how many were started by this call.
    ///
    /// A worker whose thread cannot be spawned does not stop the others; its
    /// failure is recorded for `wait_until_finished` and the first such error
    /// is returned once every worker has been tried.
    pub fn start_all(&self) -> Result<usize, DownloadError> {
        let events = self.sender()?;
        let mut started = 0;
        let mut first_error = None;
        for worker in &self.workers {
            if worker.is_started() {
                continue;
            }
            match worker.start(events.clone()) {
                Ok(()) => started += 1,
                // lost a race with start_by_index / start_by_title
                Err(DownloadError::InvalidState(_)) => {}
                Err(e) => {
                    tracing::error!(title = worker.title(), "could not start worker: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        tracing::debug!(started, "start_all");
        match first_error {
            Some(e) => Err(e),
            None => Ok(started),
        }
    }

    pub fn start_by_index(&self, index: usize) -> Result<(), DownloadError> {
        let worker = self
            .workers
            .get(index)
            .ok_or_else(|| DownloadError::UnknownWorker(format!("index {}", index)))?;
        worker.start(self.sender()?.clone())
    }

    /// Starts the first not-yet-started worker with this title.
    pub fn start_by_title(&self, title: &str) -> Result<(), DownloadError> {
        let mut matching = self.workers.iter().filter(|w| w.title() == title).peekable();
        let first = matching
            .peek()
            .cloned()
            .ok_or_else(|| DownloadError::UnknownWorker(format!("title {:?}", title)))?;
        let worker = matching.find(|w| !w.is_started()).unwrap_or(first);
        worker.start(self.sender()?.clone())
    }

    /// Blocks until every worker's transfer has ended, then drains the
    /// progress hub. Fails up front if some worker was never started.
    pub fn wait_until_finished(&mut self) -> Result<ByteProgress, DownloadError> {
        let idle: Vec<&str> = self
            .workers
            .iter()
            .filter(|w| !w.is_started())
            .map(|w| w.title())
            .collect();
        if !idle.is_empty() {
            return Err(DownloadError::invalid_state(format!(
                "never started: {}",
                idle.join(", ")
            )));
        }

        let mut failures = Vec::new();
        for worker in &self.workers {
            match worker.join() {
                Ok(()) => {}
                Err(DownloadError::WorkerFailed { failures: f }) => failures.extend(f),
                Err(e) => return Err(e),
            }
        }

        self.events = None;
        let progress = self.hub.join();
        if !failures.is_empty() {
            tracing::error!(failed = failures.len(), "batch finished with failures");
            return Err(DownloadError::WorkerFailed { failures });
        }
        let progress = progress?;
        tracing::info!(
            downloaded = progress.downloaded_bytes,
            total = progress.total_bytes,
            anomalies = progress.anomalies,
            "batch finished"
        );
        Ok(progress)
    }

    /// Every transfer returned and the hub has applied every byte they
    /// reported, so `byte_progress()` is final whenever this is true.
    pub fn is_download_complete(&self) -> bool {
        self.workers.iter().all(|w| w.is_finished()) && self.hub.snapshot().is_complete()
    }

    /// One path per title, in input order. Only available once complete.
    pub fn file_paths(&self) -> Result<Vec<PathBuf>, DownloadError> {
        if !self.is_download_complete() {
            return Err(DownloadError::invalid_state("downloads have not finished"));
        }
        self.workers.iter().map(|w| w.file_path()).collect()
    }

    /// `(resolved, total)` title count.
    pub fn query_progress(&self) -> (usize, usize) {
        (self.query.resolved(), self.query.total())
    }

    pub fn byte_progress(&self) -> ByteProgress {
        self.hub.snapshot()
    }

    pub fn workers(&self) -> &[Arc<DownloadWorker>] {
        &self.workers
    }

    /// Resolved stream id and title for each input title, in order.
    pub fn titles(&self) -> Vec<(StreamId, String)> {
        self.workers
            .iter()
            .filter_map(|w| w.stream())
            .map(|s| (s.id, s.title))
            .collect()
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// Two titles can resolve to the same stream. Later occurrences get a
/// suffixed id and title so trackers and output files stay distinct.
fn disambiguate_streams(workers: &[Arc<DownloadWorker>]) -> Vec<StreamHandle> {
    let mut seen: HashMap<StreamId, usize> = HashMap::new();
    for worker in workers {
        let Some(stream) = worker.stream() else {
            continue;
        };
        let count = seen.entry(stream.id.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            tracing::warn!(
                title = worker.title(),
                stream = %stream.id,
                occurrence = *count,
                "title resolved to a stream already in the batch"
            );
            worker.disambiguate(*count);
        }
    }
    workers.iter().filter_map(|w| w.stream()).collect()
}
