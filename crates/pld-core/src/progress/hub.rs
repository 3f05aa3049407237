//! Single consumer of the batch's progress-event channel.
//!
//! Every worker thread publishes [`ProgressEvent`]s on one `mpsc` channel;
//! this thread applies them to the aggregator in arrival order, so tracker
//! updates and the cumulative sum never race. The aggregator sits behind a
//! mutex only so callers can read a consistent snapshot.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use crate::error::DownloadError;
use crate::provider::ProgressEvent;

use super::aggregator::ProgressAggregator;
use super::ByteProgress;

pub struct ProgressHub {
    aggregator: Arc<Mutex<ProgressAggregator>>,
    handle: Option<JoinHandle<Result<(), DownloadError>>>,
}

impl ProgressHub {
    /// Moves the aggregator onto its own thread. The hub drains until every
    /// clone of the returned sender has been dropped.
    pub fn spawn(
        aggregator: ProgressAggregator,
    ) -> Result<(mpsc::Sender<ProgressEvent>, Self), DownloadError> {
        let (tx, rx) = mpsc::channel();
        let aggregator = Arc::new(Mutex::new(aggregator));
        let shared = Arc::clone(&aggregator);
        let handle = std::thread::Builder::new()
            .name("pld-progress".to_string())
            .spawn(move || run_progress_loop(rx, &shared))
            .map_err(|source| DownloadError::Io {
                path: "<progress thread>".into(),
                source,
            })?;
        Ok((
            tx,
            Self {
                aggregator,
                handle: Some(handle),
            },
        ))
    }

    /// Consistent view of the byte counters as of the last applied event.
    pub fn snapshot(&self) -> ByteProgress {
        lock(&self.aggregator).snapshot()
    }

    /// Waits for the channel to close and every queued event to be applied.
    /// Reports the first wiring error seen, if any. Idempotent.
    pub fn join(&mut self) -> Result<ByteProgress, DownloadError> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| DownloadError::invalid_state("progress thread panicked"))??;
        }
        Ok(self.snapshot())
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

fn lock(aggregator: &Mutex<ProgressAggregator>) -> MutexGuard<'_, ProgressAggregator> {
    aggregator.lock().unwrap_or_else(|e| e.into_inner())
}

fn run_progress_loop(
    rx: mpsc::Receiver<ProgressEvent>,
    aggregator: &Mutex<ProgressAggregator>,
) -> Result<(), DownloadError> {
    let mut first_error: Option<DownloadError> = None;
    for event in rx {
        if let Err(e) = lock(aggregator).on_progress(&event) {
            tracing::error!("dropping progress event: {}", e);
            first_error.get_or_insert(e);
        }
    }
    lock(aggregator).close();
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
