//! One title's download: lazy resolution, single start, background transfer.
//!
//! Lifecycle is `Idle → Started → Finished`, or `Started → Failed` when the
//! transfer returns an error or the thread panics. Nothing leaves a terminal state.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use crate::error::{DownloadError, WorkerFailure};
use crate::filename::stream_file_name;
use crate::progress::QueryProgress;
use crate::provider::{ProgressEvent, StreamHandle, StreamId, StreamProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Started,
    Finished,
    Failed,
}

pub struct DownloadWorker {
    index: usize,
    title: String,
    destination: PathBuf,
    provider: Arc<dyn StreamProvider>,
    query: Arc<QueryProgress>,
    /// Held across the first provider query so concurrent callers wait for it.
    stream: Mutex<Option<StreamHandle>>,
    started: AtomicBool,
    finished: AtomicBool,
    failure: Mutex<Option<String>>,
    execution: Mutex<Option<JoinHandle<()>>>,
    /// Transfer thread stack size; the platform default when unset.
    stack_size: Option<usize>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl DownloadWorker {
    pub fn new(
        index: usize,
        title: impl Into<String>,
        destination: impl Into<PathBuf>,
        provider: Arc<dyn StreamProvider>,
        query: Arc<QueryProgress>,
    ) -> Self {
        Self {
            index,
            title: title.into(),
            destination: destination.into(),
            provider,
            query,
            stream: Mutex::new(None),
            started: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            failure: Mutex::new(None),
            execution: Mutex::new(None),
            stack_size: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Resolves the title to a stream once; later calls return the cached handle.
    /// The query counter advances only on the first successful resolution.
    pub fn resolve(&self) -> Result<StreamHandle, DownloadError> {
        let mut slot = lock(&self.stream);
        if let Some(handle) = slot.as_ref() {
            return Ok(handle.clone());
        }
        let handle = self.provider.resolve(&self.title)?;
        tracing::debug!(
            index = self.index,
            title = %self.title,
            stream = %handle.id,
            size = handle.total_size,
            "title resolved"
        );
        self.query.advance();
        *slot = Some(handle.clone());
        Ok(handle)
    }

    /// Spawns the transfer thread. Fails with `InvalidState` if the worker was
    /// ever started before, including by a concurrent caller.
    pub fn start(self: &Arc<Self>, events: mpsc::Sender<ProgressEvent>) -> Result<(), DownloadError> {
        let mut execution = lock(&self.execution);
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DownloadError::invalid_state(format!(
                "download of {:?} was already started",
                self.title
            )));
        }

        let worker = Arc::clone(self);
        let mut builder = std::thread::Builder::new().name(format!("pld-worker-{}", self.index));
        if let Some(bytes) = self.stack_size {
            builder = builder.stack_size(bytes);
        }
        let spawned = builder.spawn(move || worker.run(events));
        match spawned {
            Ok(handle) => {
                *execution = Some(handle);
                tracing::debug!(index = self.index, title = %self.title, "worker started");
                Ok(())
            }
            Err(source) => {
                self.record_failure(format!("could not spawn worker thread: {}", source));
                Err(DownloadError::Io {
                    path: self.destination.clone(),
                    source,
                })
            }
        }
    }

    fn run(&self, events: mpsc::Sender<ProgressEvent>) {
        match self.execute(&events) {
            Ok(path) => {
                self.finished.store(true, Ordering::Release);
                tracing::info!(title = %self.title, path = %path.display(), "download finished");
            }
            Err(e) => {
                tracing::error!(title = %self.title, "download failed: {:#}", e);
                self.record_failure(format!("{:#}", e));
            }
        }
    }

    fn execute(&self, events: &mpsc::Sender<ProgressEvent>) -> Result<PathBuf, DownloadError> {
        let handle = self.resolve()?;
        let filename = stream_file_name(&handle.title, &handle.extension);
        let mut forward = |event: ProgressEvent| {
            // A closed channel means the batch stopped listening; the transfer still completes.
            let _ = events.send(event);
        };
        self.provider
            .transfer(&handle, &self.destination, &filename, &mut forward)?;
        Ok(self.destination.join(filename))
    }

    fn record_failure(&self, message: String) {
        let mut failure = lock(&self.failure);
        if failure.is_none() {
            *failure = Some(message);
        }
    }

    /// Waits for the transfer thread and reports how it ended.
    /// Fails with `InvalidState` if the worker was never started.
    pub fn join(&self) -> Result<(), DownloadError> {
        let handle = {
            let mut execution = lock(&self.execution);
            if !self.started.load(Ordering::Acquire) {
                return Err(DownloadError::invalid_state(format!(
                    "download of {:?} was never started",
                    self.title
                )));
            }
            execution.take()
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                self.record_failure("worker thread panicked".to_string());
            }
        }

        if self.is_finished() {
            return Ok(());
        }
        match self.failure() {
            Some(message) => Err(DownloadError::WorkerFailed {
                failures: vec![WorkerFailure {
                    title: self.title.clone(),
                    message,
                }],
            }),
            None => Err(DownloadError::invalid_state(format!(
                "download of {:?} is still running",
                self.title
            ))),
        }
    }

    /// `destination/<resolved title>.<format>`; only once the transfer finished.
    pub fn file_path(&self) -> Result<PathBuf, DownloadError> {
        if !self.is_finished() {
            return Err(DownloadError::invalid_state(format!(
                "download of {:?} has not finished",
                self.title
            )));
        }
        let slot = lock(&self.stream);
        let handle = slot.as_ref().ok_or_else(|| {
            DownloadError::invalid_state(format!("{:?} finished without a stream", self.title))
        })?;
        Ok(self
            .destination
            .join(stream_file_name(&handle.title, &handle.extension)))
    }

    /// Renames a cached stream so it no longer collides with another worker's
    /// (same id and file name). Only valid before the worker starts.
    pub(crate) fn disambiguate(&self, suffix: usize) {
        if self.is_started() {
            return;
        }
        if let Some(handle) = lock(&self.stream).as_mut() {
            handle.id = StreamId::new(format!("{}#{}", handle.id, suffix));
            handle.title = format!("{} ({})", handle.title, suffix);
        }
    }

    pub fn state(&self) -> WorkerState {
        if self.is_finished() {
            WorkerState::Finished
        } else if lock(&self.failure).is_some() {
            WorkerState::Failed
        } else if self.is_started() {
            WorkerState::Started
        } else {
            WorkerState::Idle
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn stream(&self) -> Option<StreamHandle> {
        lock(&self.stream).clone()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn failure(&self) -> Option<String> {
        lock(&self.failure).clone()
    }
}
