//! Error taxonomy for batch construction and worker lifecycle.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the orchestrator, its workers and the progress hub.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Title list was empty or held something other than usable strings.
    /// Raised before any directory is created or any provider is queried.
    #[error("invalid title list: {0}")]
    Validation(String),

    /// The stream provider found nothing downloadable for a title.
    #[error("no stream found for {title:?}: {reason}")]
    NotFound { title: String, reason: String },

    /// An operation was invoked out of order (double start, path before
    /// completion, waiting on a worker that never started).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// `start_by_index` / `start_by_title` named a worker that does not exist.
    #[error("no worker for {0}")]
    UnknownWorker(String),

    /// A progress event referenced a stream the aggregator was not built with.
    #[error("progress event for unknown stream {0}")]
    UnknownStream(String),

    /// One or more worker executions failed; reported after all were joined.
    #[error("{} download(s) failed: {}", .failures.len(), FailureList(.failures))]
    WorkerFailed { failures: Vec<WorkerFailure> },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

impl DownloadError {
    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        DownloadError::InvalidState(msg.into())
    }

    pub(crate) fn not_found(title: &str, reason: impl Into<String>) -> Self {
        DownloadError::NotFound {
            title: title.to_string(),
            reason: reason.into(),
        }
    }
}

/// A single failed worker execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFailure {
    pub title: String,
    pub message: String,
}

struct FailureList<'a>(&'a [WorkerFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{:?}: {}", failure.title, failure.message)?;
        }
        Ok(())
    }
}
