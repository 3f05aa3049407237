pub mod config;
pub mod error;
pub mod filename;
pub mod logging;
pub mod orchestrator;
pub mod progress;
pub mod provider;
pub mod title;
pub mod transfer;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use error::{DownloadError, WorkerFailure};
pub use orchestrator::Orchestrator;
pub use progress::{ByteProgress, NoopProgress, ProgressObserver, TerminalProgress};
pub use provider::{ProgressEvent, StreamHandle, StreamId, StreamProvider, YtDlpProvider};
pub use title::TitleList;
pub use worker::{DownloadWorker, WorkerState};
