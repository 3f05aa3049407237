//! `pld download` – resolve every title, then download all streams concurrently.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use pld_core::config::PldConfig;
use pld_core::{NoopProgress, Orchestrator, ProgressObserver, TerminalProgress, YtDlpProvider};

use crate::cli::TitleSource;

pub fn run_download(
    cfg: &PldConfig,
    source: &TitleSource,
    dest: Option<PathBuf>,
    candidates: Option<usize>,
    no_progress: bool,
) -> Result<()> {
    let titles = source.load()?;
    let dest = dest.unwrap_or_else(|| cfg.download_dir.clone());

    let mut search = cfg.search.clone();
    if let Some(n) = candidates {
        search.candidate_limit = n.max(1);
    }
    let provider = Arc::new(YtDlpProvider::new(&search, cfg.http));
    let observer: Arc<dyn ProgressObserver> = if cfg.progress_bars && !no_progress {
        Arc::new(TerminalProgress::new())
    } else {
        Arc::new(NoopProgress)
    };

    let mut orchestrator = Orchestrator::new(titles, &dest, provider, observer)?;
    let started = orchestrator.start_all()?;
    tracing::info!(started, dest = %dest.display(), "downloads started");

    let progress = orchestrator.wait_until_finished()?;
    tracing::info!(
        bytes = progress.downloaded_bytes,
        streams = progress.stream_count,
        "downloads complete"
    );

    for path in orchestrator.file_paths()? {
        println!("{}", path.display());
    }
    Ok(())
}
