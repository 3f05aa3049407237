//! `pld list` – show which stream each title resolves to, without downloading.

use std::sync::Arc;

use anyhow::Result;
use pld_core::config::PldConfig;
use pld_core::{NoopProgress, Orchestrator, StreamId, YtDlpProvider};

use crate::cli::TitleSource;

pub fn run_list(cfg: &PldConfig, source: &TitleSource) -> Result<()> {
    let titles = source.load()?;
    let provider = Arc::new(YtDlpProvider::new(&cfg.search, cfg.http));
    // Resolves the batch exactly as `download` would, duplicates included.
    let orchestrator = Orchestrator::new(
        titles,
        &cfg.download_dir,
        provider,
        Arc::new(NoopProgress),
    )?;

    for line in format_listing(&orchestrator.titles()) {
        println!("{}", line);
    }
    Ok(())
}

pub(crate) fn format_listing(streams: &[(StreamId, String)]) -> Vec<String> {
    let mut lines = Vec::with_capacity(streams.len() + 1);
    lines.push(format!("{:<4} {:<28} {}", "#", "STREAM", "TITLE"));
    for (index, (id, title)) in streams.iter().enumerate() {
        lines.push(format!("{:<4} {:<28} {}", index, id, title));
    }
    lines
}
