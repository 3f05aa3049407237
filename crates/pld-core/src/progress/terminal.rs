//! indicatif rendering of the query and download progress signals.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::observer::ProgressObserver;

/// Two stacked bars on stderr: titles searched, then bytes downloaded.
pub struct TerminalProgress {
    _mp: MultiProgress,
    query_bar: ProgressBar,
    download_bar: ProgressBar,
}

impl TerminalProgress {
    pub fn new() -> Self {
        let mp = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());

        let query_style = ProgressStyle::with_template("Searching:   |{bar:40}| {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        let query_bar = mp.add(ProgressBar::new(0));
        query_bar.set_style(query_style);

        let download_style = ProgressStyle::with_template(
            "Downloading: |{bar:40}| {bytes}/{total_bytes} {percent:>3}% ({bytes_per_sec}, {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
        let download_bar = mp.add(ProgressBar::new(0));
        download_bar.set_style(download_style);

        Self {
            _mp: mp,
            query_bar,
            download_bar,
        }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for TerminalProgress {
    fn query_started(&self, total: usize) {
        self.query_bar.set_length(total as u64);
        self.query_bar.set_position(0);
    }

    fn query_advanced(&self, resolved: usize, total: usize) {
        self.query_bar.set_position(resolved as u64);
        if resolved >= total {
            self.query_bar.finish();
        }
    }

    fn bytes_started(&self, total_bytes: u64) {
        self.download_bar.set_length(total_bytes);
        self.download_bar.set_position(0);
    }

    fn bytes_advanced(&self, chunk: u64, _downloaded: u64, _total: u64) {
        self.download_bar.inc(chunk);
    }

    fn download_complete(&self) {
        self.download_bar.finish();
    }
}
