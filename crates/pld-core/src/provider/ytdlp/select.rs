//! yt-dlp search output model and deterministic candidate selection.

use serde::Deserialize;
use std::collections::HashMap;

use crate::config::SelectionPolicy;

/// One search result as printed by `yt-dlp --dump-json`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub duration_string: Option<String>,
    #[serde(default)]
    pub formats: Vec<MediaFormat>,
}

/// One downloadable format of a search result.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaFormat {
    pub format_id: String,
    pub ext: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    /// Average audio bitrate in kbit/s.
    #[serde(default)]
    pub abr: Option<f64>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub http_headers: HashMap<String, String>,
}

impl MediaFormat {
    /// Audio-only, fetchable with a plain HTTP GET.
    fn is_plain_audio(&self) -> bool {
        let has_audio = self.acodec.as_deref().is_some_and(|c| c != "none");
        let no_video = self.vcodec.as_deref().map_or(true, |c| c == "none");
        let plain_http = self
            .protocol
            .as_deref()
            .map_or(true, |p| p == "http" || p == "https");
        has_audio && no_video && plain_http && self.url.is_some()
    }
}

impl SearchEntry {
    /// Duration in seconds: the numeric field, else the `h:mm:ss` string.
    pub fn duration_secs(&self) -> Option<u64> {
        match self.duration {
            Some(d) if d.is_finite() && d >= 0.0 => Some(d.round() as u64),
            _ => self.duration_string.as_deref().and_then(parse_duration),
        }
    }

    /// Highest-bitrate plain audio format, if any.
    pub fn best_audio_format(&self) -> Option<&MediaFormat> {
        self.formats
            .iter()
            .filter(|f| f.is_plain_audio())
            .max_by(|a, b| {
                let a = a.abr.unwrap_or(0.0);
                let b = b.abr.unwrap_or(0.0);
                a.total_cmp(&b)
            })
    }
}

/// Parses `h:mm:ss`, `m:ss` or `s` into seconds.
pub fn parse_duration(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let mut count = 0u64;
    for unit in s.split(':') {
        let unit: u64 = unit.trim().parse().ok()?;
        count = count.checked_mul(60)?.checked_add(unit)?;
    }
    Some(count)
}

/// Picks one candidate among those that have a plain audio format.
/// Ties keep the earlier search result.
pub fn select_candidate(entries: &[SearchEntry], policy: SelectionPolicy) -> Option<&SearchEntry> {
    let mut usable = entries.iter().filter(|e| e.best_audio_format().is_some());
    match policy {
        SelectionPolicy::First => usable.next(),
        // Entries without a known duration rank after every timed one.
        SelectionPolicy::Shortest => usable.min_by_key(|e| e.duration_secs().unwrap_or(u64::MAX)),
    }
}
