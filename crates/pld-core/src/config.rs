use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// How a search result is picked among the candidates returned for a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Shortest duration wins (favours the studio cut over live versions and videos).
    #[default]
    Shortest,
    /// Take the search engine's first result.
    First,
}

/// Title search parameters (optional `[search]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of search results considered per title.
    pub candidate_limit: usize,
    /// Candidate selection rule.
    pub selection: SelectionPolicy,
    /// yt-dlp executable (name on PATH or absolute path).
    pub ytdlp_binary: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 3,
            selection: SelectionPolicy::Shortest,
            ytdlp_binary: "yt-dlp".to_string(),
        }
    }
}

/// Transfer timeouts (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/s ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
        }
    }
}

/// Global configuration loaded from `~/.config/pld/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PldConfig {
    /// Destination directory when `--dest` is not given (relative paths are
    /// resolved against the working directory).
    pub download_dir: PathBuf,
    /// Draw query/download progress bars on stderr.
    pub progress_bars: bool,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for PldConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("Songs"),
            progress_bars: true,
            search: SearchConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl PldConfig {
    /// Pretty TOML, as written to the config file.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pld")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PldConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PldConfig::default();
        let toml = default_cfg.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PldConfig = toml::from_str(&data)?;
    Ok(cfg)
}
