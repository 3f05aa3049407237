//! `pld config` – show where configuration and logs live.

use anyhow::Result;
use pld_core::config::{self, PldConfig};
use pld_core::logging;

pub fn run_config(cfg: &PldConfig) -> Result<()> {
    println!("config: {}", config::config_path()?.display());
    println!("log:    {}", logging::log_file_path()?.display());
    println!();
    print!("{}", cfg.to_toml()?);
    Ok(())
}
