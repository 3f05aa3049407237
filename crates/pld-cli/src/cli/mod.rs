//! CLI for the PLD playlist downloader.

mod commands;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use pld_core::config;
use pld_core::TitleList;

use commands::{run_completions, run_config, run_download, run_list, run_manpage};

/// Top-level CLI for the PLD playlist downloader.
#[derive(Debug, Parser)]
#[command(name = "pld")]
#[command(about = "PLD: search and download the audio of a list of song titles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where the title list comes from: positional arguments or a file.
#[derive(Debug, Args)]
pub struct TitleSource {
    /// Song titles to search for, in download order.
    #[arg(value_name = "TITLE", conflicts_with = "from_file")]
    pub titles: Vec<String>,

    /// Read titles from a file, one per line (`#` starts a comment).
    #[arg(long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,

    /// The --from-file input is a JSON array of strings.
    #[arg(long, requires = "from_file")]
    pub json: bool,
}

impl TitleSource {
    pub fn load(&self) -> Result<TitleList> {
        let Some(path) = &self.from_file else {
            return Ok(TitleList::new(self.titles.iter().cloned())?);
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading title list {}", path.display()))?;
        if self.json {
            let value: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("parsing {} as JSON", path.display()))?;
            Ok(TitleList::from_json(&value)?)
        } else {
            Ok(TitleList::from_lines(&text)?)
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Search every title and download the chosen audio streams concurrently.
    Download {
        #[command(flatten)]
        source: TitleSource,

        /// Destination directory (default: `download_dir` from config). Created if absent.
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,

        /// Search results considered per title (overrides config).
        #[arg(long, value_name = "N")]
        candidates: Option<usize>,

        /// Do not draw progress bars.
        #[arg(long)]
        no_progress: bool,
    },

    /// Resolve titles and print the chosen stream ids without downloading.
    List {
        #[command(flatten)]
        source: TitleSource,
    },

    /// Show the config file location and effective values.
    Config,

    /// Print a shell completion script to stdout.
    Completions {
        /// Target shell.
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Manpage,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Download {
                source,
                dest,
                candidates,
                no_progress,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_download(&cfg, &source, dest, candidates, no_progress)?;
            }
            CliCommand::List { source } => {
                let cfg = config::load_or_init()?;
                run_list(&cfg, &source)?;
            }
            CliCommand::Config => {
                let cfg = config::load_or_init()?;
                run_config(&cfg)?;
            }
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Manpage => run_manpage()?,
        }

        Ok(())
    }
}
