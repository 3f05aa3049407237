//! CLI command handlers, one file per command.

mod config;
mod download;
mod generate;
mod list;

pub use config::run_config;
pub use download::run_download;
pub use generate::{run_completions, run_manpage};
pub use list::run_list;
#[cfg(test)]
pub(crate) use list::format_listing;
