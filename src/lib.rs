//! Core library for the `taskboard` CLI: a local kanban board whose tasks
//! track time spent in progress, with per-member task lists and a focus timer.

pub mod adapters;
pub mod board;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod model;
pub mod ports;
pub mod projector;
pub mod storage;
pub mod switcher;
pub mod theme;
pub mod timer;
pub mod transfer;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing, configuration, or command
/// execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    let config = config::BoardConfig::load(cli.store.as_deref())?;
    logging::init_tracing(&config);
    commands::dispatch(&cli, &config)
}
