//! Logging initialization and configuration.
//!
//! Sets up the tracing subscriber and color control based on CLI flags and
//! environment variables.

use anyhow::Result;
use colored::control as color_control;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::Cli;
use crate::output::OutputFormat;

/// Log level for the given flags, and whether stdout carries machine output.
pub fn log_level(cli: &Cli) -> (Level, bool) {
    if cli.verbose {
        return (Level::DEBUG, false);
    }
    if matches!(cli.command.format(), Some(OutputFormat::Json)) {
        return (Level::ERROR, true);
    }
    if cli.quiet {
        (Level::ERROR, false)
    } else {
        (Level::WARN, false)
    }
}

/// Initialize the logging subsystem based on CLI flags.
///
/// Logs always go to stderr. JSON output lowers the level to errors so stdout and stderr
/// stay clean for scripts unless `--verbose` was given.
///
/// # Errors
///
/// Returns an error if the global tracing subscriber cannot be set.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let (level, machine_output) = log_level(cli);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Color control: disable when requested, NO_COLOR is set, or when emitting machine output
    let env_no_color = std::env::var_os("NO_COLOR").is_some();
    if cli.no_color || env_no_color || machine_output {
        color_control::set_override(false);
    }
    Ok(())
}
