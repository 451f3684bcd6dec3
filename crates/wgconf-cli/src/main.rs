//! wgconf - lossless editor for WireGuard configuration files
//!
//! Thin entry point; everything lives in the library so integration tests and the
//! binary share one code path.

use std::process::ExitCode;

use colored::Colorize;
use wgconf_cli::error::exit_code_from_error;

#[tokio::main]
async fn main() -> ExitCode {
    match wgconf_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
