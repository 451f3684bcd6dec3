//! `wgconf init`

use anyhow::{Result, anyhow};
use colored::Colorize;
use tracing::info;
use wgconf_core::{Config, ConfigFile, Document};

use crate::cli::TargetArgs;
use crate::error::CliError;

/// Create a configuration holding a bare `[Interface]` header.
///
/// An existing file is only replaced with `force`.
pub fn execute(
    config: &Config,
    target: &TargetArgs,
    comment: Option<&str>,
    force: bool,
    quiet: bool,
) -> Result<()> {
    let path = config.resolve(&target.name);
    if path.exists() && !force {
        return Err(CliError::conflict(anyhow!(
            "{} already exists; pass --force to replace it",
            path.display()
        ))
        .into());
    }

    let mut document = Document::new();
    document.initialize(comment)?;

    if target.dry_run {
        print!("{document}");
        return Ok(());
    }

    ConfigFile::with_document(&path, document).save(config.write.file_mode)?;
    info!(path = %path.display(), "initialized configuration");
    if !quiet {
        println!("{} Created {}", "✓".green(), path.display());
    }
    Ok(())
}
