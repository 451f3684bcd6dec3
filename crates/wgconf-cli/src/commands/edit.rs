//! Open, mutate and save a configuration file.

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;
use wgconf_core::{Config, ConfigFile, Document};

use crate::cli::TargetArgs;

/// Apply `edit` to the file named by `target` and save it.
///
/// With `--dry-run` the edited text goes to stdout and the file is left alone. Otherwise
/// `summary` is printed unless `quiet`.
pub fn apply<F>(
    config: &Config,
    target: &TargetArgs,
    quiet: bool,
    summary: &str,
    edit: F,
) -> Result<()>
where
    F: FnOnce(&mut Document) -> wgconf_core::Result<()>,
{
    let path = config.resolve(&target.name);
    let mut file = ConfigFile::open(&path)?;
    edit(file.document_mut())?;

    if target.dry_run {
        print!("{}", file.document());
        return Ok(());
    }

    file.save(config.write.file_mode)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    info!(path = %path.display(), "{summary}");
    if !quiet {
        println!("{} {summary} in {}", "✓".green(), path.display());
    }
    Ok(())
}
