//! wgconf CLI - lossless editor for WireGuard configuration files
//!
//! Command implementations live in [`commands`]; this module parses arguments, sets up
//! logging, loads settings and dispatches.
use anyhow::Result;
use clap::Parser;
use tracing::debug;
use wgconf_core::Config;

mod cli;
mod commands;
pub mod error;
mod output;
mod utils;

use crate::utils::initialize_logging;
use cli::{AttrCommands, Cli, Commands, PeerCommands};
use commands::{AttrEdit, PeerEdit};

/// Execute the wgconf CLI with the currently configured environment.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded or the command fails.
pub async fn run() -> Result<()> {
    // Convert Broken pipe panics into a clean exit
    std::panic::set_hook(Box::new(|info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe") || msg.contains("broken pipe") {
            std::process::exit(0);
        }
        eprintln!("{msg}");
    }));

    let cli = Cli::parse();
    initialize_logging(&cli)?;

    let config = load_config(&cli)?;
    debug!(
        config_dir = %config.paths.config_dir.display(),
        wg = %config.tools.wg.display(),
        "settings loaded"
    );

    execute_command(cli, &config).await
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.apply_env(|name| std::env::var(name).ok());
            config
        },
        None => Config::load()?,
    };
    if let Some(dir) = &cli.config_dir {
        config.paths.config_dir.clone_from(dir);
    }
    Ok(config)
}

async fn execute_command(cli: Cli, config: &Config) -> Result<()> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Show { name, format } => commands::show(config, &name, format)?,
        Commands::Peers { name, format } => commands::list_peers(config, &name, format)?,
        Commands::Peer { command } => handle_peer(command, config, quiet)?,
        Commands::Attr { command } => handle_attr(command, config, quiet)?,
        Commands::Init {
            target,
            comment,
            force,
        } => commands::init(config, &target, comment.as_deref(), force, quiet)?,
        Commands::Genkey => commands::genkey(config).await?,
        Commands::Pubkey => commands::pubkey(config).await?,
        Commands::Genpsk => commands::genpsk(config).await?,
        Commands::Keypair { format } => commands::keypair(config, format).await?,
    }
    Ok(())
}

fn handle_peer(command: PeerCommands, config: &Config, quiet: bool) -> Result<()> {
    let (target, edit) = match command {
        PeerCommands::Add {
            target,
            key,
            comment,
        } => (target, PeerEdit::Add { key, comment }),
        PeerCommands::Rm { target, key } => (target, PeerEdit::Remove { key }),
        PeerCommands::Enable { target, key } => (target, PeerEdit::Enable { key }),
        PeerCommands::Disable { target, key } => (target, PeerEdit::Disable { key }),
    };
    commands::edit_peer(config, &target, &edit, quiet)
}

fn handle_attr(command: AttrCommands, config: &Config, quiet: bool) -> Result<()> {
    let (target, edit) = match command {
        AttrCommands::Add {
            target,
            peer,
            attr,
            value,
            comment,
            as_line,
        } => (
            target,
            AttrEdit::Add {
                peer,
                name: attr,
                value,
                comment,
                as_line,
            },
        ),
        AttrCommands::Rm {
            target,
            peer,
            attr,
            value,
            keep_comments,
        } => (
            target,
            AttrEdit::Remove {
                peer,
                name: attr,
                value,
                remove_comments: !keep_comments,
            },
        ),
    };
    commands::edit_attribute(config, &target, &edit, quiet)
}
