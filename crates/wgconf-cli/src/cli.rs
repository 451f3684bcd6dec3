//! # CLI Structure and Argument Parsing
//!
//! `wgconf` edits WireGuard configuration files in place without disturbing comments,
//! blank lines or formatting. Every configuration is addressed by interface name
//! (`wg0`, resolved against the configured directory) or by path.
//!
//! ```bash
//! # Inspect
//! wgconf show wg0
//! wgconf peers wg0 --format json
//!
//! # Peers
//! wgconf peer add wg0 "$(wg genkey | wg pubkey)" --comment laptop
//! wgconf peer disable wg0 xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=
//!
//! # Attributes
//! wgconf attr add wg0 --peer xTIB...Dg= AllowedIPs 10.0.0.2/32
//! wgconf attr rm wg0 ListenPort
//!
//! # Keys
//! wgconf genkey | wgconf pubkey
//! ```
//!
//! Mutating commands accept `--dry-run`, which prints the resulting file instead of
//! writing it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Main CLI structure for the `wgconf` command
#[derive(Parser, Clone, Debug)]
#[command(name = "wgconf")]
#[command(version)]
#[command(about = "wgconf - lossless editor for WireGuard configuration files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Settings file to read instead of the default one (`WGCONF_CONFIG` also works)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding `<interface>.conf` files (overrides settings and `WGCONF_CONFIG_DIR`)
    #[arg(long = "config-dir", global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

/// Available subcommands for the `wgconf` CLI
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Show the interface and every peer of a configuration
    Show {
        /// Interface name or path of the configuration file
        name: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List peer public keys and whether they are enabled
    Peers {
        /// Interface name or path of the configuration file
        name: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Add, remove, enable or disable peers
    Peer {
        #[command(subcommand)]
        command: PeerCommands,
    },

    /// Add or remove attribute values
    Attr {
        #[command(subcommand)]
        command: AttrCommands,
    },

    /// Create a configuration holding only an `[Interface]` header
    Init {
        #[command(flatten)]
        target: TargetArgs,

        /// Comment line placed above the header
        #[arg(long)]
        comment: Option<String>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate a private key with `wg genkey`
    Genkey,

    /// Derive a public key from a private key read on stdin
    Pubkey,

    /// Generate a preshared key with `wg genpsk`
    Genpsk,

    /// Generate a private key and its public key
    Keypair {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// The configuration file a mutating command edits.
#[derive(Args, Clone, Debug)]
pub struct TargetArgs {
    /// Interface name or path of the configuration file
    pub name: String,

    /// Print the resulting file instead of saving it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum PeerCommands {
    /// Append a new peer section
    Add {
        #[command(flatten)]
        target: TargetArgs,

        /// Public key of the peer
        key: String,

        /// Comment line placed above the `[Peer]` header
        #[arg(long)]
        comment: Option<String>,
    },

    /// Remove a peer section together with its comments
    Rm {
        #[command(flatten)]
        target: TargetArgs,

        /// Public key of the peer
        key: String,
    },

    /// Strip the `#!` marker from a peer
    Enable {
        #[command(flatten)]
        target: TargetArgs,

        /// Public key of the peer
        key: String,
    },

    /// Prefix every line of a peer with `#!`
    Disable {
        #[command(flatten)]
        target: TargetArgs,

        /// Public key of the peer
        key: String,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum AttrCommands {
    /// Add a value, folding it into an existing attribute
    Add {
        #[command(flatten)]
        target: TargetArgs,

        /// Edit this peer instead of the interface
        #[arg(long, value_name = "KEY")]
        peer: Option<String>,

        /// Attribute name
        attr: String,

        /// Value to add
        value: String,

        /// Comment line placed above the edited line
        #[arg(long)]
        comment: Option<String>,

        /// Write the value on its own `Key = value` line
        #[arg(long)]
        as_line: bool,
    },

    /// Remove one value, or the whole attribute when no value is given
    Rm {
        #[command(flatten)]
        target: TargetArgs,

        /// Edit this peer instead of the interface
        #[arg(long, value_name = "KEY")]
        peer: Option<String>,

        /// Attribute name
        attr: String,

        /// Value to remove
        value: Option<String>,

        /// Keep comment lines directly above removed lines
        #[arg(long)]
        keep_comments: bool,
    },
}

impl Commands {
    /// Output format requested by read-only commands.
    pub const fn format(&self) -> Option<OutputFormat> {
        match self {
            Self::Show { format, .. } | Self::Peers { format, .. } | Self::Keypair { format } => {
                Some(*format)
            },
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_attr_add_parses_flags_after_positionals() {
        let cli = Cli::try_parse_from([
            "wgconf",
            "attr",
            "add",
            "wg0",
            "--peer",
            "abc=",
            "AllowedIPs",
            "10.0.0.2/32",
            "--as-line",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Attr {
                command:
                    AttrCommands::Add {
                        target,
                        peer,
                        attr,
                        value,
                        as_line,
                        comment,
                    },
            } => {
                assert_eq!(target.name, "wg0");
                assert!(target.dry_run);
                assert_eq!(peer.as_deref(), Some("abc="));
                assert_eq!(attr, "AllowedIPs");
                assert_eq!(value, "10.0.0.2/32");
                assert!(as_line);
                assert!(comment.is_none());
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_attr_rm_value_is_optional() {
        let cli = Cli::try_parse_from(["wgconf", "attr", "rm", "wg0", "ListenPort"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Attr {
                command: AttrCommands::Rm {
                    value: None,
                    keep_comments: false,
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_attr_rm_keep_comments_flag() {
        let cli = Cli::try_parse_from([
            "wgconf",
            "attr",
            "rm",
            "wg0",
            "DNS",
            "1.1.1.1",
            "--keep-comments",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Attr {
                command: AttrCommands::Rm {
                    keep_comments: true,
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_format_only_for_read_commands() {
        let show = Cli::try_parse_from(["wgconf", "show", "wg0", "--format", "json"]).unwrap();
        assert_eq!(show.command.format(), Some(OutputFormat::Json));

        let genkey = Cli::try_parse_from(["wgconf", "genkey"]).unwrap();
        assert_eq!(genkey.command.format(), None);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["wgconf", "-q", "-v", "genkey"]).is_err());
    }
}
