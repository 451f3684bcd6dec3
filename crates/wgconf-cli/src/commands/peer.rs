//! `wgconf peer add|rm|enable|disable`

use anyhow::Result;
use wgconf_core::Config;

use super::edit::apply;
use crate::cli::TargetArgs;

/// One peer mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEdit {
    Add { key: String, comment: Option<String> },
    Remove { key: String },
    Enable { key: String },
    Disable { key: String },
}

impl PeerEdit {
    fn summary(&self) -> String {
        match self {
            Self::Add { key, .. } => format!("Added peer {key}"),
            Self::Remove { key } => format!("Removed peer {key}"),
            Self::Enable { key } => format!("Enabled peer {key}"),
            Self::Disable { key } => format!("Disabled peer {key}"),
        }
    }
}

/// Execute a peer command against the file named by `target`.
pub fn execute(config: &Config, target: &TargetArgs, edit: &PeerEdit, quiet: bool) -> Result<()> {
    apply(config, target, quiet, &edit.summary(), |doc| match edit {
        PeerEdit::Add { key, comment } => doc.add_peer(key, comment.as_deref()),
        PeerEdit::Remove { key } => doc.delete_peer(key),
        PeerEdit::Enable { key } => doc.enable_peer(key),
        PeerEdit::Disable { key } => doc.disable_peer(key),
    })
}
