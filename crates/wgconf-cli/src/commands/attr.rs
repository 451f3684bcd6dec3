//! `wgconf attr add|rm`

use anyhow::Result;
use wgconf_core::{Config, Scalar};

use super::edit::apply;
use crate::cli::TargetArgs;

/// One attribute mutation on the interface (`peer == None`) or a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrEdit {
    Add {
        peer: Option<String>,
        name: String,
        value: String,
        comment: Option<String>,
        as_line: bool,
    },
    Remove {
        peer: Option<String>,
        name: String,
        value: Option<String>,
        remove_comments: bool,
    },
}

impl AttrEdit {
    fn summary(&self) -> String {
        let (verb, peer, name, value) = match self {
            Self::Add {
                peer, name, value, ..
            } => ("Added", peer, name, Some(value)),
            Self::Remove {
                peer, name, value, ..
            } => ("Removed", peer, name, value.as_ref()),
        };
        let section = peer
            .as_deref()
            .map_or_else(|| "interface".to_string(), |key| format!("peer {key}"));
        match value {
            Some(value) => format!("{verb} {name} = {value} on {section}"),
            None => format!("{verb} {name} on {section}"),
        }
    }
}

/// Execute an attribute command against the file named by `target`.
pub fn execute(config: &Config, target: &TargetArgs, edit: &AttrEdit, quiet: bool) -> Result<()> {
    apply(config, target, quiet, &edit.summary(), |doc| match edit {
        AttrEdit::Add {
            peer,
            name,
            value,
            comment,
            as_line,
        } => doc.add_attribute(
            peer.as_deref(),
            name,
            Scalar::parse(value),
            comment.as_deref(),
            *as_line,
        ),
        AttrEdit::Remove {
            peer,
            name,
            value,
            remove_comments,
        } => {
            let value = value.as_deref().map(Scalar::parse);
            doc.delete_attribute(peer.as_deref(), name, value.as_ref(), *remove_comments)
        },
    })
}
