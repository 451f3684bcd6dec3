//! # Output Formatting
//!
//! Read-only commands print either colored text for people or pretty JSON for scripts:
//!
//! ```bash
//! wgconf show wg0
//! wgconf peers wg0 --format json | jq '.[] | select(.disabled) | .public_key'
//! ```

use std::fmt::Write as _;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use wgconf_core::{KEY_ATTRIBUTE, Section, SectionKind};

/// Output format options supported by the CLI
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line summary of a section: header, key, state and one-based line range.
pub fn section_heading(section: &Section) -> String {
    let mut heading = section.kind().header().bold().to_string();
    if let Some(key) = section.public_key() {
        let _ = write!(heading, " {}", key.cyan());
    }
    if section.is_disabled() {
        let _ = write!(heading, " {}", "(disabled)".yellow());
    }
    let _ = write!(
        heading,
        "  {}",
        format!(
            "lines {}-{}",
            section.first_line() + 1,
            section.last_line() + 1
        )
        .dimmed()
    );
    heading
}

/// Heading followed by one indented `Name = value` line per attribute.
///
/// A peer's key is already in the heading and is not repeated.
pub fn render_section(section: &Section) -> String {
    let mut text = section_heading(section);
    for (name, value) in section.attributes().iter() {
        if section.kind() == SectionKind::Peer && name == KEY_ATTRIBUTE {
            continue;
        }
        let _ = write!(text, "\n  {} = {value}", name.green());
    }
    text
}

/// `enabled`/`disabled` followed by the peer's key.
pub fn render_peer_state(section: &Section) -> String {
    let key = section.public_key().unwrap_or_default();
    if section.is_disabled() {
        format!("{} {key}", "disabled".yellow())
    } else {
        format!("{}  {key}", "enabled".green())
    }
}
