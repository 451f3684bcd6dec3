//! `wgconf show` and `wgconf peers`

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use wgconf_core::{Config, ConfigFile, SectionView};

use crate::output::{OutputFormat, print_json, render_peer_state, render_section};

#[derive(Serialize)]
struct ShowOutput<'a> {
    path: String,
    interface: Option<SectionView<'a>>,
    peers: Vec<SectionView<'a>>,
}

#[derive(Serialize)]
struct PeerSummary<'a> {
    public_key: &'a str,
    disabled: bool,
}

/// Print every section with its attributes.
pub fn show(config: &Config, name: &str, format: OutputFormat) -> Result<()> {
    let path = config.resolve(name);
    let file = ConfigFile::open(&path)?;
    let doc = file.document();

    match format {
        OutputFormat::Json => {
            let peers = doc
                .peers()
                .iter()
                .map(|section| SectionView {
                    section,
                    lines: doc.raw_lines(section),
                })
                .collect();
            print_json(&ShowOutput {
                path: path.display().to_string(),
                interface: doc.interface_details().ok(),
                peers,
            })?;
        },
        OutputFormat::Text => {
            println!("{}", path.display().to_string().dimmed());
            for section in doc.interface().ok().into_iter().chain(doc.peers()) {
                println!();
                println!("{}", render_section(section));
            }
        },
    }
    Ok(())
}

/// Print one line per peer: state and public key.
pub fn list_peers(config: &Config, name: &str, format: OutputFormat) -> Result<()> {
    let file = ConfigFile::open(config.resolve(name))?;
    let peers = file.document().peers();

    match format {
        OutputFormat::Json => {
            let summaries: Vec<PeerSummary<'_>> = peers
                .iter()
                .map(|peer| PeerSummary {
                    public_key: peer.public_key().unwrap_or_default(),
                    disabled: peer.is_disabled(),
                })
                .collect();
            print_json(&summaries)?;
        },
        OutputFormat::Text => {
            for peer in peers {
                println!("{}", render_peer_state(peer));
            }
        },
    }
    Ok(())
}
