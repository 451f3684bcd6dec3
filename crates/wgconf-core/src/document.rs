//! The line store and its derived section index.
//!
//! A [`Document`] owns the raw lines of a configuration file. Interface and peer records
//! are derived from those lines and kept in sync by every mutation (see `edit.rs`); the
//! text is never regenerated from the records, so serialization reproduces the input
//! byte for byte.
//!
//! ```rust
//! use wgconf_core::Document;
//!
//! let text = "[Interface]\nListenPort = 51820\n\n[Peer]\nPublicKey = abc=\n";
//! let doc = Document::parse(text)?;
//!
//! assert_eq!(doc.peer_keys(), vec!["abc="]);
//! assert_eq!(doc.to_string(), text);
//! # Ok::<(), wgconf_core::Error>(())
//! ```

use std::fmt;
use std::io::{Read, Write};
use std::ops::Range;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::line::SectionKind;
use crate::parser::{self, Parsed};
use crate::section::{Attributes, Bounds, Section};

const BOM: char = '\u{feff}';

/// Line terminator detected on input and used on output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// The terminator itself.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Which section an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Interface,
    Peer(usize),
}

/// A section together with the raw lines it spans.
#[derive(Debug, Clone, Serialize)]
pub struct SectionView<'a> {
    /// The derived record.
    #[serde(flatten)]
    pub section: &'a Section,
    /// Lines from `first_line` through `last_line`, verbatim.
    pub lines: &'a [String],
}

/// A parsed WireGuard configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub(crate) lines: Vec<String>,
    pub(crate) interface: Option<Section>,
    pub(crate) peers: Vec<Section>,
    line_ending: LineEnding,
    trailing_newline: bool,
    bom: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document holding just an `[Interface]` header.
    pub fn new() -> Self {
        let header = SectionKind::Interface.header().to_string();
        let bounds = Bounds {
            first: 0,
            header: 0,
            last: 0,
        };
        Self {
            lines: vec![header],
            interface: Some(Section::new(
                SectionKind::Interface,
                None,
                Attributes::default(),
                false,
                bounds,
            )),
            peers: Vec::new(),
            line_ending: LineEnding::Lf,
            trailing_newline: true,
            bom: false,
        }
    }

    /// Parse configuration text.
    ///
    /// Empty input (or input without any section) yields a document without an
    /// interface; queries on it report [`Error::NotFound`].
    pub fn parse(text: &str) -> Result<Self> {
        let (text, bom) = text
            .strip_prefix(BOM)
            .map_or((text, false), |rest| (rest, true));
        let split = split_lines(text);
        let Parsed { interface, peers } = parser::parse_lines(&split.lines)?;

        debug!(
            lines = split.lines.len(),
            peers = peers.len(),
            crlf = split.line_ending == LineEnding::CrLf,
            "parsed configuration"
        );

        Ok(Self {
            lines: split.lines,
            interface,
            peers,
            line_ending: split.line_ending,
            trailing_newline: split.trailing_newline,
            bom,
        })
    }

    /// Parse an ordered sequence of lines without terminators.
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let Parsed { interface, peers } = parser::parse_lines(&lines)?;
        let trailing_newline = !lines.is_empty();
        Ok(Self {
            lines,
            interface,
            peers,
            line_ending: LineEnding::Lf,
            trailing_newline,
            bom: false,
        })
    }

    /// Read and parse a whole stream.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(&text)
    }

    /// Write the serialized text to `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(self.to_text().as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize to text.
    ///
    /// Lines are joined with the detected terminator; a final terminator is written when
    /// the input ended with one.
    pub fn to_text(&self) -> String {
        let ending = self.line_ending.as_str();
        let capacity = self.lines.iter().map(|l| l.len() + ending.len()).sum::<usize>() + 3;
        let mut out = String::with_capacity(capacity);
        if self.bom {
            out.push(BOM);
        }
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push_str(ending);
            }
            out.push_str(line);
        }
        if self.trailing_newline && !self.lines.is_empty() {
            out.push_str(ending);
        }
        out
    }

    /// Raw lines, without terminators.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The detected line terminator.
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// The `[Interface]` section.
    pub fn interface(&self) -> Result<&Section> {
        self.interface.as_ref().ok_or_else(missing_interface)
    }

    /// Whether an `[Interface]` section exists.
    pub const fn has_interface(&self) -> bool {
        self.interface.is_some()
    }

    /// Peer sections in document order.
    pub fn peers(&self) -> &[Section] {
        &self.peers
    }

    /// Public keys of every peer in document order.
    pub fn peer_keys(&self) -> Vec<&str> {
        self.peers.iter().filter_map(Section::public_key).collect()
    }

    /// Look up a peer by public key.
    pub fn peer(&self, public_key: &str) -> Result<&Section> {
        self.find_peer(public_key)
            .map(|index| &self.peers[index])
            .ok_or_else(|| missing_peer(public_key))
    }

    /// Whether a peer with this key exists.
    pub fn contains_peer(&self, public_key: &str) -> bool {
        self.find_peer(public_key).is_some()
    }

    /// Whether the peer is enabled.
    pub fn is_peer_enabled(&self, public_key: &str) -> Result<bool> {
        self.peer(public_key).map(|peer| !peer.is_disabled())
    }

    /// Verbatim lines spanned by `section`.
    pub fn raw_lines(&self, section: &Section) -> &[String] {
        self.lines
            .get(section.first_line()..=section.last_line())
            .unwrap_or_default()
    }

    /// The interface record together with its raw lines.
    pub fn interface_details(&self) -> Result<SectionView<'_>> {
        let section = self.interface()?;
        Ok(SectionView {
            section,
            lines: self.raw_lines(section),
        })
    }

    /// A peer record together with its raw lines.
    pub fn peer_details(&self, public_key: &str) -> Result<SectionView<'_>> {
        let section = self.peer(public_key)?;
        Ok(SectionView {
            section,
            lines: self.raw_lines(section),
        })
    }

    pub(crate) fn find_peer(&self, public_key: &str) -> Option<usize> {
        self.peers
            .iter()
            .position(|peer| peer.public_key() == Some(public_key))
    }

    /// Resolve `None` to the interface and `Some(key)` to that peer.
    pub(crate) fn resolve(&self, peer: Option<&str>) -> Result<Target> {
        match peer {
            None if self.interface.is_some() => Ok(Target::Interface),
            None => Err(missing_interface()),
            Some(key) => self
                .find_peer(key)
                .map(Target::Peer)
                .ok_or_else(|| missing_peer(key)),
        }
    }

    pub(crate) fn section(&self, target: Target) -> Result<&Section> {
        match target {
            Target::Interface => self.interface(),
            Target::Peer(index) => self
                .peers
                .get(index)
                .ok_or_else(|| Error::NotFound(format!("peer #{index}"))),
        }
    }

    fn section_mut(&mut self, target: Target) -> Result<&mut Section> {
        match target {
            Target::Interface => self.interface.as_mut().ok_or_else(missing_interface),
            Target::Peer(index) => self
                .peers
                .get_mut(index)
                .ok_or_else(|| Error::NotFound(format!("peer #{index}"))),
        }
    }

    /// The section that currently ends the document.
    pub(crate) fn last_section(&self) -> Option<&Section> {
        self.peers.last().or(self.interface.as_ref())
    }

    /// Replace `range` with `replacement` and shift every section starting at or after the
    /// end of `range`.
    ///
    /// Callers re-index the section that contained the range themselves.
    pub(crate) fn splice(&mut self, range: Range<usize>, replacement: Vec<String>) {
        let old_end = range.end;
        let new_end = range.start + replacement.len();
        self.lines.splice(range, replacement);

        if old_end == new_end {
            return;
        }
        for section in self.interface.iter_mut().chain(self.peers.iter_mut()) {
            if section.first_line() >= old_end {
                section.relocate(old_end, new_end);
            }
        }
    }

    /// Replace `range` (which must lie inside the target section, after its header) and
    /// refresh the target's record.
    ///
    /// The new section text is validated before the store changes, so a failing edit leaves
    /// the document untouched.
    pub(crate) fn rewrite_section(
        &mut self,
        target: Target,
        range: Range<usize>,
        replacement: Vec<String>,
    ) -> Result<()> {
        let current = self.section(target)?;
        let kind = current.kind();
        let Bounds { first, header, last } = current.bounds();

        let mut window: Vec<String> = self.lines[first..=last].to_vec();
        window.splice(range.start - first..range.end - first, replacement.iter().cloned());
        let relative = Bounds {
            first: 0,
            header: header - first,
            last: window.len() - 1,
        };
        let mut refreshed = parser::index_section(&window, first, kind, relative)?;
        refreshed.relocate(0, first);

        if let (Some(before), Some(after)) = (current.public_key(), refreshed.public_key()) {
            if before != after {
                return Err(Error::InvalidOperation(format!(
                    "edit would change the key of peer {before}"
                )));
            }
        }

        self.splice(range, replacement);
        *self.section_mut(target)? = refreshed;
        Ok(())
    }

    pub(crate) fn reset(&mut self, lines: Vec<String>, interface: Section) {
        self.lines = lines;
        self.interface = Some(interface);
        self.peers.clear();
        self.trailing_newline = true;
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn missing_interface() -> Error {
    Error::NotFound("[Interface] section".to_string())
}

fn missing_peer(public_key: &str) -> Error {
    Error::NotFound(format!("peer {public_key}"))
}

struct SplitText {
    lines: Vec<String>,
    line_ending: LineEnding,
    trailing_newline: bool,
}

/// Split text into lines, detecting CRLF when every terminated line ends in `\r`.
fn split_lines(text: &str) -> SplitText {
    if text.is_empty() {
        return SplitText {
            lines: Vec::new(),
            line_ending: LineEnding::Lf,
            trailing_newline: false,
        };
    }

    let trailing_newline = text.ends_with('\n');
    let body = if trailing_newline {
        &text[..text.len() - 1]
    } else {
        text
    };

    let mut lines: Vec<&str> = body.split('\n').collect();
    let terminated = if trailing_newline {
        lines.len()
    } else {
        lines.len() - 1
    };

    let crlf = terminated > 0 && lines[..terminated].iter().all(|l| l.ends_with('\r'));
    if crlf {
        for line in &mut lines[..terminated] {
            *line = &line[..line.len() - 1];
        }
    }

    SplitText {
        lines: lines.into_iter().map(str::to_string).collect(),
        line_ending: if crlf { LineEnding::CrLf } else { LineEnding::Lf },
        trailing_newline,
    }
}
