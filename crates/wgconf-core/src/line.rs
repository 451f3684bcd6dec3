//! Classification of single raw lines.
//!
//! Lines are stored verbatim by [`Document`](crate::Document); this module only looks at
//! them. Every structural decision (section boundaries, attribute folding, comment
//! attachment) is based on [`classify`], and every textual edit uses the byte ranges
//! reported by [`Assignment`] so untouched bytes never change.

use std::ops::Range;

use crate::value::Scalar;

/// Prefix that switches a line off while keeping its content.
pub const DISABLED_MARKER: &str = "#!";

/// Attribute that identifies a peer section.
pub const KEY_ATTRIBUTE: &str = "PublicKey";

/// The two section types a configuration file may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// The `[Interface]` section.
    Interface,
    /// A `[Peer]` section.
    Peer,
}

impl SectionKind {
    /// Canonical header line for this kind.
    pub const fn header(self) -> &'static str {
        match self {
            Self::Interface => "[Interface]",
            Self::Peer => "[Peer]",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("interface") {
            Some(Self::Interface)
        } else if name.eq_ignore_ascii_case("peer") {
            Some(Self::Peer)
        } else {
            None
        }
    }
}

/// What a line means once any disabled marker has been dealt with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty or whitespace only.
    Blank,
    /// Starts with `#` (this includes disabled lines inside enabled sections).
    Comment,
    /// `[Interface]` or `[Peer]`.
    Header(SectionKind),
    /// `Key = Value`.
    Assignment(Assignment<'a>),
}

/// A parsed `Key = Value` line.
///
/// Token ranges are byte offsets into the raw line the assignment was parsed from,
/// including any disabled marker in front of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<'a> {
    raw: &'a str,
    key: &'a str,
    tokens: Vec<Range<usize>>,
}

impl<'a> Assignment<'a> {
    /// The attribute name, trimmed.
    pub const fn key(&self) -> &'a str {
        self.key
    }

    /// Number of comma separated tokens on this line.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Values in line order.
    pub fn values(&self) -> Vec<Scalar> {
        self.tokens
            .iter()
            .map(|range| Scalar::parse(&self.raw[range.clone()]))
            .collect()
    }

    /// Index of the first token equal to `value`.
    pub fn position(&self, value: &Scalar) -> Option<usize> {
        self.tokens
            .iter()
            .position(|range| Scalar::parse(&self.raw[range.clone()]) == *value)
    }

    /// The raw line with `, value` appended after the last token.
    ///
    /// Whitespace and inline comments after the value are kept in place.
    pub fn with_appended(&self, value: &Scalar) -> String {
        let end = self.tokens.last().map_or(self.raw.len(), |range| range.end);
        format!("{}, {value}{}", &self.raw[..end], &self.raw[end..])
    }

    /// The raw line without token `index` and its separating comma.
    ///
    /// Returns `None` when the token is the only one on the line; the caller removes the
    /// whole line in that case.
    pub fn without_token(&self, index: usize) -> Option<String> {
        if self.tokens.len() < 2 || index >= self.tokens.len() {
            return None;
        }

        let cut = if index + 1 < self.tokens.len() {
            self.tokens[index].start..self.tokens[index + 1].start
        } else {
            self.tokens[index - 1].end..self.tokens[index].end
        };

        let mut line = String::with_capacity(self.raw.len());
        line.push_str(&self.raw[..cut.start]);
        line.push_str(&self.raw[cut.end..]);
        Some(line)
    }
}

/// Error produced for a line that fits none of the known shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError(pub String);

/// Classify `raw`, skipping the first `offset` bytes (used to look past a disabled marker).
pub fn classify(raw: &str, offset: usize) -> Result<LineKind<'_>, LineError> {
    let text = &raw[offset..];
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Ok(LineKind::Blank);
    }
    if trimmed.starts_with('#') {
        return Ok(LineKind::Comment);
    }
    if trimmed.starts_with('[') {
        return parse_header(trimmed).map(LineKind::Header);
    }

    let Some(eq) = text.find('=') else {
        return Err(LineError(format!(
            "expected `Key = Value`, found {trimmed:?}"
        )));
    };

    let key = text[..eq].trim();
    if key.is_empty() {
        return Err(LineError("attribute name is empty".to_string()));
    }

    let value_start = offset + eq + 1;
    let value_end = raw[value_start..]
        .find('#')
        .map_or(raw.len(), |pos| value_start + pos);

    let mut tokens = Vec::new();
    let mut start = value_start;
    for piece in raw[value_start..value_end].split(',') {
        let lead = piece.len() - piece.trim_start().len();
        let token_start = start + lead;
        let token_end = token_start + piece.trim().len();
        tokens.push(token_start..token_end);
        start += piece.len() + 1;
    }

    Ok(LineKind::Assignment(Assignment { raw, key, tokens }))
}

fn parse_header(trimmed: &str) -> Result<SectionKind, LineError> {
    let Some(close) = trimmed.find(']') else {
        return Err(LineError(format!("unterminated section header {trimmed:?}")));
    };

    let rest = trimmed[close + 1..].trim_start();
    if !rest.is_empty() && !rest.starts_with('#') {
        return Err(LineError(format!(
            "unexpected text after section header {trimmed:?}"
        )));
    }

    let name = trimmed[1..close].trim();
    SectionKind::from_name(name)
        .ok_or_else(|| LineError(format!("unsupported section [{name}]")))
}

/// Byte offset just past one disabled marker, if the line carries one.
///
/// Leading whitespace before the marker is allowed.
pub fn marker_end(raw: &str) -> Option<usize> {
    let lead = raw.len() - raw.trim_start().len();
    raw[lead..]
        .starts_with(DISABLED_MARKER)
        .then_some(lead + DISABLED_MARKER.len())
}

/// Whether the line carries at least one disabled marker.
pub fn is_disabled(raw: &str) -> bool {
    marker_end(raw).is_some()
}

/// Whether the line is blank.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Header kind of a line, looking through any number of disabled markers.
///
/// A plain `[...]` line that is not a valid header is an error; a disabled line that does
/// not form a valid header is treated as an ordinary comment.
pub fn header_kind(raw: &str) -> Result<Option<SectionKind>, LineError> {
    let mut offset = 0;
    let mut disabled = false;
    while let Some(end) = marker_end(&raw[offset..]) {
        offset += end;
        disabled = true;
    }

    let text = raw[offset..].trim();
    if !text.starts_with('[') {
        return Ok(None);
    }

    match parse_header(text) {
        Ok(kind) => Ok(Some(kind)),
        Err(_) if disabled => Ok(None),
        Err(err) => Err(err),
    }
}

/// Prefix a line with the disabled marker and a space; blank lines are left alone.
pub fn disable(raw: &str) -> String {
    if is_blank(raw) {
        raw.to_string()
    } else {
        format!("{DISABLED_MARKER} {raw}")
    }
}

/// Remove one disabled marker from a line, keeping any leading whitespace.
///
/// A single space after the marker goes with it, so `#! [Peer]` and `#![Peer]` both
/// become `[Peer]`.
pub fn enable(raw: &str) -> String {
    marker_end(raw).map_or_else(
        || raw.to_string(),
        |end| {
            let start = end - DISABLED_MARKER.len();
            let rest = &raw[end..];
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            format!("{}{rest}", &raw[..start])
        },
    )
}

/// Render a caller supplied comment as a comment line.
pub fn comment_line(comment: &str) -> String {
    if comment.trim_start().starts_with('#') {
        comment.to_string()
    } else {
        format!("# {comment}")
    }
}

/// Render a fresh `name = value` line.
pub fn assignment_line(name: &str, value: &Scalar) -> String {
    format!("{name} = {value}")
}
