//! Section records derived from the line store.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::line::SectionKind;
use crate::value::{AttributeValue, Scalar};

/// Attributes of a section in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, AttributeValue)>,
}

impl Attributes {
    pub(crate) fn from_folded(folded: Vec<(String, Vec<Scalar>)>) -> Self {
        let entries = folded
            .into_iter()
            .filter_map(|(name, values)| AttributeValue::fold(values).map(|value| (name, value)))
            .collect();
        Self { entries }
    }

    /// Value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    /// Whether `name` is present.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Attribute names in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Name/value pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of distinct attribute names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the section defines no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One `[Interface]` or `[Peer]` section.
///
/// Line bounds are zero-based and inclusive. `first_line` includes the comment lines
/// attached above the header; `header_line` is the header itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    kind: SectionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_key: Option<String>,
    attributes: Attributes,
    disabled: bool,
    first_line: usize,
    header_line: usize,
    last_line: usize,
}

impl Section {
    pub(crate) const fn new(
        kind: SectionKind,
        public_key: Option<String>,
        attributes: Attributes,
        disabled: bool,
        bounds: Bounds,
    ) -> Self {
        Self {
            kind,
            public_key,
            attributes,
            disabled,
            first_line: bounds.first,
            header_line: bounds.header,
            last_line: bounds.last,
        }
    }

    /// Interface or peer.
    pub const fn kind(&self) -> SectionKind {
        self.kind
    }

    /// Identifying key of a peer section; `None` for the interface.
    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    /// Folded attributes.
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Shorthand for `attributes().get(name)`.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Whether every line from the header down carries the disabled marker.
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// First line of the section, including attached leading comments.
    pub const fn first_line(&self) -> usize {
        self.first_line
    }

    /// Line of the `[Interface]`/`[Peer]` header.
    pub const fn header_line(&self) -> usize {
        self.header_line
    }

    /// Last line of the section.
    pub const fn last_line(&self) -> usize {
        self.last_line
    }

    pub(crate) const fn bounds(&self) -> Bounds {
        Bounds {
            first: self.first_line,
            header: self.header_line,
            last: self.last_line,
        }
    }

    /// Move every bound of a section that lies after a splice.
    pub(crate) fn relocate(&mut self, old_end: usize, new_end: usize) {
        self.first_line = self.first_line - old_end + new_end;
        self.header_line = self.header_line - old_end + new_end;
        self.last_line = self.last_line - old_end + new_end;
    }
}

/// Inclusive line bounds of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bounds {
    pub first: usize,
    pub header: usize,
    pub last: usize,
}
