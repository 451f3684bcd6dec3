//! Attribute values and the fold/unfold rules between text and the in-memory model.
//!
//! A `Key = Value` line may carry several comma separated values, and the same key may
//! appear on several lines. Both forms fold into a single [`AttributeValue::List`]; an
//! attribute with exactly one value is always an [`AttributeValue::Scalar`].
//!
//! ```rust
//! use wgconf_core::{AttributeValue, Scalar};
//!
//! let value = AttributeValue::from(Scalar::from("fe80::2/128")).push("9999::2/128".into());
//! assert_eq!(value.values().len(), 2);
//!
//! let collapsed = AttributeValue::fold(vec![Scalar::Number(51820)]);
//! assert_eq!(collapsed, Some(AttributeValue::Scalar(Scalar::Number(51820))));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single value token.
///
/// Tokens made only of ASCII digits (and fitting into a `u64`) are numbers, everything else
/// is kept verbatim as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Numeric token such as `ListenPort = 51820`.
    Number(u64),
    /// Any other token, stored trimmed.
    Text(String),
}

impl Scalar {
    /// Parse one token, normalizing numeric-looking text to [`Scalar::Number`].
    ///
    /// Digit strings with a leading zero stay text so that `to_string` reproduces the token.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        let canonical = token == "0" || !token.starts_with('0');
        if canonical && !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(number) = token.parse::<u64>() {
                return Self::Number(number);
            }
        }
        Self::Text(token.to_string())
    }

    /// Returns the text form when this is a [`Scalar::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) => None,
        }
    }

    /// Returns the number when this is a [`Scalar::Number`].
    pub const fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Number(u64::from(value))
    }
}

impl From<u16> for Scalar {
    fn from(value: u16) -> Self {
        Self::Number(u64::from(value))
    }
}

/// The value of an attribute after folding every occurrence in its section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Exactly one value.
    Scalar(Scalar),
    /// Two or more values, in document order.
    List(Vec<Scalar>),
}

impl AttributeValue {
    /// Fold a sequence of values: none yields `None`, one yields a scalar, more yield a list.
    pub fn fold(mut values: Vec<Scalar>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(Self::Scalar),
            _ => Some(Self::List(values)),
        }
    }

    /// Append one value, promoting a scalar to a list.
    #[must_use]
    pub fn push(self, value: Scalar) -> Self {
        let mut values = self.into_values();
        values.push(value);
        Self::List(values)
    }

    /// All values as a slice; a scalar is a one-element slice.
    pub fn values(&self) -> &[Scalar] {
        match self {
            Self::Scalar(scalar) => std::slice::from_ref(scalar),
            Self::List(values) => values,
        }
    }

    /// Unfold into the flat list of values.
    pub fn into_values(self) -> Vec<Scalar> {
        match self {
            Self::Scalar(scalar) => vec![scalar],
            Self::List(values) => values,
        }
    }

    /// Whether any folded value equals `value`.
    pub fn contains(&self, value: &Scalar) -> bool {
        self.values().contains(value)
    }

    /// Returns the scalar when exactly one value is present.
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            Self::List(_) => None,
        }
    }

    /// Whether this value holds more than one entry.
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl From<Scalar> for AttributeValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}
