//! Error types for wgconf-core operations.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors carry a stable
//! [`category`](Error::category) so front ends can map them to exit codes or log fields
//! without matching on message text.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: reading or writing configuration files
//! - **Parse Errors**: a line that is not blank, a comment, a header or `Key = Value`,
//!   or a document whose sections are out of order
//! - **Document Errors**: unknown peers, duplicate peers, edits that would break the
//!   document's invariants
//! - **Configuration Errors**: invalid `config.toml` contents
//! - **Tooling Errors**: the `wg` binary is missing
//!
//! ```rust
//! use wgconf_core::{Document, Error};
//!
//! let err = Document::parse("[Peer]\nPublicKey = abc\n").unwrap_err();
//! assert_eq!(err.category(), "parse");
//! assert!(!err.is_recoverable());
//! ```

use thiserror::Error;

/// The main error type for wgconf-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading and writing configuration files and spawning external tools.
    /// Timeouts and interruptions are considered recoverable.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The text is not a valid configuration document.
    ///
    /// `line` is one-based and points at the offending line.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// A peer with this public key already exists.
    #[error("Peer already exists: {0}")]
    DuplicatePeer(String),

    /// The addressed section does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An argument cannot be written into a configuration line.
    ///
    /// ## Common Causes
    ///
    /// - Attribute names containing `=`, `#` or line breaks
    /// - Values or comments spanning several lines
    /// - Empty public keys
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The edit is well formed but not allowed.
    ///
    /// Used for changes to a peer's `PublicKey` through the attribute API; peers are
    /// added and removed as a whole.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization of the settings file failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The `wg` binary could not be spawned.
    ///
    /// ## Resolution
    ///
    /// Install the `wireguard-tools` package or point `tools.wg` at the binary.
    #[error("WireGuard tools not installed: `{0}` was not found. Install wireguard-tools")]
    WgToolsNotInstalled(String),
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    pub(crate) fn parse(index: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line: index + 1,
            message: message.into(),
        }
    }

    /// Check if the error might go away when the operation is retried.
    ///
    /// Only interrupted or timed out I/O qualifies; document errors are permanent.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// - `"io"` - file system operations
    /// - `"parse"` - malformed documents
    /// - `"duplicate_peer"` - peer key already present
    /// - `"not_found"` - missing interface or peer
    /// - `"invalid_input"` - arguments that cannot be rendered as lines
    /// - `"invalid_operation"` - disallowed edits
    /// - `"config"` - settings problems
    /// - `"serialization"` - TOML conversion
    /// - `"wg_tools"` - missing `wg` binary
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parse { .. } => "parse",
            Self::DuplicatePeer(_) => "duplicate_peer",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::WgToolsNotInstalled(_) => "wg_tools",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
