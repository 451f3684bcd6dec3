//! CLI error handling with semantic exit codes.
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Command completed successfully |
//! | 1 | `Internal` | Unexpected/internal error |
//! | 2 | `Usage` | Invalid arguments or settings |
//! | 3 | `NotFound` | Configuration file or peer not found |
//! | 4 | `Invalid` | Unparsable file or rejected edit |
//! | 5 | `Conflict` | Peer or file already exists |
//! | 6 | `ExternalTool` | `wg` missing or failing |
//!
//! ```bash
//! wgconf peer add wg0 "$key"
//! case $? in
//!     0) echo "added" ;;
//!     5) echo "peer already present" ;;
//!     *) echo "other error" ;;
//! esac
//! ```

use std::fmt;
use std::process::ExitCode;

use wgconf_core::Error as CoreError;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Unexpected or internal error (exit code 1).
    Internal = 1,

    /// Invalid arguments or settings (exit code 2).
    Usage = 2,

    /// Configuration file or peer not found (exit code 3).
    NotFound = 3,

    /// The file does not parse, or an edit was rejected (exit code 4).
    Invalid = 4,

    /// The peer or file already exists (exit code 5).
    Conflict = 5,

    /// The `wg` tool is missing or produced no key (exit code 6).
    ExternalTool = 6,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Create an `ExitCode` from this category.
    #[must_use]
    pub fn as_exit_code(self) -> ExitCode {
        ExitCode::from(self.exit_code())
    }

    /// Get a short description of this error category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal error",
            Self::Usage => "usage error",
            Self::NotFound => "not found",
            Self::Invalid => "invalid configuration",
            Self::Conflict => "conflict",
            Self::ExternalTool => "external tool error",
        }
    }

    /// Category of a library error.
    #[must_use]
    pub const fn from_core(err: &CoreError) -> Self {
        match err {
            CoreError::NotFound(_) => Self::NotFound,
            CoreError::Parse { .. }
            | CoreError::InvalidInput(_)
            | CoreError::InvalidOperation(_) => Self::Invalid,
            CoreError::DuplicatePeer(_) => Self::Conflict,
            CoreError::Config(_) => Self::Usage,
            CoreError::WgToolsNotInstalled(_) => Self::ExternalTool,
            CoreError::Io(_) | CoreError::Serialization(_) => Self::Internal,
        }
    }

    /// Infer the error category from an error message.
    ///
    /// Fallback for errors that carry neither a [`CliError`] nor a library error.
    #[must_use]
    pub fn infer_from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("not found")
            || msg_lower.contains("no such")
            || msg_lower.contains("does not exist")
        {
            return Self::NotFound;
        }

        if msg_lower.contains("already exists") {
            return Self::Conflict;
        }

        if msg_lower.contains("parse error") || msg_lower.contains("invalid input") {
            return Self::Invalid;
        }

        if msg_lower.contains("wireguard-tools") || msg_lower.contains("wg tool") {
            return Self::ExternalTool;
        }

        if msg_lower.contains("invalid argument")
            || msg_lower.contains("invalid value")
            || msg_lower.contains("cannot use")
        {
            return Self::Usage;
        }

        Self::Internal
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Create a conflict error.
    pub fn conflict(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Conflict, source)
    }

    /// Create an external tool error.
    pub fn external_tool(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::ExternalTool, source)
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }

    /// Create an `ExitCode` from this error.
    #[must_use]
    pub fn as_exit_code(&self) -> ExitCode {
        self.category.as_exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Determine the exit code from an `anyhow::Error`.
///
/// An explicit [`CliError`] wins, then the first library error in the chain, then a
/// guess from the message.
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }

    if let Some(core_err) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<CoreError>())
    {
        return ErrorCategory::from_core(core_err).exit_code();
    }

    ErrorCategory::infer_from_message(&err.to_string()).exit_code()
}
