//! # wgconf-core
//!
//! Lossless reading and editing of WireGuard configuration files.
//!
//! A configuration is one `[Interface]` section followed by any number of `[Peer]`
//! sections. [`Document`] keeps the file's raw lines as the single source of truth and
//! derives section records from them, so comments, blank lines, spacing and line endings
//! survive every edit untouched.
//!
//! ## Architecture
//!
//! - **Lines**: classification of single raw lines and the disabled marker (`#!`)
//! - **Parsing**: section bounds, comment attachment and attribute folding
//! - **Document**: the line store, queries and serialization
//! - **Editing**: attribute and peer mutations as single splices of the line store
//! - **Files**: resolving interface names and writing files atomically
//! - **Keys**: `wg genkey`/`pubkey`/`genpsk` through the external tool
//! - **Configuration**: settings for front ends
//!
//! ## Quick Start
//!
//! ```rust
//! use wgconf_core::{Document, Result};
//!
//! # fn main() -> Result<()> {
//! let mut doc = Document::parse("[Interface]\nListenPort = 51820\n")?;
//!
//! doc.add_peer("xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=", Some("laptop"))?;
//! doc.add_attribute(
//!     Some("xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg="),
//!     "AllowedIPs",
//!     "10.0.0.2/32",
//!     None,
//!     false,
//! )?;
//! doc.disable_peer("xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=")?;
//!
//! assert_eq!(
//!     doc.to_string(),
//!     "[Interface]\nListenPort = 51820\n\n#! # laptop\n#! [Peer]\n\
//!      #! PublicKey = xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=\n\
//!      #! AllowedIPs = 10.0.0.2/32\n"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`]:
//!
//! ```rust
//! use wgconf_core::{Document, Error};
//!
//! match Document::parse("[Interface]\nnot an assignment\n") {
//!     Err(Error::Parse { line, message }) => eprintln!("line {line}: {message}"),
//!     Err(e) => eprintln!("failed: {e}"),
//!     Ok(_) => unreachable!(),
//! }
//! ```

/// Settings for front ends
pub mod config;
/// Section records, queries and serialization
pub mod document;
mod edit;
/// Error types and result aliases
pub mod error;
/// Configuration files on disk
pub mod io;
/// Key generation through the `wg` tool
pub mod keys;
/// Single line classification
pub mod line;
mod parser;
/// Section and attribute records
pub mod section;
/// Attribute values
pub mod value;

// Re-export commonly used types
pub use config::{Config, PathsConfig, ToolsConfig, WriteConfig};
pub use document::{Document, LineEnding, SectionView};
pub use error::{Error, Result};
pub use io::{ConfigFile, resolve_config_path};
pub use keys::{KeyPair, WgTools};
pub use line::{DISABLED_MARKER, KEY_ATTRIBUTE, SectionKind};
pub use section::{Attributes, Section};
pub use value::{AttributeValue, Scalar};
