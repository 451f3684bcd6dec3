//! Key generation through the external `wg` tool.
//!
//! `wg genkey`, `wg pubkey` and `wg genpsk` are run as child processes. A tool that exits
//! unsuccessfully or writes anything to stderr yields `Ok(None)`; only a binary that
//! cannot be spawned at all is an error.
//!
//! ```rust,no_run
//! use wgconf_core::keys::WgTools;
//!
//! # async fn example() -> wgconf_core::Result<()> {
//! let wg = WgTools::new();
//! if let Some(pair) = wg.generate_keypair().await? {
//!     println!("PublicKey = {}", pair.public_key);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};

/// Default name of the WireGuard tool, looked up on `PATH`.
pub const DEFAULT_WG_BINARY: &str = "wg";

/// A private key and the public key derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyPair {
    /// Base64 private key.
    pub private_key: String,
    /// Base64 public key.
    pub public_key: String,
}

/// Handle on the `wg` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WgTools {
    binary: PathBuf,
}

impl Default for WgTools {
    fn default() -> Self {
        Self::new()
    }
}

impl WgTools {
    /// Use `wg` from `PATH`.
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_WG_BINARY)
    }

    /// Use a specific binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// The binary that will be spawned.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// `wg genkey`
    #[instrument(level = "debug", skip(self))]
    pub async fn generate_private_key(&self) -> Result<Option<String>> {
        self.run("genkey", None).await
    }

    /// `wg pubkey`, feeding `private_key` on stdin.
    ///
    /// Returns `None` without spawning anything when no key is given.
    #[instrument(level = "debug", skip_all)]
    pub async fn public_key(&self, private_key: Option<&str>) -> Result<Option<String>> {
        let Some(private_key) = private_key else {
            return Ok(None);
        };
        self.run("pubkey", Some(private_key)).await
    }

    /// `wg genpsk`
    #[instrument(level = "debug", skip(self))]
    pub async fn generate_preshared_key(&self) -> Result<Option<String>> {
        self.run("genpsk", None).await
    }

    /// Generate a private key and derive its public key.
    pub async fn generate_keypair(&self) -> Result<Option<KeyPair>> {
        let Some(private_key) = self.generate_private_key().await? else {
            return Ok(None);
        };
        let public_key = self.public_key(Some(&private_key)).await?;
        Ok(public_key.map(|public_key| KeyPair {
            private_key,
            public_key,
        }))
    }

    async fn run(&self, subcommand: &str, input: Option<&str>) -> Result<Option<String>> {
        let mut child = Command::new(&self.binary)
            .arg(subcommand)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::WgToolsNotInstalled(self.binary.display().to_string())
                } else {
                    Error::Io(e)
                }
            })?;

        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin.write_all(input.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() || !output.stderr.is_empty() {
            warn!(
                subcommand,
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "wg did not produce a key"
            );
            return Ok(None);
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(subcommand, empty = text.is_empty(), "wg finished");
        Ok((!text.is_empty()).then_some(text))
    }
}
