//! Settings for wgconf front ends.
//!
//! Settings live in a TOML file in the platform config directory (or the file named by
//! `WGCONF_CONFIG`). Every field has a default, so a missing file or a partial file is
//! fine. Environment variables override file values.
//!
//! ```toml
//! [paths]
//! config_dir = "/etc/wireguard"
//!
//! [write]
//! file_mode = 0o600
//!
//! [tools]
//! wg = "/usr/bin/wg"
//! ```
//!
//! ## Environment Overrides
//!
//! - `WGCONF_CONFIG` - path of the settings file itself
//! - `WGCONF_CONFIG_DIR` - directory searched for `<name>.conf`
//! - `WGCONF_WG` - the `wg` binary

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::io::resolve_config_path;
use crate::keys::{DEFAULT_WG_BINARY, WgTools};

/// Environment variable naming the settings file.
pub const ENV_CONFIG: &str = "WGCONF_CONFIG";
/// Environment variable overriding [`PathsConfig::config_dir`].
pub const ENV_CONFIG_DIR: &str = "WGCONF_CONFIG_DIR";
/// Environment variable overriding [`ToolsConfig::wg`].
pub const ENV_WG: &str = "WGCONF_WG";

/// Top level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where configuration files live.
    pub paths: PathsConfig,
    /// How files are written.
    pub write: WriteConfig,
    /// External tools.
    pub tools: ToolsConfig,
}

/// Filesystem locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `<interface>.conf` files.
    pub config_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("/etc/wireguard"),
        }
    }
}

/// Options for saving files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteConfig {
    /// Unix permission bits for written configuration files.
    pub file_mode: u32,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self { file_mode: 0o640 }
    }
}

/// External tool locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// The `wg` binary.
    pub wg: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            wg: PathBuf::from(DEFAULT_WG_BINARY),
        }
    }
}

impl Config {
    /// Load settings from the default location, then apply environment overrides.
    ///
    /// A missing settings file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            debug!(path = %path.display(), "no settings file, using defaults");
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load settings from `path` without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Save settings to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save settings to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Apply overrides, reading variables through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(dir) = lookup(ENV_CONFIG_DIR) {
            self.paths.config_dir = PathBuf::from(dir);
        }
        if let Some(wg) = lookup(ENV_WG) {
            self.tools.wg = PathBuf::from(wg);
        }
    }

    /// Path of the settings file.
    ///
    /// `WGCONF_CONFIG` wins; otherwise `config.toml` in the platform config directory
    /// (`~/.config/wgconf/` on Linux).
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(ENV_CONFIG).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        let project_dirs = directories::ProjectDirs::from("org", "wgconf", "wgconf")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Resolve an interface name (or a path) to a configuration file.
    pub fn resolve(&self, name: &str) -> PathBuf {
        resolve_config_path(&self.paths.config_dir, name)
    }

    /// Key tooling configured by these settings.
    pub fn wg_tools(&self) -> WgTools {
        WgTools::with_binary(&self.tools.wg)
    }
}
