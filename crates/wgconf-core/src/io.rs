//! Reading and writing configuration files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::document::Document;
use crate::error::{Error, Result};

/// File extension of WireGuard configuration files.
pub const CONFIG_EXTENSION: &str = "conf";

/// Map an interface name or path to a configuration file path.
///
/// A bare name such as `wg0` becomes `<dir>/wg0.conf`. Anything that already looks like a
/// path (it contains a separator or ends in `.conf`) is used as given.
///
/// ```rust
/// use std::path::{Path, PathBuf};
/// use wgconf_core::io::resolve_config_path;
///
/// let dir = Path::new("/etc/wireguard");
/// assert_eq!(resolve_config_path(dir, "wg0"), PathBuf::from("/etc/wireguard/wg0.conf"));
/// assert_eq!(resolve_config_path(dir, "./wg1.conf"), PathBuf::from("./wg1.conf"));
/// ```
pub fn resolve_config_path(dir: &Path, name: &str) -> PathBuf {
    let looks_like_path = name.contains(std::path::is_separator)
        || Path::new(name)
            .extension()
            .is_some_and(|ext| ext == CONFIG_EXTENSION);

    if looks_like_path {
        PathBuf::from(name)
    } else {
        dir.join(format!("{name}.{CONFIG_EXTENSION}"))
    }
}

/// A document bound to the file it was read from.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    document: Document,
}

impl ConfigFile {
    /// Read and parse `path`.
    ///
    /// A missing file is reported as [`Error::NotFound`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("configuration file {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;
        let document = Document::parse(&text)?;
        debug!(path = %path.display(), peers = document.peers().len(), "opened configuration");
        Ok(Self { path, document })
    }

    /// Bind an in-memory document to `path` without touching the disk.
    pub fn with_document(path: impl Into<PathBuf>, document: Document) -> Self {
        Self {
            path: path.into(),
            document,
        }
    }

    /// Path the document is saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed document.
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for edits.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Take the document out.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Write the document back to its path.
    ///
    /// The text goes to a temporary sibling first and is renamed over the target, so
    /// readers never observe a half written file. On Unix the file gets `mode`.
    pub fn save(&self, mode: u32) -> Result<()> {
        write_atomic(&self.path, &self.document.to_text(), mode)
    }

    /// Write the document to `path` and bind to it.
    pub fn save_as(&mut self, path: impl Into<PathBuf>, mode: u32) -> Result<()> {
        let path = path.into();
        write_atomic(&path, &self.document.to_text(), mode)?;
        self.path = path;
        Ok(())
    }
}

fn write_atomic(path: &Path, content: &str, mode: u32) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let staged = fs::write(&tmp_path, content)
        .map_err(Error::Io)
        .and_then(|()| set_mode(&tmp_path, mode));
    discard_on_error(&tmp_path, staged)?;

    #[cfg(target_os = "windows")]
    if path.exists() {
        discard_on_error(&tmp_path, fs::remove_file(path).map_err(Error::Io))?;
    }

    discard_on_error(&tmp_path, fs::rename(&tmp_path, path).map_err(Error::Io))?;

    debug!(path = %path.display(), bytes = content.len(), "saved configuration");
    Ok(())
}

/// Remove the temporary file when a step of the save failed.
fn discard_on_error<T>(tmp_path: &Path, result: Result<T>) -> Result<T> {
    if result.is_err() {
        let _ = fs::remove_file(tmp_path);
    }
    result
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
