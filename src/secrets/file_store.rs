//! secrets::file_store
//!
//! TOML-file secret storage.
//!
//! The file holds a flat table of namespaced keys:
//!
//! ```toml
//! "github.token" = "ghp_..."
//! ```
//!
//! It is rewritten whole on every change: a sibling temp file is created
//! with mode 0600 on Unix, written, synced, then renamed over the original.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use tracing::debug;

use super::traits::{SecretError, SecretStore};

/// Secrets in a TOML file, by default `~/.leetpush/secrets.toml`.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Store at the default location.
    pub fn new() -> Result<Self, SecretError> {
        let home = dirs::home_dir().ok_or(SecretError::NoHomeDir)?;
        Ok(Self::with_path(home.join(".leetpush").join("secrets.toml")))
    }

    /// Store at an explicit location.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the secrets file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SecretError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e, SecretError::ReadError)),
        };

        // toml errors quote the offending line, which may hold a secret.
        toml::from_str(&content).map_err(|_| {
            SecretError::ReadError(format!("'{}' is not a valid secrets file", self.path.display()))
        })
    }

    fn save(&self, secrets: &BTreeMap<String, String>) -> Result<(), SecretError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e, SecretError::WriteError))?;
        }

        let content = toml::to_string(secrets)
            .map_err(|e| SecretError::WriteError(format!("cannot encode secrets: {}", e)))?;
        let temp_path = self.path.with_extension("toml.tmp");

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&temp_path)
            .map_err(|e| self.io_error(e, SecretError::WriteError))?;
        // `mode` only applies on creation; a leftover temp file keeps its bits.
        #[cfg(unix)]
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| self.io_error(e, SecretError::WriteError))?;
        file.write_all(content.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| self.io_error(e, SecretError::WriteError))?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(e, SecretError::WriteError))?;
        debug!(path = %self.path.display(), keys = secrets.len(), "secrets saved");
        Ok(())
    }

    fn io_error(&self, err: io::Error, wrap: fn(String) -> SecretError) -> SecretError {
        let location = self.path.display().to_string();
        if err.kind() == io::ErrorKind::PermissionDenied {
            SecretError::PermissionDenied(location)
        } else {
            wrap(format!("{}: {}", location, err))
        }
    }

    /// Whether the file is private to its owner. A missing file counts as
    /// private.
    #[cfg(unix)]
    pub fn is_private(&self) -> Result<bool, SecretError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.permissions().mode() & 0o077 == 0),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(self.io_error(e, SecretError::ReadError)),
        }
    }

    #[cfg(not(unix))]
    pub fn is_private(&self) -> Result<bool, SecretError> {
        Ok(true)
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let mut secrets = self.load()?;
        secrets.insert(key.to_string(), value.to_string());
        self.save(&secrets)
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let mut secrets = self.load()?;
        if secrets.remove(key).is_none() {
            return Ok(());
        }
        self.save(&secrets)
    }
}
