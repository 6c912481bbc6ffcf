//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$LEETPUSH_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/leetpush/config.toml`
//! 3. `~/.leetpush/config.toml` (canonical write location)
//!
//! A missing file is not an error; defaults are used.
//!
//! # Example
//!
//! ```no_run
//! use leetpush::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! let remote = config.remote_config();
//! println!("GitHub API: {}", remote.api_base);
//! ```

pub mod schema;

pub use schema::FileConfig;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::forge::github::RemoteConfig;
use schema::{
    DEFAULT_API_BASE, DEFAULT_CATALOG_ENDPOINT, DEFAULT_COMMIT_MESSAGE, DEFAULT_REPO_DESCRIPTION,
    DEFAULT_REPO_NAME, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LEETPUSH_CONFIG";

/// Directory name under the home directory.
const APP_DIR: &str = ".leetpush";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Raw file contents
    pub file: FileConfig,
    /// Path the config was loaded from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Self {
            path: Some(path.to_path_buf()),
            ..config
        })
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        file.validate()?;
        Ok(Self { file, path: None })
    }

    /// Find the first existing config file.
    fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("leetpush/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        let path = dirs::home_dir()?.join(APP_DIR).join("config.toml");
        path.exists().then_some(path)
    }

    /// Path the configuration was loaded from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The application directory, `~/.leetpush`.
    pub fn app_dir() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(APP_DIR))
    }

    /// GitHub API base URL.
    pub fn api_base(&self) -> &str {
        self.file
            .github
            .as_ref()
            .and_then(|g| g.api_base.as_deref())
            .unwrap_or(DEFAULT_API_BASE)
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        let secs = self
            .file
            .github
            .as_ref()
            .and_then(|g| g.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// User-Agent header value.
    pub fn user_agent(&self) -> &str {
        self.file
            .github
            .as_ref()
            .and_then(|g| g.user_agent.as_deref())
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Repository name used when none is given explicitly.
    pub fn default_repo_name(&self) -> &str {
        self.file
            .repository
            .as_ref()
            .and_then(|r| r.default_name.as_deref())
            .unwrap_or(DEFAULT_REPO_NAME)
    }

    /// Whether difficulty lookups are enabled.
    pub fn catalog_enabled(&self) -> bool {
        self.file
            .catalog
            .as_ref()
            .and_then(|c| c.enabled)
            .unwrap_or(true)
    }

    /// GraphQL endpoint of the problem catalog.
    pub fn catalog_endpoint(&self) -> &str {
        self.file
            .catalog
            .as_ref()
            .and_then(|c| c.endpoint.as_deref())
            .unwrap_or(DEFAULT_CATALOG_ENDPOINT)
    }

    /// Location of the secrets file.
    pub fn secrets_path(&self) -> Result<PathBuf, ConfigError> {
        match self.file.secrets.as_ref().and_then(|s| s.path.clone()) {
            Some(path) => Ok(path),
            None => Ok(Self::app_dir()?.join("secrets.toml")),
        }
    }

    /// Location of the push log.
    pub fn log_path(&self) -> Result<PathBuf, ConfigError> {
        match self.file.log.as_ref().and_then(|l| l.path.clone()) {
            Some(path) => Ok(path),
            None => Ok(Self::app_dir()?.join("push-log.jsonl")),
        }
    }

    /// Settings for the GitHub client.
    pub fn remote_config(&self) -> RemoteConfig {
        let repository = self.file.repository.as_ref();
        RemoteConfig {
            api_base: self.api_base().trim_end_matches('/').to_string(),
            user_agent: self.user_agent().to_string(),
            timeout: self.timeout(),
            repo_description: repository
                .and_then(|r| r.description.clone())
                .unwrap_or_else(|| DEFAULT_REPO_DESCRIPTION.to_string()),
            commit_message: repository
                .and_then(|r| r.commit_message.clone())
                .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string()),
        }
    }
}
