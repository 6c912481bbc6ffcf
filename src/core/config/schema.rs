//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Example
//!
//! ```toml
//! [github]
//! api_base = "https://api.github.com"
//! timeout_secs = 20
//!
//! [repository]
//! default_name = "leetcode_repo"
//! commit_message = "Add LeetCode solution: {path}"
//!
//! [catalog]
//! enabled = true
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing. Every field is optional in the file;
//! accessors on [`Config`](super::Config) apply defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Upper bound for the request timeout.
pub const MAX_TIMEOUT_SECS: u64 = 120;

/// Default User-Agent header value.
pub const DEFAULT_USER_AGENT: &str = "leetpush";

/// Default repository name under the authenticated login.
pub const DEFAULT_REPO_NAME: &str = "leetcode_repo";

/// Description used when the repository has to be created.
pub const DEFAULT_REPO_DESCRIPTION: &str = "LeetCode solutions pushed by LeetCode Pusher";

/// Commit message template. `{path}` is replaced by the file path.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Add LeetCode solution: {path}";

/// Default LeetCode GraphQL endpoint.
pub const DEFAULT_CATALOG_ENDPOINT: &str = "https://leetcode.com/graphql";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// GitHub API settings
    pub github: Option<GitHubSection>,

    /// Target repository settings
    pub repository: Option<RepositorySection>,

    /// Problem catalog settings
    pub catalog: Option<CatalogSection>,

    /// Secret storage settings
    pub secrets: Option<SecretsSection>,

    /// Push log settings
    pub log: Option<LogSection>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(github) = &self.github {
            github.validate()?;
        }
        if let Some(repository) = &self.repository {
            repository.validate()?;
        }
        if let Some(catalog) = &self.catalog {
            catalog.validate()?;
        }
        Ok(())
    }
}

/// `[github]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubSection {
    /// API base URL (configurable for GitHub Enterprise)
    pub api_base: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// User-Agent header
    pub user_agent: Option<String>,
}

impl GitHubSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = &self.api_base {
            validate_url("github.api_base", base)?;
        }
        if let Some(secs) = self.timeout_secs {
            if secs == 0 || secs > MAX_TIMEOUT_SECS {
                return Err(ConfigError::InvalidValue(format!(
                    "github.timeout_secs must be between 1 and {}, got {}",
                    MAX_TIMEOUT_SECS, secs
                )));
            }
        }
        if let Some(agent) = &self.user_agent {
            if agent.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "github.user_agent cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// `[repository]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepositorySection {
    /// Repository name used when no `owner/name` is given
    pub default_name: Option<String>,

    /// Description for newly created repositories
    pub description: Option<String>,

    /// Commit message template
    pub commit_message: Option<String>,
}

impl RepositorySection {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.default_name {
            if name.is_empty() || name.contains('/') || name.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidValue(format!(
                    "repository.default_name '{}' must be a bare repository name",
                    name
                )));
            }
        }
        if let Some(message) = &self.commit_message {
            if message.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "repository.commit_message cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// `[catalog]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogSection {
    /// Look up problem difficulty after a push
    pub enabled: Option<bool>,

    /// GraphQL endpoint
    pub endpoint: Option<String>,
}

impl CatalogSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(endpoint) = &self.endpoint {
            validate_url("catalog.endpoint", endpoint)?;
        }
        Ok(())
    }
}

/// `[secrets]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsSection {
    /// Override for the secrets file location
    pub path: Option<PathBuf>,
}

/// `[log]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    /// Override for the push log location
    pub path: Option<PathBuf>,
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "{} must be an http(s) URL, got '{}'",
            field, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_valid() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn parses_all_sections() {
        let config: FileConfig = toml::from_str(
            r#"
            [github]
            api_base = "https://github.example.com/api/v3"
            timeout_secs = 10
            user_agent = "custom"

            [repository]
            default_name = "solutions"
            description = "mine"
            commit_message = "Solve {path}"

            [catalog]
            enabled = false
            endpoint = "http://localhost:9000/graphql"

            [secrets]
            path = "/tmp/secrets.toml"

            [log]
            path = "/tmp/log.jsonl"
            "#,
        )
        .unwrap();

        config.validate().unwrap();
        let github = config.github.unwrap();
        assert_eq!(github.timeout_secs, Some(10));
        assert_eq!(
            config.repository.unwrap().default_name.as_deref(),
            Some("solutions")
        );
        assert_eq!(config.catalog.unwrap().enabled, Some(false));
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: Result<FileConfig, _> = toml::from_str("[github]\ntoken = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_bad_timeout() {
        for secs in [0, MAX_TIMEOUT_SECS + 1] {
            let config = FileConfig {
                github: Some(GitHubSection {
                    timeout_secs: Some(secs),
                    ..Default::default()
                }),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn rejects_non_http_api_base() {
        let config = FileConfig {
            github: Some(GitHubSection {
                api_base: Some("ftp://example.com".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("github.api_base"));
    }

    #[test]
    fn rejects_qualified_default_name() {
        let config = FileConfig {
            repository: Some(RepositorySection {
                default_name: Some("alice/repo".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
