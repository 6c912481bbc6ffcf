//! secrets
//!
//! Storage for the GitHub access token.
//!
//! # Token resolution
//!
//! [`resolve_token`] prefers `$LEETPUSH_TOKEN`, then the token stored under
//! [`GITHUB_TOKEN_KEY`]. The environment variable is convenient for CI and
//! never touches disk.
//!
//! # Security
//!
//! - Secret values never appear in errors or log events
//! - [`FileSecretStore`] keeps its file at mode 0600 on Unix
//! - Writes replace the file atomically
//!
//! # Example
//!
//! ```no_run
//! use leetpush::secrets::{FileSecretStore, SecretStore, GITHUB_TOKEN_KEY};
//!
//! let store = FileSecretStore::new().unwrap();
//! store.set(GITHUB_TOKEN_KEY, "ghp_xxxx").unwrap();
//! assert!(store.exists(GITHUB_TOKEN_KEY).unwrap());
//! ```

mod file_store;
mod traits;

pub use file_store::FileSecretStore;
pub use traits::{MemorySecretStore, SecretError, SecretStore};

use std::fmt;

use crate::core::types::Credential;

/// Key the GitHub token is stored under.
pub const GITHUB_TOKEN_KEY: &str = "github.token";

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV: &str = "LEETPUSH_TOKEN";

/// Where a resolved token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOrigin {
    Environment,
    Store,
}

impl fmt::Display for TokenOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenOrigin::Environment => write!(f, "${}", TOKEN_ENV),
            TokenOrigin::Store => write!(f, "secret store"),
        }
    }
}

/// Find the credential to use.
///
/// `env_value` is the value of [`TOKEN_ENV`], passed in so callers decide
/// how the environment is read. Blank values are ignored.
pub fn resolve_token(
    env_value: Option<String>,
    store: &dyn SecretStore,
) -> Result<Option<(Credential, TokenOrigin)>, SecretError> {
    if let Some(value) = env_value {
        let credential = Credential::new(value);
        if !credential.is_empty() {
            return Ok(Some((credential, TokenOrigin::Environment)));
        }
    }

    Ok(store
        .get(GITHUB_TOKEN_KEY)?
        .map(Credential::new)
        .filter(|c| !c.is_empty())
        .map(|c| (c, TokenOrigin::Store)))
}
