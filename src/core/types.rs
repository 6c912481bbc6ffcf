//! core::types
//!
//! Strong types for the content-sync domain.
//!
//! # Types
//!
//! - [`Credential`] - Bearer token plus the authorization scheme to present it with
//! - [`AuthScheme`] - The two `Authorization` header formats GitHub accepts
//! - [`RepositoryRef`] - Validated `owner/name` repository reference
//! - [`FileTarget`] - A file path and the bytes to synchronize to it
//! - [`RemoteFileState`] - What the remote holds at a path
//! - [`SyncOutcome`] - Result of a successful sync call
//!
//! # Validation
//!
//! Repository references and file targets are validated at construction.
//! A malformed `owner/name` string is a distinct error, never a not-found.
//!
//! # Examples
//!
//! ```
//! use leetpush::core::types::{FileTarget, RepositoryRef};
//!
//! let repo = RepositoryRef::parse("alice/leetcode_repo").unwrap();
//! assert_eq!(repo.owner(), "alice");
//! assert_eq!(repo.name(), "leetcode_repo");
//!
//! assert!(RepositoryRef::parse("onlyname").is_err());
//! assert!(FileTarget::new("", b"print(1)".to_vec()).is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("malformed repository reference '{0}': expected 'owner/name'")]
    MalformedRepositoryRef(String),

    #[error("invalid file path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },
}

/// Authorization header scheme.
///
/// GitHub accepts `token <cred>` for classic tokens and `Bearer <cred>` for
/// OAuth and fine-grained tokens. Which one a given token needs is not known
/// in advance, so the identity probe tries [`AuthScheme::PRIMARY`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: token <cred>`
    Token,
    /// `Authorization: Bearer <cred>`
    Bearer,
}

impl AuthScheme {
    /// Scheme tried first by the identity probe.
    pub const PRIMARY: AuthScheme = AuthScheme::Token;
    /// Scheme tried after the primary one is rejected.
    pub const SECONDARY: AuthScheme = AuthScheme::Bearer;

    /// Probe order.
    pub const PROBE_ORDER: [AuthScheme; 2] = [Self::PRIMARY, Self::SECONDARY];

    /// The header prefix for this scheme.
    pub fn prefix(&self) -> &'static str {
        match self {
            AuthScheme::Token => "token",
            AuthScheme::Bearer => "Bearer",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::Token => write!(f, "token"),
            AuthScheme::Bearer => write!(f, "bearer"),
        }
    }
}

/// An opaque access token and the scheme it is presented with.
///
/// Owned by the caller. The sync engine and forge only borrow it for the
/// duration of one call and never store it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    scheme: AuthScheme,
}

impl Credential {
    /// Wrap a token, presenting it with the primary scheme until an identity
    /// probe says otherwise.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into().trim().to_string(),
            scheme: AuthScheme::PRIMARY,
        }
    }

    /// The same token bound to a specific scheme.
    pub fn with_scheme(&self, scheme: AuthScheme) -> Self {
        Self {
            token: self.token.clone(),
            scheme,
        }
    }

    /// The raw token. Never log this.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The scheme this credential is presented with.
    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Whether the token is empty.
    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }

    /// Full `Authorization` header value for the bound scheme.
    pub fn authorization(&self) -> String {
        self.authorization_with(self.scheme)
    }

    /// Full `Authorization` header value for an explicit scheme.
    pub fn authorization_with(&self, scheme: AuthScheme) -> String {
        format!("{} {}", scheme.prefix(), self.token)
    }
}

// Custom Debug to avoid exposing the token
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("scheme", &self.scheme)
            .finish()
    }
}

/// A validated `owner/name` repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Parse an `owner/name` string.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::MalformedRepositoryRef` when the separator is
    /// missing, either part is empty, there is more than one `/`, or a part
    /// contains whitespace.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        let malformed = || TypeError::MalformedRepositoryRef(value.to_string());

        let (owner, name) = value.split_once('/').ok_or_else(malformed)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(malformed());
        }
        if owner.chars().chain(name.chars()).any(char::is_whitespace) {
            return Err(malformed());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Build a reference from already-separated parts.
    pub fn new(owner: &str, name: &str) -> Result<Self, TypeError> {
        Self::parse(&format!("{}/{}", owner, name))
    }

    /// Repository owner (user or organization).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl TryFrom<String> for RepositoryRef {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RepositoryRef> for String {
    fn from(value: RepositoryRef) -> Self {
        value.to_string()
    }
}

impl std::str::FromStr for RepositoryRef {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The file being synchronized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    path: String,
    content: Vec<u8>,
}

impl FileTarget {
    /// Create a target, validating the repository path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPath` for empty paths, leading or trailing
    /// `/`, and empty, `.` or `..` segments.
    pub fn new(path: impl Into<String>, content: Vec<u8>) -> Result<Self, TypeError> {
        let path = path.into();
        Self::validate_path(&path)?;
        Ok(Self { path, content })
    }

    fn validate_path(path: &str) -> Result<(), TypeError> {
        let invalid = |reason| TypeError::InvalidPath {
            path: path.to_string(),
            reason,
        };

        if path.is_empty() {
            return Err(invalid("path cannot be empty"));
        }
        if path.starts_with('/') || path.ends_with('/') {
            return Err(invalid("path cannot start or end with '/'"));
        }
        for segment in path.split('/') {
            match segment {
                "" => return Err(invalid("path cannot contain empty segments")),
                "." | ".." => return Err(invalid("path cannot contain '.' or '..' segments")),
                _ => {}
            }
        }
        Ok(())
    }

    /// Path of the file inside the repository.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Content to write.
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Result of probing the remote for a file.
///
/// `sha` is the version token the remote requires to overwrite an existing
/// file. Its absence means the write creates a new file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteFileState {
    pub exists: bool,
    pub sha: Option<String>,
    pub content: Option<Vec<u8>>,
}

impl RemoteFileState {
    /// No file at the probed path.
    pub fn missing() -> Self {
        Self::default()
    }

    /// A file with known content and version token.
    pub fn present(content: Vec<u8>, sha: impl Into<String>) -> Self {
        Self {
            exists: true,
            sha: Some(sha.into()),
            content: Some(content),
        }
    }
}

/// Outcome of a successful sync call.
///
/// Failures are reported through the `Err` arm as a
/// [`SyncError`](crate::sync::SyncError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Remote content already matched; no write was issued.
    Unchanged,
    /// A new file was created.
    Created,
    /// An existing file was overwritten.
    Updated,
}

impl SyncOutcome {
    /// Whether this outcome represents a write that landed.
    pub fn is_write(&self) -> bool {
        matches!(self, SyncOutcome::Created | SyncOutcome::Updated)
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Unchanged => write!(f, "unchanged"),
            SyncOutcome::Created => write!(f, "created"),
            SyncOutcome::Updated => write!(f, "updated"),
        }
    }
}

/// Who a credential authenticates as, and which scheme worked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub login: String,
    pub scheme: AuthScheme,
}
