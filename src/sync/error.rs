//! sync::error
//!
//! Failure taxonomy of a sync call.
//!
//! Every failure carries a machine-readable [`SyncErrorKind`] and a
//! human-readable `Display`. Callers branch on the kind; they show the
//! message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{RepositoryRef, TypeError};
use crate::forge::ForgeError;

/// Errors from a sync call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The repository reference is not `owner/name`. No network call was made.
    #[error("malformed repository reference '{0}': expected 'owner/name'")]
    MalformedRepositoryRef(String),

    /// The file path is unusable. No network call was made.
    #[error("invalid target path '{path}': {reason}")]
    InvalidTarget { path: String, reason: String },

    /// The remote rejected the credential.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The remote could not be reached or did not answer in time.
    #[error("remote unavailable: {message}")]
    RemoteUnavailable { message: String, timed_out: bool },

    /// The remote answered with something unexpected.
    #[error("remote returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// The write raced with another writer.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The repository was missing and the remote refused to create it.
    #[error("failed to create repository '{repo}': {reason}")]
    RepoCreateFailed { repo: String, reason: String },
}

/// Machine-readable classification of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncErrorKind {
    MalformedRepositoryRef,
    InvalidTarget,
    AuthenticationFailed,
    RemoteUnavailable,
    Remote,
    Conflict,
    RepoCreateFailed,
}

impl SyncErrorKind {
    /// Stable identifier, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncErrorKind::MalformedRepositoryRef => "malformed_repository_ref",
            SyncErrorKind::InvalidTarget => "invalid_target",
            SyncErrorKind::AuthenticationFailed => "authentication_failed",
            SyncErrorKind::RemoteUnavailable => "remote_unavailable",
            SyncErrorKind::Remote => "remote",
            SyncErrorKind::Conflict => "conflict",
            SyncErrorKind::RepoCreateFailed => "repo_create_failed",
        }
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncErrorKind::RemoteUnavailable | SyncErrorKind::Conflict
        )
    }

    /// Status an HTTP front end would answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            SyncErrorKind::MalformedRepositoryRef | SyncErrorKind::InvalidTarget => 400,
            SyncErrorKind::AuthenticationFailed => 401,
            SyncErrorKind::RemoteUnavailable => 503,
            SyncErrorKind::Remote | SyncErrorKind::RepoCreateFailed => 502,
            SyncErrorKind::Conflict => 409,
        }
    }
}

impl std::fmt::Display for SyncErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyncError {
    /// Classification of this error.
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            SyncError::MalformedRepositoryRef(_) => SyncErrorKind::MalformedRepositoryRef,
            SyncError::InvalidTarget { .. } => SyncErrorKind::InvalidTarget,
            SyncError::AuthenticationFailed(_) => SyncErrorKind::AuthenticationFailed,
            SyncError::RemoteUnavailable { .. } => SyncErrorKind::RemoteUnavailable,
            SyncError::Remote { .. } => SyncErrorKind::Remote,
            SyncError::Conflict(_) => SyncErrorKind::Conflict,
            SyncError::RepoCreateFailed { .. } => SyncErrorKind::RepoCreateFailed,
        }
    }

    /// Shorthand for `self.kind().is_retryable()`.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Map a failed repository creation.
    ///
    /// Transport and credential failures keep their own kinds; anything the
    /// remote reported is `RepoCreateFailed`.
    pub(crate) fn repo_create(repo: &RepositoryRef, err: ForgeError) -> Self {
        match err {
            ForgeError::Timeout(_) | ForgeError::NetworkError(_) | ForgeError::AuthFailed(_) => {
                err.into()
            }
            other => SyncError::RepoCreateFailed {
                repo: repo.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<TypeError> for SyncError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::MalformedRepositoryRef(value) => SyncError::MalformedRepositoryRef(value),
            TypeError::InvalidPath { path, reason } => SyncError::InvalidTarget {
                path,
                reason: reason.to_string(),
            },
        }
    }
}

impl From<ForgeError> for SyncError {
    fn from(err: ForgeError) -> Self {
        match err {
            ForgeError::AuthFailed(message) => SyncError::AuthenticationFailed(message),
            ForgeError::Conflict(message) => SyncError::Conflict(message),
            ForgeError::ApiError { status, message } => SyncError::Remote {
                status,
                body: message,
            },
            ForgeError::Timeout(message) => SyncError::RemoteUnavailable {
                message,
                timed_out: true,
            },
            ForgeError::NetworkError(message) => SyncError::RemoteUnavailable {
                message,
                timed_out: false,
            },
            // The body arrived with a success status but was unusable.
            ForgeError::Decode(message) => SyncError::Remote {
                status: 200,
                body: message,
            },
            // No response at all.
            ForgeError::Config(message) => SyncError::Remote {
                status: 0,
                body: message,
            },
        }
    }
}
