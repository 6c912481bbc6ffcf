//! forge::traits
//!
//! The content API a sync needs from a repository host.
//!
//! # Design
//!
//! The `ContentForge` trait is async because every operation is a network
//! call. All methods return `Result` and every failure is typed: a probe
//! never turns an error into "not found".
//!
//! Credentials are borrowed per call. Implementations must not retain them.
//!
//! # Example
//!
//! ```ignore
//! use leetpush::core::types::{Credential, RepositoryRef};
//! use leetpush::forge::{ContentForge, ForgeError};
//!
//! async fn probe(forge: &dyn ContentForge, cred: &Credential) -> Result<(), ForgeError> {
//!     let repo = RepositoryRef::parse("alice/leetcode_repo").unwrap();
//!     if !forge.repository_exists(cred, &repo).await? {
//!         forge.create_repository(cred, repo.name()).await?;
//!     }
//!     let state = forge.fetch_file(cred, &repo, "two_sum.py").await?;
//!     println!("exists: {}", state.exists);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{Credential, Identity, RemoteFileState, RepositoryRef, SyncOutcome};

/// Errors from forge operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForgeError {
    /// Credential rejected (invalid token, expired, revoked).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Write rejected because the supplied version token is stale.
    #[error("conflict: {0}")]
    Conflict(String),

    /// API returned an unexpected status.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// Response arrived but could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The client was constructed with unusable settings.
    #[error("invalid forge configuration: {0}")]
    Config(String),
}

impl ForgeError {
    /// Whether the remote could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ForgeError::Timeout(_) | ForgeError::NetworkError(_))
    }
}

/// Content operations against a repository host.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// - `AuthFailed`: the credential was rejected
/// - `Timeout` / `NetworkError`: the host could not be reached; safe to retry
/// - `Conflict`: a write raced with another writer; refetch and retry
/// - `ApiError` / `Decode`: unexpected response, carry the status for diagnostics
#[async_trait]
pub trait ContentForge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Resolve who the credential belongs to.
    ///
    /// Tries the primary authorization scheme, then once more with the
    /// secondary scheme if the first attempt returns any non-success status.
    /// The returned [`Identity`] carries the scheme that worked.
    ///
    /// # Errors
    ///
    /// - `AuthFailed` if both schemes are rejected
    /// - `Timeout` / `NetworkError` if either attempt cannot reach the host
    async fn check_identity(&self, credential: &Credential) -> Result<Identity, ForgeError>;

    /// Check whether a repository exists.
    ///
    /// # Returns
    ///
    /// `true` on 200, `false` on 404.
    ///
    /// # Errors
    ///
    /// Any other status is an error, never `false`.
    async fn repository_exists(
        &self,
        credential: &Credential,
        repo: &RepositoryRef,
    ) -> Result<bool, ForgeError>;

    /// Create a repository named `name` under the authenticated user.
    ///
    /// # Errors
    ///
    /// `ApiError` carrying the remote status and message on anything but 201.
    async fn create_repository(&self, credential: &Credential, name: &str)
        -> Result<(), ForgeError>;

    /// Read a file and its version token.
    ///
    /// # Returns
    ///
    /// [`RemoteFileState::missing`] on 404, otherwise the decoded content and sha.
    async fn fetch_file(
        &self,
        credential: &Credential,
        repo: &RepositoryRef,
        path: &str,
    ) -> Result<RemoteFileState, ForgeError>;

    /// Write a file.
    ///
    /// `expected_sha` must be the current version token when overwriting and
    /// `None` when creating.
    ///
    /// # Returns
    ///
    /// [`SyncOutcome::Created`] on 201, [`SyncOutcome::Updated`] on 200. Never
    /// [`SyncOutcome::Unchanged`].
    ///
    /// # Errors
    ///
    /// - `Conflict` if `expected_sha` is stale
    /// - `ApiError` with the remote body for any other status
    async fn put_file(
        &self,
        credential: &Credential,
        repo: &RepositoryRef,
        path: &str,
        content: &[u8],
        expected_sha: Option<&str>,
    ) -> Result<SyncOutcome, ForgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forge_error_display() {
        assert_eq!(
            format!("{}", ForgeError::AuthFailed("bad credentials".into())),
            "authentication failed: bad credentials"
        );
        assert_eq!(
            format!("{}", ForgeError::Conflict("sha mismatch".into())),
            "conflict: sha mismatch"
        );
        assert_eq!(
            format!(
                "{}",
                ForgeError::ApiError {
                    status: 422,
                    message: "Validation failed".into()
                }
            ),
            "API error: 422 - Validation failed"
        );
        assert_eq!(
            format!("{}", ForgeError::Timeout("GET /user".into())),
            "request timed out: GET /user"
        );
        assert_eq!(
            format!("{}", ForgeError::NetworkError("connection refused".into())),
            "network error: connection refused"
        );
    }

    #[test]
    fn unavailable_covers_timeout_and_network() {
        assert!(ForgeError::Timeout("x".into()).is_unavailable());
        assert!(ForgeError::NetworkError("x".into()).is_unavailable());
        assert!(!ForgeError::Conflict("x".into()).is_unavailable());
        assert!(!ForgeError::ApiError {
            status: 502,
            message: "bad gateway".into()
        }
        .is_unavailable());
    }
}
