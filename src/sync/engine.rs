//! sync::engine
//!
//! The idempotent content-sync protocol.
//!
//! # Lifecycle
//!
//! ```text
//! identity probe -> RepoCheck -> [RepoCreate] -> FileCheck -> [Write]
//! ```
//!
//! The probe tries the `token` scheme, then `Bearer`, and the winner is used
//! for every later request of the call. A missing repository is created only
//! when its owner is the authenticated login; anything else is
//! [`SyncError::RepoCreateFailed`] with no file calls.
//!
//! Input is validated before the first phase, so a malformed repository
//! reference or path never reaches the network. A file whose remote content
//! matches the local content (ignoring surrounding ASCII whitespace) is left
//! alone. Otherwise exactly one write is issued, carrying the fetched version
//! token when the file already exists.
//!
//! # Concurrency
//!
//! Check-then-act with no lock. A concurrent writer that changes the file
//! between `FileCheck` and `Write` makes the remote reject the stale version
//! token; that surfaces as [`SyncError::Conflict`] and is not retried.
//!
//! Dropping the future cancels the call between awaits. A repository created
//! before cancellation stays created; repeating the call is safe.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use super::error::SyncError;
use crate::core::types::{Credential, FileTarget, Identity, RepositoryRef, SyncOutcome};
use crate::forge::ContentForge;

/// Phase of a sync call, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Does the repository exist?
    RepoCheck,
    /// Create the missing repository.
    RepoCreate,
    /// Read the current file and its version token.
    FileCheck,
    /// Create or overwrite the file.
    Write,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::RepoCheck => "repo_check",
            SyncPhase::RepoCreate => "repo_create",
            SyncPhase::FileCheck => "file_check",
            SyncPhase::Write => "write",
        };
        f.write_str(name)
    }
}

/// Whether remote content already matches what would be written.
///
/// Surrounding ASCII whitespace on either side is ignored, so a trailing
/// newline added by an editor does not cause a new commit.
pub fn content_matches(remote: &[u8], local: &[u8]) -> bool {
    remote.trim_ascii() == local.trim_ascii()
}

/// Drives one file onto a repository through a [`ContentForge`].
///
/// Holds no per-call state; one engine can serve concurrent calls.
#[derive(Clone)]
pub struct SyncEngine {
    forge: Arc<dyn ContentForge>,
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("forge", &self.forge.name())
            .finish()
    }
}

impl SyncEngine {
    /// Create an engine over a forge.
    pub fn new(forge: Arc<dyn ContentForge>) -> Self {
        Self { forge }
    }

    /// The forge this engine talks to.
    pub fn forge(&self) -> &dyn ContentForge {
        self.forge.as_ref()
    }

    /// Resolve who the credential belongs to.
    ///
    /// Returns the identity and the credential rebound to whichever
    /// authorization scheme the remote accepted. Use the returned credential
    /// for the rest of the call.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` if every scheme was rejected
    /// - `RemoteUnavailable` if the remote could not be reached
    pub async fn authenticate(
        &self,
        credential: &Credential,
    ) -> Result<(Identity, Credential), SyncError> {
        let identity = self.forge.check_identity(credential).await?;
        debug!(login = %identity.login, scheme = %identity.scheme, "authenticated");
        let bound = credential.with_scheme(identity.scheme);
        Ok((identity, bound))
    }

    /// Synchronize `content` to `path` in the repository named `repo`.
    ///
    /// The credential's scheme is not trusted: the identity probe runs
    /// first and the winning scheme is used for every later request.
    ///
    /// # Errors
    ///
    /// `MalformedRepositoryRef` and `InvalidTarget` are returned before any
    /// remote call. See [`SyncError`] for the rest.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use leetpush::core::types::{Credential, SyncOutcome};
    /// use leetpush::forge::mock::MockForge;
    /// use leetpush::sync::SyncEngine;
    ///
    /// # tokio_test::block_on(async {
    /// let engine = SyncEngine::new(Arc::new(MockForge::new().with_login("alice")));
    /// let cred = Credential::new("ghp_test");
    ///
    /// let first = engine.sync(&cred, "alice/leetcode_repo", "two_sum.py", b"x").await;
    /// assert_eq!(first, Ok(SyncOutcome::Created));
    ///
    /// let again = engine.sync(&cred, "alice/leetcode_repo", "two_sum.py", b"x\n").await;
    /// assert_eq!(again, Ok(SyncOutcome::Unchanged));
    /// # });
    /// ```
    pub async fn sync(
        &self,
        credential: &Credential,
        repo: &str,
        path: &str,
        content: &[u8],
    ) -> Result<SyncOutcome, SyncError> {
        let repo = RepositoryRef::parse(repo)?;
        let target = FileTarget::new(path, content.to_vec())?;
        self.sync_target(credential, &repo, &target).await
    }

    /// Synchronize an already-validated target, probing the auth scheme first.
    pub async fn sync_target(
        &self,
        credential: &Credential,
        repo: &RepositoryRef,
        target: &FileTarget,
    ) -> Result<SyncOutcome, SyncError> {
        let (identity, bound) = self.authenticate(credential).await?;
        self.sync_as(&identity, &bound, repo, target).await
    }

    /// Synchronize for an identity already resolved by [`authenticate`].
    ///
    /// `credential` must be the one `authenticate` returned.
    ///
    /// [`authenticate`]: SyncEngine::authenticate
    pub async fn sync_as(
        &self,
        identity: &Identity,
        credential: &Credential,
        repo: &RepositoryRef,
        target: &FileTarget,
    ) -> Result<SyncOutcome, SyncError> {
        self.ensure_repository(identity, credential, repo).await?;

        enter(SyncPhase::FileCheck, repo, target.path());
        let remote = self
            .forge
            .fetch_file(credential, repo, target.path())
            .await?;

        if remote.exists {
            if let Some(existing) = remote.content.as_deref() {
                if content_matches(existing, target.content()) {
                    info!(repo = %repo, path = target.path(), outcome = %SyncOutcome::Unchanged, "sync finished");
                    return Ok(SyncOutcome::Unchanged);
                }
            }
        }

        enter(SyncPhase::Write, repo, target.path());
        let expected_sha = if remote.exists {
            remote.sha.as_deref()
        } else {
            None
        };
        let outcome = self
            .forge
            .put_file(credential, repo, target.path(), target.content(), expected_sha)
            .await?;

        info!(repo = %repo, path = target.path(), outcome = %outcome, "sync finished");
        Ok(outcome)
    }

    /// Make sure the repository exists.
    ///
    /// Only a repository owned by the authenticated login is created; the
    /// remote always creates under the caller's own account.
    async fn ensure_repository(
        &self,
        identity: &Identity,
        credential: &Credential,
        repo: &RepositoryRef,
    ) -> Result<(), SyncError> {
        enter(SyncPhase::RepoCheck, repo, "");
        if self.forge.repository_exists(credential, repo).await? {
            return Ok(());
        }

        // GitHub logins are case-insensitive.
        if !repo.owner().eq_ignore_ascii_case(&identity.login) {
            return Err(SyncError::RepoCreateFailed {
                repo: repo.to_string(),
                reason: format!(
                    "repository not found, and only repositories owned by '{}' can be created",
                    identity.login
                ),
            });
        }

        enter(SyncPhase::RepoCreate, repo, "");
        self.forge
            .create_repository(credential, repo.name())
            .await
            .map_err(|e| SyncError::repo_create(repo, e))
    }
}

fn enter(phase: SyncPhase, repo: &RepositoryRef, path: &str) {
    debug!(%phase, repo = %repo, path, "sync phase");
}
