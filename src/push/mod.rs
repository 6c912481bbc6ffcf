//! push
//!
//! Push a solution file for an authenticated user.
//!
//! # Flow
//!
//! ```text
//! validate -> authenticate -> resolve repository -> sync -> [catalog -> log]
//! ```
//!
//! An explicit `owner/name` is validated before anything touches the
//! network. Without one the solution goes to `<login>/<default name>`,
//! created on first use. An explicit repository that does not exist is
//! only created when it belongs to the authenticated login. Only a write that landed (`Created` or `Updated`)
//! is looked up in the catalog and recorded in the push log; an unchanged
//! file is neither.
//!
//! # Modules
//!
//! - [`catalog`] - Problem difficulty lookup
//! - [`log`] - Push log entries and storage

pub mod catalog;
pub mod log;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::config::schema::DEFAULT_REPO_NAME;
use crate::core::naming::{language_of, problem_slug};
use crate::core::types::{Credential, FileTarget, RepositoryRef, SyncOutcome};
use crate::sync::{SyncEngine, SyncError, SyncErrorKind};
use self::catalog::{Difficulty, ProblemCatalog, ProblemInfo};
use self::log::{LogError, PushLogEntry, PushLogStore};

/// Errors from a push.
#[derive(Debug, Error)]
pub enum PushError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("pushed, but failed to record it: {0}")]
    Log(#[from] LogError),
}

impl PushError {
    /// Kind of the underlying sync failure, if that is what failed.
    pub fn sync_kind(&self) -> Option<SyncErrorKind> {
        match self {
            PushError::Sync(e) => Some(e.kind()),
            PushError::Log(_) => None,
        }
    }
}

/// A solution to push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRequest {
    /// Path of the file in the repository, e.g. `0001_two_sum.py`
    pub filename: String,
    pub content: Vec<u8>,
    /// Explicit `owner/name`; defaults to the user's solutions repository
    pub repo: Option<String>,
}

impl PushRequest {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            repo: None,
        }
    }

    /// Push to an explicit repository.
    pub fn to_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }
}

/// What a push did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReceipt {
    pub outcome: SyncOutcome,
    pub repository: RepositoryRef,
    /// Login the credential belongs to
    pub login: String,
    pub slug: String,
    pub language: Option<String>,
    pub number: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub points: u32,
    /// Whether a new push log entry was recorded
    pub logged: bool,
}

/// Pushes solutions and keeps the push log.
pub struct PushService {
    engine: SyncEngine,
    log: Arc<dyn PushLogStore>,
    catalog: Option<Arc<dyn ProblemCatalog>>,
    default_repo_name: String,
}

impl std::fmt::Debug for PushService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushService")
            .field("engine", &self.engine)
            .field("catalog", &self.catalog.is_some())
            .field("default_repo_name", &self.default_repo_name)
            .finish()
    }
}

impl PushService {
    /// Create a service with no catalog and the default repository name.
    pub fn new(engine: SyncEngine, log: Arc<dyn PushLogStore>) -> Self {
        Self {
            engine,
            log,
            catalog: None,
            default_repo_name: DEFAULT_REPO_NAME.to_string(),
        }
    }

    /// Look up difficulty in `catalog` after each landed write.
    pub fn with_catalog(mut self, catalog: Arc<dyn ProblemCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Repository name used under the user's login when none is given.
    pub fn with_default_repo_name(mut self, name: impl Into<String>) -> Self {
        self.default_repo_name = name.into();
        self
    }

    /// Push one solution.
    ///
    /// # Errors
    ///
    /// - `PushError::Sync` for anything that stopped the file from landing
    /// - `PushError::Log` if the file landed but could not be recorded
    pub async fn push(
        &self,
        credential: &Credential,
        request: PushRequest,
    ) -> Result<PushReceipt, PushError> {
        let explicit = request
            .repo
            .as_deref()
            .map(RepositoryRef::parse)
            .transpose()
            .map_err(SyncError::from)?;
        let target = FileTarget::new(request.filename, request.content).map_err(SyncError::from)?;

        let (identity, credential) = self.engine.authenticate(credential).await?;
        let repository = match explicit {
            Some(repo) => repo,
            None => RepositoryRef::new(&identity.login, &self.default_repo_name)
                .map_err(SyncError::from)?,
        };
        debug!(login = %identity.login, repo = %repository, path = target.path(), "pushing");

        let outcome = self
            .engine
            .sync_as(&identity, &credential, &repository, &target)
            .await?;

        let slug = problem_slug(target.path());
        let mut receipt = PushReceipt {
            outcome,
            repository: repository.clone(),
            login: identity.login.clone(),
            slug: slug.clone(),
            language: language_of(target.path()).map(str::to_string),
            number: None,
            difficulty: None,
            points: 0,
            logged: false,
        };
        if !outcome.is_write() {
            return Ok(receipt);
        }

        let info = self.lookup(&slug).await;
        let entry = PushLogEntry::new(
            &identity.login,
            target.path(),
            repository,
            outcome,
            target.content(),
        )
        .with_problem(
            info.as_ref().map(|i| i.number.clone()),
            info.as_ref().map(|i| i.difficulty),
        );

        receipt.number = entry.number.clone();
        receipt.difficulty = entry.difficulty;
        receipt.points = entry.points;
        receipt.logged = self.log.record(entry)?;
        Ok(receipt)
    }

    /// Catalog lookup that never fails the push.
    async fn lookup(&self, slug: &str) -> Option<ProblemInfo> {
        let catalog = self.catalog.as_ref()?;
        match catalog.lookup(slug).await {
            Ok(info) => info,
            Err(e) => {
                warn!(slug, error = %e, "problem lookup failed; recording without difficulty");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{MockForge, MockOperation};
    use super::catalog::StaticCatalog;
    use super::log::MemoryPushLog;

    fn service(forge: &MockForge, log: Arc<MemoryPushLog>) -> PushService {
        PushService::new(SyncEngine::new(Arc::new(forge.clone())), log)
    }

    #[tokio::test]
    async fn default_repository_is_under_login() {
        let forge = MockForge::new().with_login("alice");
        let log = Arc::new(MemoryPushLog::new());

        let receipt = service(&forge, log.clone())
            .push(&Credential::new("t"), PushRequest::new("0001_two_sum.py", "x"))
            .await
            .unwrap();

        assert_eq!(receipt.repository.to_string(), "alice/leetcode_repo");
        assert_eq!(receipt.outcome, SyncOutcome::Created);
        assert!(receipt.logged);
        assert!(forge.has_repository("alice/leetcode_repo"));
    }

    #[tokio::test]
    async fn configured_default_name_is_used() {
        let forge = MockForge::new().with_login("alice");
        let svc = service(&forge, Arc::new(MemoryPushLog::new())).with_default_repo_name("solutions");

        let receipt = svc
            .push(&Credential::new("t"), PushRequest::new("a.py", "x"))
            .await
            .unwrap();
        assert_eq!(receipt.repository.to_string(), "alice/solutions");
    }

    #[tokio::test]
    async fn catalog_sets_points() {
        let forge = MockForge::new().with_login("alice");
        let catalog = StaticCatalog::new().with_problem("two-sum", "0001", Difficulty::Easy);
        let svc = service(&forge, Arc::new(MemoryPushLog::new())).with_catalog(Arc::new(catalog));

        let receipt = svc
            .push(&Credential::new("t"), PushRequest::new("0001_two_sum.py", "x"))
            .await
            .unwrap();
        assert_eq!(receipt.difficulty, Some(Difficulty::Easy));
        assert_eq!(receipt.points, 3);
        assert_eq!(receipt.number.as_deref(), Some("0001"));
    }

    #[tokio::test]
    async fn identity_is_checked_once_per_push() {
        let forge = MockForge::new().with_login("alice");
        service(&forge, Arc::new(MemoryPushLog::new()))
            .push(&Credential::new("t"), PushRequest::new("a.py", "x"))
            .await
            .unwrap();

        let identity_checks = forge
            .operations()
            .iter()
            .filter(|op| matches!(op, MockOperation::CheckIdentity { .. }))
            .count();
        assert_eq!(identity_checks, 1);
    }

    #[tokio::test]
    async fn malformed_explicit_repo_fails_before_auth() {
        let forge = MockForge::new();
        let result = service(&forge, Arc::new(MemoryPushLog::new()))
            .push(
                &Credential::new("t"),
                PushRequest::new("a.py", "x").to_repo("onlyname"),
            )
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.sync_kind(), Some(SyncErrorKind::MalformedRepositoryRef));
        assert!(forge.operations().is_empty());
    }
}
