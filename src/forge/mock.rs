//! forge::mock
//!
//! In-memory forge for deterministic testing.
//!
//! # Design
//!
//! `MockForge` implements [`ContentForge`] over a map of repositories and
//! files. Every call is recorded so tests can assert exactly which remote
//! operations a sync issued, and any single operation can be made to fail.
//!
//! Version tokens are the SHA-256 of the stored content, so a write that
//! carries a sha from before a concurrent change is rejected with
//! `ForgeError::Conflict`, as GitHub would.
//!
//! # Example
//!
//! ```
//! use leetpush::core::types::{Credential, RepositoryRef, SyncOutcome};
//! use leetpush::forge::mock::MockForge;
//! use leetpush::forge::ContentForge;
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new().with_login("alice").with_repository("alice/leetcode_repo");
//! let cred = Credential::new("ghp_test");
//! let repo = RepositoryRef::parse("alice/leetcode_repo").unwrap();
//!
//! let outcome = forge
//!     .put_file(&cred, &repo, "two_sum.py", b"print(1)", None)
//!     .await
//!     .unwrap();
//! assert_eq!(outcome, SyncOutcome::Created);
//! assert_eq!(forge.file("alice/leetcode_repo", "two_sum.py").unwrap(), b"print(1)");
//! # });
//! ```

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::traits::{ContentForge, ForgeError};
use crate::core::types::{
    AuthScheme, Credential, Identity, RemoteFileState, RepositoryRef, SyncOutcome,
};

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping. Clones share state.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    /// Login returned by the identity probe.
    login: String,
    /// Schemes the remote accepts for the configured token.
    accepted_schemes: Vec<AuthScheme>,
    /// Token the remote recognizes. `None` accepts any non-empty token.
    valid_token: Option<String>,
    /// Existing repositories, as `owner/name`.
    repositories: HashSet<String>,
    /// File contents keyed by (`owner/name`, path).
    files: HashMap<(String, String), Vec<u8>>,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every identity attempt with the given error.
    CheckIdentity(ForgeError),
    /// Fail repository_exists with the given error.
    RepositoryExists(ForgeError),
    /// Fail create_repository with the given error.
    CreateRepository(ForgeError),
    /// Fail fetch_file with the given error.
    FetchFile(ForgeError),
    /// Fail put_file with the given error.
    PutFile(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    CheckIdentity {
        scheme: AuthScheme,
    },
    RepositoryExists {
        repo: String,
    },
    CreateRepository {
        name: String,
    },
    FetchFile {
        repo: String,
        path: String,
    },
    PutFile {
        repo: String,
        path: String,
        content: Vec<u8>,
        expected_sha: Option<String>,
    },
}

impl MockOperation {
    /// Whether the operation writes remote state.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            MockOperation::CreateRepository { .. } | MockOperation::PutFile { .. }
        )
    }
}

/// Version token for stored content.
pub fn content_sha(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

impl MockForge {
    /// Create an empty mock forge for login `mock-user`, accepting any token
    /// under either scheme.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner {
                login: "mock-user".to_string(),
                accepted_schemes: AuthScheme::PROBE_ORDER.to_vec(),
                valid_token: None,
                repositories: HashSet::new(),
                files: HashMap::new(),
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Set the login returned by the identity probe.
    pub fn with_login(self, login: &str) -> Self {
        self.inner.lock().unwrap().login = login.to_string();
        self
    }

    /// Only recognize this token.
    pub fn with_token(self, token: &str) -> Self {
        self.inner.lock().unwrap().valid_token = Some(token.to_string());
        self
    }

    /// Restrict which authorization schemes the remote accepts.
    ///
    /// # Example
    ///
    /// ```
    /// use leetpush::core::types::AuthScheme;
    /// use leetpush::forge::mock::MockForge;
    ///
    /// // Fine-grained tokens only work with Bearer.
    /// let forge = MockForge::new().accept_schemes(&[AuthScheme::Bearer]);
    /// ```
    pub fn accept_schemes(self, schemes: &[AuthScheme]) -> Self {
        self.inner.lock().unwrap().accepted_schemes = schemes.to_vec();
        self
    }

    /// Start with an existing repository.
    pub fn with_repository(self, repo: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .repositories
            .insert(repo.to_string());
        self
    }

    /// Start with an existing file. Creates the repository if needed.
    pub fn with_file(self, repo: &str, path: &str, content: &[u8]) -> Self {
        self.set_file(repo, path, content);
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use leetpush::forge::mock::{FailOn, MockForge};
    /// use leetpush::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::RepositoryExists(ForgeError::Timeout("GET /repos".into())));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.inner.lock().unwrap().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.inner.lock().unwrap().fail_on = None;
    }

    /// Overwrite a file as another writer would, changing its sha.
    pub fn set_file(&self, repo: &str, path: &str, content: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.repositories.insert(repo.to_string());
        inner
            .files
            .insert((repo.to_string(), path.to_string()), content.to_vec());
    }

    /// Current content of a file (for test verification).
    pub fn file(&self, repo: &str, path: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner
            .files
            .get(&(repo.to_string(), path.to_string()))
            .cloned()
    }

    /// Whether a repository exists (for test verification).
    pub fn has_repository(&self, repo: &str) -> bool {
        self.inner.lock().unwrap().repositories.contains(repo)
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.inner.lock().unwrap().operations.clone()
    }

    /// Number of recorded operations that write remote state.
    pub fn write_count(&self) -> usize {
        self.operations().iter().filter(|op| op.is_write()).count()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.inner.lock().unwrap().operations.clear();
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        self.inner.lock().unwrap().operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Result<(), ForgeError> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::CheckIdentity(e)) if expected == "check_identity" => Err(e.clone()),
            Some(FailOn::RepositoryExists(e)) if expected == "repository_exists" => {
                Err(e.clone())
            }
            Some(FailOn::CreateRepository(e)) if expected == "create_repository" => {
                Err(e.clone())
            }
            Some(FailOn::FetchFile(e)) if expected == "fetch_file" => Err(e.clone()),
            Some(FailOn::PutFile(e)) if expected == "put_file" => Err(e.clone()),
            _ => Ok(()),
        }
    }

    /// Reject tokens the remote does not recognize.
    fn check_token(&self, credential: &Credential) -> Result<(), ForgeError> {
        let inner = self.inner.lock().unwrap();
        let known = match &inner.valid_token {
            Some(token) => token == credential.token(),
            None => !credential.is_empty(),
        };
        if known && inner.accepted_schemes.contains(&credential.scheme()) {
            Ok(())
        } else {
            Err(ForgeError::AuthFailed("Bad credentials".into()))
        }
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentForge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn check_identity(&self, credential: &Credential) -> Result<Identity, ForgeError> {
        for scheme in AuthScheme::PROBE_ORDER {
            self.record(MockOperation::CheckIdentity { scheme });
            self.check_fail("check_identity")?;

            if self.check_token(&credential.with_scheme(scheme)).is_ok() {
                let login = self.inner.lock().unwrap().login.clone();
                return Ok(Identity { login, scheme });
            }
        }
        Err(ForgeError::AuthFailed(
            "all authorization schemes rejected".into(),
        ))
    }

    async fn repository_exists(
        &self,
        credential: &Credential,
        repo: &RepositoryRef,
    ) -> Result<bool, ForgeError> {
        self.record(MockOperation::RepositoryExists {
            repo: repo.to_string(),
        });
        self.check_fail("repository_exists")?;
        self.check_token(credential)?;

        Ok(self.has_repository(&repo.to_string()))
    }

    async fn create_repository(
        &self,
        credential: &Credential,
        name: &str,
    ) -> Result<(), ForgeError> {
        self.record(MockOperation::CreateRepository {
            name: name.to_string(),
        });
        self.check_fail("create_repository")?;
        self.check_token(credential)?;

        let mut inner = self.inner.lock().unwrap();
        let full_name = format!("{}/{}", inner.login, name);
        if !inner.repositories.insert(full_name) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "name already exists on this account".into(),
            });
        }
        Ok(())
    }

    async fn fetch_file(
        &self,
        credential: &Credential,
        repo: &RepositoryRef,
        path: &str,
    ) -> Result<RemoteFileState, ForgeError> {
        self.record(MockOperation::FetchFile {
            repo: repo.to_string(),
            path: path.to_string(),
        });
        self.check_fail("fetch_file")?;
        self.check_token(credential)?;

        Ok(match self.file(&repo.to_string(), path) {
            Some(content) => {
                let sha = content_sha(&content);
                RemoteFileState::present(content, sha)
            }
            None => RemoteFileState::missing(),
        })
    }

    async fn put_file(
        &self,
        credential: &Credential,
        repo: &RepositoryRef,
        path: &str,
        content: &[u8],
        expected_sha: Option<&str>,
    ) -> Result<SyncOutcome, ForgeError> {
        self.record(MockOperation::PutFile {
            repo: repo.to_string(),
            path: path.to_string(),
            content: content.to_vec(),
            expected_sha: expected_sha.map(str::to_string),
        });
        self.check_fail("put_file")?;
        self.check_token(credential)?;

        let mut inner = self.inner.lock().unwrap();
        let repo_name = repo.to_string();
        if !inner.repositories.contains(&repo_name) {
            return Err(ForgeError::ApiError {
                status: 404,
                message: "Not Found".into(),
            });
        }

        let key = (repo_name, path.to_string());
        let current_sha = inner.files.get(&key).map(|c| content_sha(c));
        let outcome = match (current_sha, expected_sha) {
            (None, None) => SyncOutcome::Created,
            (Some(current), Some(expected)) if current == expected => SyncOutcome::Updated,
            (Some(_), None) => {
                return Err(ForgeError::ApiError {
                    status: 422,
                    message: "\"sha\" wasn't supplied.".into(),
                })
            }
            (_, Some(expected)) => {
                return Err(ForgeError::Conflict(format!(
                    "{} does not match {}",
                    path, expected
                )))
            }
        };

        inner.files.insert(key, content.to_vec());
        Ok(outcome)
    }
}
