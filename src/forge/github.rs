//! forge::github
//!
//! GitHub content API implementation.
//!
//! # Design
//!
//! This module implements the `ContentForge` trait against the GitHub REST API:
//! - `GET /user` for identity
//! - `GET /repos/{owner}/{name}` and `POST /user/repos` for the repository
//! - `GET` / `PUT /repos/{owner}/{name}/contents/{path}` for the file
//!
//! # Authentication
//!
//! GitHub accepts either `token <cred>` or `Bearer <cred>` depending on the
//! kind of token. [`GitHubForge::check_identity`] probes `token` first and
//! falls back to `Bearer` once on any non-success status. Every other call
//! uses the scheme bound to the [`Credential`] it is given.
//!
//! # Timeouts
//!
//! The underlying client is built with the configured timeout. A request
//! that exceeds it fails with `ForgeError::Timeout`; connection failures are
//! `ForgeError::NetworkError`. Neither is retried here.
//!
//! # Example
//!
//! ```ignore
//! use leetpush::core::types::{Credential, RepositoryRef};
//! use leetpush::forge::github::{GitHubForge, RemoteConfig};
//! use leetpush::forge::ContentForge;
//!
//! let forge = GitHubForge::new(RemoteConfig::default())?;
//! let identity = forge.check_identity(&Credential::new("ghp_xxx")).await?;
//! let cred = Credential::new("ghp_xxx").with_scheme(identity.scheme);
//!
//! let repo = RepositoryRef::parse("octocat/solutions")?;
//! let state = forge.fetch_file(&cred, &repo, "two_sum.py").await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{ContentForge, ForgeError};
use crate::core::config::schema::{
    DEFAULT_API_BASE, DEFAULT_COMMIT_MESSAGE, DEFAULT_REPO_DESCRIPTION, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};
use crate::core::types::{
    AuthScheme, Credential, Identity, RemoteFileState, RepositoryRef, SyncOutcome,
};

/// Longest remote error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Settings for [`GitHubForge`].
///
/// Passed explicitly to the constructor so tests can point the client at a
/// local server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// API base URL (configurable for GitHub Enterprise)
    pub api_base: String,
    /// User-Agent header value
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Description for repositories created on demand
    pub repo_description: String,
    /// Commit message template; `{path}` is replaced by the file path
    pub commit_message: String,
}

impl RemoteConfig {
    /// Default settings pointed at another API base.
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..Self::default()
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render the commit message for a path.
    pub fn commit_message_for(&self, path: &str) -> String {
        self.commit_message.replace("{path}", path)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            repo_description: DEFAULT_REPO_DESCRIPTION.to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}

/// GitHub forge implementation.
///
/// Holds no credentials; each call borrows one.
#[derive(Clone)]
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Parsed API base
    api_base: Url,
    /// Settings the client was built from
    config: RemoteConfig,
}

impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("api_base", &self.config.api_base)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

impl GitHubForge {
    /// Create a GitHub forge from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns `ForgeError::Config` if the API base is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(config: RemoteConfig) -> Result<Self, ForgeError> {
        let api_base = Url::parse(&config.api_base).map_err(|e| {
            ForgeError::Config(format!("invalid API base '{}': {}", config.api_base, e))
        })?;
        if api_base.cannot_be_a_base() || !matches!(api_base.scheme(), "http" | "https") {
            return Err(ForgeError::Config(format!(
                "API base '{}' must be an http(s) URL",
                config.api_base
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ForgeError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base,
            config,
        })
    }

    /// Settings this forge was built from.
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Build a URL from path segments, percent-encoding each one.
    fn url<I, S>(&self, segments: I) -> Result<Url, ForgeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ForgeError::Config(format!(
                    "API base '{}' cannot be a base URL",
                    self.config.api_base
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of a repository.
    fn repo_url(&self, repo: &RepositoryRef) -> Result<Url, ForgeError> {
        self.url(["repos", repo.owner(), repo.name()])
    }

    /// URL of a file inside a repository.
    fn contents_url(&self, repo: &RepositoryRef, path: &str) -> Result<Url, ForgeError> {
        let base = ["repos", repo.owner(), repo.name(), "contents"];
        self.url(base.into_iter().chain(path.split('/')))
    }

    /// Authorization header for a credential under a given scheme.
    fn auth_headers(
        &self,
        credential: &Credential,
        scheme: AuthScheme,
    ) -> Result<HeaderMap, ForgeError> {
        let mut value = HeaderValue::from_str(&credential.authorization_with(scheme))
            .map_err(|_| {
                ForgeError::AuthFailed("credential contains invalid header characters".into())
            })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    /// Send a request, classifying transport failures.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, ForgeError> {
        debug!(request = what, "github request");
        request
            .send()
            .await
            .map_err(|e| self.transport_error(e, what))
    }

    /// Map a reqwest error to a timeout or a network error.
    fn transport_error(&self, err: reqwest::Error, what: &str) -> ForgeError {
        if err.is_timeout() {
            ForgeError::Timeout(format!("{} exceeded {:?}", what, self.config.timeout))
        } else {
            ForgeError::NetworkError(format!("{}: {}", what, err))
        }
    }

    /// Read a successful JSON body.
    async fn read_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
        what: &str,
    ) -> Result<T, ForgeError> {
        response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e, what)
            } else {
                ForgeError::Decode(format!("{}: {}", what, e))
            }
        })
    }

    /// Map an unexpected status to an error, keeping the remote body.
    async fn unexpected_status(response: Response) -> ForgeError {
        let status = response.status();
        let message = error_message(response).await;
        match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed(message),
            StatusCode::CONFLICT => ForgeError::Conflict(message),
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl ContentForge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn check_identity(&self, credential: &Credential) -> Result<Identity, ForgeError> {
        if credential.is_empty() {
            return Err(ForgeError::AuthFailed("empty credential".into()));
        }

        let url = self.url(["user"])?;
        let mut rejections = Vec::with_capacity(AuthScheme::PROBE_ORDER.len());

        for scheme in AuthScheme::PROBE_ORDER {
            let request = self
                .client
                .get(url.clone())
                .headers(self.auth_headers(credential, scheme)?);
            let response = self.send(request, "GET /user").await?;
            let status = response.status();

            if status.is_success() {
                let user: GitHubUser = self.read_json(response, "GET /user").await?;
                debug!(login = %user.login, %scheme, "identity resolved");
                return Ok(Identity {
                    login: user.login,
                    scheme,
                });
            }

            let message = error_message(response).await;
            debug!(status = status.as_u16(), %scheme, "identity probe rejected");
            rejections.push(format!("{} -> {} {}", scheme, status.as_u16(), message));
        }

        Err(ForgeError::AuthFailed(format!(
            "all authorization schemes rejected ({})",
            rejections.join("; ")
        )))
    }

    async fn repository_exists(
        &self,
        credential: &Credential,
        repo: &RepositoryRef,
    ) -> Result<bool, ForgeError> {
        let request = self
            .client
            .get(self.repo_url(repo)?)
            .headers(self.auth_headers(credential, credential.scheme())?);
        let response = self.send(request, "GET /repos/{owner}/{name}").await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::unexpected_status(response).await),
        }
    }

    async fn create_repository(
        &self,
        credential: &Credential,
        name: &str,
    ) -> Result<(), ForgeError> {
        let body = CreateRepoBody {
            name,
            description: &self.config.repo_description,
            private: false,
            auto_init: true,
        };
        let request = self
            .client
            .post(self.url(["user", "repos"])?)
            .headers(self.auth_headers(credential, credential.scheme())?)
            .json(&body);
        let response = self.send(request, "POST /user/repos").await?;

        match response.status() {
            StatusCode::CREATED => {
                debug!(repo = name, "repository created");
                Ok(())
            }
            _ => Err(Self::unexpected_status(response).await),
        }
    }

    async fn fetch_file(
        &self,
        credential: &Credential,
        repo: &RepositoryRef,
        path: &str,
    ) -> Result<RemoteFileState, ForgeError> {
        let what = "GET /repos/{owner}/{name}/contents/{path}";
        let request = self
            .client
            .get(self.contents_url(repo, path)?)
            .headers(self.auth_headers(credential, credential.scheme())?);
        let response = self.send(request, what).await?;

        match response.status() {
            StatusCode::OK => {
                let file: GitHubContent = self.read_json(response, what).await?;
                file.into_state(path)
            }
            StatusCode::NOT_FOUND => Ok(RemoteFileState::missing()),
            _ => Err(Self::unexpected_status(response).await),
        }
    }

    async fn put_file(
        &self,
        credential: &Credential,
        repo: &RepositoryRef,
        path: &str,
        content: &[u8],
        expected_sha: Option<&str>,
    ) -> Result<SyncOutcome, ForgeError> {
        let message = self.config.commit_message_for(path);
        let encoded = BASE64.encode(content);
        let body = PutFileBody {
            message: &message,
            content: &encoded,
            sha: expected_sha,
        };
        let request = self
            .client
            .put(self.contents_url(repo, path)?)
            .headers(self.auth_headers(credential, credential.scheme())?)
            .json(&body);
        let response = self
            .send(request, "PUT /repos/{owner}/{name}/contents/{path}")
            .await?;

        match response.status() {
            StatusCode::CREATED => Ok(SyncOutcome::Created),
            StatusCode::OK => Ok(SyncOutcome::Updated),
            _ => Err(Self::unexpected_status(response).await),
        }
    }
}

/// Extract a readable message from an error response.
///
/// Prefers GitHub's `{"message": ...}`, falls back to the raw body.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(_) => return status.to_string(),
    };

    match serde_json::from_str::<GitHubErrorResponse>(&body) {
        Ok(err) => err.message,
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => body.chars().take(MAX_ERROR_BODY).collect(),
    }
}

/// Decode a contents-API payload. GitHub wraps base64 at 60 columns.
fn decode_content(raw: &str) -> Result<Vec<u8>, ForgeError> {
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64
        .decode(compact)
        .map_err(|e| ForgeError::Decode(format!("invalid base64 content: {}", e)))
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a repository.
#[derive(Serialize)]
struct CreateRepoBody<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    auto_init: bool,
}

/// Request body for creating or updating a file.
#[derive(Serialize)]
struct PutFileBody<'a> {
    message: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// Subset of `GET /user`.
#[derive(Deserialize)]
struct GitHubUser {
    login: String,
}

/// Subset of a contents-API file object.
#[derive(Deserialize)]
struct GitHubContent {
    #[serde(rename = "type")]
    kind: String,
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

impl GitHubContent {
    fn into_state(self, path: &str) -> Result<RemoteFileState, ForgeError> {
        if self.kind != "file" {
            return Err(ForgeError::Decode(format!(
                "'{}' is a {}, not a file",
                path, self.kind
            )));
        }
        match self.encoding.as_deref() {
            None | Some("base64") => {}
            Some(other) => {
                return Err(ForgeError::Decode(format!(
                    "'{}' has unsupported encoding '{}'",
                    path, other
                )))
            }
        }

        let content = decode_content(self.content.as_deref().unwrap_or(""))?;
        Ok(RemoteFileState::present(content, self.sha))
    }
}
