//! push::catalog
//!
//! Problem difficulty lookup.
//!
//! A pushed solution scores points by difficulty: Easy 3, Medium 6, Hard 12.
//! [`LeetCodeCatalog`] asks the LeetCode GraphQL endpoint for the problem's
//! number and difficulty. Lookups are best effort: the caller logs a failure
//! and carries on with no difficulty.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// GraphQL query selecting the fields we need.
const QUESTION_QUERY: &str = "query getQuestionDetail($titleSlug: String!) { \
question(titleSlug: $titleSlug) { questionFrontendId difficulty } }";

/// Errors from catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog returned status {status}")]
    Api { status: u16 },

    #[error("catalog request timed out")]
    Timeout,

    #[error("catalog network error: {0}")]
    Network(String),

    #[error("failed to decode catalog response: {0}")]
    Decode(String),

    #[error("invalid catalog configuration: {0}")]
    Config(String),
}

/// Problem difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Points awarded for a solution.
    pub fn points(&self) -> u32 {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 6,
            Difficulty::Hard => 12,
        }
    }

    /// Parse the label LeetCode uses.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Easy" => Some(Difficulty::Easy),
            "Medium" => Some(Difficulty::Medium),
            "Hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(label)
    }
}

/// Points for an optional difficulty; unknown scores nothing.
pub fn points_for(difficulty: Option<Difficulty>) -> u32 {
    difficulty.map_or(0, |d| d.points())
}

/// What the catalog knows about a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemInfo {
    /// Frontend number, zero-padded to four digits
    pub number: String,
    pub difficulty: Difficulty,
}

/// Source of problem metadata.
#[async_trait]
pub trait ProblemCatalog: Send + Sync {
    /// Look up a problem by slug. `Ok(None)` means the catalog has no such
    /// problem.
    async fn lookup(&self, slug: &str) -> Result<Option<ProblemInfo>, CatalogError>;
}

/// LeetCode GraphQL catalog.
#[derive(Debug, Clone)]
pub struct LeetCodeCatalog {
    client: Client,
    endpoint: String,
}

impl LeetCodeCatalog {
    /// Create a catalog client for `endpoint`.
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Config(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl ProblemCatalog for LeetCodeCatalog {
    async fn lookup(&self, slug: &str) -> Result<Option<ProblemInfo>, CatalogError> {
        let body = json!({
            "operationName": "getQuestionDetail",
            "query": QUESTION_QUERY,
            "variables": { "titleSlug": slug },
        });

        debug!(slug, endpoint = %self.endpoint, "catalog lookup");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() != StatusCode::OK {
            return Err(CatalogError::Api {
                status: response.status().as_u16(),
            });
        }

        let payload: GraphQlResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout
            } else {
                CatalogError::Decode(e.to_string())
            }
        })?;

        let Some(question) = payload.data.and_then(|d| d.question) else {
            return Ok(None);
        };
        let difficulty = Difficulty::from_label(&question.difficulty).ok_or_else(|| {
            CatalogError::Decode(format!("unknown difficulty '{}'", question.difficulty))
        })?;

        Ok(Some(ProblemInfo {
            number: format!("{:0>4}", question.question_frontend_id),
            difficulty,
        }))
    }
}

fn transport_error(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Timeout
    } else {
        CatalogError::Network(err.to_string())
    }
}

/// Fixed in-memory catalog.
///
/// Useful when the network catalog is disabled and for tests.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    problems: Mutex<HashMap<String, ProblemInfo>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a problem.
    pub fn with_problem(self, slug: &str, number: &str, difficulty: Difficulty) -> Self {
        self.problems
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                slug.to_string(),
                ProblemInfo {
                    number: number.to_string(),
                    difficulty,
                },
            );
        self
    }
}

#[async_trait]
impl ProblemCatalog for StaticCatalog {
    async fn lookup(&self, slug: &str) -> Result<Option<ProblemInfo>, CatalogError> {
        let problems = self.problems.lock().unwrap_or_else(|e| e.into_inner());
        Ok(problems.get(slug).cloned())
    }
}

// --------------------------------------------------------------------------
// GraphQL Response Types
// --------------------------------------------------------------------------

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<QuestionData>,
}

#[derive(Deserialize)]
struct QuestionData {
    question: Option<Question>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Question {
    question_frontend_id: String,
    difficulty: String,
}
