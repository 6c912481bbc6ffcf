//! Integration tests for the GitHub forge against a local HTTP server.
//!
//! Each test starts a wiremock server, points `RemoteConfig::api_base` at it
//! and checks both what the client sent and how it read the answer.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leetpush::core::types::{AuthScheme, Credential, RemoteFileState, RepositoryRef, SyncOutcome};
use leetpush::forge::github::{GitHubForge, RemoteConfig};
use leetpush::forge::{ContentForge, ForgeError};
use leetpush::sync::{SyncEngine, SyncError, SyncErrorKind};

fn forge(server: &MockServer) -> GitHubForge {
    GitHubForge::new(RemoteConfig::with_api_base(server.uri())).unwrap()
}

fn engine(server: &MockServer) -> SyncEngine {
    SyncEngine::new(Arc::new(forge(server)))
}

fn repo() -> RepositoryRef {
    RepositoryRef::parse("alice/leetcode_repo").unwrap()
}

fn cred() -> Credential {
    Credential::new("abc")
}

/// A contents-API file object with GitHub's 60-column base64 wrapping.
fn file_body(content: &[u8], sha: &str) -> Value {
    let encoded = BASE64.encode(content);
    let wrapped = encoded
        .as_bytes()
        .chunks(60)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join("\n");
    json!({
        "type": "file",
        "encoding": "base64",
        "path": "two_sum.py",
        "sha": sha,
        "content": format!("{}\n", wrapped),
    })
}

/// Answer `GET /user` for any accepted credential.
async fn mount_user(server: &MockServer, login: &str) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": login})))
        .mount(server)
        .await;
}

// =============================================================================
// Identity
// =============================================================================

mod identity {
    use super::*;

    #[tokio::test]
    async fn token_scheme_accepted_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "token abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "alice"})))
            .expect(1)
            .mount(&server)
            .await;

        let identity = forge(&server).check_identity(&cred()).await.unwrap();
        assert_eq!(identity.login, "alice");
        assert_eq!(identity.scheme, AuthScheme::Token);
    }

    #[tokio::test]
    async fn falls_back_to_bearer_after_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "token abc"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "alice"})))
            .expect(1)
            .mount(&server)
            .await;

        let identity = forge(&server).check_identity(&cred()).await.unwrap();
        assert_eq!(identity.scheme, AuthScheme::Bearer);

        let requests = server.received_requests().await.unwrap();
        let schemes: Vec<_> = requests
            .iter()
            .map(|r| r.headers.get("authorization").unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(schemes, vec!["token abc", "Bearer abc"]);
    }

    #[tokio::test]
    async fn both_schemes_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})))
            .expect(2)
            .mount(&server)
            .await;

        let result = forge(&server).check_identity(&cred()).await;
        match result {
            Err(ForgeError::AuthFailed(message)) => assert!(message.contains("Bad credentials")),
            other => panic!("expected AuthFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn authenticate_binds_scheme_for_later_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "alice"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/leetcode_repo"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let engine = engine(&server);
        let (_, bound) = engine.authenticate(&cred()).await.unwrap();
        assert!(engine.forge().repository_exists(&bound, &repo()).await.unwrap());
    }

    #[tokio::test]
    async fn standard_headers_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("accept", "application/vnd.github+json"))
            .and(header("x-github-api-version", "2022-11-28"))
            .and(header("user-agent", "leetpush"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "alice"})))
            .expect(1)
            .mount(&server)
            .await;

        forge(&server).check_identity(&cred()).await.unwrap();
    }
}

// =============================================================================
// Repository and contents calls
// =============================================================================

mod contents {
    use super::*;

    #[tokio::test]
    async fn repository_probe_distinguishes_missing_from_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/leetcode_repo"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let forge = forge(&server);
        assert!(!forge.repository_exists(&cred(), &repo()).await.unwrap());

        let broken = RepositoryRef::parse("alice/broken").unwrap();
        match forge.repository_exists(&cred(), &broken).await {
            Err(ForgeError::ApiError { status, message }) => {
                assert_eq!(status, 500);
                assert!(message.contains("upstream exploded"));
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_repository_sends_expected_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(body_partial_json(json!({
                "name": "leetcode_repo",
                "description": "LeetCode solutions pushed by LeetCode Pusher",
                "private": false,
                "auto_init": true,
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        forge(&server)
            .create_repository(&cred(), "leetcode_repo")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fetch_decodes_wrapped_content() {
        let server = MockServer::start().await;
        let content = "class Solution:\n    def twoSum(self, nums, target):\n        return []\n";
        Mock::given(method("GET"))
            .and(path("/repos/alice/leetcode_repo/contents/two_sum.py"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_body(content.as_bytes(), "sha1")))
            .mount(&server)
            .await;

        let state = forge(&server)
            .fetch_file(&cred(), &repo(), "two_sum.py")
            .await
            .unwrap();
        assert_eq!(state, RemoteFileState::present(content.as_bytes().to_vec(), "sha1"));
    }

    #[tokio::test]
    async fn fetch_missing_file() {
        let server = MockServer::start().await;

        let state = forge(&server)
            .fetch_file(&cred(), &repo(), "two_sum.py")
            .await
            .unwrap();
        assert_eq!(state, RemoteFileState::missing());
    }

    #[tokio::test]
    async fn fetch_directory_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/leetcode_repo/contents/python"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "file", "name": "a.py", "sha": "x"}
            ])))
            .mount(&server)
            .await;

        let result = forge(&server).fetch_file(&cred(), &repo(), "python").await;
        assert!(matches!(result, Err(ForgeError::Decode(_))));
    }

    #[tokio::test]
    async fn path_segments_are_percent_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/leetcode_repo/contents/my%20solution%232.py"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_body(b"x", "s")))
            .expect(1)
            .mount(&server)
            .await;

        let state = forge(&server)
            .fetch_file(&cred(), &repo(), "my solution#2.py")
            .await
            .unwrap();
        assert!(state.exists);
    }

    #[tokio::test]
    async fn put_without_sha_creates() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/repos/alice/leetcode_repo/contents/two_sum.py"))
            .and(body_partial_json(json!({
                "message": "Add LeetCode solution: two_sum.py",
                "content": BASE64.encode("print(1)"),
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = forge(&server)
            .put_file(&cred(), &repo(), "two_sum.py", b"print(1)", None)
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Created);

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("sha").is_none());
    }

    #[tokio::test]
    async fn put_with_sha_updates() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/repos/alice/leetcode_repo/contents/two_sum.py"))
            .and(body_partial_json(json!({"sha": "oldsha"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = forge(&server)
            .put_file(&cred(), &repo(), "two_sum.py", b"v2", Some("oldsha"))
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Updated);
    }

    #[tokio::test]
    async fn put_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({"message": "two_sum.py does not match oldsha"})),
            )
            .mount(&server)
            .await;

        let result = forge(&server)
            .put_file(&cred(), &repo(), "two_sum.py", b"v2", Some("oldsha"))
            .await;
        match result {
            Err(ForgeError::Conflict(message)) => assert!(message.contains("does not match")),
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn custom_commit_message_template() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(body_partial_json(json!({"message": "Solve two_sum.py"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let config = RemoteConfig {
            commit_message: "Solve {path}".into(),
            ..RemoteConfig::with_api_base(server.uri())
        };
        GitHubForge::new(config)
            .unwrap()
            .put_file(&cred(), &repo(), "two_sum.py", b"x", None)
            .await
            .unwrap();
    }
}

// =============================================================================
// Full sync through the engine
// =============================================================================

mod sync {
    use super::*;

    #[tokio::test]
    async fn new_repository_and_new_file() {
        let server = MockServer::start().await;
        mount_user(&server, "alice").await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/leetcode_repo"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/leetcode_repo/contents/two_sum.py"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/alice/leetcode_repo/contents/two_sum.py"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = engine(&server)
            .sync(&cred(), "alice/leetcode_repo", "two_sum.py", b"print(1)")
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Created);
    }

    #[tokio::test]
    async fn matching_content_is_not_written() {
        let server = MockServer::start().await;
        mount_user(&server, "alice").await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/leetcode_repo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/leetcode_repo/contents/two_sum.py"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_body(b"x", "sha1")))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = engine(&server)
            .sync(&cred(), "alice/leetcode_repo", "two_sum.py", b"x\n")
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Unchanged);
    }

    #[tokio::test]
    async fn existence_timeout_stops_the_sync() {
        let server = MockServer::start().await;
        mount_user(&server, "alice").await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/leetcode_repo"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let config =
            RemoteConfig::with_api_base(server.uri()).with_timeout(Duration::from_millis(200));
        let engine = SyncEngine::new(Arc::new(GitHubForge::new(config).unwrap()));

        let err = engine
            .sync(&cred(), "alice/leetcode_repo", "two_sum.py", b"x")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::RemoteUnavailable {
                timed_out: true,
                ..
            }
        ));
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn refused_creation_makes_no_file_calls() {
        let server = MockServer::start().await;
        mount_user(&server, "alice").await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/leetcode_repo"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"message": "Repository creation failed."})),
            )
            .mount(&server)
            .await;

        let err = engine(&server)
            .sync(&cred(), "alice/leetcode_repo", "two_sum.py", b"x")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), SyncErrorKind::RepoCreateFailed);
        assert!(err.to_string().contains("Repository creation failed."));

        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| !r.url.path().contains("/contents/")));
    }

    #[tokio::test]
    async fn bearer_only_token_falls_back_within_sync() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "alice"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/r"))
            .and(header("authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/alice/r/contents/a.py"))
            .and(header("authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = engine(&server)
            .sync(&Credential::new("t"), "alice/r", "a.py", b"x")
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Created);

        let requests = server.received_requests().await.unwrap();
        let sent: Vec<_> = requests
            .iter()
            .map(|r| {
                (
                    r.url.path().to_string(),
                    r.headers.get("authorization").unwrap().to_str().unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(sent[0], ("/user".to_string(), "token t".to_string()));
        assert_eq!(sent[1], ("/user".to_string(), "Bearer t".to_string()));
        assert!(sent[2..].iter().all(|(_, auth)| auth == "Bearer t"));
    }

    #[tokio::test]
    async fn foreign_missing_repository_is_not_created() {
        let server = MockServer::start().await;
        mount_user(&server, "alice").await;
        Mock::given(method("GET"))
            .and(path("/repos/bob/solutions"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let err = engine(&server)
            .sync(&cred(), "bob/solutions", "a.py", b"x")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), SyncErrorKind::RepoCreateFailed);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unreachable_server_is_unavailable() {
        // Nothing listens on the discard port.
        let config = RemoteConfig::with_api_base("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let engine = SyncEngine::new(Arc::new(GitHubForge::new(config).unwrap()));

        let err = engine
            .sync(&cred(), "alice/leetcode_repo", "two_sum.py", b"x")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), SyncErrorKind::RemoteUnavailable);
        assert!(err.is_retryable());
    }
}
