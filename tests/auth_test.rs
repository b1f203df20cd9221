use std::collections::HashMap;

use httpmock::prelude::*;
use tracksformer::{
    error::{AuthorizationError, Error, TokenExchangeError},
    spotify::{
        auth::{Authorizer, Endpoints},
        redirect::RedirectCapture,
    },
    types::{AuthPhase, AuthorizationCode, AuthorizationState, Credentials, TokenSet},
};
use url::Url;

const TOKEN_JSON: &str = r#"{"access_token":"T","token_type":"Bearer","expires_in":3600}"#;
const EXCHANGE_BODY: &str =
    "grant_type=authorization_code&code=CODE1&redirect_uri=https%3A%2F%2Flocalhost%3A8082%2F";

// Helper function to build an authorizer against the mock accounts service
fn build_authorizer(server: &MockServer) -> Authorizer {
    let endpoints = Endpoints::new(
        Url::parse(&server.url("/authorize")).unwrap(),
        Url::parse(&server.url("/api/token")).unwrap(),
    );
    Authorizer::new(endpoints).unwrap()
}

fn credentials() -> Credentials {
    Credentials::new("abc", "xyz")
}

fn redirect_uri() -> Url {
    Url::parse("https://localhost:8082").unwrap()
}

fn query_pairs(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

// Plays the user: approves the consent page and returns the redirect for `code`,
// echoing the state found in the consent URL unless a forged one is given.
struct FakeBrowser {
    code: &'static str,
    forged_state: Option<&'static str>,
}

impl RedirectCapture for FakeBrowser {
    async fn capture(&self, authorize_url: &Url) -> Result<String, AuthorizationError> {
        let pairs = query_pairs(authorize_url);
        let state = match self.forged_state {
            Some(forged) => forged.to_string(),
            None => pairs.get("state").cloned().unwrap_or_default(),
        };
        Ok(format!(
            "https://localhost:8082/?code={}&state={}",
            self.code, state
        ))
    }
}

struct DeniedBrowser;

impl RedirectCapture for DeniedBrowser {
    async fn capture(&self, _authorize_url: &Url) -> Result<String, AuthorizationError> {
        Err(AuthorizationError::capture("browser closed"))
    }
}

#[test]
fn test_begin_authorization_builds_consent_url() {
    let server = MockServer::start();
    let mut authorizer = build_authorizer(&server);

    let request = authorizer.begin_authorization(&credentials(), &redirect_uri());
    let pairs = query_pairs(&request.url);

    assert_eq!(request.url.path(), "/authorize");
    assert_eq!(pairs.get("client_id"), Some(&"abc".to_string()));
    assert_eq!(pairs.get("response_type"), Some(&"code".to_string()));
    assert_eq!(
        pairs.get("redirect_uri"),
        Some(&"https://localhost:8082/".to_string())
    );
    assert_eq!(pairs.get("state"), Some(&request.state.as_str().to_string()));
    assert!(!pairs.contains_key("scope"));
    assert_eq!(authorizer.phase(), AuthPhase::AwaitingRedirect);
}

#[test]
fn test_begin_authorization_includes_configured_scope() {
    let server = MockServer::start();
    let mut authorizer = build_authorizer(&server).with_scope("user-read-private user-read-email");

    let request = authorizer.begin_authorization(&credentials(), &redirect_uri());

    assert_eq!(
        query_pairs(&request.url).get("scope"),
        Some(&"user-read-private user-read-email".to_string())
    );
}

#[test]
fn test_begin_authorization_issues_fresh_state() {
    let server = MockServer::start();
    let mut authorizer = build_authorizer(&server);

    let first = authorizer.begin_authorization(&credentials(), &redirect_uri());
    let second = authorizer.begin_authorization(&credentials(), &redirect_uri());

    assert_ne!(first.state, second.state);
}

#[test]
fn test_complete_authorization_with_matching_state() {
    let server = MockServer::start();
    let mut authorizer = build_authorizer(&server);
    let expected = AuthorizationState::new("S1");

    let code = authorizer
        .complete_authorization("https://localhost:8082/?code=CODE1&state=S1", &expected)
        .unwrap();

    assert_eq!(code.as_str(), "CODE1");
    assert_eq!(authorizer.phase(), AuthPhase::CodeReceived);
}

#[test]
fn test_complete_authorization_state_mismatch() {
    let server = MockServer::start();
    let mut authorizer = build_authorizer(&server);
    authorizer.begin_authorization(&credentials(), &redirect_uri());
    let expected = AuthorizationState::new("S1");

    let err = authorizer
        .complete_authorization("https://localhost:8082/?code=CODE1&state=S2", &expected)
        .unwrap_err();

    match err {
        Error::StateMismatch { expected, received } => {
            assert_eq!(expected, "S1");
            assert_eq!(received, "S2");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(authorizer.phase(), AuthPhase::Unauthenticated);
}

#[test]
fn test_complete_authorization_access_denied() {
    let server = MockServer::start();
    let mut authorizer = build_authorizer(&server);
    let expected = AuthorizationState::new("S1");

    let err = authorizer
        .complete_authorization(
            "https://localhost:8082/?error=access_denied&state=S1",
            &expected,
        )
        .unwrap_err();

    match err {
        Error::Authorization(AuthorizationError::Denied {
            reason,
            description,
        }) => {
            assert_eq!(reason, "access_denied");
            assert_eq!(description, None);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(authorizer.phase(), AuthPhase::Unauthenticated);
}

#[test]
fn test_complete_authorization_missing_code() {
    let server = MockServer::start();
    let mut authorizer = build_authorizer(&server);
    let expected = AuthorizationState::new("S1");

    let err = authorizer
        .complete_authorization("https://localhost:8082/?state=S1", &expected)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Authorization(AuthorizationError::MissingCode)
    ));
}

#[tokio::test]
async fn test_exchange_token_minimal_response() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/token")
                .header("authorization", "Basic YWJjOnh5eg==")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(EXCHANGE_BODY);
            then.status(200)
                .header("content-type", "application/json")
                .body(TOKEN_JSON);
        })
        .await;
    let mut authorizer = build_authorizer(&server);

    let token = authorizer
        .exchange_token(AuthorizationCode::new("CODE1"), &credentials(), &redirect_uri())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(token.access_token, "T");
    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.expires_in, 3600);
    assert_eq!(token.refresh_token, None);
    assert_eq!(token.scope, None);
    assert_eq!(authorizer.phase(), AuthPhase::Authorized);
    assert_eq!(authorizer.token(), Some(&token));
    assert_eq!(authorizer.authorization_header(), Some("Bearer T".to_string()));
}

#[tokio::test]
async fn test_exchange_token_full_response_is_kept_verbatim() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"access_token":"T2","token_type":"Bearer","expires_in":1800,"refresh_token":"R2","scope":"user-read-private user-read-email"}"#);
        })
        .await;
    let mut authorizer = build_authorizer(&server);

    let token = authorizer
        .exchange_token(AuthorizationCode::new("CODE1"), &credentials(), &redirect_uri())
        .await
        .unwrap();

    assert_eq!(token.access_token, "T2");
    assert_eq!(token.expires_in, 1800);
    assert_eq!(token.refresh_token.as_deref(), Some("R2"));
    assert_eq!(
        token.scope.as_deref(),
        Some("user-read-private user-read-email")
    );
}

#[tokio::test]
async fn test_exchange_token_missing_access_token() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"token_type":"Bearer","expires_in":3600}"#);
        })
        .await;
    let mut authorizer = build_authorizer(&server);

    let err = authorizer
        .exchange_token(AuthorizationCode::new("CODE1"), &credentials(), &redirect_uri())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::TokenExchange(TokenExchangeError::MissingField("access_token"))
    ));
    assert_eq!(authorizer.phase(), AuthPhase::Unauthenticated);
    assert!(authorizer.token().is_none());
}

#[tokio::test]
async fn test_exchange_token_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/token");
            then.status(400)
                .header("content-type", "application/json")
                .body(r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#);
        })
        .await;
    let mut authorizer = build_authorizer(&server);

    let err = authorizer
        .exchange_token(AuthorizationCode::new("BAD"), &credentials(), &redirect_uri())
        .await
        .unwrap_err();

    match err {
        Error::TokenExchange(TokenExchangeError::Status { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "invalid_grant: Invalid authorization code");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(authorizer.token().is_none());
}

#[tokio::test]
async fn test_exchange_token_malformed_json() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/token");
            then.status(200).body("<html>oops</html>");
        })
        .await;
    let mut authorizer = build_authorizer(&server);

    let err = authorizer
        .exchange_token(AuthorizationCode::new("CODE1"), &credentials(), &redirect_uri())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::TokenExchange(TokenExchangeError::Parse(_))
    ));
}

#[tokio::test]
async fn test_authorize_end_to_end() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/token")
                .header("authorization", "Basic YWJjOnh5eg==")
                .body(EXCHANGE_BODY);
            then.status(200)
                .header("content-type", "application/json")
                .body(TOKEN_JSON);
        })
        .await;
    let mut authorizer = build_authorizer(&server);
    let browser = FakeBrowser {
        code: "CODE1",
        forged_state: None,
    };

    let token = authorizer
        .authorize(&credentials(), &redirect_uri(), &browser)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(token.access_token, "T");
    assert_eq!(authorizer.phase(), AuthPhase::Authorized);
}

#[tokio::test]
async fn test_authorize_forged_state_never_reaches_token_endpoint() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/token");
            then.status(200)
                .header("content-type", "application/json")
                .body(TOKEN_JSON);
        })
        .await;
    let mut authorizer = build_authorizer(&server);
    let browser = FakeBrowser {
        code: "CODE1",
        forged_state: Some("S1"),
    };

    let err = authorizer
        .authorize(&credentials(), &redirect_uri(), &browser)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::StateMismatch { .. }));
    mock.assert_hits_async(0).await;
    assert_eq!(authorizer.phase(), AuthPhase::Unauthenticated);
}

#[tokio::test]
async fn test_authorize_capture_failure() {
    let server = MockServer::start_async().await;
    let mut authorizer = build_authorizer(&server);

    let err = authorizer
        .authorize(&credentials(), &redirect_uri(), &DeniedBrowser)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Authorization(AuthorizationError::Capture { .. })
    ));
    assert_eq!(authorizer.phase(), AuthPhase::Unauthenticated);
}

#[tokio::test]
async fn test_refresh_replaces_token_and_keeps_refresh_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/token")
                .header("authorization", "Basic YWJjOnh5eg==")
                .body("grant_type=refresh_token&refresh_token=R1");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"access_token":"T2","token_type":"Bearer","expires_in":3600,"scope":""}"#);
        })
        .await;
    let old = TokenSet {
        access_token: "T1".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
        refresh_token: Some("R1".to_string()),
        scope: None,
        obtained_at: 0,
    };
    let mut authorizer = build_authorizer(&server).with_token(old);

    let token = authorizer.refresh(&credentials()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(token.access_token, "T2");
    assert_eq!(token.refresh_token.as_deref(), Some("R1"));
    assert_eq!(authorizer.token(), Some(&token));
}

#[tokio::test]
async fn test_refresh_without_refresh_token() {
    let server = MockServer::start_async().await;
    let mut authorizer = build_authorizer(&server);

    let err = authorizer.refresh(&credentials()).await.unwrap_err();

    assert!(matches!(
        err,
        Error::TokenExchange(TokenExchangeError::MissingRefreshToken)
    ));
}

#[tokio::test]
async fn test_refresh_failure_keeps_held_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/token");
            then.status(400)
                .header("content-type", "application/json")
                .body(r#"{"error":"invalid_grant","error_description":"Refresh token revoked"}"#);
        })
        .await;
    let old = TokenSet {
        access_token: "T1".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
        refresh_token: Some("R1".to_string()),
        scope: None,
        obtained_at: 0,
    };
    let mut authorizer = build_authorizer(&server).with_token(old.clone());

    let err = authorizer.refresh(&credentials()).await.unwrap_err();

    mock.assert_async().await;
    match err {
        Error::TokenExchange(TokenExchangeError::Status { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "invalid_grant: Refresh token revoked");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(authorizer.token(), Some(&old));
    assert_eq!(authorizer.phase(), AuthPhase::Authorized);
    assert_eq!(authorizer.authorization_header().as_deref(), Some("Bearer T1"));
}
