//! Integration tests for Commerce Bridge.
//!
//! Each test drives the real axum router in-process with
//! `tower::ServiceExt::oneshot`, backed by a `wiremock` server standing in
//! for the commerce platform (management REST API, token endpoint and
//! storefront GraphQL endpoint).
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p commerce-bridge-integration-tests
//! ```

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use commerce_bridge::{AppState, BridgeConfig, routes};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// Store prefix of the management API base URL.
pub const STORE_PATH: &str = "/stores/abc123";
/// Path of the storefront GraphQL endpoint on the mock server.
pub const GRAPHQL_PATH: &str = "/graphql";
/// Management API credentials the bridge is configured with.
pub const CLIENT_ID: &str = "client_1234";
pub const ACCESS_TOKEN: &str = "tok_9f8e7d6c";

/// A bridge router wired to a mock upstream.
pub struct TestContext {
    pub upstream: MockServer,
    pub app: Router,
}

/// Status, headers and decoded JSON body of a bridge response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `Value::Null` for empty bodies, a JSON string for non-JSON bodies.
    pub body: Value,
}

impl TestResponse {
    /// A response header as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestContext {
    /// Bridge without Basic authentication.
    pub async fn new() -> Self {
        Self::with_env(&[]).await
    }

    /// Bridge requiring the given Basic credentials.
    pub async fn with_basic_auth(username: &str, password: &str) -> Self {
        Self::with_env(&[
            ("BRIDGE_AUTH_USERNAME", username),
            ("BRIDGE_AUTH_PASSWORD", password),
        ])
        .await
    }

    async fn with_env(extra: &[(&str, &str)]) -> Self {
        let upstream = MockServer::start().await;

        let mut env = vec![
            ("API_BASE_URL".to_string(), format!("{}{STORE_PATH}", upstream.uri())),
            ("GRAPHQL_URL".to_string(), format!("{}{GRAPHQL_PATH}", upstream.uri())),
            ("CLIENT_ID".to_string(), CLIENT_ID.to_string()),
            ("ACCESS_TOKEN".to_string(), ACCESS_TOKEN.to_string()),
            ("UPSTREAM_TIMEOUT_SECS".to_string(), "5".to_string()),
        ];
        env.extend(extra.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));

        let config = BridgeConfig::from_source(|key| {
            env.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .expect("test configuration is valid");
        let state = AppState::new(config).expect("upstream client builds");

        Self {
            upstream,
            app: routes::router(state),
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body is readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(request(Method::GET, uri, None)).await
    }

    /// Requests the mock upstream received on `path_suffix` below the store.
    pub async fn upstream_requests(&self, path_suffix: &str) -> Vec<wiremock::Request> {
        let wanted = store_path(path_suffix);
        self.upstream
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == wanted)
            .collect()
    }

    /// Serve storefront tokens for GraphQL calls.
    pub async fn mount_token(&self, token: &str) {
        Mock::given(method("POST"))
            .and(path(store_path("/v3/storefront/api-token")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"token": token},
                "meta": {},
            })))
            .mount(&self.upstream)
            .await;
    }
}

/// Full upstream path of a management API path.
#[must_use]
pub fn store_path(suffix: &str) -> String {
    format!("{STORE_PATH}{suffix}")
}

/// Build a bridge request, optionally with a JSON body.
#[must_use]
pub fn request(method: Method, uri: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request is well formed")
}

/// `Authorization` header value for Basic credentials.
#[must_use]
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}
