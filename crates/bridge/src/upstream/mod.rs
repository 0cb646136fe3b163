//! Upstream platform API access.
//!
//! # Architecture
//!
//! - [`Transport`] is the seam between the resource services and the network:
//!   REST verbs plus a single GraphQL call, all returning normalized
//!   [`UpstreamResponse`]/[`UpstreamError`] values
//! - [`UpstreamClient`] is the production implementation on top of `reqwest`
//! - GraphQL calls carry a storefront token that is issued lazily, cached in
//!   the client, and re-issued once when the GraphQL endpoint answers 401
//! - Upstream JSON is decoded into explicit structs ([`payload`]); malformed
//!   payloads are rejected rather than coerced

mod client;
mod pagination;
pub mod payload;
mod token;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;
use std::sync::Arc;

use graphql_client::QueryBody;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use client::UpstreamClient;
pub use pagination::{MAX_PAGES, PageCursor, query_string};
pub use token::{StorefrontToken, TOKEN_LIFETIME_SECS};

/// Path of the endpoint issuing storefront GraphQL tokens.
pub const TOKEN_PATH: &str = "/v3/storefront/api-token";

/// Errors that can occur when talking to the upstream platform.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered with a non-success status.
    #[error("{method} {path} - {status}: {detail}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
        /// Human-readable detail (upstream `detail` field or status text).
        detail: String,
        /// Raw error body as returned by upstream.
        payload: Value,
    },

    /// No response was received (connection failure, timeout).
    #[error("{method} {path}: {source}")]
    Transport {
        method: Method,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered successfully but the payload had an unexpected shape.
    #[error("Malformed upstream payload: {0}")]
    Parse(#[from] serde_json::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// The storefront token could not be obtained.
    #[error("Storefront token unavailable: {0}")]
    Token(String),

    /// A paginated listing did not reach its last page within the page cap.
    #[error("Listing {path} did not finish within {pages} pages")]
    PaginationLimit { path: String, pages: u32 },

    /// A failure shared between concurrent callers of the same cache load.
    #[error(transparent)]
    Shared(Arc<Self>),
}

impl UpstreamError {
    /// HTTP status of the failure; 500 when no HTTP response was received.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            Self::Shared(inner) => inner.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Upstream error body, or the error message when there is none.
    #[must_use]
    pub fn data(&self) -> Value {
        match self {
            Self::Status { payload, .. } if !payload.is_null() => payload.clone(),
            Self::Shared(inner) => inner.data(),
            other => Value::String(other.to_string()),
        }
    }

    /// Structured upstream error body, if upstream sent one.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Status { payload, .. } if !payload.is_null() => Some(payload),
            Self::Shared(inner) => inner.payload(),
            _ => None,
        }
    }

    /// Message of the first entry of an array-shaped error body.
    ///
    /// Content endpoints report some write failures as `[{"message": ...}]`.
    #[must_use]
    pub fn first_message(&self) -> Option<&str> {
        self.payload()?.as_array()?.first()?.get("message")?.as_str()
    }

    /// Whether upstream rejected the request's credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == StatusCode::UNAUTHORIZED && self.payload_status_known()
    }

    /// Whether upstream reported the addressed resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == StatusCode::NOT_FOUND && self.payload_status_known()
    }

    fn payload_status_known(&self) -> bool {
        match self {
            Self::Status { .. } => true,
            Self::Shared(inner) => inner.payload_status_known(),
            _ => false,
        }
    }

    /// The failure shape reported to callers: `{error, data, status}`.
    #[must_use]
    pub fn to_failure_body(&self) -> Value {
        serde_json::json!({
            "error": true,
            "data": self.data(),
            "status": self.status().as_u16(),
        })
    }
}

impl From<Arc<Self>> for UpstreamError {
    fn from(shared: Arc<Self>) -> Self {
        Self::Shared(shared)
    }
}

/// A GraphQL error returned by the storefront API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response.
    pub path: Vec<Value>,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| {
            if e.path.is_empty() {
                return e.message.clone();
            }
            let path = e
                .path
                .iter()
                .map(|p| match p {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".");
            format!("{} (path: {path})", e.message)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// A successful upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// Decoded JSON body; `Null` for empty bodies.
    pub body: Value,
}

impl UpstreamResponse {
    /// Decode the body into an explicit payload type.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Parse` if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, UpstreamError> {
        Ok(serde_json::from_value(self.body)?)
    }
}

/// The most recent failed upstream call, kept for error-message construction.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub message: String,
    pub payload: Option<Value>,
}

impl FailureRecord {
    pub(crate) fn from_error(error: &UpstreamError) -> Option<Self> {
        match error {
            UpstreamError::Status {
                method,
                path,
                status,
                detail,
                payload,
            } => Some(Self {
                method: method.clone(),
                path: path.clone(),
                status: *status,
                message: detail.clone(),
                payload: (!payload.is_null()).then(|| payload.clone()),
            }),
            UpstreamError::Transport { method, path, source } => Some(Self {
                method: method.clone(),
                path: path.clone(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: source.to_string(),
                payload: None,
            }),
            _ => None,
        }
    }
}

/// Outbound access to the upstream platform.
///
/// Paths are relative to the configured API base URL and may carry a query
/// string.
pub trait Transport: Send + Sync {
    /// Perform a REST call.
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> impl Future<Output = Result<UpstreamResponse, UpstreamError>> + Send;

    /// Execute a storefront GraphQL query; the response body is the `data`
    /// member of the GraphQL response.
    fn graphql(
        &self,
        body: &QueryBody<Value>,
    ) -> impl Future<Output = Result<UpstreamResponse, UpstreamError>> + Send;

    /// The most recent failure recorded by this transport.
    fn last_failure(&self) -> Option<FailureRecord>;

    fn get(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<UpstreamResponse, UpstreamError>> + Send {
        self.request(Method::GET, path, None)
    }

    fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> impl Future<Output = Result<UpstreamResponse, UpstreamError>> + Send {
        self.request(Method::POST, path, Some(body))
    }

    fn put(
        &self,
        path: &str,
        body: &Value,
    ) -> impl Future<Output = Result<UpstreamResponse, UpstreamError>> + Send {
        self.request(Method::PUT, path, Some(body))
    }

    fn delete(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<UpstreamResponse, UpstreamError>> + Send {
        self.request(Method::DELETE, path, None)
    }
}
