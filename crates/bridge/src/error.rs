//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`; server-side failures are
//! captured to Sentry before the response is built.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use commerce_bridge_core::{ContentId, InvalidId};
use serde_json::json;
use thiserror::Error;

use crate::services::ContentError;
use crate::upstream::UpstreamError;
use crate::validation::FieldValidationError;

/// Realm announced to clients that fail Basic authentication.
pub const AUTH_REALM: &str = r#"Basic realm="bridge""#;

/// Application-level error type for the bridge.
#[derive(Debug, Error)]
pub enum AppError {
    /// Upstream platform call failed.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Upstream rejected a field of the request payload.
    #[error(transparent)]
    Validation(#[from] FieldValidationError),

    /// Upstream refused a write and explained why.
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: UpstreamError,
    },

    /// A content page was created without its embed code.
    #[error("Content page {id} was created but its embed code could not be stored")]
    EmbedFailed {
        id: ContentId,
        #[source]
        source: UpstreamError,
    },

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or wrong Basic credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<InvalidId> for AppError {
    fn from(err: InvalidId) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Upstream(err) => Self::Upstream(err),
            ContentError::Validation(err) => Self::Validation(err),
            ContentError::Rejected { message, source } => Self::Rejected { message, source },
            ContentError::EmbedFailed { id, source } => Self::EmbedFailed { id, source },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Upstream(_) | Self::Rejected { .. } | Self::EmbedFailed { .. } | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            Self::Validation(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": err.to_string(), "cause": err.causes })),
            )
                .into_response(),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            Self::Unauthorized => {
                let mut response =
                    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" })))
                        .into_response();
                response
                    .headers_mut()
                    .insert(WWW_AUTHENTICATE, HeaderValue::from_static(AUTH_REALM));
                response
            }
            Self::Upstream(err) => (StatusCode::BAD_GATEWAY, Json(upstream_body(&err, err.to_string())))
                .into_response(),
            Self::Rejected { message, source } => {
                (StatusCode::BAD_GATEWAY, Json(upstream_body(&source, message))).into_response()
            }
            err @ Self::EmbedFailed { .. } => (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": true, "message": err.to_string() })),
            )
                .into_response(),
            // Don't expose internal error details to clients
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

/// `{error, data, status}` failure shape plus a readable message.
fn upstream_body(err: &UpstreamError, message: String) -> serde_json::Value {
    let mut body = err.to_failure_body();
    body["message"] = serde_json::Value::String(message);
    body
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
