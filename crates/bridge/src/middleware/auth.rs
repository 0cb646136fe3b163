//! HTTP Basic authentication for the API routes.
//!
//! Enabled only when credentials are configured; without them every request
//! passes through.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;

use crate::config::BasicAuthConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Reject requests without the configured Basic credentials.
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = &state.config().auth
        && !is_authorized(request.headers(), expected)
    {
        tracing::warn!(path = %request.uri().path(), "Rejected request without valid credentials");
        return AppError::Unauthorized.into_response();
    }

    next.run(request).await
}

/// Whether the `Authorization` header carries the expected credentials.
fn is_authorized(headers: &HeaderMap, expected: &BasicAuthConfig) -> bool {
    credentials(headers).is_some_and(|(username, password)| {
        let username_ok = username.as_bytes().ct_eq(expected.username.as_bytes());
        let password_ok = password
            .as_bytes()
            .ct_eq(expected.password.expose_secret().as_bytes());
        (username_ok & password_ok).into()
    })
}

/// Decode `Authorization: Basic base64(user:pass)`.
fn credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
