//! Storefront GraphQL token issuing.
//!
//! Storefront queries are authorized with a short-lived token minted through
//! the management API (`POST /v3/storefront/api-token`).

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::UpstreamError;

/// Requested token lifetime in seconds (one day).
pub const TOKEN_LIFETIME_SECS: i64 = 86_400;

/// Tokens this close to expiry are re-issued instead of used.
const EXPIRY_BUFFER_SECS: i64 = 60;

/// Token for the storefront GraphQL API.
#[derive(Debug, Clone)]
pub struct StorefrontToken {
    pub token: SecretString,
    /// Unix timestamp when the token expires.
    pub expires_at: i64,
}

impl StorefrontToken {
    /// Whether the token is expired or about to expire.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() >= self.expires_at - EXPIRY_BUFFER_SECS
    }
}

/// Request body for the token endpoint.
#[derive(Debug, Serialize)]
pub(super) struct TokenRequest {
    pub channel_id: u32,
    pub expires_at: i64,
}

impl TokenRequest {
    pub(super) fn new(channel_id: u32) -> Self {
        Self {
            channel_id,
            expires_at: chrono::Utc::now().timestamp() + TOKEN_LIFETIME_SECS,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    data: TokenData,
}

#[derive(Deserialize)]
struct TokenData {
    token: String,
}

/// Decode the token endpoint's response body.
pub(super) fn decode_token(
    body: serde_json::Value,
    expires_at: i64,
) -> Result<StorefrontToken, UpstreamError> {
    let response: TokenResponse = serde_json::from_value(body)
        .map_err(|e| UpstreamError::Token(format!("unexpected token response: {e}")))?;

    if response.data.token.is_empty() {
        return Err(UpstreamError::Token("empty token in response".to_string()));
    }

    Ok(StorefrontToken {
        token: SecretString::from(response.data.token),
        expires_at,
    })
}
