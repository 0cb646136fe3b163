//! Bridge configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `API_BASE_URL` - Base URL of the upstream REST API (e.g. `https://api.example.com/stores/abc123`)
//! - `GRAPHQL_URL` - Storefront GraphQL endpoint
//! - `ACCESS_TOKEN` - Upstream API access token
//! - `CLIENT_ID` - Upstream API client ID
//!
//! ## Optional
//! - `BRIDGE_AUTH_USERNAME` / `BRIDGE_AUTH_PASSWORD` - Basic auth credentials
//!   the bridge host must present (both or neither)
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `NODE_PORT` / `PORT` - Listen port (default: 3000)
//! - `STOREFRONT_CHANNEL_ID` - Channel the GraphQL token is issued for (default: 1)
//! - `UPSTREAM_TIMEOUT_SECS` - Timeout for every upstream call (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_PORT: &str = "3000";
const DEFAULT_CHANNEL_ID: &str = "1";
const DEFAULT_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration for '{0}' is missing")]
    MissingEnvVar(String),
    #[error("Invalid configuration for '{0}': {1}")]
    InvalidEnvVar(String, String),
}

/// Bridge application configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Upstream platform API configuration
    pub upstream: UpstreamConfig,
    /// Credentials the bridge host must present, if any
    pub auth: Option<BasicAuthConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Upstream platform API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct UpstreamConfig {
    /// Base URL for REST calls; request paths are appended to it
    pub api_base_url: Url,
    /// Storefront GraphQL endpoint
    pub graphql_url: Url,
    /// Value of the `X-Auth-Client` header
    pub client_id: String,
    /// Value of the `X-Auth-Token` header
    pub access_token: SecretString,
    /// Channel the storefront GraphQL token is issued for
    pub channel_id: u32,
    /// Timeout applied to every outbound request
    pub timeout: Duration,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("graphql_url", &self.graphql_url.as_str())
            .field("client_id", &self.client_id)
            .field("access_token", &"[REDACTED]")
            .field("channel_id", &self.channel_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Basic auth credentials for inbound requests.
#[derive(Clone)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for BasicAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let source = Source(&get);

        let upstream = UpstreamConfig::from_source(&source)?;

        let host = source
            .or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = source
            .optional("NODE_PORT")
            .or_else(|| source.optional("PORT"))
            .unwrap_or_else(|| DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let auth = BasicAuthConfig::from_source(&source)?;

        Ok(Self {
            host,
            port,
            upstream,
            auth,
            sentry_dsn: source.optional("SENTRY_DSN"),
            sentry_environment: source.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl UpstreamConfig {
    fn from_source(source: &Source<'_>) -> Result<Self, ConfigError> {
        let graphql_url = source.required("GRAPHQL_URL")?;
        let api_base_url = source.required("API_BASE_URL")?;
        let access_token = source.required("ACCESS_TOKEN")?;
        let client_id = source.required("CLIENT_ID")?;

        let channel_id = source
            .or_default("STOREFRONT_CHANNEL_ID", DEFAULT_CHANNEL_ID)
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_CHANNEL_ID".to_string(), e.to_string())
            })?;
        let timeout_secs = source
            .or_default("UPSTREAM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("UPSTREAM_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_base_url: parse_base_url("API_BASE_URL", &api_base_url)?,
            graphql_url: Url::parse(&graphql_url).map_err(|e| {
                ConfigError::InvalidEnvVar("GRAPHQL_URL".to_string(), e.to_string())
            })?,
            client_id,
            access_token: SecretString::from(access_token),
            channel_id,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl BasicAuthConfig {
    fn from_source(source: &Source<'_>) -> Result<Option<Self>, ConfigError> {
        match (
            source.optional("BRIDGE_AUTH_USERNAME"),
            source.optional("BRIDGE_AUTH_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Ok(Some(Self {
                username,
                password: SecretString::from(password),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "BRIDGE_AUTH_PASSWORD".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar(
                "BRIDGE_AUTH_USERNAME".to_string(),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Key/value lookup used while loading configuration.
struct Source<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Source<'_> {
    /// Get a required value.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        (self.0)(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional value. Empty strings count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    /// Get a value with a default.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Parse a base URL setting, normalizing it to end with a slash so request
/// paths can be joined onto it.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };
    Url::parse(&normalized).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
