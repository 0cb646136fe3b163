//! `reqwest`-backed upstream client.
//!
//! Management API calls authenticate with the static client id and access
//! token headers. Storefront GraphQL calls use a bearer token issued by the
//! management API and cached in memory.

use std::sync::{Arc, PoisonError};

use graphql_client::QueryBody;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::instrument;
use url::Url;

use super::token::{StorefrontToken, TokenRequest, decode_token};
use super::{FailureRecord, GraphQLError, TOKEN_PATH, Transport, UpstreamError, UpstreamResponse};
use crate::config::UpstreamConfig;

/// Client for the upstream management API and storefront GraphQL API.
///
/// Cheap to clone; clones share the connection pool, the cached storefront
/// token and the last-failure record.
#[derive(Clone)]
pub struct UpstreamClient {
    inner: Arc<UpstreamClientInner>,
}

struct UpstreamClientInner {
    client: reqwest::Client,
    api_base_url: Url,
    graphql_url: Url,
    client_id: String,
    access_token: SecretString,
    channel_id: u32,
    /// In-memory storefront token cache
    token: RwLock<Option<StorefrontToken>>,
    last_failure: std::sync::RwLock<Option<FailureRecord>>,
}

impl UpstreamClient {
    /// Create a client for the configured upstream store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(UpstreamClientInner {
                client,
                api_base_url: config.api_base_url.clone(),
                graphql_url: config.graphql_url.clone(),
                client_id: config.client_id.clone(),
                access_token: config.access_token.clone(),
                channel_id: config.channel_id,
                token: RwLock::new(None),
                last_failure: std::sync::RwLock::new(None),
            }),
        })
    }

    /// Absolute URL of a management API path.
    fn rest_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.inner.api_base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // =========================================================================
    // Storefront token
    // =========================================================================

    /// Drop the cached storefront token; the next GraphQL call issues a new one.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Whether a usable storefront token is cached.
    #[cfg(test)]
    pub async fn has_valid_token(&self) -> bool {
        self.inner
            .token
            .read()
            .await
            .as_ref()
            .is_some_and(|token| !token.is_expired())
    }

    /// Current storefront token, issuing one if none is cached or it expired.
    async fn storefront_token(&self) -> Result<String, UpstreamError> {
        if let Some(token) = self.inner.token.read().await.as_ref()
            && !token.is_expired()
        {
            return Ok(token.token.expose_secret().to_string());
        }

        let mut slot = self.inner.token.write().await;
        // Another caller may have issued one while we waited for the lock
        if let Some(token) = slot.as_ref()
            && !token.is_expired()
        {
            return Ok(token.token.expose_secret().to_string());
        }

        let token = self.issue_token().await?;
        let value = token.token.expose_secret().to_string();
        *slot = Some(token);
        Ok(value)
    }

    #[instrument(skip(self), fields(channel_id = self.inner.channel_id))]
    async fn issue_token(&self) -> Result<StorefrontToken, UpstreamError> {
        let request = TokenRequest::new(self.inner.channel_id);
        let expires_at = request.expires_at;
        let body = serde_json::to_value(&request)?;

        let response = self
            .send_rest(Method::POST, TOKEN_PATH, Some(&body))
            .await
            .map_err(|e| UpstreamError::Token(e.to_string()))?;

        tracing::info!("Issued storefront token");
        decode_token(response.body, expires_at)
    }

    // =========================================================================
    // Request execution
    // =========================================================================

    async fn send_rest(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let mut request = self
            .inner
            .client
            .request(method.clone(), self.rest_url(path))
            .header("X-Auth-Client", &self.inner.client_id)
            .header("X-Auth-Token", self.inner.access_token.expose_secret())
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let result = request.send().await;
        self.finish(method, path, result).await
    }

    async fn send_graphql(
        &self,
        body: &QueryBody<Value>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let token = self.storefront_token().await?;
        let path = self.inner.graphql_url.path().to_string();

        let result = self
            .inner
            .client
            .post(self.inner.graphql_url.clone())
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await;

        let response = self.finish(Method::POST, &path, result).await?;
        let graphql: graphql_client::Response<Value> = response.json()?;

        if let Some(errors) = graphql.errors
            && !errors.is_empty()
        {
            let errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    path: e
                        .path
                        .unwrap_or_default()
                        .into_iter()
                        .map(|fragment| match fragment {
                            graphql_client::PathFragment::Key(key) => Value::String(key),
                            graphql_client::PathFragment::Index(index) => Value::from(index),
                        })
                        .collect(),
                })
                .collect();
            tracing::warn!(errors = errors.len(), "Storefront query returned errors");
            return Err(UpstreamError::GraphQL(errors));
        }

        Ok(UpstreamResponse {
            status: StatusCode::OK,
            body: graphql.data.unwrap_or(Value::Null),
        })
    }

    /// Normalize a raw `reqwest` outcome into a response or a recorded failure.
    async fn finish(
        &self,
        method: Method,
        path: &str,
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let response = match result {
            Ok(response) => response,
            Err(source) => {
                return Err(self.fail(UpstreamError::Transport {
                    method,
                    path: path.to_string(),
                    source,
                }));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(source) => {
                return Err(self.fail(UpstreamError::Transport {
                    method,
                    path: path.to_string(),
                    source,
                }));
            }
        };
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            tracing::info!(%method, path, status = status.as_u16(), "Upstream response");
            return Ok(UpstreamResponse { status, body });
        }

        let detail = body
            .get("detail")
            .or_else(|| body.get("title"))
            .and_then(Value::as_str)
            .map_or_else(
                || status.canonical_reason().unwrap_or("Request failed").to_string(),
                str::to_string,
            );

        Err(self.fail(UpstreamError::Status {
            method,
            path: path.to_string(),
            status,
            detail,
            payload: body,
        }))
    }

    /// Log a failure and keep it as the most recent one.
    fn fail(&self, error: UpstreamError) -> UpstreamError {
        tracing::error!(error = %error, status = error.status().as_u16(), "Upstream request failed");
        if let Some(record) = FailureRecord::from_error(&error) {
            *self
                .inner
                .last_failure
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Some(record);
        }
        error
    }
}

impl Transport for UpstreamClient {
    #[instrument(skip(self, method, body), fields(%method))]
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        self.send_rest(method, path, body).await
    }

    /// Runs the query; a 401 drops the cached token and the query is sent
    /// once more with a freshly issued one.
    #[instrument(skip(self, body))]
    async fn graphql(&self, body: &QueryBody<Value>) -> Result<UpstreamResponse, UpstreamError> {
        match self.send_graphql(body).await {
            Err(error) if error.is_unauthorized() => {
                tracing::warn!("Storefront token rejected, issuing a new one");
                self.clear_token().await;
                self.send_graphql(body).await
            }
            other => other,
        }
    }

    fn last_failure(&self) -> Option<FailureRecord> {
        self.inner
            .last_failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
