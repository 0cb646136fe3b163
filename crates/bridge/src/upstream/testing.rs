//! In-memory [`Transport`] for service tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use graphql_client::QueryBody;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use super::{FailureRecord, Transport, UpstreamError, UpstreamResponse};

type Reply = Result<Value, (StatusCode, Value)>;

/// A recorded outbound call.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Scripted transport.
///
/// Replies are queued per `(method, path)`; the last queued reply keeps
/// being served once the others are consumed. Unscripted calls answer 404.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
    last_failure: Mutex<Option<FailureRecord>>,
    delay: Option<Duration>,
}

pub const GRAPHQL_PATH: &str = "graphql";

#[allow(clippy::unwrap_used)]
impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply, so concurrent callers overlap.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    fn push(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn on(&self, method: Method, path: &str, body: Value) -> &Self {
        self.push(method, path, Ok(body))
    }

    pub fn fail(&self, method: Method, path: &str, status: StatusCode, payload: Value) -> &Self {
        self.push(method, path, Err((status, payload)))
    }

    /// Script the `data` member of the next GraphQL response.
    pub fn on_graphql(&self, data: Value) -> &Self {
        self.push(Method::POST, GRAPHQL_PATH, Ok(data))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == *method && c.path == path)
            .count()
    }

    /// Calls whose path starts with `prefix`, in order.
    pub fn calls_to(&self, prefix: &str) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path.starts_with(prefix))
            .cloned()
            .collect()
    }

    async fn reply(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.calls.lock().unwrap().push(Call {
            method: method.clone(),
            path: path.to_string(),
            body,
        });

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            replies
                .get_mut(&(method.clone(), path.to_string()))
                .and_then(|queue| {
                    if queue.len() > 1 {
                        queue.pop_front()
                    } else {
                        queue.front().cloned()
                    }
                })
        };

        match reply {
            Some(Ok(body)) => Ok(UpstreamResponse {
                status: StatusCode::OK,
                body,
            }),
            Some(Err((status, payload))) => Err(self.record(method, path, status, payload)),
            None => Err(self.record(
                method,
                path,
                StatusCode::NOT_FOUND,
                serde_json::json!({"status": 404, "title": "The requested resource was not found."}),
            )),
        }
    }

    fn record(&self, method: Method, path: &str, status: StatusCode, payload: Value) -> UpstreamError {
        let error = UpstreamError::Status {
            method,
            path: path.to_string(),
            status,
            detail: status.canonical_reason().unwrap_or("error").to_string(),
            payload,
        };
        *self.last_failure.lock().unwrap() = FailureRecord::from_error(&error);
        error
    }
}

impl Transport for FakeTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        self.reply(method, path, body.cloned()).await
    }

    async fn graphql(&self, body: &QueryBody<Value>) -> Result<UpstreamResponse, UpstreamError> {
        let body = serde_json::to_value(body)?;
        self.reply(Method::POST, GRAPHQL_PATH, Some(body)).await
    }

    #[allow(clippy::unwrap_used)]
    fn last_failure(&self) -> Option<FailureRecord> {
        self.last_failure.lock().unwrap().clone()
    }
}
