use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, SyncError};
use crate::session::SessionStore;

/// Thin wrapper over `reqwest::Client` for the records API.
///
/// Reads the session store immediately before every authenticated request,
/// attaches the bearer token when one exists, and maps transport and
/// status failures onto [`SyncError`]. A 401 clears the store before the
/// error is returned, so callers observe a clean transition to anonymous
/// state. Requests are never retried.
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        }
    }

    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }

    /// Issue one request and decode the JSON body.
    ///
    /// `authenticated` marks endpoints that require a token; when no
    /// session exists the header is simply omitted and the server decides.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        authenticated: bool,
    ) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let request_id = Uuid::new_v4();

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header("x-request-id", request_id.to_string());
        if authenticated {
            if let Some(session) = self.store.current().await {
                request = request.bearer_auth(session.token);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        let status = response.status();
        debug!(%request_id, method = %method, path, status = status.as_u16(), "api request");

        if status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| SyncError::Network(e.to_string()))?;
            if text.is_empty() {
                // DELETE endpoints answer 204 with no body
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| SyncError::InvalidResponse(e.to_string()));
        }

        let detail = error_detail(response).await;
        match status {
            StatusCode::UNAUTHORIZED => {
                if authenticated {
                    warn!(%request_id, path, "request rejected as unauthenticated, dropping session");
                    self.store.clear().await;
                }
                let message = if detail.is_empty() {
                    "session expired".to_string()
                } else {
                    detail
                };
                Err(SyncError::Auth(message))
            }
            s if s.is_client_error() => Err(SyncError::Validation(detail)),
            s => Err(SyncError::Server(s.as_u16())),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.request(Method::GET, path, None, true).await?;
        serde_json::from_value(value).map_err(|e| SyncError::InvalidResponse(e.to_string()))
    }

    pub async fn post(
        &self,
        path: &str,
        body: &impl Serialize,
        authenticated: bool,
    ) -> Result<Value> {
        let body = serde_json::to_value(body).map_err(|e| SyncError::InvalidResponse(e.to_string()))?;
        self.request(Method::POST, path, Some(&body), authenticated)
            .await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        authenticated: bool,
    ) -> Result<T> {
        let value = self.post(path, body, authenticated).await?;
        serde_json::from_value(value).map_err(|e| SyncError::InvalidResponse(e.to_string()))
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, None, true).await.map(|_| ())
    }
}

/// Pull the server's `detail` message out of an error response. Non-JSON
/// bodies contribute an empty detail rather than a decode failure.
async fn error_detail(response: reqwest::Response) -> String {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("json"))
        .unwrap_or(false);
    if !is_json {
        return String::new();
    }
    let Ok(body) = response.json::<Value>().await else {
        return String::new();
    };
    body.get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}
