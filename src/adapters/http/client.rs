//! HTTP entity client for the remote document API.
//!
//! Stateless reqwest adapter: every operation issues exactly one request
//! against the configured base URL, attaches the opaque credential as an
//! `Authorization` header, and maps non-success statuses onto the domain
//! error taxonomy. No retries at this layer — a miss surfaces unchanged to
//! the tool-call handler.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};

use crate::domain::errors::{ApiError, ApiResult};
use crate::domain::models::{Project, Rule, RulePage};
use crate::domain::ports::EntityClient;

use super::models::DocListResponse;

/// Default per-request timeout. Hung requests surface as `ApiError::Network`.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Authorization scheme used by the document store.
const AUTH_SCHEME: &str = "users API-Key";

/// Reqwest-backed implementation of [`EntityClient`].
#[derive(Debug, Clone)]
pub struct HttpEntityClient {
    /// The underlying HTTP client.
    http: Client,
    /// Base URL of the document API, without a trailing slash.
    base_url: String,
    /// Opaque credential attached to every request.
    api_key: String,
}

impl HttpEntityClient {
    /// Create a client against the given base URL and credential.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> ApiResult<Self> {
        Self::with_timeout(base_url, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Build an authorized request for a collection path.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("{AUTH_SCHEME} {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    /// Send a request, map the status onto the error taxonomy, and parse
    /// the JSON body into `T`.
    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        req: RequestBuilder,
        kind: &'static str,
        id: &str,
    ) -> ApiResult<T> {
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("{kind} request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(map_status(status, kind, id, resp.text().await.unwrap_or_default()));
        }

        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Network(format!("{kind} response parse failed: {e}")))
    }
}

/// Map a non-success status onto the domain error taxonomy.
fn map_status(status: StatusCode, kind: &'static str, id: &str, body: String) -> ApiError {
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound {
            kind,
            id: id.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ApiError::Auth(format!("{kind} request rejected ({status}): {body}"))
        }
        _ => ApiError::Network(format!("{kind} request returned {status}: {body}")),
    }
}

#[async_trait]
impl EntityClient for HttpEntityClient {
    async fn fetch_project(&self, id: &str) -> ApiResult<Project> {
        let req = self.request(Method::GET, &format!("/projects/{id}"));
        self.send_json(req, "Project", id).await
    }

    async fn fetch_rule(&self, id: &str) -> ApiResult<Rule> {
        let req = self.request(Method::GET, &format!("/rules/{id}"));
        self.send_json(req, "Rule", id).await
    }

    async fn fetch_owned_rules(&self) -> ApiResult<RulePage> {
        let req = self.request(Method::GET, "/rules");
        let resp: DocListResponse = self.send_json(req, "Rule", "owned").await?;
        Ok(resp.into())
    }

    async fn update_rule(&self, id: &str, content: &str) -> ApiResult<Rule> {
        let body = serde_json::json!({ "content": content });
        let req = self
            .request(Method::PATCH, &format!("/rules/{id}"))
            .json(&body);
        self.send_json(req, "Rule", id).await
    }
}
