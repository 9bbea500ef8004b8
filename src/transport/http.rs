//! HTTP Transport
//!
//! Thin wrapper over `reqwest` that owns the base URL, attaches the auth
//! header from the session, and turns every failure into an [`ApiError`].

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::error::{ApiError, ApiResult};
use crate::session::SessionStore;

/// Transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL of the backend (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// User-Agent header value
    pub user_agent: String,
    /// Header carrying the auth token
    pub auth_header: String,
    /// Scheme prefixed to the token; empty sends the raw token
    pub auth_scheme: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: 30_000,
            user_agent: format!("incubator-portal/{}", env!("CARGO_PKG_VERSION")),
            auth_header: "Authorization".to_string(),
            auth_scheme: "Bearer".to_string(),
        }
    }
}

/// Pagination query parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl Page {
    pub fn new(skip: u32, limit: u32) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
        }
    }

    /// Query pairs with unset values dropped
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Binary payload returned by image endpoints
#[derive(Debug, Clone)]
pub struct ImageBlob {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// HTTP transport for the incubator backend
pub struct HttpTransport {
    client: Client,
    config: TransportConfig,
    session: Option<SessionStore>,
}

impl HttpTransport {
    /// Create a transport without a session (no auth header is ever sent)
    pub fn new(mut config: TransportConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Config(format!("failed to create HTTP client: {}", e)))?;

        config.base_url = normalize_base(&config.base_url);

        Ok(Self {
            client,
            config,
            session: None,
        })
    }

    /// Create a transport that reads the auth token from `session`
    pub fn with_session(config: TransportConfig, session: SessionStore) -> ApiResult<Self> {
        let mut transport = Self::new(config)?;
        transport.session = Some(session);
        Ok(transport)
    }

    /// Replace the base URL; trailing slashes are stripped
    pub fn set_base_url(&mut self, url: &str) {
        self.config.base_url = normalize_base(url);
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the current configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Join the base URL and `path` with exactly one slash
    pub fn url_for(&self, path: &str) -> String {
        let clean_path = path.trim_start_matches('/');
        if clean_path.is_empty() {
            self.config.base_url.clone()
        } else {
            format!("{}/{}", self.config.base_url, clean_path)
        }
    }

    /// Header name and value for the current token, if one is set
    pub fn auth_header_pair(&self) -> Option<(String, String)> {
        let token = self.session.as_ref()?.token()?;
        let value = if self.config.auth_scheme.is_empty() {
            token
        } else {
            format!("{} {}", self.config.auth_scheme, token)
        };
        Some((self.config.auth_header.clone(), value))
    }

    // ============================================
    // JSON requests
    // ============================================

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, page: Page) -> ApiResult<T> {
        let (url, builder) = self.request(Method::GET, path);
        let builder = builder.query(&page.query_pairs());
        let response = self.dispatch(&Method::GET, &url, builder).await?;
        decode_json(&Method::GET, &url, response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (url, builder) = self.request(Method::POST, path);
        let response = self.dispatch(&Method::POST, &url, builder.json(body)).await?;
        decode_json(&Method::POST, &url, response).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (url, builder) = self.request(Method::PUT, path);
        let response = self.dispatch(&Method::PUT, &url, builder.json(body)).await?;
        decode_json(&Method::PUT, &url, response).await
    }

    /// DELETE; an empty response body decodes as `null`
    pub async fn delete_json(&self, path: &str) -> ApiResult<serde_json::Value> {
        let (url, builder) = self.request(Method::DELETE, path);
        let response = self.dispatch(&Method::DELETE, &url, builder).await?;
        decode_json(&Method::DELETE, &url, response).await
    }

    /// GET a binary payload (image endpoints)
    pub async fn get_bytes(&self, path: &str) -> ApiResult<ImageBlob> {
        let (url, builder) = self.request(Method::GET, path);
        let builder = builder.header(ACCEPT, "image/*");
        let response = self.dispatch(&Method::GET, &url, builder).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|e| {
            let err = ApiError::from_reqwest(e);
            tracing::error!(method = "GET", url = %url, error = %err, "Failed to read image body");
            err
        })?;

        Ok(ImageBlob {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    // ============================================
    // Internals
    // ============================================

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let url = self.url_for(path);
        let mut builder = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");

        if let Some((name, value)) = self.auth_header_pair() {
            builder = builder.header(name, value);
        }

        (url, builder)
    }

    /// Send and check the status. Failures are logged, then returned unchanged.
    async fn dispatch(
        &self,
        method: &Method,
        url: &str,
        builder: RequestBuilder,
    ) -> ApiResult<Response> {
        tracing::debug!(method = %method, url = %url, "Sending request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::from_reqwest(e);
                tracing::error!(method = %method, url = %url, error = %err, "Request failed");
                return Err(err);
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body);
        tracing::error!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            error = %err,
            "Request failed"
        );
        Err(err)
    }
}

async fn decode_json<T: DeserializeOwned>(
    method: &Method,
    url: &str,
    response: Response,
) -> ApiResult<T> {
    let bytes = response.bytes().await.map_err(|e| {
        let err = ApiError::from_reqwest(e);
        tracing::error!(method = %method, url = %url, error = %err, "Failed to read response body");
        err
    })?;

    let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &bytes
    };

    serde_json::from_slice(body).map_err(|e| {
        let err = ApiError::Decode(e.to_string());
        tracing::error!(method = %method, url = %url, error = %err, "Failed to decode response");
        err
    })
}

fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
