//! HTTP utilities for OData REST calls

use super::error::ApiError;
use crate::config::ClientConfig;
use reqwest::header::{ETAG, IF_MATCH};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters and line breaks,
/// including Unicode separators; other non-ASCII text is kept
fn sanitize_for_log(body: &str) -> String {
    let char_count = body.chars().count();
    let truncated = if char_count > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control() || (c.is_whitespace() && c != ' '), "")
}

/// Response returned unmodified to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    /// `ETag` header, usable as the `If-Match` precondition of a later delete
    pub etag: Option<String>,
    /// JSON body, `Value::Null` when the server sent none
    pub body: Value,
}

impl RawResponse {
    /// Decode the body into a typed value
    pub fn json<U: DeserializeOwned>(&self) -> Result<U, ApiError> {
        serde_json::from_value(self.body.clone()).map_err(ApiError::Decode)
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_null()
    }
}

/// HTTP client wrapper for OData endpoints
///
/// Every request carries the configuration's default headers.
#[derive(Clone)]
pub struct ODataHttp {
    client: Client,
    config: Arc<ClientConfig>,
}

impl ODataHttp {
    /// Create a new HTTP client
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Self::from_shared(Arc::new(config))
    }

    /// Create a client over a configuration shared with other clients
    pub fn from_shared(config: Arc<ClientConfig>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .default_headers(config.default_headers().clone())
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a URL below the service root
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_path(), path)
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<RawResponse, ApiError> {
        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        self.send(Method::GET, url, request).await
    }

    /// Make a POST request with a JSON body
    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<RawResponse, ApiError> {
        let request = self.client.post(url).json(body);
        self.send(Method::POST, url, request).await
    }

    /// Make a PATCH request with a JSON body
    pub async fn patch<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<RawResponse, ApiError> {
        let request = self.client.patch(url).json(body);
        self.send(Method::PATCH, url, request).await
    }

    /// Make a DELETE request, conditional when `if_match` is given
    pub async fn delete(&self, url: &str, if_match: Option<&str>) -> Result<RawResponse, ApiError> {
        let mut request = self.client.delete(url);
        if let Some(tag) = if_match {
            request = request.header(IF_MATCH, tag);
        }
        self.send(Method::DELETE, url, request).await
    }

    async fn send(&self, method: Method, url: &str, request: RequestBuilder) -> Result<RawResponse, ApiError> {
        tracing::debug!("{} {}", method, url);

        let response = request.send().await.map_err(handle_transport_error)?;

        let status = response.status();
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await.map_err(handle_transport_error)?;

        if !status.is_success() {
            return Err(handle_error(status, &body));
        }

        // Handle empty response (204 No Content, DELETE)
        if body.trim().is_empty() {
            return Ok(RawResponse {
                status,
                etag,
                body: Value::Null,
            });
        }

        let body = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Invalid JSON from {}: {}", url, sanitize_for_log(&body));
            ApiError::Decode(e)
        })?;

        Ok(RawResponse { status, etag, body })
    }
}

/// Log a failed response and forward the server's error payload
fn handle_error(status: StatusCode, body: &str) -> ApiError {
    // Only log sanitized/truncated error body to avoid leaking sensitive data
    tracing::error!("API error: {} - {}", status, sanitize_for_log(body));
    ApiError::from_response(status, body)
}

fn handle_transport_error(err: reqwest::Error) -> ApiError {
    tracing::error!("Transport error: {}", err);
    ApiError::Transport(err)
}
