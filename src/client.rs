//! HTTP transport used by the probes


use crate::error::{AppError, Result, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method};
use url::Url;
use std::time::Duration;

const USER_AGENT: &str = concat!("network-speed-probe/", env!("CARGO_PKG_VERSION"));

/// HTTP transport trait for abstraction and testing
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue one request. Any received response is returned, whatever its
    /// status; only transport-level failures are errors.
    async fn request(
        &self,
        url: &str,
        config: &RequestConfig,
    ) -> std::result::Result<HttpResponse, TransportError>;
}

/// Request configuration shared by every attempt against every candidate
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    /// Shared between attempts; cloning the config does not copy the payload
    pub body: Option<Bytes>,
    /// Read the full response body before returning. When false the call
    /// completes as soon as the response head arrives.
    pub consume_body: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestConfig {
    /// GET without a body
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            consume_body: false,
        }
    }

    /// POST carrying `body`
    pub fn post(body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::POST,
            headers: Vec::new(),
            body: Some(body.into()),
            consume_body: false,
        }
    }

    /// Add custom header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Read the response body to completion
    pub fn consuming_body(mut self) -> Self {
        self.consume_body = true;
        self
    }

    /// Size of the request body in bytes
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Bytes::len)
    }
}

/// HTTP response as seen by the probes
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    /// Empty unless the request asked for the body to be consumed
    pub body: Bytes,
}

impl HttpResponse {
    /// Check if the response indicates success
    pub fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }

    /// Number of body bytes received
    pub fn body_size(&self) -> usize {
        self.body.len()
    }
}

/// reqwest-backed transport
pub struct NetworkClient {
    client: Client,
    default_timeout: Duration,
}

impl NetworkClient {
    /// Create a new network client with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }
}

#[async_trait]
impl HttpTransport for NetworkClient {
    async fn request(
        &self,
        url: &str,
        config: &RequestConfig,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let parsed = Url::parse(url)
            .map_err(|e| TransportError::Other(format!("invalid URL '{}': {}", url, e)))?;

        let mut req_builder = self
            .client
            .request(config.method.clone(), parsed)
            .timeout(self.default_timeout);

        for (name, value) in &config.headers {
            req_builder = req_builder.header(name, value);
        }

        if let Some(body) = &config.body {
            req_builder = req_builder.body(body.clone());
        }

        let response = req_builder.send().await?;
        let status_code = response.status().as_u16();

        let body = if config.consume_body {
            response.bytes().await?
        } else {
            Bytes::new()
        };

        Ok(HttpResponse { status_code, body })
    }
}

/// Utility functions for HTTP operations
pub struct HttpUtils;

impl HttpUtils {
    /// Validate URL format
    pub fn validate_url(url: &str) -> Result<()> {
        let parsed = Url::parse(url)
            .map_err(|e| AppError::validation(format!("Invalid URL format: {}", e)))?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => return Err(AppError::validation(format!("Unsupported URL scheme: {}", scheme))),
        }

        if parsed.host().is_none() {
            return Err(AppError::validation("URL must have a host"));
        }

        Ok(())
    }

    /// Extract host from URL, falling back to the raw string
    pub fn display_host(url: &str) -> String {
        Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
            .unwrap_or_else(|| url.to_string())
    }
}
