//! Upstream HTTP client.
//!
//! Issues exactly one request per call and decodes the body as JSON. There is
//! no retry here; timeouts and redirects come from [`UpstreamConfig`].

use std::time::Duration;

use axum::http::{HeaderMap, Method, StatusCode};
use reqwest::redirect::Policy;
use serde_json::Value;

use crate::config::UpstreamConfig;

/// A fully shaped request ready to be sent upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// What the upstream answered: its status and its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Failures that stop a response from being relayed.
///
/// An upstream answering with a non-2xx status is not an error.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("failed to build upstream client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid json response body at {url}: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Shared client for the upstream API.
///
/// Cheap to clone; clones share the underlying connection handling.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Build a client for the configured upstream.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let redirect = if config.max_redirects == 0 {
            Policy::none()
        } else {
            Policy::limited(config.max_redirects)
        };

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .redirect(redirect);

        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let http = builder.build().map_err(UpstreamError::Build)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and decode the JSON answer.
    pub async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, UpstreamError> {
        let OutboundRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.http.request(method, &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(source) => return Err(UpstreamError::Transport { url, source }),
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(source) => return Err(UpstreamError::Transport { url, source }),
        };

        let body = serde_json::from_slice(&bytes)
            .map_err(|source| UpstreamError::InvalidJson { url, source })?;

        Ok(UpstreamResponse { status, body })
    }
}
