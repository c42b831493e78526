//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! POST /token, /oauth2/token
//!     → body.rs (JSON / form / raw → InboundBody)
//!     → token.rs (form body + credential headers)
//!
//! GET /ehrrunner/fhir/*
//!     → resource.rs (path passthrough + identity headers)
//!
//! Both:
//!     → upstream::UpstreamClient (one exchange)
//!     → http::response (relay status + JSON, or 500 envelope)
//! ```
//!
//! # Design Decisions
//! - Request shaping is pure and tested without a network
//! - Exactly one outbound request per inbound request, never retried
//! - Upstream statuses are relayed; only transport and decode failures are 500s

pub mod body;
pub mod resource;
pub mod token;

use std::time::Instant;

use axum::http::{header::InvalidHeaderValue, HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::config::ProxyConfig;
use crate::http::response::relay;
use crate::observability::metrics;
use crate::upstream::{OutboundRequest, UpstreamClient};

pub use body::{InboundBody, InboundBodyError};

/// Settings the token forwarder applies to every exchange.
#[derive(Debug, Clone)]
pub struct TokenPolicy {
    pub user_agent: HeaderValue,
    pub percent_encode_form: bool,
}

impl TokenPolicy {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            user_agent: HeaderValue::from_str(&config.upstream.user_agent)?,
            percent_encode_form: config.token.percent_encode_form,
        })
    }
}

/// Copy a header from the inbound request if the client sent it.
pub(crate) fn copy_header(inbound: &HeaderMap, outbound: &mut HeaderMap, name: HeaderName) {
    if let Some(value) = inbound.get(&name) {
        outbound.insert(name, value.clone());
    }
}

/// Send one outbound request and turn the outcome into the caller's response.
pub(crate) async fn dispatch(
    client: &UpstreamClient,
    forwarder: &'static str,
    request_id: &str,
    outbound: OutboundRequest,
) -> Response {
    let start = Instant::now();
    let url = outbound.url.clone();

    match client.send(outbound).await {
        Ok(response) => {
            tracing::info!(
                request_id = %request_id,
                forwarder,
                url = %url,
                status = response.status.as_u16(),
                "Relaying upstream response"
            );
            metrics::record_forward(forwarder, response.status.as_u16(), start);
            relay(response)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                forwarder,
                url = %url,
                error = %e,
                "Upstream exchange failed"
            );
            let response = e.into_response();
            metrics::record_forward(forwarder, response.status().as_u16(), start);
            response
        }
    }
}
