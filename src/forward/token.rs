//! Token exchange forwarder.
//!
//! `POST /token` and `POST /oauth2/token` both land on `{base}/token` with a
//! form-encoded body and the client's credentials.

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
        HeaderMap, HeaderValue, Method,
    },
    response::{IntoResponse, Response},
};

use crate::forward::body::InboundBody;
use crate::forward::{copy_header, dispatch, TokenPolicy};
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::upstream::OutboundRequest;

/// Upstream path both inbound aliases collapse to.
pub const UPSTREAM_TOKEN_PATH: &str = "/token";

/// Body sent when the client supplied none.
pub const DEFAULT_BODY: &str = "grant_type=client_credentials";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Encode an inbound body as the upstream form body.
///
/// Structured fields are joined as `key=value` pairs without escaping unless
/// `percent_encode` is set.
pub fn encode_body(body: &InboundBody, percent_encode: bool) -> String {
    match body {
        InboundBody::Empty => DEFAULT_BODY.to_string(),
        InboundBody::Raw(raw) => raw.clone(),
        InboundBody::Structured(fields) if percent_encode => {
            url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish()
        }
        InboundBody::Structured(fields) => fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&"),
    }
}

/// Build the upstream token request.
pub fn build_request(
    base_url: &str,
    inbound: &HeaderMap,
    body: &InboundBody,
    policy: &TokenPolicy,
) -> OutboundRequest {
    let mut headers = HeaderMap::new();
    copy_header(inbound, &mut headers, AUTHORIZATION);
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    headers.insert(USER_AGENT, policy.user_agent.clone());

    OutboundRequest {
        method: Method::POST,
        url: format!("{}{}", base_url, UPSTREAM_TOKEN_PATH),
        headers,
        body: Some(encode_body(body, policy.percent_encode_form)),
    }
}

/// Handler for both token aliases.
pub async fn token_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = request_id(&headers).to_string();
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());

    let body = match InboundBody::parse(content_type, &body) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejected token request body");
            return e.into_response();
        }
    };

    let outbound = build_request(state.upstream.base_url(), &headers, &body, &state.token_policy);

    tracing::debug!(
        request_id = %request_id,
        body = outbound.body.as_deref().unwrap_or_default(),
        "Sending token request upstream"
    );

    dispatch(&state.upstream, "token", &request_id, outbound).await
}
