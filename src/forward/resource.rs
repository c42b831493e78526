//! Resource forwarder for `GET /ehrrunner/fhir/*`.

use axum::{
    extract::State,
    http::{
        header::{ACCEPT, AUTHORIZATION},
        HeaderMap, HeaderName, HeaderValue, Method, Uri,
    },
    response::Response,
};

use crate::forward::{copy_header, dispatch};
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::upstream::OutboundRequest;

/// Inbound prefix served by this forwarder.
pub const RESOURCE_PREFIX: &str = "/ehrrunner/fhir/";

/// Caller identity header passed through to the upstream.
pub const SUBJECT_ID: HeaderName = HeaderName::from_static("subject-id");

const FHIR_JSON: &str = "application/fhir+json";

/// Build the upstream resource request for an inbound path.
///
/// The path is appended to the base unchanged; the query string is not part
/// of `path` and is not forwarded.
pub fn build_request(base_url: &str, path: &str, inbound: &HeaderMap) -> OutboundRequest {
    let mut headers = HeaderMap::new();
    copy_header(inbound, &mut headers, AUTHORIZATION);
    headers.insert(ACCEPT, HeaderValue::from_static(FHIR_JSON));
    copy_header(inbound, &mut headers, SUBJECT_ID);

    OutboundRequest {
        method: Method::GET,
        url: format!("{}{}", base_url, path),
        headers,
        body: None,
    }
}

pub async fn resource_handler(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let request_id = request_id(&headers).to_string();
    let outbound = build_request(state.upstream.base_url(), uri.path(), &headers);

    tracing::debug!(
        request_id = %request_id,
        subject_id = headers.get(&SUBJECT_ID).and_then(|v| v.to_str().ok()).unwrap_or("-"),
        "Sending resource request upstream"
    );

    dispatch(&state.upstream, "resource", &request_id, outbound).await
}
