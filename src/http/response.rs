//! Response construction.
//!
//! # Responsibilities
//! - Relay an upstream status and JSON body to the caller
//! - Map proxy-level failures to the `{"error": ...}` envelope
//!
//! # Design Decisions
//! - Upstream non-2xx answers are relayed, never rewritten
//! - Transport and decode failures become 500
//! - Unreadable inbound bodies become 400

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::forward::InboundBodyError;
use crate::upstream::{UpstreamError, UpstreamResponse};

/// Body returned when the proxy itself could not complete a request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Build an error envelope response.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Return the upstream's status and JSON body unchanged.
pub fn relay(response: UpstreamResponse) -> Response {
    (response.status, Json(response.body)).into_response()
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
    }
}

impl IntoResponse for InboundBodyError {
    fn into_response(self) -> Response {
        error_response(StatusCode::BAD_REQUEST, self.to_string())
    }
}
