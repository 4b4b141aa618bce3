//! Request handling and transformation.
//!
//! # Responsibilities
//! - Name the request ID header used end to end
//! - Enforce the body size limit before buffering
//! - Reduce an axum request to an [`InboundRequest`]
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Declared oversize bodies rejected before reading
//! - Bodies are only read when they will be forwarded

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderName, CONTENT_LENGTH};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::proxy::InboundRequest;
use crate::routing::normalize_path;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID of an inbound request, `"unknown"` when absent.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Why an inbound request could not be turned into an [`InboundRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RequestRejection {
    #[error("Request body too large")]
    TooLarge,
    #[error("Request body could not be read")]
    Unreadable,
}

impl IntoResponse for RequestRejection {
    fn into_response(self) -> Response {
        let status = match self {
            RequestRejection::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RequestRejection::Unreadable => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Split a request into forwarding parts, buffering the body only if `read_body`.
pub async fn read_inbound(
    request: Request<Body>,
    read_body: bool,
    limit: usize,
) -> Result<InboundRequest, RequestRejection> {
    let (parts, body) = request.into_parts();

    let body = if read_body {
        if declared_length(&parts.headers).is_some_and(|len| len > limit) {
            return Err(RequestRejection::TooLarge);
        }
        axum::body::to_bytes(body, limit)
            .await
            .map_err(|_| RequestRejection::Unreadable)?
    } else {
        Bytes::new()
    };

    Ok(InboundRequest {
        method: parts.method,
        path: normalize_path(parts.uri.path()),
        query: parts.uri.query().map(ToOwned::to_owned),
        headers: parts.headers,
        body,
    })
}
