//! Response construction.
//!
//! # Responsibilities
//! - Rebuild the client response from an upstream response
//! - Root redirect, not-found page, and gateway failure responses
//!
//! # Design Decisions
//! - Upstream responses are copied into a fresh response, never mutated
//! - Streaming responses avoid buffering entire body
//! - Hop-by-hop headers stripped automatically
//! - Unreachable or timed-out origins result in 502 Bad Gateway

use axum::body::{Body, Bytes};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::proxy::headers::response_headers;
use crate::proxy::UpstreamResponse;

const BUILTIN_NOT_FOUND: &str = include_str!("../../assets/not_found.html");

/// Client response for a received upstream response: same status, headers and body.
pub fn from_upstream(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(upstream.body);
    *response.status_mut() = upstream.status;
    *response.headers_mut() = response_headers(&upstream.headers);
    response
}

/// `Location` for the root redirect: the inbound origin followed by `default_route`.
///
/// The scheme comes from `x-forwarded-proto` (the router normally sits behind
/// TLS termination), then the request URI, then `http`. Without a host the
/// redirect is relative.
pub fn root_location(headers: &HeaderMap, uri: &Uri, default_route: &str) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(ToOwned::to_owned)
        .or_else(|| uri.authority().map(|a| a.to_string()));

    let Some(host) = host else {
        return default_route.to_string();
    };

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");

    format!("{scheme}://{host}{default_route}")
}

/// 302 Found pointing at `location`.
pub fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::warn!(location = %location, "Unrepresentable redirect location");
            (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect location").into_response()
        }
    }
}

/// 502 for an origin that never answered.
pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
}

/// The rendered not-found page body.
#[derive(Debug, Clone)]
pub struct NotFoundPage {
    body: Bytes,
}

impl NotFoundPage {
    /// Built-in page linking to `default_route`.
    pub fn builtin(default_route: &str) -> Self {
        let body = BUILTIN_NOT_FOUND.replace("{{default_route}}", &escape_attribute(default_route));
        Self {
            body: Bytes::from(body),
        }
    }

    /// Operator-supplied page, served verbatim.
    pub fn custom(html: impl Into<String>) -> Self {
        Self {
            body: Bytes::from(html.into()),
        }
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// 404 with `Content-Type: text/html`.
    pub fn response(&self) -> Response {
        (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, HeaderValue::from_static("text/html"))],
            Body::from(self.body.clone()),
        )
            .into_response()
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
