//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest (method, path, query, headers, body)
//!     → forwarder.rs (rewrite path against the matched origin)
//!     → headers.rs (drop host / hop-by-hop headers)
//!     → upstream.rs (Upstream::send under the request Deadline)
//!     → UpstreamResponse, or UpstreamError on network failure / timeout
//!
//! Page routes only:
//!     404 for an extension-less path → GET <origin>/ and return that instead
//! ```
//!
//! # Design Decisions
//! - One trait object at the network seam so routing logic is testable offline
//! - Upstream responses are never mutated; http/response.rs builds a fresh one
//! - Upstream 4xx/5xx are results, not errors

pub mod forwarder;
pub mod headers;
pub mod upstream;

#[cfg(test)]
pub(crate) mod testing;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, StatusCode};
use url::Url;

pub use forwarder::Forwarder;
pub use upstream::{HttpUpstream, Upstream, UpstreamError};

/// An inbound request reduced to what forwarding needs.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A request about to be sent to an origin.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// What an origin answered. The body is streamed.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

/// GET and HEAD never carry a forwarded body.
pub fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}
