//! Header manipulation.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Drop `host` and `content-length` from forwarded requests; the client
//!   sets them for the new origin and body
//!
//! # Design Decisions
//! - Everything else passes through untouched, including `x-request-id`
//! - Headers named in `Connection` are treated as hop-by-hop too

use axum::http::header::{self, HeaderMap, HeaderName};

const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

fn is_hop_by_hop(name: &HeaderName, connection_listed: &[HeaderName]) -> bool {
    HOP_BY_HOP.contains(name)
        || name.as_str() == "keep-alive"
        || name.as_str() == "proxy-connection"
        || connection_listed.contains(name)
}

fn connection_listed(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect()
}

fn filtered(headers: &HeaderMap, extra: &[HeaderName]) -> HeaderMap {
    let listed = connection_listed(headers);
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name, &listed) || extra.contains(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Headers to send upstream for an inbound request.
pub fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    filtered(inbound, &[header::HOST, header::CONTENT_LENGTH])
}

/// Headers to return to the client for an upstream response.
pub fn response_headers(upstream: &HeaderMap) -> HeaderMap {
    filtered(upstream, &[])
}
