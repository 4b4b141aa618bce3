//! API and page forwarding.
//!
//! # Responsibilities
//! - Rewrite API requests onto the API origin (prefix stripped, body kept)
//! - Rewrite page requests onto their site origin (prefix stripped)
//! - Apply the SPA fallback: a 404 for an extension-less page path is
//!   replaced by a GET of the site's root document
//!
//! # Design Decisions
//! - The fallback fires on a received 404 only, never on a failed call
//! - Primary and fallback calls run sequentially under one deadline
//! - At most one fallback per request

use std::sync::Arc;

use axum::http::{Method, StatusCode};

use crate::observability::metrics;
use crate::proxy::headers::outbound_headers;
use crate::proxy::upstream::{Upstream, UpstreamError};
use crate::proxy::{carries_body, InboundRequest, OutboundRequest, UpstreamResponse};
use crate::resilience::Deadline;
use crate::routing::{has_file_extension, ApiRoute, Origin, RouteEntry};

/// Issues rewritten requests through an [`Upstream`].
#[derive(Clone)]
pub struct Forwarder {
    upstream: Arc<dyn Upstream>,
    forward_page_body: bool,
}

impl Forwarder {
    pub fn new(upstream: Arc<dyn Upstream>, forward_page_body: bool) -> Self {
        Self {
            upstream,
            forward_page_body,
        }
    }

    /// Whether page requests carry their body upstream.
    pub fn forwards_page_body(&self) -> bool {
        self.forward_page_body
    }

    /// Forward an API request. The response is returned as received.
    pub async fn forward_api(
        &self,
        route: &ApiRoute,
        request: InboundRequest,
        deadline: Deadline,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let path = route.target_path(&request.path);
        let url = route.origin().endpoint(&path, request.query.as_deref());
        let body = carries_body(&request.method).then_some(request.body);

        tracing::debug!(origin = %route.origin(), path = %path, "Forwarding API request");

        let outbound = OutboundRequest {
            method: request.method,
            url,
            headers: outbound_headers(&request.headers),
            body,
        };
        self.dispatch(route.origin(), outbound, deadline).await
    }

    /// Forward a page request, falling back to the site root for unknown SPA routes.
    pub async fn forward_page(
        &self,
        entry: &RouteEntry,
        request: InboundRequest,
        deadline: Deadline,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let origin = entry.origin();
        let target_path = entry.target_path(&request.path);
        let is_asset = has_file_extension(&target_path);
        let headers = outbound_headers(&request.headers);
        let query = request.query.as_deref();

        let body = (self.forward_page_body && carries_body(&request.method))
            .then(|| request.body.clone());

        tracing::debug!(
            route = %entry.prefix(),
            origin = %origin,
            path = %target_path,
            asset = is_asset,
            "Forwarding page request"
        );

        let primary = OutboundRequest {
            method: request.method.clone(),
            url: origin.endpoint(&target_path, query),
            headers: headers.clone(),
            body,
        };
        let response = self.dispatch(origin, primary, deadline).await?;

        if response.status != StatusCode::NOT_FOUND || is_asset {
            return Ok(response);
        }

        // Discard the 404 before asking for the root document.
        drop(response);

        tracing::debug!(
            route = %entry.prefix(),
            path = %target_path,
            "Route path not found upstream, serving site root"
        );
        metrics::record_spa_fallback(entry.prefix());

        let fallback = OutboundRequest {
            method: Method::GET,
            url: origin.endpoint("/", query),
            headers,
            body: None,
        };
        self.dispatch(origin, fallback, deadline).await
    }

    async fn dispatch(
        &self,
        origin: &Origin,
        request: OutboundRequest,
        deadline: Deadline,
    ) -> Result<UpstreamResponse, UpstreamError> {
        match deadline.run(self.upstream.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout {
                origin: origin.to_string(),
            }),
        }
    }
}
