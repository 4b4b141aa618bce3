//! Outbound HTTP client.
//!
//! # Responsibilities
//! - Send one rewritten request to an origin
//! - Stream the origin's response body back without buffering
//! - Turn network failures into an explicit [`UpstreamError`]
//!
//! # Design Decisions
//! - Origin redirects are followed (bounded) before the response is judged,
//!   since an origin `Location` carries no route prefix
//! - Connect timeout bounded by config; the overall deadline lives in resilience

use std::time::Duration;

use axum::body::Body;
use futures_util::future::BoxFuture;

use crate::proxy::{OutboundRequest, UpstreamResponse};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const MAX_REDIRECTS: usize = 10;

/// The request never produced a response.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream {origin} did not answer before the deadline")]
    Timeout { origin: String },

    #[error("upstream {origin} unreachable: {source}")]
    Unreachable {
        origin: String,
        #[source]
        source: BoxError,
    },
}

impl UpstreamError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Timeout { .. } => "timeout",
            UpstreamError::Unreachable { .. } => "unreachable",
        }
    }
}

/// Network seam between routing decisions and the wire.
pub trait Upstream: Send + Sync {
    fn send(
        &self,
        request: OutboundRequest,
    ) -> BoxFuture<'_, Result<UpstreamResponse, UpstreamError>>;
}

/// [`Upstream`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Upstream for HttpUpstream {
    fn send(
        &self,
        request: OutboundRequest,
    ) -> BoxFuture<'_, Result<UpstreamResponse, UpstreamError>> {
        Box::pin(async move {
            let origin = request.url.origin().ascii_serialization();

            let mut builder = self
                .client
                .request(request.method, request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout { origin }
                } else {
                    UpstreamError::Unreachable {
                        origin,
                        source: Box::new(e),
                    }
                }
            })?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = Body::from_stream(response.bytes_stream());

            Ok(UpstreamResponse {
                status,
                headers,
                body,
            })
        })
    }
}
