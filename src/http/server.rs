//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener
//! - Classify each request and dispatch it to the matching handler
//! - Observability (metrics, correlation IDs)

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::validation::join_errors;
use crate::config::{EdgeConfig, ValidationError};
use crate::http::request::{read_inbound, request_id};
use crate::http::response::{self, NotFoundPage};
use crate::observability::metrics;
use crate::proxy::{
    carries_body, Forwarder, HttpUpstream, Upstream, UpstreamError, UpstreamResponse,
};
use crate::resilience::Deadline;
use crate::routing::{normalize_path, Category, Classification, RouteTable};

/// Errors building the server from a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid route table: {}", join_errors(.0))]
    Routes(Vec<ValidationError>),
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub forwarder: Forwarder,
    pub not_found: Arc<NotFoundPage>,
    pub request_timeout: Duration,
    pub max_body_size: usize,
}

/// HTTP server for the edge router.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server that forwards over the network.
    pub fn new(config: &EdgeConfig, not_found_page: Option<String>) -> Result<Self, ServerError> {
        let upstream = HttpUpstream::new(Duration::from_secs(config.timeouts.connect_secs))?;
        Self::with_upstream(config, not_found_page, Arc::new(upstream))
    }

    /// Create a server that forwards through the given upstream.
    pub fn with_upstream(
        config: &EdgeConfig,
        not_found_page: Option<String>,
        upstream: Arc<dyn Upstream>,
    ) -> Result<Self, ServerError> {
        let table = RouteTable::from_config(config).map_err(ServerError::Routes)?;

        tracing::info!(
            api_prefix = %table.api().prefix(),
            api_origin = %table.api().origin(),
            routes = table.entries().len(),
            default_route = %table.default_route(),
            "Route table loaded"
        );
        for entry in table.entries() {
            tracing::debug!(prefix = %entry.prefix(), origin = %entry.origin(), "Page route");
        }

        let not_found = match not_found_page {
            Some(html) => NotFoundPage::custom(html),
            None => NotFoundPage::builtin(table.default_route()),
        };

        let state = AppState {
            table: Arc::new(table),
            forwarder: Forwarder::new(upstream, config.forwarding.forward_page_body),
            not_found: Arc::new(not_found),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
            max_body_size: config.forwarding.max_body_size,
        };

        let router = Self::build_router(state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(route_request))
            .route("/", any(route_request))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            path = %request.uri().path(),
                            request_id = %request_id(request.headers()),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router, for serving it elsewhere or driving it in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main handler: classify the path, then forward, redirect or answer 404.
async fn route_request(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let deadline = Deadline::after(state.request_timeout);

    let path = normalize_path(request.uri().path());
    let classification = state.table.classify(&path);
    let category = classification.category();

    tracing::debug!(category = category.as_str(), "Request classified");

    let response = match classification {
        Classification::Api(route) => {
            let read_body = carries_body(request.method());
            match read_inbound(request, read_body, state.max_body_size).await {
                Ok(inbound) => finish(
                    category,
                    state.forwarder.forward_api(route, inbound, deadline).await,
                ),
                Err(rejection) => rejection.into_response(),
            }
        }
        Classification::Page(entry) => {
            let read_body = state.forwarder.forwards_page_body() && carries_body(request.method());
            match read_inbound(request, read_body, state.max_body_size).await {
                Ok(inbound) => finish(
                    category,
                    state.forwarder.forward_page(entry, inbound, deadline).await,
                ),
                Err(rejection) => rejection.into_response(),
            }
        }
        Classification::Root => {
            let location = response::root_location(
                request.headers(),
                request.uri(),
                state.table.default_route(),
            );
            tracing::debug!(location = %location, "Redirecting root");
            response::redirect(&location)
        }
        Classification::Unknown => {
            tracing::debug!(path = %path, "No route matched");
            state.not_found.response()
        }
    };

    let status = response.status().as_u16();
    tracing::info!(category = category.as_str(), status, "Request handled");
    metrics::record_request(category, status, start_time);
    response
}

fn finish(category: Category, result: Result<UpstreamResponse, UpstreamError>) -> Response {
    match result {
        Ok(upstream) => response::from_upstream(upstream),
        Err(e) => {
            tracing::error!(error = %e, kind = e.kind(), "Upstream error");
            metrics::record_upstream_failure(category, e.kind());
            response::bad_gateway()
        }
    }
}
