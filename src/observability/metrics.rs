//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_router_requests_total` (counter): requests by category, status
//! - `edge_router_request_duration_seconds` (histogram): latency by category
//! - `edge_router_spa_fallbacks_total` (counter): fallbacks by route prefix
//! - `edge_router_upstream_failures_total` (counter): failures by category, kind
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::Category;

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(category: Category, status: u16, start: Instant) {
    ::metrics::counter!(
        "edge_router_requests_total",
        "category" => category.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "edge_router_request_duration_seconds",
        "category" => category.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_spa_fallback(route: &str) {
    ::metrics::counter!("edge_router_spa_fallbacks_total", "route" => route.to_string())
        .increment(1);
}

pub fn record_upstream_failure(category: Category, kind: &'static str) {
    ::metrics::counter!(
        "edge_router_upstream_failures_total",
        "category" => category.as_str(),
        "kind" => kind
    )
    .increment(1);
}
