//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use edge_router::config::{EdgeConfig, RouteConfig};
use edge_router::http::HttpServer;
use edge_router::lifecycle::Shutdown;

/// A request as seen by a mock origin.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: String,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: String,
}

/// A running mock origin that records every request it receives.
pub struct MockOrigin {
    pub addr: SocketAddr,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl MockOrigin {
    /// `http://127.0.0.1:<port>`, usable as a route origin.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    /// Path and query of every recorded request, in arrival order.
    pub fn uris(&self) -> Vec<String> {
        self.hits().into_iter().map(|h| h.uri).collect()
    }
}

/// Start a programmable mock origin answering with a status and body.
pub async fn start_origin<F, Fut>(f: F) -> MockOrigin
where
    F: Fn(Hit) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    start_raw_origin(move |hit: Hit| {
        let reply = f(hit);
        async move {
            let (status, body) = reply.await;
            (StatusCode::from_u16(status).unwrap(), Body::from(body)).into_response()
        }
    })
    .await
}

/// Start a mock origin on an ephemeral port that builds full responses.
pub async fn start_raw_origin<F, Fut>(f: F) -> MockOrigin
where
    F: Fn(Hit) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(Mutex::new(Vec::new()));

    let recorded = hits.clone();
    let app = Router::new().fallback(move |request: Request| {
        let f = f.clone();
        let recorded = recorded.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
            let hit = Hit {
                method: parts.method.to_string(),
                uri: parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.to_string())
                    .unwrap_or_default(),
                headers: parts.headers,
                body: String::from_utf8_lossy(&body).into_owned(),
            };
            recorded.lock().unwrap().push(hit.clone());

            f(hit).await
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockOrigin { addr, hits }
}

/// Mock single-page app: `/` is the shell, known files are served, the rest is 404.
pub async fn start_spa_origin(name: &'static str) -> MockOrigin {
    start_origin(move |hit: Hit| async move {
        let path = hit.uri.split('?').next().unwrap_or_default().to_string();
        match path.as_str() {
            "/" => (200, format!("{name} index")),
            "/app.js" => (200, format!("{name} script")),
            _ => (404, format!("{name} missing {path}")),
        }
    })
    .await
}

/// An address with nothing listening on it.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config with the API and page routes pointed at the given origins.
pub fn config_for(api: &str, routes: &[(&str, String)]) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.api.origin = api.to_string();
    config.routes = routes
        .iter()
        .map(|(prefix, origin)| RouteConfig::new(*prefix, origin.clone()))
        .collect();
    config
}

/// A running router under test.
pub struct RunningRouter {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningRouter {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the router on an ephemeral port.
pub async fn start_router(config: EdgeConfig) -> RunningRouter {
    let server = HttpServer::new(&config, None).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let task = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    RunningRouter {
        addr,
        shutdown,
        task,
    }
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
