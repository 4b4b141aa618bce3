//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → routing (classify path)
//!     → request.rs (reduce to InboundRequest, body limit)
//!     → proxy (forward, SPA fallback) | redirect | not-found
//!     → response.rs (fresh response for the client)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
