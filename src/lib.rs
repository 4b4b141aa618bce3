//! Path-based HTTP edge router library.
//!
//! One API origin and several static-site origins behind a single host, with
//! SPA navigation fallback for the sites.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resilience;
pub mod routing;

pub use config::EdgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
