//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the edge router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Path that `/` redirects to. Also linked from the not-found page.
    pub default_route: String,

    /// Optional HTML file replacing the built-in not-found page.
    pub not_found_page: Option<PathBuf>,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The API prefix and the origin it forwards to.
    pub api: ApiConfig,

    /// Page sites, matched in declaration order.
    pub routes: Vec<RouteConfig>,

    /// Request forwarding behavior.
    pub forwarding: ForwardingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            default_route: "/administracao".to_string(),
            not_found_page: None,
            listener: ListenerConfig::default(),
            api: ApiConfig::default(),
            routes: Vec::new(),
            forwarding: ForwardingConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// API forwarding target.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Path prefix claimed by the API (raw prefix match, checked first).
    pub prefix: String,

    /// API origin, e.g. "https://api.example.com" or a bare host.
    pub origin: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
            origin: String::new(),
        }
    }
}

/// A page site bound to a path prefix.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// Path prefix, e.g. "/administracao".
    pub prefix: String,

    /// Origin serving the site.
    pub origin: String,
}

impl RouteConfig {
    pub fn new(prefix: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            origin: origin.into(),
        }
    }
}

/// Forwarding behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Forward request bodies of non-GET/HEAD page requests.
    /// Off by default: page requests keep their method but drop the body.
    pub forward_page_body: bool,

    /// Maximum inbound body size in bytes that will be forwarded.
    pub max_body_size: usize,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            forward_page_body: false,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Budget for all upstream calls of one request (primary + fallback) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
