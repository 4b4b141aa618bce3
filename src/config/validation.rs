//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate origins, prefixes and value ranges
//! - Detect duplicate and overlapping routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::EdgeConfig;
use crate::routing::matcher::{Matcher, SegmentPrefixMatcher};
use crate::routing::origin::OriginError;
use crate::routing::RouteTable;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("prefix `{prefix}` {reason}")]
    InvalidPrefix { prefix: String, reason: &'static str },

    #[error("route prefix `{0}` is declared more than once")]
    DuplicatePrefix(String),

    #[error("route prefixes `{outer}` and `{inner}` overlap")]
    OverlappingPrefix { outer: String, inner: String },

    #[error("route prefix `{prefix}` is shadowed by the API prefix `{api_prefix}`")]
    ShadowedByApi { prefix: String, api_prefix: String },

    #[error("invalid origin for `{name}`: {source}")]
    InvalidOrigin {
        name: String,
        #[source]
        source: OriginError,
    },

    #[error("default route `{0}` must start with `/` and must not be `/`")]
    InvalidDefaultRoute(String),

    #[error("invalid {field} `{address}`")]
    InvalidAddress { field: &'static str, address: String },

    #[error("timeout `{0}` must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(mut table_errors) = RouteTable::from_config(config) {
        errors.append(&mut table_errors);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "bind address",
            address: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "metrics address",
            address: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Render a list of validation errors on one line.
pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn check_prefix(prefix: &str) -> Option<&'static str> {
    if prefix.is_empty() {
        Some("is empty")
    } else if !prefix.starts_with('/') {
        Some("must start with `/`")
    } else if prefix.ends_with('/') {
        Some("must not end with `/`")
    } else {
        None
    }
}

/// Check the API prefix and the ordered page prefixes against each other.
pub(crate) fn check_prefix_set(api_prefix: &str, prefixes: &[&str]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(reason) = check_prefix(api_prefix) {
        errors.push(ValidationError::InvalidPrefix {
            prefix: api_prefix.to_string(),
            reason,
        });
    }

    let mut seen = HashSet::new();
    let mut valid: Vec<&str> = Vec::with_capacity(prefixes.len());

    for &prefix in prefixes {
        if let Some(reason) = check_prefix(prefix) {
            errors.push(ValidationError::InvalidPrefix {
                prefix: prefix.to_string(),
                reason,
            });
            continue;
        }

        if !seen.insert(prefix) {
            errors.push(ValidationError::DuplicatePrefix(prefix.to_string()));
            continue;
        }

        if !api_prefix.is_empty() && prefix.starts_with(api_prefix) {
            errors.push(ValidationError::ShadowedByApi {
                prefix: prefix.to_string(),
                api_prefix: api_prefix.to_string(),
            });
        }

        for &other in &valid {
            let (outer, inner) = if other.len() <= prefix.len() {
                (other, prefix)
            } else {
                (prefix, other)
            };
            if SegmentPrefixMatcher::new(outer).matches(inner) {
                errors.push(ValidationError::OverlappingPrefix {
                    outer: outer.to_string(),
                    inner: inner.to_string(),
                });
            }
        }

        valid.push(prefix);
    }

    errors
}

pub(crate) fn check_default_route(route: &str) -> Option<ValidationError> {
    if route.starts_with('/') && route != "/" {
        None
    } else {
        Some(ValidationError::InvalidDefaultRoute(route.to_string()))
    }
}
