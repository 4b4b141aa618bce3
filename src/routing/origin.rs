//! Backend origins.
//!
//! An origin is a scheme + host (+ optional port) with no path. Requests are
//! forwarded to it by swapping in a rewritten path and the inbound query.

use std::fmt;
use url::Url;

/// Reasons an origin string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OriginError {
    #[error("origin is empty")]
    Empty,
    #[error("not a valid URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported scheme `{0}` (expected http or https)")]
    Scheme(String),
    #[error("origin has no host")]
    MissingHost,
    #[error("origin must not carry a path, query or fragment")]
    HasPath,
}

/// A validated forwarding target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    url: Url,
}

impl Origin {
    /// Parse an origin. A bare host such as `site.pages.dev` means `https://site.pages.dev`.
    pub fn parse(raw: &str) -> Result<Self, OriginError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(OriginError::Empty);
        }

        let url = if raw.contains("://") {
            Url::parse(raw)?
        } else {
            Url::parse(&format!("https://{raw}"))?
        };

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(OriginError::Scheme(other.to_string())),
        }
        if url.host_str().is_none() {
            return Err(OriginError::MissingHost);
        }
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(OriginError::HasPath);
        }

        Ok(Self { url })
    }

    /// Host name of the origin.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Scheme of the origin ("http" or "https").
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Absolute URL for `path` (already percent-encoded) and an optional raw query.
    pub fn endpoint(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.url.clone();
        url.set_path(path);
        url.set_query(query);
        url
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url.origin().ascii_serialization())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_defaults_to_https() {
        let origin = Origin::parse("site.pages.dev").unwrap();
        assert_eq!(origin.scheme(), "https");
        assert_eq!(origin.host(), "site.pages.dev");
        assert_eq!(origin.to_string(), "https://site.pages.dev");
    }

    #[test]
    fn keeps_explicit_scheme_and_port() {
        let origin = Origin::parse("http://127.0.0.1:3000").unwrap();
        assert_eq!(origin.scheme(), "http");
        assert_eq!(origin.to_string(), "http://127.0.0.1:3000");
    }

    #[test]
    fn rejects_bad_origins() {
        assert_eq!(Origin::parse("  "), Err(OriginError::Empty));
        assert_eq!(
            Origin::parse("ftp://files.example.com"),
            Err(OriginError::Scheme("ftp".into()))
        );
        assert_eq!(
            Origin::parse("https://example.com/base"),
            Err(OriginError::HasPath)
        );
        assert!(matches!(
            Origin::parse("https://exa mple.com"),
            Err(OriginError::Parse(_))
        ));
    }

    #[test]
    fn endpoint_replaces_path_and_query() {
        let origin = Origin::parse("https://api.example.com").unwrap();

        let url = origin.endpoint("/users", Some("page=2"));
        assert_eq!(url.as_str(), "https://api.example.com/users?page=2");

        let url = origin.endpoint("/docs/a%20b", None);
        assert_eq!(url.as_str(), "https://api.example.com/docs/a%20b");
    }
}
