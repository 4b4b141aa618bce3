//! Path matching and rewriting.
//!
//! # Responsibilities
//! - Match the API prefix (raw string prefix)
//! - Match page prefixes on a segment boundary
//! - Strip the matched prefix to build the upstream path
//! - Tell static-asset paths apart from SPA route paths
//! - Resolve `.` and `..` segments before any of the above
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

use url::Url;

/// Trait for matching request paths against a prefix.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;

    /// The path forwarded upstream once the prefix is removed.
    fn strip(&self, path: &str) -> String;
}

/// Raw prefix match: `/api` claims `/api`, `/api/users` and also `/apiary`.
#[derive(Debug, Clone)]
pub struct RawPrefixMatcher {
    prefix: String,
}

impl RawPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Matcher for RawPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    fn strip(&self, path: &str) -> String {
        let rest = path.strip_prefix(self.prefix.as_str()).unwrap_or(path);
        if rest.starts_with('/') {
            rest.to_string()
        } else {
            // `/api` -> `/`, `/apiary` -> `/ary`
            format!("/{rest}")
        }
    }
}

/// Segment-bounded match: `/medico` claims `/medico` and `/medico/...`
/// but not `/medicos`.
#[derive(Debug, Clone)]
pub struct SegmentPrefixMatcher {
    prefix: String,
}

impl SegmentPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Matcher for SegmentPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    fn strip(&self, path: &str) -> String {
        match path.strip_prefix(self.prefix.as_str()) {
            Some("") | None => "/".to_string(),
            Some(rest) => rest.to_string(),
        }
    }
}

/// Resolve dot segments (`/a/./b`, `/a/x/../b`, `%2e%2e`) the way a URL parser
/// does, so matching, rewriting and the extension test all see the same path.
pub fn normalize_path(path: &str) -> String {
    match Url::parse("http://edge.invalid/") {
        Ok(mut url) => {
            url.set_path(path);
            url.path().to_string()
        }
        Err(_) => path.to_string(),
    }
}

/// True when the last path segment ends in `.` followed by one or more
/// ASCII alphanumerics (`app.a1b2.js`, `logo.png`).
pub fn has_file_extension(path: &str) -> bool {
    match path.rsplit_once('.') {
        Some((_, ext)) => !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_prefix_matcher() {
        let matcher = RawPrefixMatcher::new("/api");

        assert!(matcher.matches("/api"));
        assert!(matcher.matches("/api/users"));
        assert!(matcher.matches("/apiary"));
        assert!(!matcher.matches("/ap"));
        assert!(!matcher.matches("/v1/api"));
    }

    #[test]
    fn test_raw_prefix_strip() {
        let matcher = RawPrefixMatcher::new("/api");

        assert_eq!(matcher.strip("/api/users"), "/users");
        assert_eq!(matcher.strip("/api"), "/");
        assert_eq!(matcher.strip("/api/"), "/");
        assert_eq!(matcher.strip("/apiary"), "/ary");
        assert_eq!(matcher.strip("/api/v1/api/x"), "/v1/api/x");
    }

    #[test]
    fn test_segment_prefix_matcher() {
        let matcher = SegmentPrefixMatcher::new("/medico");

        assert!(matcher.matches("/medico"));
        assert!(matcher.matches("/medico/"));
        assert!(matcher.matches("/medico/agenda/1"));
        assert!(!matcher.matches("/medicos"));
        assert!(!matcher.matches("/paciente/medico"));
    }

    #[test]
    fn test_segment_prefix_strip() {
        let matcher = SegmentPrefixMatcher::new("/administracao");

        assert_eq!(matcher.strip("/administracao"), "/");
        assert_eq!(matcher.strip("/administracao/"), "/");
        assert_eq!(matcher.strip("/administracao/dashboard"), "/dashboard");
        // only the leading occurrence is removed
        assert_eq!(
            matcher.strip("/administracao/administracao/x"),
            "/administracao/x"
        );
    }

    #[test]
    fn test_file_extension() {
        assert!(has_file_extension("/app.a1b2.js"));
        assert!(has_file_extension("/assets/logo.PNG"));
        assert!(has_file_extension("/.env"));

        assert!(!has_file_extension("/"));
        assert!(!has_file_extension("/dashboard"));
        assert!(!has_file_extension("/file."));
        assert!(!has_file_extension("/v1.2/users"));
        assert!(!has_file_extension("/archive.tar-gz"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/administracao/x/../y"), "/administracao/y");
        assert_eq!(normalize_path("/administracao/./app.js"), "/administracao/app.js");
        assert_eq!(normalize_path("/administracao/%2e%2e/api/users"), "/api/users");
        assert_eq!(normalize_path("/../paciente"), "/paciente");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/medico/agenda"), "/medico/agenda");
        assert_eq!(normalize_path("/medico/a%20b"), "/medico/a%20b");
    }
}
