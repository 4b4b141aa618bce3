//! Route table and request classification.
//!
//! # Responsibilities
//! - Store the API route and the ordered page routes
//! - Classify a request path into exactly one category
//! - Return an explicit category rather than a silent default
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan in declaration order, first match wins
//! - Invariants (unique, non-overlapping prefixes) checked at construction

use crate::config::validation::{check_default_route, check_prefix_set, ValidationError};
use crate::config::EdgeConfig;
use crate::routing::matcher::{Matcher, RawPrefixMatcher, SegmentPrefixMatcher};
use crate::routing::origin::Origin;

/// The API binding: a raw prefix and the origin it forwards to.
#[derive(Debug, Clone)]
pub struct ApiRoute {
    matcher: RawPrefixMatcher,
    origin: Origin,
}

impl ApiRoute {
    pub fn new(prefix: impl Into<String>, origin: Origin) -> Self {
        Self {
            matcher: RawPrefixMatcher::new(prefix),
            origin,
        }
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Upstream path for an API request.
    pub fn target_path(&self, path: &str) -> String {
        self.matcher.strip(path)
    }
}

/// A single page-site binding.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    matcher: SegmentPrefixMatcher,
    origin: Origin,
}

impl RouteEntry {
    pub fn new(prefix: impl Into<String>, origin: Origin) -> Self {
        Self {
            matcher: SegmentPrefixMatcher::new(prefix),
            origin,
        }
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    /// Upstream path for a page request: the prefix removed once, `/` if nothing is left.
    pub fn target_path(&self, path: &str) -> String {
        self.matcher.strip(path)
    }
}

/// Handling category of an inbound path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Api,
    Page,
    Root,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Api => "api",
            Category::Page => "page",
            Category::Root => "root",
            Category::Unknown => "unknown",
        }
    }
}

/// Result of classifying a path against a [`RouteTable`].
#[derive(Debug, Clone, Copy)]
pub enum Classification<'a> {
    Api(&'a ApiRoute),
    Page(&'a RouteEntry),
    Root,
    Unknown,
}

impl Classification<'_> {
    pub fn category(&self) -> Category {
        match self {
            Classification::Api(_) => Category::Api,
            Classification::Page(_) => Category::Page,
            Classification::Root => Category::Root,
            Classification::Unknown => Category::Unknown,
        }
    }
}

/// Immutable routing table shared by all requests.
#[derive(Debug, Clone)]
pub struct RouteTable {
    api: ApiRoute,
    entries: Vec<RouteEntry>,
    default_route: String,
}

impl RouteTable {
    /// Build a table, rejecting invalid, duplicate or overlapping prefixes.
    pub fn new(
        api: ApiRoute,
        entries: Vec<RouteEntry>,
        default_route: impl Into<String>,
    ) -> Result<Self, Vec<ValidationError>> {
        let default_route = default_route.into();

        let prefixes: Vec<&str> = entries.iter().map(RouteEntry::prefix).collect();
        let mut errors = check_prefix_set(api.prefix(), &prefixes);
        errors.extend(check_default_route(&default_route));

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            api,
            entries,
            default_route,
        })
    }

    /// Build a table from configuration, reporting every problem found.
    pub fn from_config(config: &EdgeConfig) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let api = match Origin::parse(&config.api.origin) {
            Ok(origin) => Some(ApiRoute::new(config.api.prefix.clone(), origin)),
            Err(source) => {
                errors.push(ValidationError::InvalidOrigin {
                    name: config.api.prefix.clone(),
                    source,
                });
                None
            }
        };

        let mut entries = Vec::with_capacity(config.routes.len());
        for route in &config.routes {
            match Origin::parse(&route.origin) {
                Ok(origin) => entries.push(RouteEntry::new(route.prefix.clone(), origin)),
                Err(source) => errors.push(ValidationError::InvalidOrigin {
                    name: route.prefix.clone(),
                    source,
                }),
            }
        }

        match api {
            Some(api) if errors.is_empty() => {
                Self::new(api, entries, config.default_route.clone())
            }
            _ => {
                let prefixes: Vec<&str> =
                    config.routes.iter().map(|r| r.prefix.as_str()).collect();
                errors.extend(check_prefix_set(&config.api.prefix, &prefixes));
                errors.extend(check_default_route(&config.default_route));
                Err(errors)
            }
        }
    }

    /// Classify a path. Order: API prefix, page routes (declaration order), root, unknown.
    pub fn classify(&self, path: &str) -> Classification<'_> {
        if self.api.matcher.matches(path) {
            return Classification::Api(&self.api);
        }

        if let Some(entry) = self.entries.iter().find(|e| e.matches(path)) {
            return Classification::Page(entry);
        }

        if path.is_empty() || path == "/" {
            return Classification::Root;
        }

        Classification::Unknown
    }

    pub fn api(&self) -> &ApiRoute {
        &self.api
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn default_route(&self) -> &str {
        &self.default_route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;

    fn origin(host: &str) -> Origin {
        Origin::parse(host).unwrap()
    }

    fn table() -> RouteTable {
        RouteTable::new(
            ApiRoute::new("/api", origin("api.example.com")),
            vec![
                RouteEntry::new("/administracao", origin("adm.example.com")),
                RouteEntry::new("/paciente", origin("paciente.example.com")),
                RouteEntry::new("/medico", origin("medico.example.com")),
            ],
            "/administracao",
        )
        .unwrap()
    }

    fn page_host(c: Classification<'_>) -> Option<&str> {
        match c {
            Classification::Page(entry) => Some(entry.origin().host()),
            _ => None,
        }
    }

    #[test]
    fn api_prefix_is_checked_first() {
        let table = table();
        assert_eq!(table.classify("/api/users").category(), Category::Api);
        assert_eq!(table.classify("/api").category(), Category::Api);
        assert_eq!(table.classify("/apiary").category(), Category::Api);
    }

    #[test]
    fn pages_match_on_segment_boundary() {
        let table = table();
        assert_eq!(page_host(table.classify("/medico")), Some("medico.example.com"));
        assert_eq!(
            page_host(table.classify("/administracao/dashboard")),
            Some("adm.example.com")
        );
        assert_eq!(table.classify("/medicos").category(), Category::Unknown);
    }

    #[test]
    fn root_and_unknown() {
        let table = table();
        assert_eq!(table.classify("/").category(), Category::Root);
        assert_eq!(table.classify("").category(), Category::Root);
        assert_eq!(table.classify("/unknown/thing").category(), Category::Unknown);
        assert_eq!(table.classify("//").category(), Category::Unknown);
    }

    #[test]
    fn rejects_overlapping_and_duplicate_prefixes() {
        let errors = RouteTable::new(
            ApiRoute::new("/api", origin("api.example.com")),
            vec![
                RouteEntry::new("/app", origin("a.example.com")),
                RouteEntry::new("/app/admin", origin("b.example.com")),
                RouteEntry::new("/app", origin("c.example.com")),
            ],
            "/app",
        )
        .unwrap_err();

        assert!(errors.contains(&ValidationError::DuplicatePrefix("/app".into())));
        assert!(errors.contains(&ValidationError::OverlappingPrefix {
            outer: "/app".into(),
            inner: "/app/admin".into(),
        }));
    }

    #[test]
    fn from_config_collects_origin_and_prefix_errors() {
        let mut config = EdgeConfig::default();
        config.api.origin = String::new();
        config.routes.push(RouteConfig::new("docs", "docs.example.com"));
        config.routes.push(RouteConfig::new("/site", "ftp://site.example.com"));

        let errors = RouteTable::from_config(&config).unwrap_err();

        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidOrigin { name, .. } if name == "/api")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidOrigin { name, .. } if name == "/site")));
        assert!(errors.iter().any(
            |e| matches!(e, ValidationError::InvalidPrefix { prefix, .. } if prefix == "docs")
        ));
    }

    #[test]
    fn from_config_builds_ordered_table() {
        let mut config = EdgeConfig::default();
        config.api.origin = "https://api.example.com".into();
        config.routes.push(RouteConfig::new("/administracao", "adm.example.com"));
        config.routes.push(RouteConfig::new("/documentacao", "docs.example.com"));

        let table = RouteTable::from_config(&config).unwrap();
        let prefixes: Vec<_> = table.entries().iter().map(RouteEntry::prefix).collect();
        assert_eq!(prefixes, ["/administracao", "/documentacao"]);
        assert_eq!(table.default_route(), "/administracao");
        assert_eq!(table.api().origin().host(), "api.example.com");
    }
}
