//! Request matching logic.
//!
//! # Responsibilities
//! - Match the request method (GET only for the console)
//! - Match the path within the application against a glob pattern
//! - Detect WebSocket upgrade attempts
//! - Combine the three with AND semantics (upgrade negated)
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Upgrade token comparison is ASCII case-insensitive (RFC 9110, section 7.8)
//! - A predicate that cannot evaluate returns `MatchError`; the caller
//!   decides what a failed evaluation means

use axum::body::Body;
use axum::http::{header, Method, Request};

use crate::error::MatchError;
use crate::routing::pattern::PathPattern;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> Result<bool, MatchError>;
}

/// Matches the request method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> Result<bool, MatchError> {
        Ok(req.method() == self.method)
    }
}

/// Matches the path within the application against a glob pattern.
#[derive(Debug, Clone)]
pub struct PathPatternMatcher {
    pattern: PathPattern,
    context_path: String,
}

impl PathPatternMatcher {
    /// Create a matcher for an application mounted under `context_path`
    /// (empty for the root).
    pub fn new(pattern: PathPattern, context_path: impl Into<String>) -> Self {
        Self {
            pattern,
            context_path: context_path.into(),
        }
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn context_path(&self) -> &str {
        &self.context_path
    }
}

impl Matcher for PathPatternMatcher {
    fn matches(&self, req: &Request<Body>) -> Result<bool, MatchError> {
        Ok(path_within_application(req.uri().path(), &self.context_path)
            .is_some_and(|path| self.pattern.matches(path)))
    }
}

/// Matches WebSocket upgrade requests (`Upgrade: websocket`).
#[derive(Debug, Clone, Default)]
pub struct WebSocketUpgradeMatcher;

impl Matcher for WebSocketUpgradeMatcher {
    fn matches(&self, req: &Request<Body>) -> Result<bool, MatchError> {
        for value in req.headers().get_all(header::UPGRADE) {
            let value = value.to_str().map_err(|_| MatchError::InvalidHeader {
                name: header::UPGRADE.to_string(),
            })?;
            if value
                .split(',')
                .any(|token| token.trim().eq_ignore_ascii_case("websocket"))
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Decides whether a request belongs to the console:
/// `GET` AND path matches AND NOT upgrade.
#[derive(Debug)]
pub struct ConsoleMatcher {
    method: MethodMatcher,
    path: PathPatternMatcher,
    upgrade: Box<dyn Matcher>,
}

impl ConsoleMatcher {
    pub fn new(path: PathPatternMatcher) -> Self {
        Self {
            method: MethodMatcher::new(Method::GET),
            path,
            upgrade: Box::new(WebSocketUpgradeMatcher),
        }
    }

    /// Replace the upgrade predicate.
    pub fn with_upgrade_matcher(mut self, upgrade: Box<dyn Matcher>) -> Self {
        self.upgrade = upgrade;
        self
    }

    pub fn path(&self) -> &PathPatternMatcher {
        &self.path
    }

    pub fn matches(&self, req: &Request<Body>) -> Result<bool, MatchError> {
        Ok(self.method.matches(req)? && self.path.matches(req)? && !self.upgrade.matches(req)?)
    }
}

/// Strip the application's context path, returning `None` for paths
/// outside it.
pub fn path_within_application<'a>(path: &'a str, context_path: &str) -> Option<&'a str> {
    if context_path.is_empty() {
        return Some(path);
    }
    match path.strip_prefix(context_path) {
        Some("") => Some("/"),
        Some(rest) if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> ConsoleMatcher {
        ConsoleMatcher::new(PathPatternMatcher::new(
            PathPattern::parse("/console/**").unwrap(),
            "",
        ))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[derive(Debug)]
    struct Broken;

    impl Matcher for Broken {
        fn matches(&self, _req: &Request<Body>) -> Result<bool, MatchError> {
            Err(MatchError::InvalidHeader { name: "x-test".into() })
        }
    }

    #[test]
    fn test_method_matcher() {
        let matcher = MethodMatcher::new(Method::GET);
        assert!(matcher.matches(&get("/")).unwrap());

        let post = Request::builder()
            .method(Method::POST)
            .uri("/")
            .body(Body::empty())
            .unwrap();
        assert!(!matcher.matches(&post).unwrap());
    }

    #[test]
    fn test_path_matcher_with_context_path() {
        let matcher = PathPatternMatcher::new(PathPattern::parse("/console/**").unwrap(), "/app");
        assert!(matcher.matches(&get("http://example.com/app/console/index.html")).unwrap());
        assert!(!matcher.matches(&get("http://example.com/console/index.html")).unwrap());
        assert!(!matcher.matches(&get("http://example.com/application/console")).unwrap());
    }

    #[test]
    fn test_websocket_upgrade_matcher() {
        let matcher = WebSocketUpgradeMatcher;
        assert!(!matcher.matches(&get("/")).unwrap());

        let ws = Request::builder()
            .uri("/console/socket")
            .header("Upgrade", "WebSocket")
            .header("Connection", "Upgrade")
            .body(Body::empty())
            .unwrap();
        assert!(matcher.matches(&ws).unwrap());

        let h2c = Request::builder()
            .uri("/")
            .header("Upgrade", "h2c")
            .body(Body::empty())
            .unwrap();
        assert!(!matcher.matches(&h2c).unwrap());

        let garbage = Request::builder()
            .uri("/")
            .header("Upgrade", &b"web\xffsocket"[..])
            .body(Body::empty())
            .unwrap();
        assert!(matcher.matches(&garbage).is_err());
    }

    #[test]
    fn test_console_matcher() {
        let matcher = console();
        assert!(matcher.matches(&get("/console/index.html")).unwrap());
        assert!(!matcher.matches(&get("/api/posts")).unwrap());

        let head = Request::builder()
            .method(Method::HEAD)
            .uri("/console/index.html")
            .body(Body::empty())
            .unwrap();
        assert!(!matcher.matches(&head).unwrap());

        let ws = Request::builder()
            .uri("/console/socket")
            .header("Upgrade", "websocket")
            .body(Body::empty())
            .unwrap();
        assert!(!matcher.matches(&ws).unwrap());
    }

    #[test]
    fn test_console_matcher_propagates_predicate_failure() {
        let matcher = console().with_upgrade_matcher(Box::new(Broken));
        assert!(matcher.matches(&get("/console/index.html")).is_err());
        // Short-circuits before the upgrade predicate runs.
        assert!(!matcher.matches(&get("/api")).unwrap());
    }

    #[test]
    fn test_path_within_application() {
        assert_eq!(path_within_application("/a/b", ""), Some("/a/b"));
        assert_eq!(path_within_application("/app/a", "/app"), Some("/a"));
        assert_eq!(path_within_application("/app", "/app"), Some("/"));
        assert_eq!(path_within_application("/apple", "/app"), None);
    }
}
