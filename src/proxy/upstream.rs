//! Upstream endpoint and URI construction.
//!
//! # Responsibilities
//! - Hold the parsed backend endpoint (scheme, authority, base path)
//! - Join endpoint + forwarded path + raw query into the upstream URI
//!
//! # Design Decisions
//! - The raw query string is reused as-is: ordering, repeated keys and
//!   percent-encoding survive untouched
//! - The inbound path is never re-encoded; anything `http::Uri` rejects is a
//!   construction error, not silently repaired

use axum::http::uri::{Authority, Scheme};
use axum::http::Uri;

use crate::error::{ProxyError, SetupError};

/// The backend the console is served from.
#[derive(Debug, Clone)]
pub struct Endpoint {
    scheme: Scheme,
    authority: Authority,
    base_path: String,
}

impl Endpoint {
    /// Parse an absolute base URI such as `http://127.0.0.1:8090`.
    pub fn parse(endpoint: &str) -> Result<Self, SetupError> {
        let invalid = |reason: &str| SetupError::Endpoint {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        };

        let uri = endpoint
            .parse::<Uri>()
            .map_err(|e| invalid(&e.to_string()))?;
        let parts = uri.into_parts();
        let scheme = parts.scheme.ok_or_else(|| invalid("missing scheme"))?;
        if scheme != Scheme::HTTP {
            return Err(invalid("scheme must be http"));
        }
        let authority = parts.authority.ok_or_else(|| invalid("missing host"))?;
        let path_and_query = parts.path_and_query;
        if path_and_query.as_ref().and_then(|pq| pq.query()).is_some() {
            return Err(invalid("must not carry a query"));
        }
        let base_path = path_and_query
            .as_ref()
            .map(|pq| pq.path().trim_end_matches('/').to_string())
            .unwrap_or_default();

        Ok(Self {
            scheme,
            authority,
            base_path,
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Path prepended to every forwarded path (no trailing slash, may be empty).
    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.base_path)
    }
}

/// Build `scheme://authority[base]path[?query]` for the upstream call.
pub fn build_upstream_uri(
    endpoint: &Endpoint,
    path: &str,
    query: Option<&str>,
) -> Result<Uri, ProxyError> {
    let mut target = endpoint.to_string();
    target.push_str(path);
    if let Some(query) = query {
        target.push('?');
        target.push_str(query);
    }

    match target.parse::<Uri>() {
        Ok(uri) => Ok(uri),
        Err(e) => Err(ProxyError::UriConstruction {
            uri: target,
            reason: e.to_string(),
        }),
    }
}
