//! The console proxy decision engine.
//!
//! # Request State Machine
//! ```text
//! deciding ──no match──▶ delegated   (next handler runs, engine is done)
//!     │
//!     └──match──▶ forwarding ──▶ completed  (status/headers/body written)
//!                          └──▶ failed     (ProxyError returned)
//! ```
//!
//! # Design Decisions
//! - Stateless beyond the immutable config; safe to share behind an `Arc`
//! - The next handler is an `FnOnce`, so it can run at most once
//! - A predicate that fails to evaluate counts as a non-match

use axum::body::Body;
use axum::http::{Request, Response, Uri};
use axum::response::IntoResponse;
use std::future::Future;
use std::time::Instant;

use crate::config::{ConsoleConfig, ProxyConfig};
use crate::error::{ProxyError, SetupError};
use crate::observability::metrics;
use crate::proxy::relay::{self, BodyDisposition};
use crate::proxy::transport::{HyperTransport, UpstreamTransport};
use crate::proxy::upstream::{build_upstream_uri, Endpoint};
use crate::routing::{path_within_application, ConsoleMatcher, Matcher, PathPattern, PathPatternMatcher};

/// Outcome of [`ConsoleProxy::forward`].
#[derive(Debug)]
pub enum Forwarded {
    /// The next handler produced this response.
    Delegated(Response<Body>),
    /// The response was relayed from the upstream endpoint.
    Proxied(Response<Body>),
}

impl Forwarded {
    /// True when the upstream endpoint answered.
    pub fn is_proxied(&self) -> bool {
        matches!(self, Forwarded::Proxied(_))
    }

    /// The response, whichever side produced it.
    pub fn into_inner(self) -> Response<Body> {
        match self {
            Forwarded::Delegated(res) | Forwarded::Proxied(res) => res,
        }
    }
}

impl IntoResponse for Forwarded {
    fn into_response(self) -> axum::response::Response {
        self.into_inner()
    }
}

/// Forwards console requests to a separately running backend.
pub struct ConsoleProxy<T = HyperTransport> {
    matcher: ConsoleMatcher,
    endpoint: Endpoint,
    strip_prefix: bool,
    transport: T,
}

impl ConsoleProxy<HyperTransport> {
    /// Build a proxy with the pooled hyper transport.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, SetupError> {
        Self::new(&config.console, HyperTransport::new(&config.timeouts))
    }
}

impl<T: UpstreamTransport> ConsoleProxy<T> {
    pub fn new(config: &ConsoleConfig, transport: T) -> Result<Self, SetupError> {
        let pattern = PathPattern::parse(&config.path_pattern)?;
        let endpoint = Endpoint::parse(&config.endpoint)?;
        let matcher = ConsoleMatcher::new(PathPatternMatcher::new(pattern, config.context_path.clone()));

        tracing::debug!(
            pattern = %config.path_pattern,
            endpoint = %endpoint,
            "Initialized console proxy"
        );

        Ok(Self {
            matcher,
            endpoint,
            strip_prefix: config.strip_prefix,
            transport,
        })
    }

    /// Replace the WebSocket upgrade predicate.
    pub fn with_upgrade_matcher(mut self, upgrade: Box<dyn Matcher>) -> Self {
        self.matcher = self.matcher.with_upgrade_matcher(upgrade);
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns true if the request should be proxied.
    pub fn matches(&self, req: &Request<Body>) -> bool {
        match self.matcher.matches(req) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %req.uri().path(),
                    "Match evaluation failed, passing request on"
                );
                false
            }
        }
    }

    /// Upstream URI for a matched request.
    pub fn upstream_uri(&self, req: &Request<Body>) -> Result<Uri, ProxyError> {
        let full_path = req.uri().path();
        let mut path = path_within_application(full_path, self.matcher.path().context_path())
            .unwrap_or(full_path);
        if self.strip_prefix {
            path = self.matcher.path().pattern().strip_static_prefix(path);
        }
        build_upstream_uri(&self.endpoint, path, req.uri().query())
    }

    /// Proxy the request, or hand it to `next` if it does not match.
    pub async fn forward<N, Fut>(&self, request: Request<Body>, next: N) -> Result<Forwarded, ProxyError>
    where
        N: FnOnce(Request<Body>) -> Fut,
        Fut: Future<Output = Response<Body>>,
    {
        if !self.matches(&request) {
            metrics::record_delegated();
            return Ok(Forwarded::Delegated(next(request).await));
        }

        let uri = self.upstream_uri(&request).inspect_err(|e| {
            tracing::warn!(error = %e, "Cannot build upstream uri");
            metrics::record_failed("uri");
        })?;

        tracing::trace!(uri = %uri, endpoint = %self.endpoint, "Proxy request");

        let headers = request.headers().clone();
        drop(request);

        let started = Instant::now();
        let upstream = self
            .transport
            .get(uri, headers)
            .await
            .inspect_err(|e| {
                tracing::warn!(error = %e, "Upstream request failed");
                metrics::record_failed("unavailable");
            })?;

        let status = upstream.status();
        let mut outbound = Response::new(Body::empty());
        let disposition = relay::write_outbound(upstream, &mut outbound);
        metrics::record_proxied(status, started);

        tracing::debug!(
            status = status.as_u16(),
            body_suppressed = disposition == BodyDisposition::Suppressed,
            "Proxied console request"
        );

        Ok(Forwarded::Proxied(outbound))
    }
}
