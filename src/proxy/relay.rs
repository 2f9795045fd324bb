//! Response translation from upstream to the outbound response.
//!
//! # Responsibilities
//! - Copy headers with overwrite-by-name semantics
//! - Copy `Set-Cookie` directives with overwrite-by-cookie-name semantics
//! - Copy the status code
//! - Suppress the body for redirects, 204, and zero or missing
//!   `Content-Length`; otherwise stream it through
//!
//! # Design Decisions
//! - Order is headers, cookies, status, body
//! - A missing or unreadable `Content-Length` counts as zero, so chunked
//!   responses without a length are sent without a body
//! - Suppressed bodies are dropped unread, which releases the upstream stream
//! - Relayed bodies are never buffered; a mid-stream failure surfaces as a
//!   body error carrying `ProxyError::UpstreamInterrupted`

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode};
use futures_util::TryStreamExt;
use std::collections::HashSet;

use crate::error::ProxyError;
use crate::observability::metrics;

/// What happened to the upstream body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyDisposition {
    Suppressed,
    Streamed,
}

/// Framing headers the outbound connection manages itself.
pub fn is_sink_managed(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection" | "transfer-encoding" | "te" | "trailer" | "keep-alive" | "proxy-connection"
    )
}

/// Declared body length; absent or unreadable headers count as zero.
pub fn declared_content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

/// Statuses and lengths for which no body is forwarded.
pub fn suppresses_body(status: StatusCode, content_length: u64) -> bool {
    status.is_redirection() || status == StatusCode::NO_CONTENT || content_length == 0
}

/// Copy every upstream header except cookies and framing, replacing
/// outbound headers of the same name.
pub fn copy_headers(from: &HeaderMap, to: &mut HeaderMap) {
    for name in from.keys() {
        if *name == header::SET_COOKIE || is_sink_managed(name) {
            continue;
        }
        to.remove(name);
        for value in from.get_all(name) {
            to.append(name.clone(), value.clone());
        }
    }
}

fn cookie_name(value: &HeaderValue) -> Option<&str> {
    let pair = value.to_str().ok()?.split(';').next()?;
    let (name, _) = pair.split_once('=')?;
    Some(name.trim())
}

/// Copy upstream `Set-Cookie` directives, replacing outbound cookies with
/// the same name.
pub fn copy_cookies(from: &HeaderMap, to: &mut HeaderMap) {
    let upstream: Vec<&HeaderValue> = from.get_all(header::SET_COOKIE).iter().collect();
    if upstream.is_empty() {
        return;
    }
    let replaced: HashSet<&str> = upstream.iter().filter_map(|v| cookie_name(*v)).collect();

    let kept: Vec<HeaderValue> = to
        .get_all(header::SET_COOKIE)
        .iter()
        .filter(|v| cookie_name(*v).map_or(true, |name| !replaced.contains(name)))
        .cloned()
        .collect();
    to.remove(header::SET_COOKIE);

    for value in kept.into_iter().chain(upstream.into_iter().cloned()) {
        to.append(header::SET_COOKIE, value);
    }
}

/// Write the upstream response into `outbound`.
pub fn write_outbound(upstream: Response<Body>, outbound: &mut Response<Body>) -> BodyDisposition {
    let (parts, body) = upstream.into_parts();

    copy_headers(&parts.headers, outbound.headers_mut());
    copy_cookies(&parts.headers, outbound.headers_mut());
    *outbound.status_mut() = parts.status;

    let content_length = declared_content_length(&parts.headers);
    if suppresses_body(parts.status, content_length) {
        drop(body);
        // The empty body frames itself.
        outbound.headers_mut().remove(header::CONTENT_LENGTH);
        *outbound.body_mut() = Body::empty();
        return BodyDisposition::Suppressed;
    }

    *outbound.body_mut() = relay(body);
    BodyDisposition::Streamed
}

fn relay(body: Body) -> Body {
    Body::from_stream(body.into_data_stream().map_err(|e| {
        tracing::warn!(error = %e, "Upstream stream interrupted");
        metrics::record_interrupted();
        ProxyError::UpstreamInterrupted {
            reason: e.to_string(),
        }
    }))
}
