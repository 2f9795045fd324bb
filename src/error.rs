//! Error types for the console proxy.
//!
//! # Design Decisions
//! - Forwarding errors carry enough context for logging but no response body
//! - The pipeline adapter (`IntoResponse`) picks the status shown to the caller
//! - Predicate failures are a separate type: they never abort a request

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::routing::PatternError;

/// Errors raised while forwarding a matched request upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The inbound path/query could not be combined with the endpoint into a valid URI.
    #[error("invalid upstream uri {uri:?}: {reason}")]
    UriConstruction { uri: String, reason: String },

    /// The upstream could not be reached before the response head arrived.
    #[error("upstream {endpoint} unavailable: {reason}")]
    UpstreamUnavailable {
        endpoint: String,
        reason: String,
        timed_out: bool,
    },

    /// The upstream closed the connection while the body was being relayed.
    #[error("upstream stream interrupted: {reason}")]
    UpstreamInterrupted { reason: String },
}

impl ProxyError {
    /// Status code the surrounding pipeline reports for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::UpstreamUnavailable { timed_out: true, .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        self.status_code().into_response()
    }
}

/// Errors raised while assembling a console proxy from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid path pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("invalid endpoint {endpoint:?}: {reason}")]
    Endpoint { endpoint: String, reason: String },
}

/// Failure of one of the match predicates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("header {name} is not valid visible ASCII")]
    InvalidHeader { name: String },
}
