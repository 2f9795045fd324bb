//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the path pattern compiles
//! - Check the endpoint is an absolute http URI
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;
use crate::routing::PathPattern;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("console.path_pattern: {0}")]
    PathPattern(String),

    #[error("console.endpoint: {0}")]
    Endpoint(String),

    #[error("console.context_path must be empty or start with '/' and not end with '/': {0:?}")]
    ContextPath(String),

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("{field} is not a socket address: {value:?}")]
    Address { field: &'static str, value: String },
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = PathPattern::parse(&config.console.path_pattern) {
        errors.push(ValidationError::PathPattern(e.to_string()));
    }

    match Url::parse(&config.console.endpoint) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::Endpoint(format!(
                    "unsupported scheme {:?}",
                    url.scheme()
                )));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::Endpoint("missing host".into()));
            }
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::Endpoint(
                    "must not carry a query or fragment".into(),
                ));
            }
        }
        Err(e) => errors.push(ValidationError::Endpoint(e.to_string())),
    }

    let context_path = &config.console.context_path;
    if !context_path.is_empty() && (!context_path.starts_with('/') || context_path.ends_with('/')) {
        errors.push(ValidationError::ContextPath(context_path.clone()));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.connect_secs" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.request_secs" });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ProxyConfig::default();
        config.console.path_pattern = "console/**".into();
        config.console.endpoint = "ftp://files.example.com".into();
        config.console.context_path = "app/".into();
        config.timeouts.connect_secs = 0;
        config.listener.bind_address = "localhost".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroTimeout { field: "timeouts.connect_secs" }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::PathPattern(_))));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Endpoint(_))));
    }

    #[test]
    fn test_relative_endpoint_rejected() {
        let mut config = ProxyConfig::default();
        config.console.endpoint = "/console".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::Endpoint(_)));
    }
}
