//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the console proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Which requests are proxied and where to.
    pub console: ConsoleConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Console proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Glob pattern selecting the proxied paths (e.g., "/console/**").
    pub path_pattern: String,

    /// Absolute base URI of the backend (e.g., "http://127.0.0.1:8090").
    pub endpoint: String,

    /// Base path the application is mounted under; stripped before matching.
    pub context_path: String,

    /// Remove the pattern's literal prefix from the forwarded path.
    ///
    /// A pattern without wildcards keeps its last segment, so
    /// `/console/index.html` is forwarded as `/index.html`.
    pub strip_prefix: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            path_pattern: "/console/**".to_string(),
            endpoint: "http://127.0.0.1:8090".to_string(),
            context_path: String::new(),
            strip_prefix: true,
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the upstream response head, in seconds.
    pub request_secs: u64,
}

impl TimeoutConfig {
    /// Deadline for a whole inbound request on the server side.
    /// Outlasts the upstream connect and response deadlines combined.
    pub fn server_deadline(&self) -> Duration {
        Duration::from_secs(self.connect_secs + self.request_secs + 1)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config.console.path_pattern, "/console/**");
        assert_eq!(config.console.endpoint, "http://127.0.0.1:8090");
        assert!(config.console.strip_prefix);
        assert_eq!(config.timeouts.connect_secs, 5);
    }

    #[test]
    fn test_partial_section() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [console]
            endpoint = "http://backend:3000"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.console.endpoint, "http://backend:3000");
        assert_eq!(config.console.path_pattern, "/console/**");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_server_deadline_outlasts_upstream() {
        let timeouts = TimeoutConfig {
            connect_secs: 2,
            request_secs: 1,
        };
        assert_eq!(timeouts.server_deadline(), Duration::from_secs(4));
        assert!(timeouts.server_deadline() > Duration::from_secs(timeouts.request_secs));
    }
}
