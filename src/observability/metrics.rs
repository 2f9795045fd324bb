//! Metrics collection and exposition.
//!
//! # Metrics
//! - `console_proxy_requests_total` (counter): decisions by outcome
//!   (`delegated`, `proxied`, `failed`) and upstream status
//! - `console_proxy_upstream_duration_seconds` (histogram): time to the
//!   upstream response head
//! - `console_proxy_interrupted_total` (counter): relays cut mid-stream
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op, so the engine
//!   records unconditionally
//! - Prometheus exporter is opt-in via `observability.metrics_enabled`

use axum::http::StatusCode;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_delegated() {
    counter!("console_proxy_requests_total", "outcome" => "delegated").increment(1);
}

pub fn record_proxied(status: StatusCode, started: Instant) {
    counter!(
        "console_proxy_requests_total",
        "outcome" => "proxied",
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    histogram!("console_proxy_upstream_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_failed(kind: &'static str) {
    counter!("console_proxy_requests_total", "outcome" => "failed", "error" => kind).increment(1);
}

pub fn record_interrupted() {
    counter!("console_proxy_interrupted_total").increment(1);
}
