//! Console proxy server.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────┐
//!                         │              CONSOLE PROXY               │
//!     Client Request      │  ┌──────────┐    ┌──────────────────┐    │
//!     ────────────────────┼─▶│   http   │───▶│  console proxy   │────┼──── GET /console/** ───▶ Backend
//!                         │  │  server  │    │ (match & relay)  │◀───┼──── streamed response ─── Server
//!                         │  └──────────┘    └────────┬─────────┘    │
//!                         │                           │ no match     │
//!                         │                           ▼              │
//!     Client Response     │                  ┌──────────────────┐    │
//!     ◀───────────────────┼──────────────────│ application /404 │    │
//!                         │                  └──────────────────┘    │
//!                         └──────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use console_proxy::config::{self, validation::validate_config, ConfigError, ProxyConfig};
use console_proxy::http::HttpServer;
use console_proxy::lifecycle::Shutdown;
use console_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "console-proxy")]
#[command(about = "Forward console UI requests to a separately running backend", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn load(cli: &Cli) -> Result<ProxyConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    logging::init_logging(&config.observability);

    tracing::info!("console-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        path_pattern = %config.console.path_pattern,
        endpoint = %config.console.endpoint,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        signal.trigger_on_signal().await;
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
