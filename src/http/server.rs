//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router around the application's own routes
//! - Put the console proxy in front of every route
//! - Wire up middleware (tracing, request timeout)
//! - Bind server to listener and shut down gracefully

use axum::{
    http::StatusCode,
    response::IntoResponse,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::SetupError;
use crate::proxy::{self, ConsoleProxy, UpstreamTransport};

/// HTTP server fronting an application with the console proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server whose only other handler is a 404 fallback.
    pub fn new(config: ProxyConfig) -> Result<Self, SetupError> {
        Self::with_app(config, Router::new().fallback(not_found))
    }

    /// Create a server around an existing application router.
    pub fn with_app(config: ProxyConfig, app: Router) -> Result<Self, SetupError> {
        let console = ConsoleProxy::from_config(&config)?;
        Ok(Self::with_proxy(config, app, console))
    }

    /// Create a server with a caller-supplied console proxy.
    pub fn with_proxy<T: UpstreamTransport>(
        config: ProxyConfig,
        app: Router,
        console: ConsoleProxy<T>,
    ) -> Self {
        let router = Self::build_router(&config, app, Arc::new(console));
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router<T: UpstreamTransport>(
        config: &ProxyConfig,
        app: Router,
        console: Arc<ConsoleProxy<T>>,
    ) -> Router {
        proxy::wrap(app, console)
            .layer(TimeoutLayer::new(config.timeouts.server_deadline()))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            pattern = %self.config.console.path_pattern,
            endpoint = %self.config.console.endpoint,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

async fn not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}
