//! Console proxy: forwards console UI requests to a separately running
//! backend and lets everything else through to the application.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use error::{MatchError, ProxyError, SetupError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::{ConsoleProxy, Forwarded};
