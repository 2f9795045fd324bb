//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → console proxy middleware (proxy or pass on)
//!     → application routes / fallback
//!     → Send to client
//! ```

pub mod server;

pub use server::HttpServer;
