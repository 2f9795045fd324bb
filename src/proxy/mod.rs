//! Console proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → engine.rs (GET AND path matches AND NOT upgrade?)
//!         no  → next handler (rest of the pipeline), done
//!         yes → upstream.rs (endpoint + path + raw query)
//!             → transport.rs (GET with inbound headers, pooled client)
//!             → relay.rs (headers → cookies → status → body or suppression)
//!     → Outbound response
//! ```
//!
//! # Design Decisions
//! - GET only; no request body, retries, or load balancing
//! - The engine never writes an error body; errors go back to the pipeline
//! - middleware.rs adapts the engine to an axum `Router`

pub mod engine;
pub mod middleware;
pub mod relay;
pub mod transport;
pub mod upstream;

pub use engine::{ConsoleProxy, Forwarded};
pub use middleware::wrap;
pub use relay::BodyDisposition;
pub use transport::{HyperTransport, UpstreamTransport};
pub use upstream::{build_upstream_uri, Endpoint};
