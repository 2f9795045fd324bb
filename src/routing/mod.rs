//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, headers)
//!     → matcher.rs (method AND path AND NOT upgrade)
//!     → pattern.rs (glob evaluation of the path within the application)
//!     → Return: match / no match / evaluation error
//!
//! Pattern Compilation (at startup):
//!     path_pattern string
//!     → PathPattern (segments + static prefix)
//!     → Frozen inside the immutable ConsoleMatcher
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at startup, immutable at runtime
//! - No regex in hot path (segment-wise glob only)
//! - Deterministic: same input always gives the same decision

pub mod matcher;
pub mod pattern;

pub use matcher::{
    path_within_application, ConsoleMatcher, Matcher, MethodMatcher, PathPatternMatcher,
    WebSocketUpgradeMatcher,
};
pub use pattern::{PathPattern, PatternError};
