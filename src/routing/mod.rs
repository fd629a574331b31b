//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound path "/api/proxy/<backend-path>?<query>"
//!     → rewrite.rs (strip prefix, join with backend base)
//!     → "<BACKEND_BASE>/<backend-path>?<query>"
//! ```
//!
//! # Design Decisions
//! - Rewrite rules compiled at startup, swapped whole on reload
//! - Deterministic: same input always produces the same target

pub mod rewrite;

pub use rewrite::{has_dot_segment, PrefixRewrite, RewriteError, UpstreamBase};
