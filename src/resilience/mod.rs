//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (enforce upstream deadline)
//!     → On expiry: 504 Gateway Timeout
//! ```
//!
//! # Design Decisions
//! - No retries: forwarded calls are not assumed idempotent
//! - Client disconnect drops the handler future and with it the outbound call

pub mod timeouts;
