//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → listener.rs (bind plain TCP)
//!     → tls.rs (load certificate + key when TLS is configured)
//!     → Hand off to HTTP layer
//! ```

pub mod listener;
pub mod tls;
