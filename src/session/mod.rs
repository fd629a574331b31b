//! Console session subsystem.
//!
//! # Data Flow
//! ```text
//! Page request
//!     → gate.rs (excluded? public? else read `token` cookie)
//!     → token.rs (single authorization check: shape + expiry)
//!     → Session in request extensions, or 307 to login
//! ```
//!
//! # Design Decisions
//! - One authorization function; no per-page expiry checks
//! - Session is request-scoped, passed through extensions, never global

pub mod gate;
pub mod token;

pub use gate::{session_gate, GateDecision, SessionGate};
pub use token::{authorize, Session, SessionError};
