//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request headers:
//!     → headers.rs (drop host + hop-by-hop)
//!     → credentials.rs (inject server-side credential)
//!     → Outbound request
//!
//! Backend response headers:
//!     → headers.rs (drop hop-by-hop)
//!     → Client response
//! ```
//!
//! # Design Decisions
//! - Credentials never leave the server; the browser never sees them
//! - Header sets are rebuilt, never mutated in place

pub mod credentials;
pub mod headers;

pub use credentials::{CredentialError, CredentialInjector};
pub use headers::{forwardable_request_headers, is_hop_by_hop, relayable_response_headers, HOP_BY_HOP_HEADERS};
