//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, routes)
//!     → request.rs (request ID)
//!     → forward.rs (rewrite, filter, inject, relay)
//!     → response.rs (failure → fixed JSON response)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardSettings, Forwarder};
pub use request::{request_id_middleware, RequestId, RequestIdExt, X_REQUEST_ID};
pub use response::ForwardError;
pub use server::HttpServer;
