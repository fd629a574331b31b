//! Console request-forwarding proxy library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;
pub mod session;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
