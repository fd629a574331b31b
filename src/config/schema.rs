//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Backend origin used when neither the file nor the environment names one.
pub const DEFAULT_UPSTREAM_URL: &str = "https://plasmida.onrender.com";

/// Root configuration for the console proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Backend the forwarder relays to.
    pub upstream: UpstreamConfig,

    /// Inbound path handling.
    pub forwarding: ForwardingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Console session gate.
    pub session: SessionConfig,

    /// Static console assets.
    pub ui: UiConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Backend origin and the credential injected on its behalf.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Absolute base URL of the backend (e.g., "https://api.example.com").
    pub base_url: String,

    /// Server-side credential, never exposed to the browser.
    pub auth: UpstreamAuthConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            auth: UpstreamAuthConfig::default(),
        }
    }
}

/// Credential injection. Active only when both `header_name` and `token` are set.
#[derive(Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct UpstreamAuthConfig {
    /// Header to set on every outbound request (e.g., "Authorization").
    pub header_name: Option<String>,

    /// Credential value.
    pub token: Option<String>,

    /// Send the value as `Bearer <token>`.
    pub bearer: bool,
}

impl std::fmt::Debug for UpstreamAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamAuthConfig")
            .field("header_name", &self.header_name)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("bearer", &self.bearer)
            .finish()
    }
}

/// Inbound path handling.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Path prefix stripped before building the backend URL.
    pub prefix: String,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            prefix: "/api/proxy".to_string(),
        }
    }
}

/// Timeout configuration for outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for the backend call including its body, in seconds. 0 disables.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
        }
    }
}

/// Session gate for console pages.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Enable the gate.
    pub enabled: bool,

    /// Cookie carrying the session token.
    pub cookie_name: String,

    /// Where unauthenticated visitors are sent.
    pub login_path: String,

    /// Paths reachable without a session. "/" matches only itself; others match by prefix.
    pub public_paths: Vec<String>,

    /// Path prefixes the gate never inspects (assets, API).
    pub excluded_prefixes: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cookie_name: "token".to_string(),
            login_path: "/".to_string(),
            public_paths: vec!["/".to_string(), "/signup".to_string()],
            excluded_prefixes: vec![
                "/_next/static".to_string(),
                "/_next/image".to_string(),
                "/favicon.ico".to_string(),
                "/api".to_string(),
                "/healthz".to_string(),
            ],
        }
    }
}

/// Static console assets.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Directory served for non-API paths. Unset means 404.
    pub static_dir: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
