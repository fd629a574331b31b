//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Define the forwarder's failure modes
//! - Map failures to the fixed client-facing responses
//!
//! # Design Decisions
//! - Backend responses (any status) are relayed, never mapped here
//! - Failure detail is logged by the caller and never sent to the client
//! - Upstream deadline exceeded results in 504 Gateway Timeout

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Body message for every internal forwarding failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Proxy internal error";

/// Body message when the backend misses its deadline.
pub const UPSTREAM_TIMEOUT_MESSAGE: &str = "Proxy upstream timeout";

/// Errors that abort a forwarded exchange.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The rewritten backend URL could not be parsed.
    #[error("invalid upstream target {target:?}: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },

    /// The forwarded path contains `.` or `..` segments.
    #[error("forwarded path {0:?} contains dot segments")]
    DotSegments(String),

    /// Connecting to or exchanging with the backend failed.
    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    /// The backend response body could not be read to completion.
    #[error("failed to read upstream body: {0}")]
    UpstreamBody(#[source] reqwest::Error),

    /// The backend did not answer within the configured deadline.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// The relayed response could not be assembled.
    #[error("failed to build relayed response: {0}")]
    Response(#[from] axum::http::Error),
}

impl ForwardError {
    /// Status code returned to the caller for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let message = match self {
            ForwardError::Timeout(_) => UPSTREAM_TIMEOUT_MESSAGE,
            _ => INTERNAL_ERROR_MESSAGE,
        };
        (self.status(), Json(json!({ "message": message }))).into_response()
    }
}

/// Response for a panic caught at the top of the middleware stack.
pub fn panic_response(_panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked while forwarding");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}
