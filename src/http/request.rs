//! Request identification.
//!
//! # Responsibilities
//! - Adopt the caller's `x-request-id` or mint a UUID v4
//! - Carry the ID in request extensions for logging
//! - Echo the ID on the response unless the backend already set one
//!
//! # Design Decisions
//! - The ID lives in extensions, not in the forwarded header set, so the
//!   backend sees exactly the headers the caller sent

use std::fmt;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Correlation header name.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Longest caller-supplied ID that is adopted as-is.
const MAX_INBOUND_ID_LEN: usize = 128;

/// Correlation ID for one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Mint a fresh ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Adopt a caller-supplied ID if it is printable and reasonably short.
    pub fn from_header(value: &HeaderValue) -> Option<Self> {
        let id = value.to_str().ok()?.trim();
        if id.is_empty() || id.len() > MAX_INBOUND_ID_LEN {
            return None;
        }
        Some(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access to the request ID stored by [`request_id_middleware`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Attach a [`RequestId`] to the request and echo it on the response.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(RequestId::from_header)
        .unwrap_or_default();
    request.extensions_mut().insert(id.clone());

    let mut response = next.run(request).await;
    if !response.headers().contains_key(X_REQUEST_ID) {
        if let Ok(value) = HeaderValue::from_str(id.as_str()) {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
    }
    response
}
