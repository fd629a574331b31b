//! Server-side credential injection.
//!
//! The credential lives only in the proxy's configuration. It is written onto
//! outbound requests after header filtering, replacing any value the caller sent.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::schema::UpstreamAuthConfig;

/// Errors raised while compiling the credential from configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid credential header name {0:?}")]
    InvalidHeaderName(String),

    #[error("credential token is not a valid header value")]
    InvalidValue,
}

/// Header name and (sensitive) value set on every outbound request.
#[derive(Debug, Clone)]
pub struct CredentialInjector {
    name: HeaderName,
    value: HeaderValue,
}

impl CredentialInjector {
    /// Build the injector. Returns `None` unless both header name and token are non-empty.
    pub fn from_config(auth: &UpstreamAuthConfig) -> Result<Option<Self>, CredentialError> {
        let (Some(name), Some(token)) = (
            auth.header_name.as_deref().filter(|n| !n.is_empty()),
            auth.token.as_deref().filter(|t| !t.is_empty()),
        ) else {
            return Ok(None);
        };

        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| CredentialError::InvalidHeaderName(name.to_string()))?;

        let raw = if auth.bearer {
            format!("Bearer {token}")
        } else {
            token.to_string()
        };
        let mut value = HeaderValue::from_str(&raw).map_err(|_| CredentialError::InvalidValue)?;
        value.set_sensitive(true);

        Ok(Some(Self { name, value }))
    }

    /// Header this injector writes.
    pub fn header_name(&self) -> &HeaderName {
        &self.name
    }

    /// Set the credential, overwriting every existing value of the header.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(self.name.clone(), self.value.clone());
    }
}
