//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile-check the upstream URL, forwarding prefix and credential
//! - Check the session gate cannot redirect into itself
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;
use crate::routing::{PrefixRewrite, RewriteError, UpstreamBase};
use crate::security::{CredentialError, CredentialInjector};
use crate::session::SessionGate;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("listener.tls: cert_path and key_path must both be set")]
    TlsPaths,

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error("upstream.auth: {0}")]
    Credential(#[from] CredentialError),

    #[error("session.cookie_name {0:?} is not a valid cookie name")]
    CookieName(String),

    #[error("session.login_path {0:?} must start with '/' and be a public path")]
    LoginPath(String),
}

/// Check every semantic rule and report all failures.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::TlsPaths);
        }
    }

    if let Err(e) = PrefixRewrite::new(config.forwarding.prefix.clone()) {
        errors.push(e.into());
    }
    if let Err(e) = UpstreamBase::parse(&config.upstream.base_url) {
        errors.push(e.into());
    }
    if let Err(e) = CredentialInjector::from_config(&config.upstream.auth) {
        errors.push(e.into());
    }

    if config.session.enabled {
        let session = &config.session;
        let valid_cookie = !session.cookie_name.is_empty()
            && session
                .cookie_name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
        if !valid_cookie {
            errors.push(ValidationError::CookieName(session.cookie_name.clone()));
        }

        let gate = SessionGate::new(session);
        if !session.login_path.starts_with('/') || !gate.is_public(&session.login_path) {
            errors.push(ValidationError::LoginPath(session.login_path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.upstream.base_url = "ftp://files".into();
        config.forwarding.prefix = "api".into();
        config.session.cookie_name = "bad cookie".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0], ValidationError::BindAddress("nowhere".into()));
        assert_eq!(
            errors[1],
            ValidationError::Rewrite(RewriteError::InvalidPrefix("api".into()))
        );
    }

    #[test]
    fn test_login_path_must_be_public() {
        let mut config = ProxyConfig::default();
        config.session.login_path = "/login".into();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::LoginPath("/login".into())]
        );

        config.session.public_paths.push("/login".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_disabled_session_skips_session_rules() {
        let mut config = ProxyConfig::default();
        config.session.enabled = false;
        config.session.login_path = "nope".into();
        assert!(validate_config(&config).is_ok());
    }
}
