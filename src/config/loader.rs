//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Backend base URL override.
pub const ENV_API_URL: &str = "API_URL";
/// Credential header name override.
pub const ENV_AUTH_HEADER_NAME: &str = "API_AUTH_HEADER_NAME";
/// Credential token override.
pub const ENV_AUTH_TOKEN: &str = "API_AUTH_TOKEN";
/// `"true"` sends the credential as a bearer token.
pub const ENV_AUTH_BEARER: &str = "API_AUTH_BEARER";
/// Listener address override.
pub const ENV_BIND_ADDRESS: &str = "PROXY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file, apply environment overrides, and validate.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: ProxyConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Defaults plus environment overrides, validated. Used when no file is given.
pub fn load_from_env() -> Result<ProxyConfig, ConfigError> {
    let mut config = ProxyConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment values onto `config`. Empty values count as unset.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(url) = var(ENV_API_URL) {
        config.upstream.base_url = url;
    }
    if let Some(name) = var(ENV_AUTH_HEADER_NAME) {
        config.upstream.auth.header_name = Some(name);
    }
    if let Some(token) = var(ENV_AUTH_TOKEN) {
        config.upstream.auth.token = Some(token);
    }
    if let Some(bearer) = var(ENV_AUTH_BEARER) {
        config.upstream.auth.bearer = bearer == "true";
    }
    if let Some(bind) = var(ENV_BIND_ADDRESS) {
        config.listener.bind_address = bind;
    }
}
