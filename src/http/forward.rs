//! The request forwarder.
//!
//! One call to [`Forwarder::forward`] is one exchange: the inbound request is
//! rewritten onto the backend origin, sent with redirects disabled, and the
//! backend's status, headers and body are relayed back. Nothing is shared
//! between exchanges except the immutable settings snapshot and the client pool.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::{Body, Bytes},
    http::{header, Method, Request},
    response::Response,
};

use crate::config::schema::{ProxyConfig, TimeoutConfig};
use crate::config::validation::ValidationError;
use crate::resilience::timeouts::{deadline_from_secs, with_deadline};
use crate::routing::{has_dot_segment, PrefixRewrite, UpstreamBase};
use crate::security::{forwardable_request_headers, relayable_response_headers, CredentialInjector};

use super::response::ForwardError;

/// Settings for one generation of configuration. Swapped whole on reload.
#[derive(Debug, Clone)]
pub struct ForwardSettings {
    pub rewrite: PrefixRewrite,
    pub base: UpstreamBase,
    pub credentials: Option<CredentialInjector>,
    pub upstream_timeout: Option<Duration>,
}

impl ForwardSettings {
    /// Compile forwarding settings from configuration.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            rewrite: PrefixRewrite::new(config.forwarding.prefix.clone())?,
            base: UpstreamBase::parse(&config.upstream.base_url)?,
            credentials: CredentialInjector::from_config(&config.upstream.auth)?,
            upstream_timeout: deadline_from_secs(config.timeouts.upstream_secs),
        })
    }
}

/// Relays inbound requests to the configured backend.
pub struct Forwarder {
    client: reqwest::Client,
    settings: ArcSwap<ForwardSettings>,
}

impl Forwarder {
    /// Create a forwarder with its own outbound client.
    pub fn new(settings: ForwardSettings, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()?;

        Ok(Self {
            client,
            settings: ArcSwap::from_pointee(settings),
        })
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> Arc<ForwardSettings> {
        self.settings.load_full()
    }

    /// Replace the settings used by subsequent exchanges.
    /// Exchanges already in flight finish with the snapshot they started with.
    pub fn reload(&self, settings: ForwardSettings) {
        self.settings.store(Arc::new(settings));
    }

    /// Forward one request and relay the backend's answer.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response, ForwardError> {
        let settings = self.settings.load_full();
        let (parts, body) = request.into_parts();

        let forward_path = settings.rewrite.strip(parts.uri.path());
        if has_dot_segment(forward_path) {
            return Err(ForwardError::DotSegments(forward_path.to_string()));
        }
        let target = settings.base.target(forward_path, parts.uri.query());
        let url = reqwest::Url::parse(&target)
            .map_err(|source| ForwardError::InvalidTarget { target, source })?;

        let mut headers = forwardable_request_headers(&parts.headers);
        if let Some(credentials) = &settings.credentials {
            credentials.apply(&mut headers);
        }

        let body = if parts.method == Method::GET || parts.method == Method::HEAD {
            None
        } else {
            read_inbound_body(body).await
        };
        if body.is_none() {
            headers.remove(header::CONTENT_LENGTH);
        }

        tracing::debug!(
            method = %parts.method,
            upstream = %url.as_str(),
            body_len = body.as_ref().map_or(0, Bytes::len),
            "Sending upstream request"
        );

        let mut outbound = self.client.request(parts.method, url).headers(headers);
        if let Some(bytes) = body {
            outbound = outbound.body(bytes);
        }

        let (status, headers, bytes) = with_deadline(settings.upstream_timeout, async move {
            let upstream = outbound.send().await.map_err(ForwardError::Upstream)?;
            let status = upstream.status();
            let headers = relayable_response_headers(upstream.headers());
            let bytes = upstream.bytes().await.map_err(ForwardError::UpstreamBody)?;
            Ok::<_, ForwardError>((status, headers, bytes))
        })
        .await?;

        let mut response = Response::builder().status(status).body(Body::from(bytes))?;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Buffer the inbound body. Empty bodies and read failures both yield `None`.
async fn read_inbound_body(body: Body) -> Option<Bytes> {
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) if bytes.is_empty() => None,
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body, forwarding without it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::UpstreamAuthConfig;

    #[test]
    fn test_settings_compile_from_defaults() {
        let settings = ForwardSettings::from_config(&ProxyConfig::default()).unwrap();
        assert_eq!(settings.rewrite.prefix(), "/api/proxy");
        assert_eq!(settings.base.as_str(), "https://plasmida.onrender.com");
        assert!(settings.credentials.is_none());
        assert_eq!(settings.upstream_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_settings_reject_bad_credentials() {
        let mut config = ProxyConfig::default();
        config.upstream.auth = UpstreamAuthConfig {
            header_name: Some("not valid".into()),
            token: Some("t".into()),
            bearer: false,
        };
        assert!(ForwardSettings::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_empty_body_is_absent() {
        assert!(read_inbound_body(Body::empty()).await.is_none());
        assert_eq!(
            read_inbound_body(Body::from("payload")).await.unwrap(),
            Bytes::from_static(b"payload")
        );
    }

    #[tokio::test]
    async fn test_dot_segments_rejected_before_sending() {
        let forwarder = Forwarder::new(
            ForwardSettings::from_config(&ProxyConfig::default()).unwrap(),
            &TimeoutConfig::default(),
        )
        .unwrap();

        for path in ["/api/proxy/../admin", "/api/proxy/%2e%2e/admin", "/api/proxy/a/./b"] {
            let request = Request::builder().uri(path).body(Body::empty()).unwrap();
            let err = forwarder.forward(request).await.unwrap_err();
            assert!(matches!(err, ForwardError::DotSegments(_)), "{path}: {err}");
        }
    }

    #[tokio::test]
    async fn test_reload_swaps_snapshot() {
        let forwarder = Forwarder::new(
            ForwardSettings::from_config(&ProxyConfig::default()).unwrap(),
            &TimeoutConfig::default(),
        )
        .unwrap();

        let mut next = ProxyConfig::default();
        next.upstream.base_url = "http://127.0.0.1:9/".into();
        forwarder.reload(ForwardSettings::from_config(&next).unwrap());

        assert_eq!(forwarder.settings().base.as_str(), "http://127.0.0.1:9");
    }
}
