//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (panic guard, tracing, request ID, session gate)
//! - Mount the forwarder under the forwarding prefix
//! - Serve static console assets when configured
//! - Apply hot-reloaded configuration
//! - Bind server to listener (plain or TLS)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};

use crate::config::{validate_config, ConfigError, ProxyConfig};
use crate::http::forward::{ForwardSettings, Forwarder};
use crate::http::request::{request_id_middleware, RequestIdExt};
use crate::http::response::panic_response;
use crate::observability::metrics;
use crate::session::{session_gate, SessionGate};

/// How long in-flight TLS connections get to finish after shutdown.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the console proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    forwarder: Arc<Forwarder>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let settings = ForwardSettings::from_config(&config)
            .map_err(|e| ConfigError::Validation(vec![e]))?;
        let forwarder = Arc::new(Forwarder::new(settings, &config.timeouts)?);

        let state = AppState {
            forwarder: forwarder.clone(),
        };
        let router = Self::build_router(&config, state);

        Ok(Self {
            router,
            config,
            forwarder,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let prefix = config.forwarding.prefix.as_str();

        let mut router = Router::new()
            .route(prefix, forward_methods())
            .route(&format!("{prefix}/{{*path}}"), forward_methods())
            .route("/healthz", get(health))
            .with_state(state);

        router = match &config.ui.static_dir {
            Some(dir) => router.fallback_service(ServeDir::new(dir)),
            None => router.fallback(not_found),
        };

        if config.session.enabled {
            let gate = Arc::new(SessionGate::new(&config.session));
            router = router.layer(middleware::from_fn_with_state(gate, session_gate));
        }

        router
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(panic_response))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        self.log_start(addr);
        self.spawn_reloader(config_updates);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        self.log_start(addr);
        self.spawn_reloader(config_updates);

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    fn log_start(&self, addr: SocketAddr) {
        let settings = self.forwarder.settings();
        tracing::info!(
            address = %addr,
            prefix = %settings.rewrite.prefix(),
            upstream = %settings.base.as_str(),
            credential_header = settings.credentials.as_ref().map(|c| c.header_name().as_str()),
            "HTTP server starting"
        );
    }

    fn spawn_reloader(&self, mut updates: mpsc::UnboundedReceiver<ProxyConfig>) {
        let forwarder = self.forwarder.clone();
        let running = self.config.clone();
        tokio::spawn(async move {
            while let Some(next) = updates.recv().await {
                apply_reload(&forwarder, &running, &next);
            }
        });
    }
}

/// Swap in forward settings from `next`. Settings bound at startup (listener,
/// prefix, session, UI, connect timeout) keep their running values.
fn apply_reload(forwarder: &Forwarder, running: &ProxyConfig, next: &ProxyConfig) {
    if running.listener != next.listener
        || running.forwarding != next.forwarding
        || running.session != next.session
        || running.ui != next.ui
        || running.timeouts.connect_secs != next.timeouts.connect_secs
    {
        tracing::warn!("Listener, prefix, session, UI or connect timeout changed; restart to apply");
    }

    let mut effective = next.clone();
    effective.forwarding = running.forwarding.clone();

    match ForwardSettings::from_config(&effective) {
        Ok(settings) => {
            tracing::info!(upstream = %settings.base.as_str(), "Forward settings reloaded");
            forwarder.reload(settings);
        }
        Err(e) => tracing::error!(error = %e, "Rejected reloaded config"),
    }
}

fn forward_methods() -> MethodRouter<AppState> {
    get(proxy_handler)
        .post(proxy_handler)
        .put(proxy_handler)
        .patch(proxy_handler)
        .delete(proxy_handler)
}

/// Forward one request to the backend.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .request_id()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    let response = match state.forwarder.forward(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %e,
                "Proxy error"
            );
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" })))
}
