//! Session gate middleware for console pages.
//!
//! Every page request passes through one check: excluded prefixes (assets,
//! API, probes) and public paths go straight through, everything else needs
//! a `token` cookie that [`authorize`] accepts. Failures redirect to the login
//! page; a present but unusable cookie is cleared on the way.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::config::schema::SessionConfig;

use super::token::{authorize, Session};

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Path is not gated.
    Bypass,
    /// Session is valid.
    Allow(Session),
    /// Send the visitor to the login page.
    Redirect { clear_cookie: bool },
}

/// Compiled session gate rules.
#[derive(Debug, Clone)]
pub struct SessionGate {
    cookie_name: String,
    login_path: String,
    public_paths: Vec<String>,
    excluded_prefixes: Vec<String>,
}

impl SessionGate {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            login_path: config.login_path.clone(),
            public_paths: config.public_paths.clone(),
            excluded_prefixes: config.excluded_prefixes.clone(),
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// "/" is public only as itself; other public paths match by prefix.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|public| {
            if public == "/" {
                path == "/"
            } else {
                path.starts_with(public.as_str())
            }
        })
    }

    /// Decide what to do with a request for `path` at `now` (Unix seconds).
    pub fn check(&self, headers: &HeaderMap, path: &str, now: i64) -> GateDecision {
        if self.is_excluded(path) || self.is_public(path) {
            return GateDecision::Bypass;
        }

        let Some(token) = cookie_value(headers, &self.cookie_name) else {
            return GateDecision::Redirect { clear_cookie: false };
        };

        match authorize(token, now) {
            Ok(session) => GateDecision::Allow(session),
            Err(e) => {
                tracing::debug!(path = %path, reason = %e, "Session rejected");
                GateDecision::Redirect { clear_cookie: true }
            }
        }
    }

    fn redirect(&self, clear_cookie: bool) -> Response {
        let mut response = Redirect::temporary(&self.login_path).into_response();
        if clear_cookie {
            let expired = format!("{}=; Path=/; Max-Age=0", self.cookie_name);
            if let Ok(value) = HeaderValue::from_str(&expired) {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
        }
        response
    }
}

/// Find a cookie by name across all `Cookie` headers. Empty values count as absent.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Middleware enforcing the gate.
pub async fn session_gate(
    State(gate): State<Arc<SessionGate>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let decision = gate.check(request.headers(), request.uri().path(), unix_now());
    match decision {
        GateDecision::Bypass => next.run(request).await,
        GateDecision::Allow(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        GateDecision::Redirect { clear_cookie } => gate.redirect(clear_cookie),
    }
}
