//! Session token authorization.
//!
//! The console keeps a JWT issued by the backend. The proxy does not verify the
//! signature (the backend does on every API call); it only decides whether the
//! token is well-formed and unexpired before serving console pages.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

/// An authorized console session, attached to request extensions by the gate.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    token: String,
    subject: Option<String>,
    expires_at: Option<i64>,
}

impl Session {
    /// The raw token, as presented by the browser.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The `sub` claim, if present and a string.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Expiry as Unix seconds, if the token carries one.
    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session token is malformed")]
    Malformed,

    #[error("session token expired at {0}")]
    Expired(i64),
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<f64>,
    sub: Option<serde_json::Value>,
}

/// Decide whether `token` is a usable session at `now` (Unix seconds).
pub fn authorize(token: &str, now: i64) -> Result<Session, SessionError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(SessionError::Malformed);
    };

    let decoded = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| SessionError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&decoded).map_err(|_| SessionError::Malformed)?;

    let expires_at = claims.exp.map(|exp| exp.floor() as i64);
    if let Some(exp) = expires_at {
        if exp <= now {
            return Err(SessionError::Expired(exp));
        }
    }

    let subject = match claims.sub {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    };

    Ok(Session {
        token: token.to_string(),
        subject,
        expires_at,
    })
}

#[cfg(test)]
pub(crate) fn make_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}
