//! Header manipulation at the forwarding boundary.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Strip the inbound Host header (the client sets the backend's own)
//!
//! # Design Decisions
//! - Matching is case-insensitive; `http` stores names lowercased
//! - Multi-valued headers are copied value by value, order preserved

use axum::http::{header, HeaderMap};

/// Connection-scoped headers that are never relayed across the proxy.
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Returns true if `name` is in the hop-by-hop set.
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|hop| hop.eq_ignore_ascii_case(name))
}

/// Inbound headers minus `host` and the hop-by-hop set.
pub fn forwardable_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if name == header::HOST || is_hop_by_hop(name.as_str()) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Backend response headers minus the hop-by-hop set.
pub fn relayable_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn inbound() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("console.local"));
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("proxy-authorization", HeaderValue::from_static("Basic abc"));
        headers.insert("te", HeaderValue::from_static("trailers"));
        headers.insert("upgrade", HeaderValue::from_static("websocket"));
        headers.insert("authorization", HeaderValue::from_static("Bearer user"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.append("accept", HeaderValue::from_static("text/html"));
        headers.append("accept", HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn test_hop_by_hop_case_insensitive() {
        assert!(is_hop_by_hop("Transfer-Encoding"));
        assert!(is_hop_by_hop("KEEP-ALIVE"));
        assert!(!is_hop_by_hop("content-length"));
        assert!(!is_hop_by_hop("authorization"));
    }

    #[test]
    fn test_request_filter_drops_host_and_hop_by_hop() {
        let out = forwardable_request_headers(&inbound());

        assert!(out.get("host").is_none());
        for hop in HOP_BY_HOP_HEADERS {
            assert!(out.get(hop).is_none(), "{hop} must not be forwarded");
        }
        assert_eq!(out.get("authorization").unwrap(), "Bearer user");
        assert_eq!(out.get("content-type").unwrap(), "application/json");

        let accept: Vec<_> = out.get_all("accept").iter().collect();
        assert_eq!(accept, vec!["text/html", "application/json"]);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_response_filter_keeps_location_and_cookies() {
        let mut upstream = HeaderMap::new();
        upstream.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        upstream.insert("connection", HeaderValue::from_static("close"));
        upstream.insert("location", HeaderValue::from_static("/login"));
        upstream.append("set-cookie", HeaderValue::from_static("a=1"));
        upstream.append("set-cookie", HeaderValue::from_static("b=2"));

        let out = relayable_response_headers(&upstream);
        assert!(out.get("transfer-encoding").is_none());
        assert!(out.get("connection").is_none());
        assert_eq!(out.get("location").unwrap(), "/login");
        assert_eq!(out.get_all("set-cookie").iter().count(), 2);
    }
}
