//! Path rewrite from the inbound forwarding prefix to the backend origin.
//!
//! # Responsibilities
//! - Strip the forwarding prefix once, at the start of the path
//! - Normalize the backend base URL (one trailing slash removed)
//! - Append the original query string unchanged
//! - Refuse forwarded paths carrying dot segments, which URL parsing would
//!   resolve outside the base path
//!
//! # Design Decisions
//! - Plain string assembly: the query is carried byte-for-byte, never re-encoded
//! - Base URL validated once at config load, not per request

use url::Url;

/// Errors raised while compiling rewrite rules from configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// The backend base URL is not an absolute http(s) URL.
    #[error("invalid upstream base url {url:?}: {reason}")]
    InvalidBase { url: String, reason: String },

    /// The forwarding prefix is malformed.
    #[error("invalid forwarding prefix {0:?}: must start with '/' and must not end with '/'")]
    InvalidPrefix(String),
}

/// Strips a fixed path prefix from inbound request paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRewrite {
    prefix: String,
}

impl PrefixRewrite {
    /// Create a rewrite for `prefix` (e.g. "/api/proxy").
    pub fn new(prefix: impl Into<String>) -> Result<Self, RewriteError> {
        let prefix = prefix.into();
        if !prefix.starts_with('/') || prefix.ends_with('/') {
            return Err(RewriteError::InvalidPrefix(prefix));
        }
        Ok(Self { prefix })
    }

    /// The configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Remove the prefix from the start of `path`, exactly once.
    /// Paths that do not start with the prefix are returned unchanged.
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        path.strip_prefix(self.prefix.as_str()).unwrap_or(path)
    }
}

/// True when any segment of `path` is `.` or `..`, literal or percent-encoded.
/// Backslash counts as a separator, as it does for http(s) URLs.
pub fn has_dot_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

/// Validated backend origin that forwarded paths are appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamBase {
    base: String,
}

impl UpstreamBase {
    /// Parse and normalize a backend base URL.
    pub fn parse(raw: &str) -> Result<Self, RewriteError> {
        let invalid = |reason: String| RewriteError::InvalidBase {
            url: raw.to_string(),
            reason,
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme {other:?}"))),
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".to_string()));
        }

        let base = raw.strip_suffix('/').unwrap_or(raw).to_string();
        Ok(Self { base })
    }

    /// The normalized base, without trailing slash.
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Build the backend URL for a forwarded path and optional raw query.
    pub fn target(&self, forward_path: &str, query: Option<&str>) -> String {
        let mut target = String::with_capacity(self.base.len() + forward_path.len() + 16);
        target.push_str(&self.base);
        target.push_str(forward_path);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_removes_prefix_once() {
        let rewrite = PrefixRewrite::new("/api/proxy").unwrap();
        assert_eq!(rewrite.strip("/api/proxy/api/v1/reports"), "/api/v1/reports");
        assert_eq!(rewrite.strip("/api/proxy/api/proxy/x"), "/api/proxy/x");
        assert_eq!(rewrite.strip("/api/proxy"), "");
        assert_eq!(rewrite.strip("/other"), "/other");
    }

    #[test]
    fn test_prefix_validation() {
        assert!(PrefixRewrite::new("api/proxy").is_err());
        assert!(PrefixRewrite::new("/api/proxy/").is_err());
        assert!(PrefixRewrite::new("/").is_err());
        assert!(PrefixRewrite::new("/p").is_ok());
    }

    #[test]
    fn test_base_trailing_slash_normalized() {
        let base = UpstreamBase::parse("https://backend.example.com/").unwrap();
        assert_eq!(base.as_str(), "https://backend.example.com");
        assert_eq!(
            base.target("/api/v1/staff", None),
            "https://backend.example.com/api/v1/staff"
        );

        let nested = UpstreamBase::parse("http://127.0.0.1:4000/v2/").unwrap();
        assert_eq!(nested.target("/users", None), "http://127.0.0.1:4000/v2/users");
    }

    #[test]
    fn test_query_preserved_verbatim() {
        let base = UpstreamBase::parse("http://localhost:4000").unwrap();
        assert_eq!(
            base.target("/search", Some("q=a%20b&tag=x&tag=y")),
            "http://localhost:4000/search?q=a%20b&tag=x&tag=y"
        );
        assert_eq!(base.target("/search", Some("")), "http://localhost:4000/search");
    }

    #[test]
    fn test_dot_segments_detected() {
        assert!(has_dot_segment("/../admin"));
        assert!(has_dot_segment("/a/./b"));
        assert!(has_dot_segment("/%2e%2e/admin"));
        assert!(has_dot_segment("/%2E./admin"));
        assert!(has_dot_segment("/a/.%2e"));
        assert!(has_dot_segment("/a\\..\\b"));
        assert!(has_dot_segment("/.."));

        assert!(!has_dot_segment(""));
        assert!(!has_dot_segment("/api/v1/reports"));
        assert!(!has_dot_segment("/files/a..b/.hidden/v1.2"));
        assert!(!has_dot_segment("/%2e%2e%2fadmin"));
    }

    #[test]
    fn test_invalid_bases_rejected() {
        assert!(UpstreamBase::parse("not a url").is_err());
        assert!(UpstreamBase::parse("ftp://files.example.com").is_err());
        assert!(UpstreamBase::parse("http://example.com/?a=b").is_err());
    }
}
