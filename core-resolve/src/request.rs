//! Track requests and resolved locations.

use std::collections::HashMap;

/// Prefix marking local-origin content. Local tracks are never cached on the
/// stream path and never looked up remotely.
pub const LOCAL_KEY_PREFIX: &str = "local:";

/// A requested read of track bytes.
///
/// `uri` is where the bytes are fetched from once resolved; `key` names the
/// track independently of its location. Rewriting a request never mutates in
/// place: the builder-style methods consume and return the request so a
/// half-rewritten value can never escape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRequest {
    pub uri: String,
    pub key: Option<String>,
    /// Absolute byte offset the caller wants to read from.
    pub position: u64,
    /// Scoped read length; `None` means "to end of stream".
    pub length: Option<u64>,
    /// Transport headers accompanying the fetch.
    pub headers: HashMap<String, String>,
}

impl TrackRequest {
    /// Create an unscoped request for the given URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            key: None,
            position: 0,
            length: None,
            headers: HashMap::new(),
        }
    }

    /// Set the track key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Replace the target URI.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    /// Set the read position.
    pub fn at_position(mut self, position: u64) -> Self {
        self.position = position;
        self
    }

    /// Scope the request to a byte length.
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// Add a transport header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Whether this request targets local-origin content.
    pub fn is_local(&self) -> bool {
        self.key
            .as_deref()
            .unwrap_or(&self.uri)
            .starts_with(LOCAL_KEY_PREFIX)
    }

    /// Derive the track identifier: the explicit key when present (with the
    /// configured URI prefix stripped), otherwise the URI when it matches the
    /// prefix pattern. `None` when neither yields an identifier.
    pub fn identifier(&self, key_uri_prefix: Option<&str>) -> Option<String> {
        if let Some(key) = self.key.as_deref() {
            let bare = match key_uri_prefix {
                Some(prefix) => key.strip_prefix(prefix).unwrap_or(key),
                None => key,
            };
            return Some(bare.to_owned());
        }

        let prefix = key_uri_prefix?;
        self.uri.strip_prefix(prefix).map(str::to_owned)
    }
}

/// A concrete fetchable URL derived from a track identifier.
///
/// Produced only by a successful remote lookup and immutable afterwards; the
/// recency ring stores its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub identifier: String,
    pub url: String,
    /// Remote stream URLs go stale on the server side without notice; the
    /// bounded ring is the only thing limiting how long one is reused.
    pub expires_implicitly: bool,
}

impl ResolvedLocation {
    pub fn new(identifier: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            url: url.into(),
            expires_implicitly: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "https://watch.invalid/track?v=";

    #[test]
    fn local_classification_checks_key_then_uri() {
        let by_key = TrackRequest::new("content://media/1234").with_key("local:1234");
        assert!(by_key.is_local());

        let by_uri = TrackRequest::new("local:1234");
        assert!(by_uri.is_local());

        let remote = TrackRequest::new("https://cdn.invalid/a").with_key("abc");
        assert!(!remote.is_local());
    }

    #[test]
    fn identifier_from_explicit_key() {
        let bare = TrackRequest::new("ignored").with_key("abc");
        assert_eq!(bare.identifier(Some(PREFIX)), Some("abc".to_owned()));

        let prefixed = TrackRequest::new("ignored").with_key(format!("{PREFIX}abc"));
        assert_eq!(prefixed.identifier(Some(PREFIX)), Some("abc".to_owned()));
    }

    #[test]
    fn identifier_from_uri_pattern() {
        let request = TrackRequest::new(format!("{PREFIX}xyz"));
        assert_eq!(request.identifier(Some(PREFIX)), Some("xyz".to_owned()));
    }

    #[test]
    fn identifier_missing() {
        let request = TrackRequest::new("https://elsewhere.invalid/xyz");
        assert_eq!(request.identifier(Some(PREFIX)), None);
        assert_eq!(request.identifier(None), None);
    }

    #[test]
    fn rewrite_keeps_unrelated_fields() {
        let request = TrackRequest::new("https://old.invalid")
            .with_key("abc")
            .at_position(42)
            .with_header("X-Session", "s1");

        let rewritten = request.clone().with_uri("https://new.invalid");
        assert_eq!(rewritten.position, 42);
        assert_eq!(rewritten.key.as_deref(), Some("abc"));
        assert_eq!(rewritten.headers.get("X-Session").map(String::as_str), Some("s1"));
        assert_eq!(rewritten.uri, "https://new.invalid");
    }
}
