//! Resolver configuration.

use crate::chunk::DEFAULT_CHUNK_LENGTH;
use std::time::Duration;

/// Configuration for the resolution layer.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Endpoint of the remote playback lookup service.
    pub lookup_endpoint: String,

    /// User agent presented on lookup and stream requests.
    pub user_agent: String,

    /// TCP connect timeout for remote calls.
    pub connect_timeout: Duration,

    /// Read timeout for remote calls, enforced independently of connect.
    pub read_timeout: Duration,

    /// Fixed chunk length for scoped requests; `None` falls back to the
    /// resolved content length.
    pub chunk_length: Option<u64>,

    /// Number of slots in the recency ring.
    pub recency_capacity: usize,

    /// URI prefix stripped from request keys/URIs to derive the bare track
    /// identifier, e.g. a watch-page prefix. `None` uses keys verbatim.
    pub key_uri_prefix: Option<String>,
}

impl ResolverConfig {
    /// Create a configuration for the given lookup endpoint.
    pub fn new(lookup_endpoint: impl Into<String>) -> Self {
        Self {
            lookup_endpoint: lookup_endpoint.into(),
            user_agent:
                "Mozilla/5.0 (Windows NT 10.0; rv:91.0) Gecko/20100101 Firefox/91.0".to_string(),
            connect_timeout: Duration::from_millis(16_000),
            read_timeout: Duration::from_millis(8_000),
            chunk_length: Some(DEFAULT_CHUNK_LENGTH),
            recency_capacity: 2,
            key_uri_prefix: None,
        }
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set or clear the fixed chunk length.
    pub fn with_chunk_length(mut self, length: Option<u64>) -> Self {
        self.chunk_length = length;
        self
    }

    /// Set the recency ring capacity.
    pub fn with_recency_capacity(mut self, capacity: usize) -> Self {
        self.recency_capacity = capacity;
        self
    }

    /// Set the key URI prefix.
    pub fn with_key_uri_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_uri_prefix = Some(prefix.into());
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.lookup_endpoint.is_empty() {
            return Err("lookup_endpoint cannot be empty".to_string());
        }

        if self.recency_capacity == 0 {
            return Err("recency_capacity must be at least 1".to_string());
        }

        if self.chunk_length == Some(0) {
            return Err("chunk_length must be greater than 0 when set".to_string());
        }

        Ok(())
    }
}
