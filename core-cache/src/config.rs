//! Cache configuration and eviction policies.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the disk content cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding span files and the span index database.
    pub directory: PathBuf,

    /// Eviction policy, chosen once at construction.
    pub eviction: EvictionPolicy,

    /// Maximum number of pooled index connections.
    pub max_index_connections: u32,
}

impl CacheConfig {
    /// Create a configuration rooted at the given directory.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            eviction: EvictionPolicy::default(),
            max_index_connections: 4,
        }
    }

    /// Set the eviction policy.
    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    /// Set the index connection pool size.
    pub fn with_max_index_connections(mut self, count: u32) -> Self {
        self.max_index_connections = count;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.directory.as_os_str().is_empty() {
            return Err("directory cannot be empty".to_string());
        }

        if self.max_index_connections == 0 {
            return Err("max_index_connections must be at least 1".to_string());
        }

        if let EvictionPolicy::LeastRecentlyUsed { max_bytes } = self.eviction {
            if max_bytes == 0 {
                return Err("LRU byte budget must be greater than 0".to_string());
            }
        }

        Ok(())
    }
}

/// Policy for evicting spans when the cache grows.
///
/// The choice is made once when the cache is opened; there is no policy
/// switching on a live cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Never evict; the cache grows without bound.
    Unbounded,

    /// Evict least-recently-used spans once total stored bytes exceed
    /// `max_bytes`, checked after every write.
    LeastRecentlyUsed { max_bytes: u64 },
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        EvictionPolicy::LeastRecentlyUsed {
            max_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}
