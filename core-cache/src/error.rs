//! Error types for the disk content cache.

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Filesystem operation on a span file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Span index query failed.
    #[error("Index error: {0}")]
    Database(#[from] sqlx::Error),

    /// Cache configuration was rejected at construction.
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    /// The requested range is not (fully) present in the cache.
    #[error("Range not cached: {0}")]
    NotCached(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
