//! # Disk Content Cache
//!
//! Persistent, range-addressable byte store for streamed track content.
//!
//! ## Overview
//!
//! Downloaded chunks of a track are stored as span files on disk and indexed
//! in SQLite by `(identifier, byte offset)`. The cache answers
//! "are these bytes already on disk?" without any network traffic, serves
//! partial reads across adjacent spans, and enforces a construction-time
//! eviction policy: unbounded, or least-recently-used within a byte budget.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │            ContentCache                │
//! │  - is_cached(identifier, range)        │
//! │  - write() / read()                    │
//! │  - remove() / clear()                  │
//! └────────┬───────────────────────────────┘
//!          │
//!          ├──> SpanIndex (SQLite, WAL)
//!          └──> span files (<stem>.<offset>.span)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_cache::{CacheConfig, ContentCache, EvictionPolicy};
//!
//! let config = CacheConfig::new("/var/cache/audiosource")
//!     .with_eviction(EvictionPolicy::LeastRecentlyUsed { max_bytes: 512 * 1024 * 1024 });
//! let cache = ContentCache::open(config).await?;
//!
//! cache.write("track-a", 0, &chunk).await?;
//! assert!(cache.is_cached("track-a", 0, chunk.len() as u64).await?);
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod store;

pub use config::{CacheConfig, EvictionPolicy};
pub use error::{CacheError, Result};
pub use store::ContentCache;
