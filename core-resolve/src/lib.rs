//! # Streaming Source Resolution
//!
//! Turns an opaque track identifier into a fetchable, byte-range scoped
//! request, reusing local and recently-resolved sources before going remote.
//!
//! ## Overview
//!
//! A caller asks for bytes of track `T` at offset `O`. The [`SourceResolver`]
//! classifies the request, first match wins:
//!
//! 1. Local-origin content is passed through untouched.
//! 2. A range already materialized in the [`core_cache::ContentCache`] is
//!    passed through untouched; the downstream reader serves it from disk.
//! 3. An identifier still present in the fixed-size recency ring is rewritten
//!    to its previously resolved URL.
//! 4. Otherwise the remote lookup service is consulted, the best stream
//!    variant is selected, discovered metadata is persisted best-effort, the
//!    ring is updated and the request is rewritten and chunk-scoped.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              SourceResolver              │
//! │   classify → cache / ring / cold path    │
//! └───┬──────────┬──────────┬────────────┬───┘
//!     │          │          │            │
//!     ▼          ▼          ▼            ▼
//! ContentCache RecencyCache LookupClient MetadataStore
//! ```
//!
//! Resolutions for distinct identifiers proceed independently; the only
//! shared mutable state is the recency ring behind one lightweight mutex.

pub mod chunk;
pub mod config;
pub mod error;
pub mod format;
pub mod lookup;
pub mod metadata;
pub mod reader;
pub mod recency;
pub mod request;
pub mod resolver;

pub use chunk::{ChunkPolicy, DEFAULT_CHUNK_LENGTH};
pub use config::ResolverConfig;
pub use error::{ResolveError, Result};
pub use format::{select_best, AudioQuality, FormatDescriptor, StreamVariant};
pub use lookup::{HttpLookupClient, LookupClient, Playability, PlayabilityResult, PlayableManifest};
pub use metadata::{ItemLookup, MetadataError, MetadataStore, PlaybackItem};
pub use reader::ChunkReader;
pub use recency::RecencyCache;
pub use request::{ResolvedLocation, TrackRequest, LOCAL_KEY_PREFIX};
pub use resolver::SourceResolver;
