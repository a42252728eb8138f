//! Collaborator seams for metadata persistence and item lookup.
//!
//! Both stores live outside this layer. Persistence is best-effort from the
//! resolver's point of view: it awaits these calls, logs a failure, and
//! discards the result so playback is never blocked on bookkeeping. The
//! calls still return `Result` so tests can assert that persistence was
//! attempted without coupling resolution success to it.

use crate::format::FormatDescriptor;
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a metadata persistence call. Never propagated past the
/// resolver; logged and dropped.
#[derive(Debug, Error)]
#[error("Metadata store failure: {0}")]
pub struct MetadataError(String);

impl MetadataError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// External store for per-track stream metadata.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Record the stream format discovered for a track.
    async fn insert_format(
        &self,
        descriptor: &FormatDescriptor,
    ) -> std::result::Result<(), MetadataError>;

    /// Record the human-readable duration text of a track.
    async fn update_duration_text(
        &self,
        identifier: &str,
        text: &str,
    ) -> std::result::Result<(), MetadataError>;
}

/// An already-known playback item carrying prior metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackItem {
    pub identifier: String,
    pub duration_text: Option<String>,
}

/// Callback into the playback pipeline for already-known items.
///
/// Absence is not an error; it just means no prior metadata exists and a
/// duration text may need to be derived.
#[async_trait]
pub trait ItemLookup: Send + Sync {
    async fn find_item(&self, identifier: &str) -> Option<PlaybackItem>;
}
