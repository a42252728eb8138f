//! # Resolution Orchestrator
//!
//! The central decision function of the streaming layer: classifies each
//! incoming request, serves it from the disk cache or the recency ring when
//! possible, and otherwise drives the cold path (remote lookup, variant
//! selection, metadata persistence, ring update, request rewrite).
//!
//! Classification is read-only; nothing is mutated until the cold path
//! commits, so an abandoned resolution leaves both caches untouched.

use crate::chunk::ChunkPolicy;
use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::format::{select_best, FormatDescriptor, StreamVariant};
use crate::lookup::{LookupClient, Playability, PlayableManifest};
use crate::metadata::{ItemLookup, MetadataStore};
use crate::recency::RecencyCache;
use crate::request::{ResolvedLocation, TrackRequest};
use core_cache::ContentCache;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Resolves track requests into fetchable, range-scoped requests.
pub struct SourceResolver {
    cache: Arc<ContentCache>,
    recents: RecencyCache,
    lookup: Arc<dyn LookupClient>,
    metadata: Arc<dyn MetadataStore>,
    items: Arc<dyn ItemLookup>,
    chunking: ChunkPolicy,
    key_uri_prefix: Option<String>,
}

impl SourceResolver {
    /// Create a resolver over the given collaborators.
    pub fn new(
        cache: Arc<ContentCache>,
        lookup: Arc<dyn LookupClient>,
        metadata: Arc<dyn MetadataStore>,
        items: Arc<dyn ItemLookup>,
        config: ResolverConfig,
    ) -> Result<Self> {
        config.validate().map_err(ResolveError::unknown)?;

        Ok(Self {
            cache,
            recents: RecencyCache::new(config.recency_capacity),
            lookup,
            metadata,
            items,
            chunking: ChunkPolicy::new(config.chunk_length),
            key_uri_prefix: config.key_uri_prefix,
        })
    }

    /// Resolve one request. First matching classification wins:
    ///
    /// 1. local-origin content passes through unchanged;
    /// 2. a range already on disk passes through unchanged;
    /// 3. an identifier still in the recency ring is rewritten to its URL;
    /// 4. otherwise the cold path performs a remote lookup.
    ///
    /// Resolutions for distinct identifiers never block each other; the only
    /// serialization is the atomic ring push at the end of the cold path.
    #[instrument(skip(self, request), fields(uri = %request.uri, position = request.position))]
    pub async fn resolve(&self, request: TrackRequest) -> Result<TrackRequest> {
        if request.is_local() {
            debug!("Local-origin request passed through");
            return Ok(request);
        }

        let identifier = request
            .identifier(self.key_uri_prefix.as_deref())
            .ok_or_else(|| ResolveError::unknown("request carries no track identifier"))?;

        if self
            .cache
            .is_cached(&identifier, request.position, self.chunking.probe_length())
            .await?
        {
            debug!(%identifier, "Range already cached on disk");
            return Ok(request);
        }

        if let Some(recent) = self.recents.find(&identifier) {
            debug!(%identifier, "Reusing recently resolved URL");
            return Ok(request.with_uri(recent.url));
        }

        self.resolve_cold(request, identifier).await
    }

    /// Most recently pushed ring entry at `index` (0 = newest), for
    /// diagnostics and tests.
    pub fn recent(&self, index: usize) -> Option<ResolvedLocation> {
        self.recents.get(index)
    }

    async fn resolve_cold(&self, request: TrackRequest, identifier: String) -> Result<TrackRequest> {
        info!(%identifier, "Cold path: querying remote lookup service");

        let result = self.lookup.lookup(&identifier).await?;

        // The service is untrusted: a wrong or missing echo poisons the
        // whole response regardless of its playability status.
        if result.identifier.as_deref() != Some(identifier.as_str()) {
            return Err(ResolveError::IdentityMismatch {
                requested: identifier,
                received: result.identifier.unwrap_or_default(),
            });
        }

        let manifest = match result.playability {
            Playability::Ok(manifest) => manifest,
            Playability::Unplayable => return Err(ResolveError::Unplayable),
            Playability::LoginRequired => return Err(ResolveError::LoginRequired),
            Playability::Other(status) => return Err(ResolveError::Remote(status)),
        };

        let variant = select_best(&manifest.variants)
            .ok_or(ResolveError::NoPlayableFormat)?
            .clone();
        debug!(
            %identifier,
            format_id = variant.format_id,
            bitrate = ?variant.bitrate,
            "Selected stream variant"
        );

        self.persist_metadata(&identifier, &variant, &manifest).await;

        self.recents
            .push(ResolvedLocation::new(identifier.clone(), variant.url.clone()));

        let rewritten = request.with_key(identifier).with_uri(variant.url.clone());
        Ok(self.chunking.scope(rewritten, variant.content_length))
    }

    /// Persist discovered metadata. Failures are logged and dropped; they
    /// must never fail the resolution.
    async fn persist_metadata(
        &self,
        identifier: &str,
        variant: &StreamVariant,
        manifest: &PlayableManifest,
    ) {
        let known = self.items.find_item(identifier).await;
        let has_duration_text = known
            .as_ref()
            .is_some_and(|item| item.duration_text.is_some());

        if !has_duration_text {
            if let Some(ms) = variant.approx_duration_ms.or(manifest.duration_ms) {
                let text = format_duration_text(ms / 1000);
                if let Err(err) = self.metadata.update_duration_text(identifier, &text).await {
                    warn!(identifier, %err, "Failed to persist duration text");
                }
            }
        }

        let descriptor = FormatDescriptor::from_variant(identifier, variant, manifest.loudness_db);
        if let Err(err) = self.metadata.insert_format(&descriptor).await {
            warn!(identifier, %err, "Failed to persist stream format");
        }
    }
}

/// Render elapsed seconds as `H:MM:SS` / `M:SS` with a single leading digit,
/// the form playback item lists display.
fn format_duration_text(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_text_drops_leading_zero() {
        assert_eq!(format_duration_text(5), "0:05");
        assert_eq!(format_duration_text(65), "1:05");
        assert_eq!(format_duration_text(183), "3:03");
        assert_eq!(format_duration_text(225), "3:45");
        assert_eq!(format_duration_text(3725), "1:02:05");
        assert_eq!(format_duration_text(36_000), "10:00:00");
    }
}
