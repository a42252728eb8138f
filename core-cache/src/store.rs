//! Content-addressed span store.
//!
//! Spans are written atomically: bytes land in a temporary file which is
//! renamed into place before the index row is inserted. Eviction removes the
//! index row before the file, so a crash can leave an orphan span file but
//! never an index row pointing at missing bytes.

use crate::config::{CacheConfig, EvictionPolicy};
use crate::error::{CacheError, Result};
use crate::index::{SpanIndex, SpanRecord};
use bytes::{Bytes, BytesMut};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

const INDEX_FILE: &str = "spans.db";
const EVICTION_BATCH: u32 = 10;

/// Persistent key+range addressable byte store.
///
/// Concurrent readers and writers on distinct identifiers do not block each
/// other; writers on the same identifier serialize through a per-identifier
/// lock.
pub struct ContentCache {
    config: CacheConfig,
    index: SpanIndex,
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Monotonic access stamp, seeded from wall-clock millis. Strictly
    /// increasing per process so LRU ordering stays stable when several
    /// operations land within the same clock tick.
    stamp: AtomicI64,
}

impl ContentCache {
    /// Open the cache rooted at `config.directory`, creating the directory
    /// and index database as needed. Entries from previous runs remain valid.
    #[instrument(skip(config), fields(directory = %config.directory.display()))]
    pub async fn open(config: CacheConfig) -> Result<Self> {
        config.validate().map_err(CacheError::InvalidConfig)?;

        tokio::fs::create_dir_all(&config.directory).await?;

        let index = SpanIndex::open(
            &config.directory.join(INDEX_FILE),
            config.max_index_connections,
        )
        .await?;
        index.initialize().await?;

        info!("Content cache opened");
        Ok(Self {
            config,
            index,
            write_locks: Mutex::new(HashMap::new()),
            stamp: AtomicI64::new(chrono::Utc::now().timestamp_millis()),
        })
    }

    /// Whether `[offset, offset + length)` of `identifier` is fully covered
    /// by cached spans. Answers from the index alone; never touches the
    /// network and never reorders eviction candidates.
    pub async fn is_cached(&self, identifier: &str, offset: u64, length: u64) -> Result<bool> {
        if length == 0 {
            return Ok(true);
        }

        let spans = self.index.spans_for(identifier).await?;
        let end = offset.saturating_add(length);
        let mut cursor = offset;

        for span in spans {
            let span_end = span.offset + span.length;
            if span_end <= cursor {
                continue;
            }
            if span.offset > cursor {
                // Spans are offset-ordered, so this gap cannot be filled later.
                return Ok(false);
            }
            cursor = span_end;
            if cursor >= end {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Whether the whole track, `[0, content_length)`, is cached.
    pub async fn is_fully_cached(&self, identifier: &str, content_length: u64) -> Result<bool> {
        self.is_cached(identifier, 0, content_length).await
    }

    /// Store one span of a track. Replaces a previous span at the same
    /// offset. The eviction budget is re-evaluated after the write.
    #[instrument(skip(self, data), fields(len = data.len()))]
    pub async fn write(&self, identifier: &str, offset: u64, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let lock = self.writer_lock(identifier).await;
        let _guard = lock.lock().await;

        let file = Self::span_file_name(identifier, offset);
        let final_path = self.config.directory.join(&file);
        let tmp_path = final_path.with_extension("tmp");

        tokio::fs::write(&tmp_path, data).await?;
        tokio::fs::rename(&tmp_path, &final_path).await?;

        let now = self.next_stamp();
        self.index
            .insert(&SpanRecord {
                identifier: identifier.to_owned(),
                offset,
                length: data.len() as u64,
                file,
                created_at: now,
                last_access: now,
            })
            .await?;

        debug!(identifier, offset, "Span written");
        drop(_guard);

        self.enforce_budget().await
    }

    /// Read `[offset, offset + length)` of `identifier`, assembling the range
    /// from adjacent spans. Fails with [`CacheError::NotCached`] on any gap.
    #[instrument(skip(self))]
    pub async fn read(&self, identifier: &str, offset: u64, length: u64) -> Result<Bytes> {
        if length == 0 {
            return Ok(Bytes::new());
        }

        let spans = self.index.spans_for(identifier).await?;
        let end = offset.saturating_add(length);
        let mut cursor = offset;
        let mut out = BytesMut::with_capacity(length as usize);
        let now = self.next_stamp();

        for span in spans {
            if cursor >= end {
                break;
            }
            let span_end = span.offset + span.length;
            if span_end <= cursor {
                continue;
            }
            if span.offset > cursor {
                break;
            }

            let bytes = tokio::fs::read(self.config.directory.join(&span.file)).await?;
            let from = (cursor - span.offset) as usize;
            let to = (end.min(span_end) - span.offset) as usize;
            out.extend_from_slice(&bytes[from..to]);
            cursor = span_end.min(end);

            self.index.touch(identifier, span.offset, now).await?;
        }

        if cursor < end {
            return Err(CacheError::NotCached(format!(
                "{identifier} [{offset}, {end})"
            )));
        }

        Ok(out.freeze())
    }

    /// Total bytes currently stored.
    pub async fn cached_bytes(&self) -> Result<u64> {
        self.index.total_bytes().await
    }

    /// Remove every span of one identifier.
    #[instrument(skip(self))]
    pub async fn remove(&self, identifier: &str) -> Result<()> {
        let lock = self.writer_lock(identifier).await;
        let _guard = lock.lock().await;

        for span in self.index.spans_for(identifier).await? {
            self.evict_span(&span).await?;
        }

        Ok(())
    }

    /// Remove all cached content.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        let identifiers = self.index.identifiers().await?;
        for identifier in identifiers {
            self.remove(&identifier).await?;
        }

        info!("Content cache cleared");
        Ok(())
    }

    /// Evict LRU spans until the store fits the configured byte budget.
    async fn enforce_budget(&self) -> Result<()> {
        let EvictionPolicy::LeastRecentlyUsed { max_bytes } = self.config.eviction else {
            return Ok(());
        };

        loop {
            let total = self.index.total_bytes().await?;
            if total <= max_bytes {
                return Ok(());
            }

            let candidates = self.index.lru_candidates(EVICTION_BATCH).await?;
            if candidates.is_empty() {
                warn!(total, max_bytes, "Over budget but no spans to evict");
                return Ok(());
            }

            let mut freed = 0u64;
            for span in &candidates {
                self.evict_span(span).await?;
                freed += span.length;
                if total - freed <= max_bytes {
                    break;
                }
            }

            info!(freed, "Evicted spans to honor byte budget");
        }
    }

    /// Drop one span: index row first, then the backing file.
    async fn evict_span(&self, span: &SpanRecord) -> Result<()> {
        self.index.remove(&span.identifier, span.offset).await?;

        let path = self.config.directory.join(&span.file);
        if let Err(err) = tokio::fs::remove_file(&path).await {
            // The row is gone, so a leftover file is only wasted disk.
            warn!(file = %path.display(), %err, "Failed to delete span file");
        }

        debug!(identifier = %span.identifier, offset = span.offset, "Span evicted");
        Ok(())
    }

    async fn writer_lock(&self, identifier: &str) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().await;
        locks
            .entry(identifier.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn span_file_name(identifier: &str, offset: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(identifier.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        format!("{}.{offset}.span", &digest[..16])
    }

    fn next_stamp(&self) -> i64 {
        self.stamp.fetch_add(1, Ordering::Relaxed)
    }

    /// Cache directory this store was opened at.
    pub fn directory(&self) -> &PathBuf {
        &self.config.directory
    }
}
