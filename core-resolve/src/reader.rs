//! Read-through chunk reader.
//!
//! Serves the bytes of a resolved, range-scoped request: cached ranges come
//! straight from disk, everything else is fetched over HTTP and written
//! through into the cache for the next reader.

use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::request::TrackRequest;
use bytes::Bytes;
use core_cache::ContentCache;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Reads scoped request bytes, preferring the disk cache over the network.
pub struct ChunkReader {
    cache: Arc<ContentCache>,
    client: reqwest::Client,
}

impl ChunkReader {
    /// Build a reader sharing the resolver's transport configuration.
    pub fn new(cache: Arc<ContentCache>, config: &ResolverConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ResolveError::wrap("failed to build stream HTTP client", e))?;

        Ok(Self { cache, client })
    }

    /// Fetch the bytes of one scoped request.
    ///
    /// A zero-length scope returns an empty buffer: it is an immediate end of
    /// stream, not an error. Local-origin requests are not served here; the
    /// host player owns local I/O.
    #[instrument(skip(self, request), fields(uri = %request.uri, position = request.position))]
    pub async fn read(&self, request: &TrackRequest) -> Result<Bytes> {
        if request.is_local() {
            return Err(ResolveError::unknown(
                "local content is read by the host player",
            ));
        }

        if request.length == Some(0) {
            return Ok(Bytes::new());
        }

        if let (Some(key), Some(length)) = (request.key.as_deref(), request.length) {
            if self.cache.is_cached(key, request.position, length).await? {
                debug!(key, "Serving range from disk cache");
                return Ok(self.cache.read(key, request.position, length).await?);
            }
        }

        let bytes = self.fetch_remote(request).await?;

        // Write-through is best-effort; a failed cache write must not fail
        // the read that already has its bytes.
        if let Some(key) = request.key.as_deref() {
            if let Err(err) = self.cache.write(key, request.position, &bytes).await {
                warn!(key, %err, "Failed to cache fetched range");
            }
        }

        Ok(bytes)
    }

    async fn fetch_remote(&self, request: &TrackRequest) -> Result<Bytes> {
        let mut builder = self.client.get(&request.uri);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(Self::transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Transport(format!(
                "stream host returned HTTP {status}"
            )));
        }

        response.bytes().await.map_err(Self::transport)
    }

    fn transport(err: reqwest::Error) -> ResolveError {
        if err.is_timeout() {
            ResolveError::Transport("stream request timed out".to_string())
        } else {
            ResolveError::Transport(err.to_string())
        }
    }
}
