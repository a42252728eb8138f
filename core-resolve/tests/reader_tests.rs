//! Integration tests for the read-through chunk reader.
//!
//! Remote URIs in these tests point at an unroutable port, so any attempted
//! network fetch fails loudly instead of passing silently.

use core_cache::{CacheConfig, ContentCache, EvictionPolicy};
use core_resolve::{ChunkReader, ResolveError, ResolverConfig, TrackRequest};
use std::sync::Arc;
use tempfile::TempDir;

async fn open_cache(dir: &TempDir) -> Arc<ContentCache> {
    let config = CacheConfig::new(dir.path()).with_eviction(EvictionPolicy::Unbounded);
    Arc::new(ContentCache::open(config).await.unwrap())
}

fn reader(cache: Arc<ContentCache>) -> ChunkReader {
    ChunkReader::new(cache, &ResolverConfig::new("https://lookup.invalid/player")).unwrap()
}

const DEAD_URI: &str = "http://127.0.0.1:9/stream";

#[tokio::test]
async fn zero_length_scope_is_an_immediate_end_of_stream() {
    let dir = TempDir::new().unwrap();
    let reader = reader(open_cache(&dir).await);

    let request = TrackRequest::new(DEAD_URI)
        .with_key("abc")
        .at_position(1_000_000)
        .with_length(0);

    let bytes = reader.read(&request).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn cached_ranges_are_served_without_network() {
    let dir = TempDir::new().unwrap();
    let cache = open_cache(&dir).await;
    cache.write("abc", 0, b"hello world").await.unwrap();

    let reader = reader(cache);
    let request = TrackRequest::new(DEAD_URI)
        .with_key("abc")
        .at_position(3)
        .with_length(5);

    let bytes = reader.read(&request).await.unwrap();
    assert_eq!(&bytes[..], b"lo wo");
}

#[tokio::test]
async fn uncached_ranges_hit_the_network() {
    let dir = TempDir::new().unwrap();
    let reader = reader(open_cache(&dir).await);

    let request = TrackRequest::new(DEAD_URI).with_key("abc").with_length(16);

    let err = reader.read(&request).await.unwrap_err();
    assert!(matches!(err, ResolveError::Transport(_)));
}

#[tokio::test]
async fn local_requests_are_rejected() {
    let dir = TempDir::new().unwrap();
    let reader = reader(open_cache(&dir).await);

    let request = TrackRequest::new("local:1234");
    let err = reader.read(&request).await.unwrap_err();
    assert!(matches!(err, ResolveError::Unknown { .. }));
}
