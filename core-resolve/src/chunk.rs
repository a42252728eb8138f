//! Chunk scoping for partial, resumable transfers.

use crate::request::TrackRequest;

/// Default chunk length for remote stream reads: 512 KiB.
pub const DEFAULT_CHUNK_LENGTH: u64 = 512 * 1024;

/// Splits a resolved request into one bounded sub-range.
///
/// A fixed `chunk_length` wins over the resolved content length; with
/// neither available the request passes through unscoped. Some stream hosts
/// ignore structural offset/length fields, so every scoped request also
/// carries the byte range as a `Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    pub chunk_length: Option<u64>,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            chunk_length: Some(DEFAULT_CHUNK_LENGTH),
        }
    }
}

impl ChunkPolicy {
    pub fn new(chunk_length: Option<u64>) -> Self {
        Self { chunk_length }
    }

    /// Length used when probing the disk cache for an incoming request.
    pub fn probe_length(&self) -> u64 {
        self.chunk_length.unwrap_or(DEFAULT_CHUNK_LENGTH)
    }

    /// Scope `request` to a sub-range starting at its position.
    ///
    /// A position at or past the resolved length yields a zero-length scope
    /// rather than an error; downstream readers treat that as an immediate
    /// end of stream.
    pub fn scope(&self, request: TrackRequest, resolved_length: Option<u64>) -> TrackRequest {
        let Some(length) = self.chunk_length.or(resolved_length) else {
            return request;
        };

        let start = request.position;
        let span = match resolved_length {
            Some(total) => length.min(total.saturating_sub(start)),
            None => length,
        };

        request
            .with_length(span)
            .with_header("Range", format!("{start}-{}", start + span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_header(request: &TrackRequest) -> &str {
        request.headers.get("Range").map(String::as_str).unwrap_or("")
    }

    #[test]
    fn fixed_chunk_length_wins() {
        let policy = ChunkPolicy::default();
        let scoped = policy.scope(TrackRequest::new("https://cdn.invalid/a"), Some(4_000_000));

        assert_eq!(scoped.length, Some(524_288));
        assert_eq!(range_header(&scoped), "0-524288");
    }

    #[test]
    fn falls_back_to_resolved_content_length() {
        let policy = ChunkPolicy::new(None);
        let scoped = policy.scope(TrackRequest::new("https://cdn.invalid/a"), Some(1000));

        assert_eq!(scoped.length, Some(1000));
        assert_eq!(range_header(&scoped), "0-1000");
    }

    #[test]
    fn unscoped_passthrough_when_nothing_known() {
        let policy = ChunkPolicy::new(None);
        let request = TrackRequest::new("https://cdn.invalid/a").at_position(7);
        let scoped = policy.scope(request.clone(), None);

        assert_eq!(scoped, request);
    }

    #[test]
    fn scope_starts_at_request_position() {
        let policy = ChunkPolicy::new(Some(100));
        let scoped = policy.scope(
            TrackRequest::new("https://cdn.invalid/a").at_position(250),
            Some(1000),
        );

        assert_eq!(scoped.position, 250);
        assert_eq!(scoped.length, Some(100));
        assert_eq!(range_header(&scoped), "250-350");
    }

    #[test]
    fn tail_chunk_is_clamped_to_content_length() {
        let policy = ChunkPolicy::new(Some(100));
        let scoped = policy.scope(
            TrackRequest::new("https://cdn.invalid/a").at_position(950),
            Some(1000),
        );

        assert_eq!(scoped.length, Some(50));
        assert_eq!(range_header(&scoped), "950-1000");
    }

    #[test]
    fn position_past_end_yields_zero_length_scope() {
        let policy = ChunkPolicy::new(None);
        let scoped = policy.scope(
            TrackRequest::new("https://cdn.invalid/a").at_position(1_000_000),
            Some(500_000),
        );

        assert_eq!(scoped.length, Some(0));
        assert_eq!(range_header(&scoped), "1000000-1000000");
    }
}
