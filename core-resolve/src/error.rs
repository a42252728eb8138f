//! # Resolution Error Types
//!
//! The failure taxonomy callers use to decide between retrying, skipping to
//! the next item, or surfacing a message. Resolution never retries
//! internally; every failure propagates as exactly one of these kinds.

use thiserror::Error;

/// Errors that can occur while resolving a track request.
#[derive(Error, Debug)]
pub enum ResolveError {
    // ========================================================================
    // Transport
    // ========================================================================
    /// Network-level failure talking to the lookup service or a stream host,
    /// including connect and read timeouts.
    #[error("Transport failure: {0}")]
    Transport(String),

    // ========================================================================
    // Lookup outcomes
    // ========================================================================
    /// The lookup response echoed a different identifier than requested.
    /// The response is treated as corrupt and never accepted.
    #[error("Identifier mismatch: requested `{requested}`, received `{received}`")]
    IdentityMismatch { requested: String, received: String },

    /// The lookup reported a playable track but listed no stream variants.
    #[error("No playable stream format available")]
    NoPlayableFormat,

    /// The remote service refuses to play this track.
    #[error("Track is unplayable")]
    Unplayable,

    /// The remote service requires an authenticated session.
    #[error("Login required to play this track")]
    LoginRequired,

    /// Any other non-OK playability status, carried verbatim.
    #[error("Remote playability status: {0}")]
    Remote(String),

    // ========================================================================
    // Catch-all
    // ========================================================================
    /// Unclassified failure during classification or rewriting. The original
    /// cause is preserved for diagnostics.
    #[error("Resolution failed: {message}")]
    Unknown {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ResolveError {
    /// Unclassified failure without an underlying cause.
    pub fn unknown(message: impl Into<String>) -> Self {
        ResolveError::Unknown {
            message: message.into(),
            source: None,
        }
    }

    /// Unclassified failure wrapping its cause.
    pub fn wrap(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ResolveError::Unknown {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` if the caller's retry/skip policy may retry this.
    pub fn is_transient(&self) -> bool {
        matches!(self, ResolveError::Transport(_))
    }

    /// Returns `true` if the failure is expected to be shown to the user.
    pub fn should_surface(&self) -> bool {
        matches!(self, ResolveError::LoginRequired | ResolveError::Remote(_))
    }
}

impl From<core_cache::CacheError> for ResolveError {
    fn from(err: core_cache::CacheError) -> Self {
        ResolveError::wrap("disk cache failure", err)
    }
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_is_the_only_transient_kind() {
        assert!(ResolveError::Transport("timed out".into()).is_transient());
        assert!(!ResolveError::Unplayable.is_transient());
        assert!(!ResolveError::LoginRequired.is_transient());
        assert!(!ResolveError::NoPlayableFormat.is_transient());
    }

    #[test]
    fn user_facing_kinds() {
        assert!(ResolveError::LoginRequired.should_surface());
        assert!(ResolveError::Remote("AGE_RESTRICTED".into()).should_surface());
        assert!(!ResolveError::Transport("reset".into()).should_surface());
    }

    #[test]
    fn unknown_preserves_cause() {
        let cause = std::io::Error::other("disk gone");
        let err = ResolveError::wrap("classification failed", cause);

        let source = std::error::Error::source(&err).expect("cause should be preserved");
        assert!(source.to_string().contains("disk gone"));
    }
}
