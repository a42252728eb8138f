//! # Remote Lookup Client
//!
//! Asks the remote playback service whether a track is playable and which
//! encoded variants it offers. The service is untrusted: its identifier echo
//! is always checked by the orchestrator before a result is accepted.

use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::format::StreamVariant;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Structured outcome of a playback lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayabilityResult {
    /// Identifier echoed by the service, if any.
    pub identifier: Option<String>,
    pub playability: Playability,
}

/// Tagged playability verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum Playability {
    Ok(PlayableManifest),
    Unplayable,
    LoginRequired,
    /// Any other status code, carried verbatim for the caller.
    Other(String),
}

/// Stream manifest accompanying an OK verdict.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayableManifest {
    pub variants: Vec<StreamVariant>,
    /// Track duration hint in milliseconds.
    pub duration_ms: Option<u64>,
    /// Normalized loudness hint in dB.
    pub loudness_db: Option<f32>,
}

/// Client issuing playback lookups against the remote service.
///
/// Lookups are blocking network work and must run on an I/O-bound execution
/// context; they are never driven from the thread pacing playback.
#[async_trait]
pub trait LookupClient: Send + Sync {
    /// Look up playability and stream variants for a track identifier.
    ///
    /// # Errors
    ///
    /// Network failures and timeouts surface as [`ResolveError::Transport`];
    /// they are never retried here.
    async fn lookup(&self, identifier: &str) -> Result<PlayabilityResult>;
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireLookupRequest<'a> {
    identifier: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLookupResponse {
    #[serde(default)]
    track_details: Option<WireTrackDetails>,
    playability: WirePlayability,
    #[serde(default)]
    streaming: Option<WireStreaming>,
    #[serde(default)]
    audio_config: Option<WireAudioConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTrackDetails {
    identifier: String,
    #[serde(default)]
    duration_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePlayability {
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStreaming {
    #[serde(default)]
    variants: Vec<StreamVariant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAudioConfig {
    #[serde(default)]
    loudness_db: Option<f32>,
}

impl From<WireLookupResponse> for PlayabilityResult {
    fn from(wire: WireLookupResponse) -> Self {
        let identifier = wire.track_details.as_ref().map(|d| d.identifier.clone());

        let playability = match wire.playability.status.as_str() {
            "OK" => Playability::Ok(PlayableManifest {
                variants: wire.streaming.map(|s| s.variants).unwrap_or_default(),
                duration_ms: wire.track_details.and_then(|d| d.duration_ms),
                loudness_db: wire.audio_config.and_then(|a| a.loudness_db),
            }),
            "UNPLAYABLE" => Playability::Unplayable,
            "LOGIN_REQUIRED" => Playability::LoginRequired,
            other => Playability::Other(other.to_owned()),
        };

        PlayabilityResult {
            identifier,
            playability,
        }
    }
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// Reqwest-based lookup client with independent connect and read timeouts.
pub struct HttpLookupClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLookupClient {
    /// Build a client from the resolver configuration.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ResolveError::wrap("failed to build lookup HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: config.lookup_endpoint.clone(),
        })
    }

    fn transport(err: reqwest::Error) -> ResolveError {
        if err.is_timeout() {
            ResolveError::Transport("lookup request timed out".to_string())
        } else if err.is_connect() {
            ResolveError::Transport(format!("lookup connection failed: {err}"))
        } else {
            ResolveError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl LookupClient for HttpLookupClient {
    #[instrument(skip(self))]
    async fn lookup(&self, identifier: &str) -> Result<PlayabilityResult> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&WireLookupRequest { identifier })
            .send()
            .await
            .map_err(Self::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Transport(format!(
                "lookup returned HTTP {status}"
            )));
        }

        let wire: WireLookupResponse = response.json().await.map_err(Self::transport)?;
        debug!(identifier, status = ?wire.playability.status, "Lookup completed");

        Ok(wire.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::AudioQuality;

    #[test]
    fn parses_ok_response_with_variants_and_hints() {
        let json = r#"{
            "trackDetails": { "identifier": "abc", "durationMs": 183000 },
            "playability": { "status": "OK" },
            "streaming": {
                "variants": [
                    {
                        "formatId": 140,
                        "mimeType": "audio/mp4; codecs=\"mp4a.40.2\"",
                        "bitrate": 128000,
                        "quality": "medium",
                        "contentLength": 2900000,
                        "url": "https://cdn.invalid/abc/140"
                    },
                    {
                        "formatId": 251,
                        "mimeType": "audio/webm; codecs=\"opus\"",
                        "bitrate": 256000,
                        "quality": "high",
                        "contentLength": 4300000,
                        "approxDurationMs": 183000,
                        "url": "https://cdn.invalid/abc/251"
                    }
                ]
            },
            "audioConfig": { "loudnessDb": -2.1 }
        }"#;

        let wire: WireLookupResponse = serde_json::from_str(json).unwrap();
        let result = PlayabilityResult::from(wire);

        assert_eq!(result.identifier.as_deref(), Some("abc"));
        let Playability::Ok(manifest) = result.playability else {
            panic!("expected OK playability");
        };
        assert_eq!(manifest.variants.len(), 2);
        assert_eq!(manifest.duration_ms, Some(183_000));
        assert_eq!(manifest.loudness_db, Some(-2.1));
        assert_eq!(manifest.variants[1].quality, Some(AudioQuality::High));
    }

    #[test]
    fn parses_non_ok_statuses() {
        for (status, expected) in [
            ("UNPLAYABLE", Playability::Unplayable),
            ("LOGIN_REQUIRED", Playability::LoginRequired),
            ("AGE_RESTRICTED", Playability::Other("AGE_RESTRICTED".into())),
        ] {
            let json = format!(
                r#"{{ "trackDetails": {{ "identifier": "abc" }},
                      "playability": {{ "status": "{status}" }} }}"#
            );

            let wire: WireLookupResponse = serde_json::from_str(&json).unwrap();
            assert_eq!(PlayabilityResult::from(wire).playability, expected);
        }
    }

    #[test]
    fn missing_track_details_leaves_echo_empty() {
        let json = r#"{ "playability": { "status": "OK" } }"#;
        let wire: WireLookupResponse = serde_json::from_str(json).unwrap();
        let result = PlayabilityResult::from(wire);

        assert!(result.identifier.is_none());
        assert_eq!(
            result.playability,
            Playability::Ok(PlayableManifest::default())
        );
    }
}
