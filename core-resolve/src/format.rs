//! Stream variants and format selection.

use serde::{Deserialize, Serialize};

/// Declared quality tier of an encoded stream variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioQuality {
    Low,
    Medium,
    High,
}

/// One encoded stream variant offered by the lookup service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamVariant {
    /// Numeric encoder format identifier.
    pub format_id: u32,
    pub mime_type: String,
    #[serde(default)]
    pub bitrate: Option<u64>,
    #[serde(default)]
    pub quality: Option<AudioQuality>,
    #[serde(default)]
    pub content_length: Option<u64>,
    #[serde(default)]
    pub last_modified: Option<i64>,
    #[serde(default)]
    pub approx_duration_ms: Option<u64>,
    pub url: String,
}

/// Pick the best variant: highest quality, ties broken by bitrate descending,
/// then by format identifier ascending. Deterministic and stable.
pub fn select_best(variants: &[StreamVariant]) -> Option<&StreamVariant> {
    variants.iter().max_by(|a, b| {
        a.quality
            .cmp(&b.quality)
            .then_with(|| a.bitrate.cmp(&b.bitrate))
            .then_with(|| b.format_id.cmp(&a.format_id))
    })
}

/// Stream format metadata persisted per track after a cold resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDescriptor {
    pub identifier: String,
    pub format_id: u32,
    pub mime_type: String,
    pub bitrate: Option<u64>,
    pub loudness_db: Option<f32>,
    pub content_length: Option<u64>,
    pub last_modified: Option<i64>,
}

impl FormatDescriptor {
    /// Build the persistable descriptor for a selected variant.
    pub fn from_variant(
        identifier: impl Into<String>,
        variant: &StreamVariant,
        loudness_db: Option<f32>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            format_id: variant.format_id,
            mime_type: variant.mime_type.clone(),
            bitrate: variant.bitrate,
            loudness_db,
            content_length: variant.content_length,
            last_modified: variant.last_modified,
        }
    }
}
