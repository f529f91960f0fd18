//! The resolver's public return value.

use serde::{Deserialize, Serialize};

use super::variant::MediaVariant;

// ============================================================================
// Extraction Result
// ============================================================================

/// Successful resolution of a post to its downloadable media.
///
/// Invariant: `variants` is non-empty and ordered best-first. The pipeline
/// never returns an empty-but-successful result; an empty variant list is
/// always surfaced as a failure instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Quality variants, best-first.
    pub variants: Vec<MediaVariant>,
    /// Thumbnail URL, when the winning strategy surfaced one.
    pub thumbnail: Option<String>,
    /// Media duration in milliseconds, when known.
    pub duration_ms: Option<u64>,
    /// Author handle.
    pub author: String,
    /// Numeric content id.
    pub content_id: String,
    /// Post text, when the winning strategy surfaced it.
    pub text: Option<String>,
}

impl ExtractionResult {
    /// The best (first-ranked) variant.
    pub fn best(&self) -> &MediaVariant {
        // Non-empty by construction; the orchestrator rejects empty lists.
        &self.variants[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_returns_first() {
        let result = ExtractionResult {
            variants: vec![
                MediaVariant {
                    url: "https://cdn/v/720.mp4".into(),
                    quality_label: "720p".into(),
                    width: 1280,
                    height: 720,
                    bitrate: 2_176_000,
                    content_type: "video/mp4".into(),
                },
                MediaVariant {
                    url: "https://cdn/v/360.mp4".into(),
                    quality_label: "480p".into(),
                    width: 640,
                    height: 360,
                    bitrate: 832_000,
                    content_type: "video/mp4".into(),
                },
            ],
            thumbnail: None,
            duration_ms: Some(14_000),
            author: "someuser".into(),
            content_id: "123".into(),
            text: None,
        };

        assert_eq!(result.best().quality_label, "720p");
    }
}
