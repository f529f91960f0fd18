//! Media variant types and the variant normalizer.
//!
//! Strategies produce loose [`RawVariant`] records; the normalizer
//! deduplicates them by URL stem, derives a quality label from the larger
//! dimension, and ranks best-first. Only one strategy's output is normalized
//! per request; yields are never merged across strategies.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Strategy Kind
// ============================================================================

/// Which extraction strategy produced a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Strategy A: token-authenticated metadata API.
    TokenApi,
    /// Strategy B: third-party read-only mirror API.
    MirrorApi,
    /// Strategy C: headless-browser automation.
    Browser,
}

impl StrategyKind {
    /// Returns the stable identifier for this strategy.
    pub fn id(&self) -> &'static str {
        match self {
            Self::TokenApi => "token_api",
            Self::MirrorApi => "mirror_api",
            Self::Browser => "browser",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

// ============================================================================
// Raw Variant
// ============================================================================

/// Unprocessed variant record produced by a strategy.
///
/// Transient: consumed immediately by the normalizer. Unknown dimensions
/// and bitrate are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVariant {
    /// Direct, CDN-hosted file URL.
    pub url: String,
    /// MIME content type (e.g. `video/mp4`).
    pub content_type: String,
    /// Bitrate in bits per second; zero when unknown.
    pub bitrate: u64,
    /// Width in pixels; zero when unknown.
    pub width: u32,
    /// Height in pixels; zero when unknown.
    pub height: u32,
    /// The strategy that produced this record.
    pub origin: StrategyKind,
}

impl RawVariant {
    /// Pixel count used for ranking; zero when resolution is unknown.
    fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// The URL with its query string stripped, used as the dedup key.
    fn url_stem(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }
}

// ============================================================================
// Media Variant
// ============================================================================

/// A normalized, quality-labeled variant. Public result element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaVariant {
    /// Direct, CDN-hosted file URL.
    pub url: String,
    /// Human-readable quality label derived from the larger dimension.
    pub quality_label: String,
    /// Width in pixels; zero when unknown.
    pub width: u32,
    /// Height in pixels; zero when unknown.
    pub height: u32,
    /// Bitrate in bits per second; zero when unknown.
    pub bitrate: u64,
    /// MIME content type.
    pub content_type: String,
}

impl MediaVariant {
    fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

// ============================================================================
// Quality Labeling
// ============================================================================

/// Derives a quality label from the larger of the two dimensions.
///
/// Fixed thresholds: ≥1920 → `1080p`, ≥1280 → `720p`, ≥640 → `480p`,
/// ≥480 → `360p`; anything smaller is labeled with the dimension itself,
/// and `unknown` when both dimensions are zero.
pub fn quality_label(width: u32, height: u32) -> String {
    let max_dim = width.max(height);
    match max_dim {
        0 => "unknown".to_string(),
        d if d >= 1920 => "1080p".to_string(),
        d if d >= 1280 => "720p".to_string(),
        d if d >= 640 => "480p".to_string(),
        d if d >= 480 => "360p".to_string(),
        d => format!("{d}p"),
    }
}

// ============================================================================
// Normalizer
// ============================================================================

/// Deduplicates, labels, and ranks raw variants best-first.
///
/// Deduplication is by URL stem (path before the query string), keeping the
/// better of two duplicates (higher pixel count, then bitrate). Sorting is
/// descending by pixel count, falling back to bitrate when both pixel counts
/// are zero or equal. The output is deterministic for any input ordering.
pub fn normalize_variants(raw: Vec<RawVariant>) -> Vec<MediaVariant> {
    let mut by_stem: HashMap<String, RawVariant> = HashMap::with_capacity(raw.len());

    for variant in raw {
        let stem = variant.url_stem().to_string();
        match by_stem.get(&stem) {
            Some(existing) => {
                let held = (existing.pixels(), existing.bitrate);
                let offered = (variant.pixels(), variant.bitrate);
                // Equal-rank duplicates keep the lexicographically smaller
                // URL, so the winner is independent of input order.
                if offered > held || (offered == held && variant.url < existing.url) {
                    by_stem.insert(stem, variant);
                }
            }
            None => {
                by_stem.insert(stem, variant);
            }
        }
    }

    let mut variants: Vec<MediaVariant> = by_stem
        .into_values()
        .map(|v| MediaVariant {
            quality_label: quality_label(v.width, v.height),
            url: v.url,
            width: v.width,
            height: v.height,
            bitrate: v.bitrate,
            content_type: v.content_type,
        })
        .collect();

    // Descending by pixel count, then bitrate; URL as a final tie-break so
    // equal inputs always produce the same order.
    variants.sort_by(|a, b| {
        (b.pixels(), b.bitrate)
            .cmp(&(a.pixels(), a.bitrate))
            .then_with(|| a.url.cmp(&b.url))
    });

    variants
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: &str, w: u32, h: u32, bitrate: u64) -> RawVariant {
        RawVariant {
            url: url.to_string(),
            content_type: "video/mp4".to_string(),
            bitrate,
            width: w,
            height: h,
            origin: StrategyKind::TokenApi,
        }
    }

    #[test]
    fn test_quality_label_thresholds() {
        assert_eq!(quality_label(1920, 1080), "1080p");
        assert_eq!(quality_label(1080, 1920), "1080p");
        assert_eq!(quality_label(1280, 720), "720p");
        assert_eq!(quality_label(854, 480), "480p");
        assert_eq!(quality_label(640, 360), "480p");
        assert_eq!(quality_label(480, 270), "360p");
        assert_eq!(quality_label(320, 180), "320p");
        assert_eq!(quality_label(0, 0), "unknown");
    }

    #[test]
    fn test_sort_descending_by_pixels() {
        let out = normalize_variants(vec![
            raw("https://cdn/v/360.mp4", 640, 360, 832_000),
            raw("https://cdn/v/720.mp4", 1280, 720, 2_176_000),
            raw("https://cdn/v/1080.mp4", 1920, 1080, 10_368_000),
        ]);

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].quality_label, "1080p");
        assert_eq!(out[1].quality_label, "720p");
        assert_eq!(out[2].quality_label, "480p");
    }

    #[test]
    fn test_bitrate_tie_break_when_resolution_unknown() {
        let out = normalize_variants(vec![
            raw("https://cdn/v/low.mp4", 0, 0, 256_000),
            raw("https://cdn/v/high.mp4", 0, 0, 2_000_000),
        ]);

        assert_eq!(out[0].url, "https://cdn/v/high.mp4");
        assert_eq!(out[0].quality_label, "unknown");
        assert_eq!(out[1].url, "https://cdn/v/low.mp4");
    }

    #[test]
    fn test_dedup_by_url_stem_keeps_best() {
        let out = normalize_variants(vec![
            raw("https://cdn/v/clip.mp4?tag=12", 1280, 720, 2_176_000),
            raw("https://cdn/v/clip.mp4?tag=14&mx=1", 0, 0, 0),
        ]);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].width, 1280);
    }

    #[test]
    fn test_equal_rank_duplicates_resolve_order_independently() {
        let a = raw("https://cdn/v/clip.mp4?tag=12", 1280, 720, 2_176_000);
        let b = raw("https://cdn/v/clip.mp4?tag=14", 1280, 720, 2_176_000);

        let forward = normalize_variants(vec![a.clone(), b.clone()]);
        let backward = normalize_variants(vec![b, a]);

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].url, "https://cdn/v/clip.mp4?tag=12");
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let a = vec![
            raw("https://cdn/v/a.mp4", 1280, 720, 1),
            raw("https://cdn/v/b.mp4", 1280, 720, 1),
            raw("https://cdn/v/c.mp4", 640, 360, 5),
        ];
        let mut b = a.clone();
        b.reverse();

        assert_eq!(normalize_variants(a), normalize_variants(b));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize_variants(vec![
            raw("https://cdn/v/a.mp4?x=1", 1280, 720, 100),
            raw("https://cdn/v/a.mp4?x=2", 1280, 720, 100),
            raw("https://cdn/v/b.mp4", 0, 0, 50),
        ]);

        let again = normalize_variants(
            once.iter()
                .map(|v| RawVariant {
                    url: v.url.clone(),
                    content_type: v.content_type.clone(),
                    bitrate: v.bitrate,
                    width: v.width,
                    height: v.height,
                    origin: StrategyKind::TokenApi,
                })
                .collect(),
        );

        assert_eq!(once, again);
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_variants(Vec::new()).is_empty());
    }
}
