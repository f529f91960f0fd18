//! Extraction from a decoded status payload.

use clipscout_core::{RawVariant, StrategyKind};
use clipscout_resolve::StrategyYield;

use crate::util::dims_from_url;

use super::models::{ApiErrorBody, StatusResponse};

/// Error codes that confirm the content itself is gone or restricted:
/// page does not exist (34), suspended author (63), deleted (144),
/// protected author (179), age-restricted (421), and withheld (422).
const UNAVAILABLE_CODES: &[i64] = &[34, 63, 144, 179, 421, 422];

/// Whether an API error code means the content is permanently unavailable,
/// as opposed to a request-level failure worth retrying elsewhere.
pub fn is_unavailable_code(code: i64) -> bool {
    UNAVAILABLE_CODES.contains(&code)
}

/// Extracts error codes from a non-2xx response body. Empty when the body
/// isn't the API's error envelope.
pub fn error_codes(body: &str) -> Vec<i64> {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|envelope| envelope.errors.into_iter().map(|e| e.code).collect())
        .unwrap_or_default()
}

/// Walks the status payload's media entities and collects video renditions.
///
/// Playlist entries (`application/x-mpegURL`) are skipped; only `video/*`
/// renditions become variants. Dimensions come from the CDN URL path when it
/// encodes them, falling back to the entity's source dimensions.
pub fn yield_from_status(status: StatusResponse) -> StrategyYield {
    let mut out = StrategyYield {
        text: status.full_text,
        author: status.user.map(|u| u.screen_name),
        ..StrategyYield::default()
    };

    let Some(entities) = status.extended_entities else {
        return out;
    };

    for entity in entities.media {
        if entity.kind != "video" && entity.kind != "animated_gif" {
            continue;
        }
        let Some(info) = entity.video_info else {
            continue;
        };

        if out.thumbnail.is_none() {
            out.thumbnail = entity.media_url_https;
        }
        if out.duration_ms.is_none() {
            out.duration_ms = info.duration_millis;
        }

        let original = entity.original_info;
        for variant in info.variants {
            if !variant.content_type.starts_with("video/") {
                continue;
            }
            let (width, height) = dims_from_url(&variant.url).unwrap_or_else(|| {
                original
                    .as_ref()
                    .and_then(|o| Some((o.width?, o.height?)))
                    .unwrap_or((0, 0))
            });
            out.variants.push(RawVariant {
                url: variant.url,
                content_type: variant.content_type,
                bitrate: variant.bitrate.unwrap_or(0),
                width,
                height,
                origin: StrategyKind::TokenApi,
            });
        }
    }

    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEO_STATUS: &str = r#"{
        "full_text": "watch this",
        "user": {"screen_name": "someone"},
        "extended_entities": {
            "media": [{
                "type": "video",
                "media_url_https": "https://pbs.twimg.com/ext_tw_video_thumb/1/pu/img/still.jpg",
                "original_info": {"width": 1920, "height": 1080},
                "video_info": {
                    "duration_millis": 14000,
                    "variants": [
                        {"content_type": "application/x-mpegURL", "url": "https://video.twimg.com/ext_tw_video/1/pu/pl/list.m3u8"},
                        {"bitrate": 832000, "content_type": "video/mp4", "url": "https://video.twimg.com/ext_tw_video/1/pu/vid/640x360/a.mp4?tag=12"},
                        {"bitrate": 2176000, "content_type": "video/mp4", "url": "https://video.twimg.com/ext_tw_video/1/pu/vid/1280x720/b.mp4?tag=12"}
                    ]
                }
            }]
        }
    }"#;

    #[test]
    fn test_extracts_video_variants_and_metadata() {
        let status: StatusResponse = serde_json::from_str(VIDEO_STATUS).unwrap();
        let out = yield_from_status(status);

        assert_eq!(out.variants.len(), 2, "playlist entry must be skipped");
        assert_eq!(out.variants[0].width, 640);
        assert_eq!(out.variants[0].height, 360);
        assert_eq!(out.variants[1].bitrate, 2_176_000);
        assert_eq!(out.duration_ms, Some(14_000));
        assert_eq!(out.author.as_deref(), Some("someone"));
        assert_eq!(out.text.as_deref(), Some("watch this"));
        assert!(out.thumbnail.as_deref().unwrap().contains("still.jpg"));
    }

    #[test]
    fn test_falls_back_to_original_info_dimensions() {
        let body = r#"{
            "extended_entities": {"media": [{
                "type": "animated_gif",
                "original_info": {"width": 498, "height": 280},
                "video_info": {"variants": [
                    {"bitrate": 0, "content_type": "video/mp4", "url": "https://video.twimg.com/tweet_video/gif.mp4"}
                ]}
            }]}
        }"#;
        let status: StatusResponse = serde_json::from_str(body).unwrap();
        let out = yield_from_status(status);

        assert_eq!(out.variants.len(), 1);
        assert_eq!(out.variants[0].width, 498);
        assert_eq!(out.variants[0].height, 280);
    }

    #[test]
    fn test_photo_only_post_yields_nothing() {
        let body = r#"{
            "full_text": "a picture",
            "extended_entities": {"media": [{
                "type": "photo",
                "media_url_https": "https://pbs.twimg.com/media/x.jpg"
            }]}
        }"#;
        let status: StatusResponse = serde_json::from_str(body).unwrap();
        let out = yield_from_status(status);

        assert!(out.variants.is_empty());
        assert!(out.thumbnail.is_none(), "photo stills are not video thumbnails");
    }

    #[test]
    fn test_no_entities() {
        let status: StatusResponse = serde_json::from_str(r#"{"full_text": "words only"}"#).unwrap();
        assert!(yield_from_status(status).variants.is_empty());
    }

    #[test]
    fn test_error_codes_parsed_from_envelope() {
        let codes = error_codes(r#"{"errors": [{"code": 34, "message": "page does not exist"}]}"#);
        assert_eq!(codes, vec![34]);
        assert!(is_unavailable_code(34));
        assert!(is_unavailable_code(144));
        assert!(!is_unavailable_code(88));
    }

    #[test]
    fn test_error_codes_tolerate_non_envelope_bodies() {
        assert!(error_codes("not json at all").is_empty());
        assert!(error_codes("{}").is_empty());
    }
}
