//! Network traffic classification for the browser strategy.
//!
//! While the page loads, the strategy watches CDP network events for two
//! kinds of signal: direct media file requests, and responses from the
//! page's own metadata calls. Metadata bodies arrive as arbitrary JSON
//! whose exact shape shifts with the frontend, so extraction walks the
//! value looking for rendition lists instead of deserializing a fixed
//! model.

use serde_json::Value;

use clipscout_core::{RawVariant, StrategyKind};

use crate::util::{content_type_for_url, dims_from_url};

/// Depth bound for the metadata walk. Real payloads nest ~15 levels;
/// anything past this is a pathological or adversarial document.
const MAX_WALK_DEPTH: usize = 32;

/// Node budget for the metadata walk.
const MAX_WALK_NODES: usize = 20_000;

/// Whether a request URL is one of the page's own metadata calls, whose
/// response body may carry the full rendition list.
pub fn is_metadata_url(url: &str) -> bool {
    (url.contains("/graphql/")
        && (url.contains("TweetResultByRestId") || url.contains("TweetDetail")))
        || (url.contains("syndication") && url.contains("tweet-result"))
        || url.contains("statuses/show.json")
}

/// Whether a request URL is a direct video file or playlist fetch.
pub fn is_media_url(url: &str) -> bool {
    if !url.contains("video.twimg.com") {
        return false;
    }
    let path = url.split('?').next().unwrap_or(url);
    path.ends_with(".mp4") || path.ends_with(".m3u8")
}

/// Builds a variant record from an observed media request URL. The URL
/// path is the only metadata available on this path.
pub fn variant_from_media_url(url: &str) -> RawVariant {
    let (width, height) = dims_from_url(url).unwrap_or((0, 0));
    RawVariant {
        content_type: content_type_for_url(url).to_string(),
        url: url.to_string(),
        bitrate: 0,
        width,
        height,
        origin: StrategyKind::Browser,
    }
}

/// Extracts video renditions from an intercepted metadata body.
///
/// Walks the JSON looking for objects shaped like rendition entries
/// (`url` + `content_type`) and for `variants` arrays under a
/// `video_info` key. Bounded in depth and node count so a hostile or
/// degenerate body cannot stall the extraction.
pub fn variants_from_metadata(body: &str) -> Vec<RawVariant> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut budget = MAX_WALK_NODES;
    walk(&value, 0, &mut budget, &mut out);
    out
}

fn walk(value: &Value, depth: usize, budget: &mut usize, out: &mut Vec<RawVariant>) {
    if depth > MAX_WALK_DEPTH || *budget == 0 {
        return;
    }
    *budget -= 1;

    match value {
        Value::Object(map) => {
            if let Some(variant) = rendition_entry(map) {
                out.push(variant);
                return;
            }
            for child in map.values() {
                walk(child, depth + 1, budget, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                walk(child, depth + 1, budget, out);
            }
        }
        _ => {}
    }
}

/// Recognizes one rendition entry: an object carrying a video URL and its
/// content type, as emitted inside `video_info.variants` arrays.
fn rendition_entry(map: &serde_json::Map<String, Value>) -> Option<RawVariant> {
    let url = map.get("url").and_then(Value::as_str)?;
    let content_type = map.get("content_type").and_then(Value::as_str)?;
    if !content_type.starts_with("video/") {
        return None;
    }

    let (width, height) = dims_from_url(url).unwrap_or((0, 0));
    Some(RawVariant {
        url: url.to_string(),
        content_type: content_type.to_string(),
        bitrate: map.get("bitrate").and_then(Value::as_u64).unwrap_or(0),
        width,
        height,
        origin: StrategyKind::Browser,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_url_classification() {
        assert!(is_metadata_url(
            "https://x.com/i/api/graphql/abc123/TweetResultByRestId?variables=%7B%7D"
        ));
        assert!(is_metadata_url(
            "https://x.com/i/api/graphql/def456/TweetDetail?variables=%7B%7D"
        ));
        assert!(is_metadata_url(
            "https://cdn.syndication.twimg.com/tweet-result?id=123"
        ));
        assert!(is_metadata_url(
            "https://api.x.com/1.1/statuses/show.json?id=123"
        ));
        assert!(!is_metadata_url("https://x.com/i/api/graphql/abc/HomeTimeline"));
        assert!(!is_metadata_url("https://abs.twimg.com/responsive-web/main.js"));
    }

    #[test]
    fn test_media_url_classification() {
        assert!(is_media_url(
            "https://video.twimg.com/ext_tw_video/1/pu/vid/1280x720/a.mp4?tag=12"
        ));
        assert!(is_media_url("https://video.twimg.com/ext_tw_video/1/pu/pl/x.m3u8"));
        assert!(!is_media_url("https://pbs.twimg.com/media/photo.jpg"));
        assert!(!is_media_url("https://video.twimg.com/ext_tw_video_thumb/1/img/still.jpg"));
    }

    #[test]
    fn test_variant_from_media_url_reads_path_dimensions() {
        let v = variant_from_media_url(
            "https://video.twimg.com/ext_tw_video/1/pu/vid/640x360/a.mp4?tag=12",
        );
        assert_eq!((v.width, v.height), (640, 360));
        assert_eq!(v.content_type, "video/mp4");
        assert_eq!(v.origin, StrategyKind::Browser);
    }

    #[test]
    fn test_variants_found_in_nested_graphql_payload() {
        let body = r#"{
            "data": {"tweetResult": {"result": {"legacy": {"extended_entities": {"media": [{
                "video_info": {"variants": [
                    {"content_type": "application/x-mpegURL", "url": "https://video.twimg.com/pl/x.m3u8"},
                    {"bitrate": 2176000, "content_type": "video/mp4",
                     "url": "https://video.twimg.com/ext_tw_video/1/pu/vid/1280x720/b.mp4"}
                ]}
            }]}}}}}
        }"#;
        let out = variants_from_metadata(body);

        assert_eq!(out.len(), 1, "playlist entries are not renditions");
        assert_eq!(out[0].bitrate, 2_176_000);
        assert_eq!((out[0].width, out[0].height), (1280, 720));
    }

    #[test]
    fn test_walk_tolerates_junk_bodies() {
        assert!(variants_from_metadata("<!doctype html>").is_empty());
        assert!(variants_from_metadata(r#"{"data": null}"#).is_empty());
        assert!(variants_from_metadata(r#"[1, 2, [3, [4]]]"#).is_empty());
    }

    #[test]
    fn test_walk_depth_is_bounded() {
        let mut body = String::new();
        for _ in 0..200 {
            body.push_str(r#"{"a":"#);
        }
        body.push_str("1");
        for _ in 0..200 {
            body.push('}');
        }
        // serde_json's own recursion limit may reject this first; either
        // way the walk must return without finding anything.
        assert!(variants_from_metadata(&body).is_empty());
    }
}
