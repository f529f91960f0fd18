//! URL-derived media hints shared by the strategies.
//!
//! CDN file URLs encode the rendition dimensions in their path (e.g.
//! `/vid/1280x720/clip.mp4`), which is often the only resolution signal a
//! strategy gets. Extraction is best-effort; callers fall back to zero
//! dimensions when nothing matches.

use regex::Regex;
use std::sync::LazyLock;

static DIMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d{2,4})x(\d{2,4})/").expect("valid dims pattern"));

/// Extracts `{width}x{height}` from a CDN URL path segment.
pub(crate) fn dims_from_url(url: &str) -> Option<(u32, u32)> {
    let caps = DIMS_RE.captures(url)?;
    let width = caps.get(1)?.as_str().parse().ok()?;
    let height = caps.get(2)?.as_str().parse().ok()?;
    Some((width, height))
}

/// Infers a MIME content type from the URL's file extension, ignoring the
/// query string.
pub(crate) fn content_type_for_url(url: &str) -> &'static str {
    let path = url.split('?').next().unwrap_or(url);
    if path.ends_with(".mp4") {
        "video/mp4"
    } else if path.ends_with(".m3u8") {
        "application/x-mpegURL"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dims_from_cdn_path() {
        assert_eq!(
            dims_from_url("https://video.twimg.com/ext_tw_video/1/pu/vid/1280x720/abc.mp4?tag=12"),
            Some((1280, 720))
        );
        assert_eq!(
            dims_from_url("https://video.twimg.com/amplify_video/1/vid/avc1/640x360/x.mp4"),
            Some((640, 360))
        );
        assert_eq!(dims_from_url("https://video.twimg.com/pl/abc.m3u8"), None);
    }

    #[test]
    fn test_content_type_ignores_query() {
        assert_eq!(
            content_type_for_url("https://cdn/v/clip.mp4?tag=14&mx=1"),
            "video/mp4"
        );
        assert_eq!(
            content_type_for_url("https://cdn/pl/clip.m3u8"),
            "application/x-mpegURL"
        );
        assert_eq!(content_type_for_url("https://cdn/pic/x.jpg"), "application/octet-stream");
    }
}
