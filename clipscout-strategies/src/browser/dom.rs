//! DOM-level extraction for the browser strategy.
//!
//! Runs after the page settles, as the complement to network interception:
//! media URLs that were fetched before the listeners attached, or that only
//! exist as element attributes, are still visible in the rendered document.

use regex::Regex;
use std::sync::LazyLock;

use clipscout_core::RawVariant;

use super::events;

/// Matches CDN video file URLs embedded anywhere in the rendered document,
/// including JSON-escaped occurrences inside inline script tags.
static MEDIA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https://video\.twimg\.com/[^"'\s\\<>]+\.(?:mp4|m3u8)[^"'\s\\<>]*"#)
        .expect("valid media URL pattern")
});

/// Best-effort click on the player's play button, which triggers the
/// rendition fetch on pages that lazy-load video. A missing button is fine.
pub const CLICK_PLAY_JS: &str = r#"
    (() => {
        const button = document.querySelector('[data-testid="playButton"]')
            || document.querySelector('div[role="button"][aria-label*="Play"]');
        if (button) { button.click(); return true; }
        const video = document.querySelector('video');
        if (video) { video.play().catch(() => {}); return true; }
        return false;
    })()
"#;

/// Collects `src` attributes from video and source elements.
pub const COLLECT_VIDEO_SOURCES_JS: &str = r#"
    (() => {
        const urls = [];
        for (const el of document.querySelectorAll('video, video source')) {
            if (el.src) { urls.push(el.src); }
            if (el.currentSrc) { urls.push(el.currentSrc); }
        }
        return urls;
    })()
"#;

/// Scans rendered HTML for CDN video URLs.
pub fn variants_from_html(html: &str) -> Vec<RawVariant> {
    MEDIA_URL_RE
        .find_iter(html)
        .map(|m| m.as_str())
        .filter(|url| events::is_media_url(url))
        .map(events::variant_from_media_url)
        .collect()
}

/// Converts element `src` values collected in the page into variants,
/// dropping blob URLs and anything off the media CDN.
pub fn variants_from_sources(sources: Vec<String>) -> Vec<RawVariant> {
    sources
        .iter()
        .filter(|url| events::is_media_url(url))
        .map(|url| events::variant_from_media_url(url))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_finds_urls_in_markup_and_scripts() {
        let html = r#"
            <video src="https://video.twimg.com/ext_tw_video/1/pu/vid/1280x720/a.mp4?tag=12"></video>
            <script>{"playbackUrl":"https://video.twimg.com/ext_tw_video/1/pu/pl/list.m3u8"}</script>
            <img src="https://pbs.twimg.com/media/photo.jpg">
        "#;
        let out = variants_from_html(html);

        assert_eq!(out.len(), 2);
        assert!(out.iter().any(|v| v.content_type == "video/mp4" && v.width == 1280));
        assert!(out.iter().any(|v| v.content_type == "application/x-mpegURL"));
    }

    #[test]
    fn test_scan_stops_at_quote_boundaries() {
        let html = r#"<div data-x="https://video.twimg.com/a/vid/640x360/v.mp4" data-y="next">"#;
        let out = variants_from_html(html);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://video.twimg.com/a/vid/640x360/v.mp4");
    }

    #[test]
    fn test_sources_filter_blob_urls() {
        let out = variants_from_sources(vec![
            "blob:https://x.com/0a1b2c3d".to_string(),
            "https://video.twimg.com/tweet_video/g.mp4".to_string(),
        ]);

        assert_eq!(out.len(), 1);
        assert!(out[0].url.ends_with("g.mp4"));
    }

    #[test]
    fn test_empty_document() {
        assert!(variants_from_html("<html><body></body></html>").is_empty());
    }
}
