//! Strategy B: third-party read-only mirror API.

use async_trait::async_trait;
use tracing::{debug, instrument};

use clipscout_core::{ContentReference, RawVariant, ResolveError, StrategyKind};
use clipscout_resolve::{ResolveContext, ResolveStrategy, StrategyYield};

use crate::util::content_type_for_url;

use super::models::MirrorResponse;

/// Default mirror base URL.
const MIRROR_BASE: &str = "https://api.vxtwitter.com";

/// Resolves media through an unauthenticated mirror of the provider's API.
///
/// The mirror needs no credential, which makes it a genuinely independent
/// second opinion when the guest-token path is rejected or rate limited.
/// Its payloads are simpler than the provider's own: one file URL per
/// attachment, no bitrate, dimensions under `size`.
#[derive(Debug, Clone, Default)]
pub struct MirrorStrategy {
    base: String,
}

impl MirrorStrategy {
    /// Creates the strategy against the default mirror.
    pub fn new() -> Self {
        Self {
            base: MIRROR_BASE.to_string(),
        }
    }

    /// Overrides the mirror base URL (tests, self-hosted mirrors).
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    fn request_url(&self, reference: &ContentReference) -> String {
        format!(
            "{}/{}/status/{}",
            self.base, reference.handle, reference.content_id
        )
    }

    fn extract(response: MirrorResponse) -> StrategyYield {
        let mut out = StrategyYield {
            text: response.text,
            author: response.user_screen_name,
            ..StrategyYield::default()
        };

        for media in response.media_extended {
            if media.kind != "video" && media.kind != "gif" {
                continue;
            }
            let Some(url) = media.url else { continue };

            if out.thumbnail.is_none() {
                out.thumbnail = media.thumbnail_url;
            }
            if out.duration_ms.is_none() {
                out.duration_ms = media.duration_millis;
            }

            let (width, height) = media
                .size
                .map(|s| (s.width, s.height))
                .unwrap_or((0, 0));
            out.variants.push(RawVariant {
                content_type: content_type_for_url(&url).to_string(),
                url,
                bitrate: 0,
                width,
                height,
                origin: StrategyKind::MirrorApi,
            });
        }

        out
    }
}

#[async_trait]
impl ResolveStrategy for MirrorStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MirrorApi
    }

    #[instrument(skip(self, ctx), fields(content_id = %reference.content_id))]
    async fn resolve(
        &self,
        ctx: &ResolveContext,
        reference: &ContentReference,
    ) -> Result<StrategyYield, ResolveError> {
        let response = ctx
            .http
            .get_with_timeout(&self.request_url(reference), ctx.settings.mirror_timeout)
            .await?;
        let status = response.status();

        // The mirror reports both its own failures and upstream ones as
        // plain non-2xx statuses; none of them confirm content removal, so
        // they all stay recoverable.
        if !status.is_success() {
            return Err(ResolveError::Transport(format!(
                "mirror returned {status}"
            )));
        }

        let parsed: MirrorResponse = serde_json::from_str(&response.text().await?)?;
        let out = Self::extract(parsed);
        debug!(variants = out.variants.len(), "mirror response parsed");
        Ok(out)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_shape() {
        let reference = ContentReference::parse_default("https://x.com/someone/status/123456789")
            .unwrap();
        assert_eq!(
            MirrorStrategy::new().request_url(&reference),
            "https://api.vxtwitter.com/someone/status/123456789"
        );
    }

    #[test]
    fn test_extract_video_attachment() {
        let body = r#"{
            "text": "clip",
            "user_screen_name": "someone",
            "media_extended": [{
                "type": "video",
                "url": "https://video.twimg.com/ext_tw_video/1/pu/vid/1280x720/a.mp4",
                "size": {"width": 1280, "height": 720},
                "duration_millis": 9000,
                "thumbnail_url": "https://pbs.twimg.com/ext_tw_video_thumb/1/pu/img/still.jpg"
            }]
        }"#;
        let parsed: MirrorResponse = serde_json::from_str(body).unwrap();
        let out = MirrorStrategy::extract(parsed);

        assert_eq!(out.variants.len(), 1);
        assert_eq!(out.variants[0].width, 1280);
        assert_eq!(out.variants[0].content_type, "video/mp4");
        assert_eq!(out.variants[0].origin, StrategyKind::MirrorApi);
        assert_eq!(out.duration_ms, Some(9000));
        assert_eq!(out.author.as_deref(), Some("someone"));
    }

    #[test]
    fn test_extract_skips_images() {
        let body = r#"{
            "media_extended": [
                {"type": "image", "url": "https://pbs.twimg.com/media/x.jpg"},
                {"type": "gif", "url": "https://video.twimg.com/tweet_video/g.mp4"}
            ]
        }"#;
        let parsed: MirrorResponse = serde_json::from_str(body).unwrap();
        let out = MirrorStrategy::extract(parsed);

        assert_eq!(out.variants.len(), 1);
        assert!(out.variants[0].url.ends_with("g.mp4"));
    }

    #[test]
    fn test_extract_tolerates_missing_size() {
        let body = r#"{"media_extended": [{"type": "video", "url": "https://cdn/v.mp4"}]}"#;
        let parsed: MirrorResponse = serde_json::from_str(body).unwrap();
        let out = MirrorStrategy::extract(parsed);

        assert_eq!(out.variants[0].width, 0);
        assert_eq!(out.variants[0].height, 0);
    }
}
