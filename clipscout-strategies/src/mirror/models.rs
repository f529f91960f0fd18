//! Partial wire models for the mirror API.

use serde::Deserialize;

/// A post payload from the mirror.
#[derive(Debug, Deserialize)]
pub struct MirrorResponse {
    /// Media attachments.
    #[serde(default)]
    pub media_extended: Vec<MirrorMedia>,
    /// Post text.
    #[serde(default)]
    pub text: Option<String>,
    /// Author handle without the `@`.
    #[serde(default)]
    pub user_screen_name: Option<String>,
}

/// One media attachment.
#[derive(Debug, Deserialize)]
pub struct MirrorMedia {
    /// Direct file URL.
    #[serde(default)]
    pub url: Option<String>,
    /// `"video"`, `"gif"`, or `"image"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Rendition dimensions.
    #[serde(default)]
    pub size: Option<MirrorSize>,
    /// Playback duration in milliseconds.
    #[serde(default)]
    pub duration_millis: Option<u64>,
    /// Still-frame URL.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Rendition dimensions.
#[derive(Debug, Deserialize)]
pub struct MirrorSize {
    /// Width in pixels.
    #[serde(default)]
    pub width: u32,
    /// Height in pixels.
    #[serde(default)]
    pub height: u32,
}
