//! Partial wire models for the status metadata endpoint.
//!
//! Only the fields the extractor reads are modeled; everything else in the
//! (large) status payload is ignored by serde.

use serde::Deserialize;

/// A status payload from `statuses/show.json`.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    /// Media attachments, present when the post carries video or images.
    #[serde(default)]
    pub extended_entities: Option<StatusEntities>,
    /// The posting account.
    #[serde(default)]
    pub user: Option<StatusUser>,
    /// Post text in extended mode.
    #[serde(default)]
    pub full_text: Option<String>,
}

/// The media attachment list.
#[derive(Debug, Deserialize)]
pub struct StatusEntities {
    /// Media entities attached to the post.
    #[serde(default)]
    pub media: Vec<MediaEntity>,
}

/// One attached media entity.
#[derive(Debug, Deserialize)]
pub struct MediaEntity {
    /// `"video"`, `"animated_gif"`, or `"photo"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Still-frame URL, used as the thumbnail.
    #[serde(default)]
    pub media_url_https: Option<String>,
    /// Video renditions, absent for photos.
    #[serde(default)]
    pub video_info: Option<VideoInfo>,
    /// Source media dimensions.
    #[serde(default)]
    pub original_info: Option<OriginalInfo>,
}

/// Rendition list plus playback metadata.
#[derive(Debug, Deserialize)]
pub struct VideoInfo {
    /// Playback duration in milliseconds.
    #[serde(default)]
    pub duration_millis: Option<u64>,
    /// Available renditions.
    #[serde(default)]
    pub variants: Vec<ApiVariant>,
}

/// One rendition entry.
#[derive(Debug, Deserialize)]
pub struct ApiVariant {
    /// CDN file URL.
    pub url: String,
    /// MIME type; playlists are `application/x-mpegURL`.
    pub content_type: String,
    /// Bitrate in bits per second, absent for playlists.
    #[serde(default)]
    pub bitrate: Option<u64>,
}

/// Source media dimensions, the fallback when the URL encodes none.
#[derive(Debug, Deserialize)]
pub struct OriginalInfo {
    /// Width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
}

/// The posting account.
#[derive(Debug, Deserialize)]
pub struct StatusUser {
    /// Handle without the `@`.
    pub screen_name: String,
}

/// Error envelope the API returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Error entries, usually one.
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

/// One API error entry.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}
