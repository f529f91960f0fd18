//! Content reference parsing.
//!
//! A [`ContentReference`] is the canonical identity of a post: the author
//! handle plus the numeric content id. Parsing is a pure function of the
//! input URL and the host allow-list; no network access happens here.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::error::ResolveError;

/// Hosts accepted by default for post URLs.
pub const DEFAULT_ALLOWED_HOSTS: &[&str] = &[
    "twitter.com",
    "www.twitter.com",
    "mobile.twitter.com",
    "x.com",
    "www.x.com",
];

// ============================================================================
// Content Reference
// ============================================================================

/// Canonical identifier for a post, parsed from a public URL.
///
/// Immutable once parsed; consumed by every strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentReference {
    /// Author handle (the path segment before `/status/`).
    pub handle: String,
    /// Numeric content id.
    pub content_id: String,
}

impl ContentReference {
    /// Parses a free-form URL string into a reference.
    ///
    /// The URL must use one of the allowed hosts and match the shape
    /// `/<handle>/status/<numeric-id>`. Trailing segments (e.g. `/video/1`)
    /// and query strings are tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidReference`] on any mismatch.
    pub fn parse(input: &str, allowed_hosts: &[impl AsRef<str>]) -> Result<Self, ResolveError> {
        let url = Url::parse(input.trim())
            .map_err(|e| ResolveError::InvalidReference(format!("not a URL: {e}")))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ResolveError::InvalidReference(format!(
                    "unsupported scheme: {other}"
                )));
            }
        }

        let host = url
            .host_str()
            .ok_or_else(|| ResolveError::InvalidReference("URL has no host".to_string()))?;

        if !allowed_hosts.iter().any(|h| h.as_ref() == host) {
            return Err(ResolveError::InvalidReference(format!(
                "host not recognized: {host}"
            )));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        // Expected shape: /<handle>/status/<id>[/...]
        let (handle, id) = match segments.as_slice() {
            [handle, marker, id, ..] if *marker == "status" || *marker == "statuses" => {
                (*handle, *id)
            }
            _ => {
                return Err(ResolveError::InvalidReference(format!(
                    "path does not name a post: {}",
                    url.path()
                )));
            }
        };

        if handle.is_empty() || handle.starts_with('@') && handle.len() == 1 {
            return Err(ResolveError::InvalidReference(
                "empty author handle".to_string(),
            ));
        }

        let handle = handle.trim_start_matches('@');
        if handle.is_empty() {
            return Err(ResolveError::InvalidReference(
                "empty author handle".to_string(),
            ));
        }

        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ResolveError::InvalidReference(format!(
                "content id is not numeric: {id}"
            )));
        }

        Ok(Self {
            handle: handle.to_string(),
            content_id: id.to_string(),
        })
    }

    /// Parses using the default host allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidReference`] on any mismatch.
    pub fn parse_default(input: &str) -> Result<Self, ResolveError> {
        Self::parse(input, DEFAULT_ALLOWED_HOSTS)
    }

    /// Rebuilds the canonical page URL for this reference.
    pub fn canonical_url(&self) -> String {
        format!("https://x.com/{}/status/{}", self.handle, self.content_id)
    }
}

impl fmt::Display for ContentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.handle, self.content_id)
    }
}

// ============================================================================
// Tests
// ============================================================================
