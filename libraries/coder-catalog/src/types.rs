//! Types for the catalog client.

use chrono::{DateTime, Utc};
use coder_core::Track;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Catalog connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the data API (default: `https://www.googleapis.com/youtube/v3`)
    pub base_url: String,

    /// Results requested per search (default: 20)
    pub max_results: u32,

    /// Whole-request timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Connect timeout in seconds (default: 10)
    pub connect_timeout_secs: u64,
}

impl CatalogConfig {
    /// Create a config pointing at a different API root.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            max_results: 20,
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

// ===== Wire types =====

/// Response from `GET /search`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchItem {
    pub id: SearchItemId,
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchItemId {
    pub video_id: Option<String>,
}

/// Response from `GET /videos`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VideosResponse {
    #[serde(default)]
    pub items: Vec<VideoDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoDetails {
    pub id: String,
    pub content_details: Option<ContentDetails>,
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContentDetails {
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Statistics {
    pub view_count: Option<String>,
}

/// Response from `GET /playlistItems`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlaylistItemsResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlaylistItem {
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    pub published_at: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Thumbnails {
    pub medium: Option<Thumbnail>,
    pub default: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceId {
    pub video_id: Option<String>,
}

/// Error body returned by the data API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub message: String,
}

impl Snippet {
    /// Build a track for `video_id` from this snippet.
    pub(crate) fn into_track(self, video_id: String) -> Track {
        let thumbnail_url = self
            .thumbnails
            .medium
            .or(self.thumbnails.default)
            .map(|t| t.url)
            .unwrap_or_default();

        let mut track = Track::new(video_id, self.title)
            .with_channel(self.channel_title)
            .with_thumbnail(thumbnail_url);
        track.published_at = self
            .published_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        track
    }
}

impl VideosResponse {
    /// Index details by video id.
    pub(crate) fn by_id(self) -> HashMap<String, VideoDetails> {
        self.items
            .into_iter()
            .map(|details| (details.id.clone(), details))
            .collect()
    }
}
