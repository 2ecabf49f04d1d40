//! Track domain type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog video identifier
///
/// Opaque to the player; two tracks are the same track when their ids match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Create a new track ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A playable catalog entry
///
/// Created by the catalog client and never modified afterwards. The
/// `duration` here is for display only; the embed reports the real one
/// once the video is ready.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Catalog identifier
    pub id: TrackId,

    /// Video title
    pub title: String,

    /// Medium-size thumbnail
    pub thumbnail_url: String,

    /// Uploading channel
    pub channel_title: String,

    /// Formatted duration (e.g. "3:05"), empty when the catalog did not report one
    pub duration: String,

    /// Raw view count as reported by the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<String>,

    /// Upload date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Track {
    /// Create a track with only an id and title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(id),
            title: title.into(),
            thumbnail_url: String::new(),
            channel_title: String::new(),
            duration: String::new(),
            view_count: None,
            published_at: None,
        }
    }

    /// Set the channel title
    pub fn with_channel(mut self, channel_title: impl Into<String>) -> Self {
        self.channel_title = channel_title.into();
        self
    }

    /// Set the thumbnail URL
    pub fn with_thumbnail(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = thumbnail_url.into();
        self
    }

    /// Set the display duration
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }
}
