//! Catalog client.

use crate::error::{CatalogError, Result};
use crate::format::format_duration;
use crate::types::{
    ApiErrorResponse, CatalogConfig, PlaylistItemsResponse, SearchResponse, VideosResponse,
};
use async_trait::async_trait;
use coder_core::{CredentialGate, Track, TrackCatalog};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

/// Music video category of the data API.
const MUSIC_CATEGORY: &str = "10";

/// Largest page the data API serves.
const MAX_PAGE: u32 = 50;

/// Default number of playlist entries fetched.
pub const DEFAULT_PLAYLIST_LIMIT: u32 = 50;

/// Client for the video data API.
///
/// The API key is passed per call so the same client can follow a
/// [`CredentialGate`] as the key changes.
///
/// # Example
///
/// ```ignore
/// use coder_catalog::{CatalogClient, CatalogConfig};
///
/// let client = CatalogClient::new(CatalogConfig::default())?;
/// let tracks = client.search("lo-fi hip hop study", "my-api-key", 10).await;
/// for track in tracks {
///     println!("{} ({})", track.title, track.duration);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
    max_results: u32,
}

impl CatalogClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(CatalogError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(format!("CoderMusic/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            max_results: config.max_results,
        })
    }

    /// Get the API root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Page size used when a caller passes a limit of 0.
    pub fn default_limit(&self) -> u32 {
        self.max_results
    }

    /// Search for music videos.
    ///
    /// Issues a search request followed by one details request for durations
    /// and view counts. Details are matched to results by video id; results
    /// the details request did not cover keep an empty duration.
    pub async fn try_search(
        &self,
        query: &str,
        credential: &str,
        limit: u32,
    ) -> Result<Vec<Track>> {
        let credential = require_credential(credential)?;
        let limit = self.page_size(limit);

        debug!(query = %query, limit, "Searching catalog");

        let search: SearchResponse = self
            .get_json(
                "search",
                &[
                    ("part", "snippet".to_string()),
                    ("q", query.to_string()),
                    ("type", "video".to_string()),
                    ("maxResults", limit.to_string()),
                    ("key", credential.to_string()),
                    ("videoCategoryId", MUSIC_CATEGORY.to_string()),
                ],
            )
            .await?;

        let results: Vec<(String, _)> = search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id.map(|id| (id, item.snippet)))
            .collect();

        if results.is_empty() {
            debug!(query = %query, "Search returned no videos");
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        let details: VideosResponse = self
            .get_json(
                "videos",
                &[
                    ("part", "contentDetails,statistics".to_string()),
                    ("id", ids.join(",")),
                    ("key", credential.to_string()),
                ],
            )
            .await?;
        let mut details = details.by_id();

        let tracks: Vec<Track> = results
            .into_iter()
            .map(|(id, snippet)| {
                let detail = details.remove(&id);
                let mut track = snippet.into_track(id);
                if let Some(detail) = detail {
                    track.duration = detail
                        .content_details
                        .and_then(|c| c.duration)
                        .map(|d| format_duration(&d))
                        .unwrap_or_default();
                    track.view_count = detail.statistics.and_then(|s| s.view_count);
                }
                track
            })
            .collect();

        info!(query = %query, count = tracks.len(), "Catalog search complete");
        Ok(tracks)
    }

    /// Search for music videos, reporting any failure as no results.
    pub async fn search(&self, query: &str, credential: &str, limit: u32) -> Vec<Track> {
        match self.try_search(query, credential, limit).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(query = %query, error = %e, "Catalog search failed");
                Vec::new()
            }
        }
    }

    /// Search only while the gate holds a credential.
    pub async fn search_gated(&self, gate: &CredentialGate, query: &str, limit: u32) -> Vec<Track> {
        match gate.credential() {
            Some(credential) => self.search(query, &credential, limit).await,
            None => {
                debug!(query = %query, "Search skipped: no credential");
                Vec::new()
            }
        }
    }

    /// Fetch the videos of a playlist.
    ///
    /// Entries without a video id (deleted or private videos) are skipped.
    /// Playlist entries carry no duration.
    pub async fn try_playlist_videos(
        &self,
        playlist_id: &str,
        credential: &str,
        limit: u32,
    ) -> Result<Vec<Track>> {
        let credential = require_credential(credential)?;
        let limit = if limit == 0 {
            DEFAULT_PLAYLIST_LIMIT
        } else {
            limit.min(MAX_PAGE)
        };

        debug!(playlist_id = %playlist_id, limit, "Fetching playlist");

        let playlist: PlaylistItemsResponse = self
            .get_json(
                "playlistItems",
                &[
                    ("part", "snippet".to_string()),
                    ("playlistId", playlist_id.to_string()),
                    ("maxResults", limit.to_string()),
                    ("key", credential.to_string()),
                ],
            )
            .await?;

        let tracks: Vec<Track> = playlist
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.snippet.resource_id.as_ref()?.video_id.clone()?;
                Some(item.snippet.into_track(id))
            })
            .collect();

        debug!(playlist_id = %playlist_id, count = tracks.len(), "Fetched playlist");
        Ok(tracks)
    }

    /// Fetch the videos of a playlist, reporting any failure as an empty list.
    pub async fn playlist_videos(
        &self,
        playlist_id: &str,
        credential: &str,
        limit: u32,
    ) -> Vec<Track> {
        match self.try_playlist_videos(playlist_id, credential, limit).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(playlist_id = %playlist_id, error = %e, "Playlist fetch failed");
                Vec::new()
            }
        }
    }

    fn page_size(&self, limit: u32) -> u32 {
        let limit = if limit == 0 { self.max_results } else { limit };
        limit.clamp(1, MAX_PAGE)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.http.get(&url).query(params).send().await?;
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                CatalogError::ParseError(format!("Failed to parse {} response: {}", endpoint, e))
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            Err(CatalogError::ServerError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl TrackCatalog for CatalogClient {
    async fn search(&self, query: &str, credential: &str, limit: u32) -> Vec<Track> {
        CatalogClient::search(self, query, credential, limit).await
    }
}

fn require_credential(credential: &str) -> Result<&str> {
    let credential = credential.trim();
    if credential.is_empty() {
        Err(CatalogError::CredentialRequired)
    } else {
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let client = CatalogClient::new(CatalogConfig::new("https://api.example.com/v3/")).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/v3");
    }

    #[test]
    fn invalid_urls_are_rejected() {
        for url in ["", "not a url", "ftp://example.com"] {
            assert!(matches!(
                CatalogClient::new(CatalogConfig::new(url)),
                Err(CatalogError::InvalidUrl(_))
            ));
        }
    }

    #[test]
    fn page_size_is_bounded() {
        let client = CatalogClient::new(CatalogConfig::default()).unwrap();
        assert_eq!(client.page_size(0), 20);
        assert_eq!(client.page_size(5), 5);
        assert_eq!(client.page_size(500), 50);
    }
}
