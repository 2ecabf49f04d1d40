//! Coder Music Catalog Client
//!
//! HTTP client for the video data API that backs Coder Music.
//!
//! # Features
//!
//! - **Search**: music-category video search with durations and view counts
//! - **Playlists**: fetch the entries of a playlist, including curated presets
//! - **Formatting**: ISO-8601 durations and view counts for display
//!
//! Every lookup has a fallible `try_` form and an infallible form that logs
//! the failure and returns an empty list.
//!
//! # Example
//!
//! ```ignore
//! use coder_catalog::{CatalogClient, CatalogConfig, CodingPlaylist};
//! use coder_core::CredentialGate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CatalogClient::new(CatalogConfig::default())?;
//!     let gate = CredentialGate::with_credential("my-api-key");
//!
//!     let tracks = client.search_gated(&gate, "deep work music", 10).await;
//!     println!("Found {} tracks", tracks.len());
//!
//!     let key = gate.credential().unwrap_or_default();
//!     let lofi = client
//!         .playlist_videos(CodingPlaylist::Lofi.playlist_id(), &key, 0)
//!         .await;
//!     println!("Lo-fi preset has {} tracks", lofi.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod format;
mod queries;
mod types;

pub use client::{CatalogClient, DEFAULT_PLAYLIST_LIMIT};
pub use error::{CatalogError, Result};
pub use format::{duration_secs, format_duration, format_view_count};
pub use queries::{random_coding_query, CodingPlaylist, CODING_QUERIES};
pub use types::CatalogConfig;
