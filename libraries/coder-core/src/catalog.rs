//! Catalog boundary
//!
//! The player only consumes search results; how they are fetched lives in the
//! catalog client crate.

use crate::track::Track;
use async_trait::async_trait;

/// Source of playable tracks
///
/// Implementations must never fail outward: a network or decoding problem
/// is reported as an empty list.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Search the catalog
    async fn search(&self, query: &str, credential: &str, limit: u32) -> Vec<Track>;
}
