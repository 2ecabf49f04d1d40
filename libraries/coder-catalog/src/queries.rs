//! Curated searches and playlists for coding sessions.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Search phrases that reliably return music to code to.
pub const CODING_QUERIES: &[&str] = &[
    "coding music lofi",
    "programming ambient music",
    "focus music for developers",
    "lo-fi hip hop study",
    "electronic music coding",
    "ambient programming",
    "deep work music",
    "concentration music",
];

/// Pick one of [`CODING_QUERIES`] at random.
pub fn random_coding_query() -> &'static str {
    CODING_QUERIES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(CODING_QUERIES[0])
}

/// Preset playlists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodingPlaylist {
    Lofi,
    Electronic,
    Classical,
    Ambient,
    Focus,
}

impl CodingPlaylist {
    pub const ALL: [Self; 5] = [
        Self::Lofi,
        Self::Electronic,
        Self::Classical,
        Self::Ambient,
        Self::Focus,
    ];

    /// Catalog playlist id
    pub fn playlist_id(self) -> &'static str {
        match self {
            Self::Lofi => "PLwkxNyWJmTe6QVJGRVNhM9RdWJ6_C1o8D",
            Self::Electronic => "PLOzDu-MXXLliO9fBNZOQTBDddoA3FzZUo",
            Self::Classical => "PLYgJ6tTaBOWHU93L5B8qVKYwCaJa1Fjjh",
            Self::Ambient => "PLcIuTiT3fU31Q-b0xqreCJzJcNJUILq-C",
            Self::Focus => "PLNS3c0cF-mWC8X5dwBNuzjVPCb7lgGMy6",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Lofi => "lofi",
            Self::Electronic => "electronic",
            Self::Classical => "classical",
            Self::Ambient => "ambient",
            Self::Focus => "focus",
        }
    }
}

impl fmt::Display for CodingPlaylist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodingPlaylist {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown playlist preset: {}", s))
    }
}
