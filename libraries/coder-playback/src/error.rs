//! Error types for playback management

use crate::embed::EmbedErrorCode;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Playback needs a catalog credential first
    #[error("Credential required before playback")]
    CredentialRequired,

    /// The embed reported a failure for the current track
    ///
    /// Retryable: the controller is left paused on the same track.
    #[error("Embed error: {code}")]
    Embed {
        /// Error reported by the widget
        code: EmbedErrorCode,
    },

    /// The embed reported a state code outside the known set
    #[error("Unknown embed state code: {0}")]
    UnknownEmbedState(i32),

    /// The player service task is no longer running
    #[error("Player service stopped")]
    ServiceStopped,
}

impl PlaybackError {
    /// Whether retrying the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Embed { .. } | Self::CredentialRequired)
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
