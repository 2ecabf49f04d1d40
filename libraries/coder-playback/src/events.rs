//! Player events
//!
//! Event-based communication for UI synchronization during playback.
//! Events are emitted at key points:
//! - State changes (loading/playing/paused/...)
//! - Track changes (selection, navigation, auto-advance)
//! - Position updates (sampler ticks and seek gestures)
//! - Volume and queue changes

use crate::types::PlaybackState;
use coder_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Playback state changed
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// A different track became current
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Track finished playing naturally (reached end)
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Auto-advance found no next track
    QueueExhausted,

    /// Elapsed time changed
    PositionUpdate {
        /// Seconds into the track
        current_time: f64,
        /// Track length in seconds
        duration: f64,
    },

    /// Embed reported the authoritative duration
    DurationChanged {
        /// Track length in seconds
        duration: f64,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0-100)
        level: u8,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Queue replaced
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Error occurred during playback
    Error {
        /// Error message
        message: String,
        /// Whether playing again may succeed
        retryable: bool,
    },
}
