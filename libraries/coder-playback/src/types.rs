//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback state
///
/// Exactly one is live per controller and it only changes through
/// [`crate::machine::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing playing (initial state, and where the queue runs out)
    #[default]
    Idle,

    /// Waiting for the embed to report ready
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track (also where embed failures land)
    Paused,

    /// Embed stalled waiting for data
    Buffering,

    /// Track reached its end, auto-advance pending
    Ended,
}

impl PlaybackState {
    /// Whether the UI should show a spinner
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Loading | Self::Buffering)
    }
}

/// What the user asked for, as opposed to what the embed reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Intent {
    /// Keep playing once loading settles
    Play,

    /// Stay paused once loading settles
    #[default]
    Pause,
}

impl Intent {
    /// The opposite intent
    pub fn flipped(self) -> Self {
        match self {
            Self::Play => Self::Pause,
            Self::Pause => Self::Play,
        }
    }
}

/// Elapsed time, duration, and the seek gesture flag
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressState {
    /// Seconds into the track
    pub current_time: f64,

    /// Track length in seconds as reported by the embed (0 until ready)
    pub duration: f64,

    /// A seek gesture is held; sampler writes are suppressed
    pub is_seeking: bool,
}

impl ProgressState {
    /// Fraction of the track played, 0.0 when the duration is unknown
    pub fn fraction(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Forget everything about the previous track
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial volume (0-100, default: 50)
    pub volume: u8,

    /// Progress sampling cadence in milliseconds (default: 1000)
    pub sample_interval_ms: u64,

    /// Capacity of the command channel (default: 64)
    pub command_buffer: usize,

    /// Capacity of the event broadcast channel (default: 128)
    pub event_buffer: usize,
}

impl PlayerConfig {
    /// Sampling cadence as a `Duration`
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 50,
            sample_interval_ms: 1000,
            command_buffer: 64,
            event_buffer: 128,
        }
    }
}
