//! Coder Music - Playback Session Controller
//!
//! Drives an embedded third-party video widget as a music player.
//!
//! This crate provides:
//! - Track queue with a current-position pointer (no wrap-around)
//! - Explicit playback state machine (idle, loading, playing, paused, buffering, ended)
//! - Session tokens so callbacks from a superseded track are ignored
//! - Progress sampling on a fixed cadence, paused during seek gestures
//! - Volume and mute
//! - Auto-advance to the next queued track
//!
//! # Architecture
//!
//! The widget is reached only through the [`EmbedWidget`] trait and reports
//! back through an [`EmbedEventSender`]. [`PlaybackController`] is the
//! synchronous core; [`PlayerService`] runs it on a Tokio task and exposes a
//! cloneable [`PlayerHandle`].
//!
//! # Example
//!
//! ```rust
//! use coder_core::{CredentialGate, Track};
//! use coder_playback::{
//!     EmbedWidget, PlaybackController, PlaybackState, PlayerConfig, SessionToken,
//! };
//!
//! #[derive(Default)]
//! struct NullWidget {
//!     loaded: Option<String>,
//! }
//!
//! impl EmbedWidget for NullWidget {
//!     fn load(&mut self, video_id: &str, _session: SessionToken) {
//!         self.loaded = Some(video_id.to_string());
//!     }
//!     fn play(&mut self) {}
//!     fn pause(&mut self) {}
//!     fn seek_to(&mut self, _seconds: f64) {}
//!     fn set_volume(&mut self, _level: u8) {}
//!     fn current_time(&self) -> f64 { 0.0 }
//!     fn duration(&self) -> f64 { 0.0 }
//! }
//!
//! let gate = CredentialGate::with_credential("key");
//! let (mut player, _ticks) =
//!     PlaybackController::new(&PlayerConfig::default(), NullWidget::default(), gate);
//!
//! let tracks = vec![Track::new("a", "First"), Track::new("b", "Second")];
//! player.play_track(tracks[1].clone(), Some(tracks)).unwrap();
//!
//! assert_eq!(player.state(), PlaybackState::Loading);
//! assert_eq!(player.queue().current_index(), Some(1));
//! assert_eq!(player.widget().loaded.as_deref(), Some("b"));
//! ```

mod controller;
mod embed;
mod error;
mod events;
pub mod machine;
mod queue;
mod sampler;
mod service;
mod session;
pub mod types;
mod volume;

// Public exports
pub use controller::{PlaybackController, PlayerSnapshot};
pub use embed::{
    event_channel, EmbedBridge, EmbedErrorCode, EmbedEvent, EmbedEventKind, EmbedEventSender,
    EmbedStateKind, EmbedWidget,
};
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use queue::Queue;
pub use sampler::{format_time, Sampler, SamplerTick, SamplerTicks, SamplerToken, SeekPointer};
pub use service::{PlayerCommand, PlayerHandle, PlayerService};
pub use session::{SessionCounter, SessionToken};
pub use types::{Intent, PlaybackState, PlayerConfig, ProgressState};
pub use volume::Volume;
