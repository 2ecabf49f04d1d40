//! Playback controller - core orchestration
//!
//! Owns the queue, the authoritative playback state, progress and volume, and
//! drives one embed widget through the [`EmbedBridge`]. All state changes go
//! through [`machine::transition`] via a single dispatch loop, so an input
//! raised while another is being applied (auto-advance after `Ended`) waits
//! its turn instead of re-entering.

use crate::embed::{EmbedBridge, EmbedEvent, EmbedEventKind, EmbedWidget};
use crate::error::{PlaybackError, Result};
use crate::events::PlayerEvent;
use crate::machine::{self, Effect, Input};
use crate::queue::Queue;
use crate::sampler::{Sampler, SamplerTick, SamplerTicks, SamplerToken, SeekPointer};
use crate::session::SessionToken;
use crate::types::{Intent, PlaybackState, PlayerConfig, ProgressState};
use crate::volume::Volume;
use coder_core::{CredentialGate, Track, TrackId};
use std::collections::VecDeque;
use tracing::{debug, info, trace, warn};

/// Externally observable player state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub intent: Intent,
    pub current_track: Option<Track>,
    pub current_index: Option<usize>,
    pub queue_len: usize,
    pub progress: ProgressState,
    pub volume: Volume,
    /// Spinner flag: loading or buffering
    pub is_loading: bool,
    pub has_credential: bool,
    /// Last embed failure, cleared when a track is selected or resumed
    pub last_error: Option<PlaybackError>,
}

/// Playback session controller
///
/// Single-owner and synchronous: callers (normally [`crate::PlayerService`])
/// feed it user operations, embed events and sampler ticks one at a time.
pub struct PlaybackController<W> {
    // State
    state: PlaybackState,
    intent: Intent,
    current_track: Option<Track>,

    // Queue, progress, settings
    queue: Queue,
    progress: ProgressState,
    volume: Volume,

    // Collaborators
    bridge: EmbedBridge<W>,
    sampler: Sampler,
    sampler_token: Option<SamplerToken>,
    gate: CredentialGate,

    last_error: Option<PlaybackError>,

    // Dispatch loop
    inbox: VecDeque<Input>,
    dispatching: bool,

    // Event queue for UI synchronization
    pending_events: Vec<PlayerEvent>,
}

impl<W: EmbedWidget> PlaybackController<W> {
    /// Create a controller for `widget`
    ///
    /// Returns the channel sampler ticks arrive on; feed them back through
    /// [`PlaybackController::on_sample_tick`].
    pub fn new(config: &PlayerConfig, widget: W, gate: CredentialGate) -> (Self, SamplerTicks) {
        let (sampler, ticks) = Sampler::new(config.sample_interval());
        let controller = Self {
            state: PlaybackState::Idle,
            intent: Intent::Pause,
            current_track: None,
            queue: Queue::new(),
            progress: ProgressState::default(),
            volume: Volume::new(config.volume),
            bridge: EmbedBridge::new(widget),
            sampler,
            sampler_token: None,
            gate,
            last_error: None,
            inbox: VecDeque::new(),
            dispatching: false,
            pending_events: Vec::new(),
        };
        (controller, ticks)
    }

    // ===== Queue =====

    /// Replace the queue without touching playback
    pub fn set_queue(&mut self, tracks: Vec<Track>, focus: Option<&TrackId>) {
        self.queue.set_queue(tracks, focus);
        debug!(length = self.queue.len(), index = ?self.queue.current_index(), "Queue replaced");
        self.emit(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    // ===== Navigation =====

    /// Play `track`, optionally replacing the queue first
    ///
    /// Without a queue the pointer moves to `track` if it is already queued,
    /// otherwise back to the first entry.
    pub fn play_track(&mut self, track: Track, queue: Option<Vec<Track>>) -> Result<()> {
        self.require_credential()?;

        match queue {
            Some(tracks) => self.set_queue(tracks, Some(&track.id)),
            None => {
                self.queue.focus_or_first(&track.id);
            }
        }
        self.select_track(track);
        Ok(())
    }

    /// Skip to the next queued track
    ///
    /// No-op at the end of the queue.
    pub fn next(&mut self) -> Result<()> {
        if !self.queue.has_next() {
            trace!("next() at end of queue");
            return Ok(());
        }
        self.require_credential()?;

        if let Some(track) = self.queue.advance().cloned() {
            self.select_track(track);
        }
        Ok(())
    }

    /// Go back to the previous queued track
    ///
    /// No-op at the start of the queue.
    pub fn previous(&mut self) -> Result<()> {
        if !self.queue.has_previous() {
            trace!("previous() at start of queue");
            return Ok(());
        }
        self.require_credential()?;

        if let Some(track) = self.queue.retreat().cloned() {
            self.select_track(track);
        }
        Ok(())
    }

    /// Flip between playing and paused
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.current_track.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        match self.intent.flipped() {
            Intent::Play => self.play(),
            Intent::Pause => self.pause(),
        }
    }

    /// Resume (or restart) the current track
    pub fn play(&mut self) -> Result<()> {
        let Some(track) = self.current_track.clone() else {
            return Err(PlaybackError::NoTrackLoaded);
        };
        self.require_credential()?;

        match self.state {
            PlaybackState::Paused if self.bridge.is_ready() => {
                self.intent = Intent::Play;
                self.last_error = None;
                self.dispatch(Input::UserPlay);
            }
            // Never got ready (failed load) or already finished: load it again
            PlaybackState::Paused | PlaybackState::Idle | PlaybackState::Ended => {
                self.select_track(track);
            }
            PlaybackState::Loading | PlaybackState::Buffering => {
                self.intent = Intent::Play;
            }
            PlaybackState::Playing => {}
        }
        Ok(())
    }

    /// Pause the current track
    pub fn pause(&mut self) -> Result<()> {
        if self.current_track.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        self.intent = Intent::Pause;
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Buffering) {
            self.dispatch(Input::UserPause);
        }
        Ok(())
    }

    // ===== Seeking =====

    /// Pointer pressed on the progress control
    ///
    /// Returns `false` when nothing is seekable yet.
    pub fn seek_press(&mut self, pointer: SeekPointer) -> bool {
        if self.current_track.is_none() {
            return false;
        }
        let Some(target) = pointer.target(self.progress.duration) else {
            return false;
        };
        self.progress.is_seeking = true;
        self.apply_seek(target);
        true
    }

    /// Pointer moved while pressed (live scrubbing)
    pub fn seek_move(&mut self, pointer: SeekPointer) -> bool {
        if !self.progress.is_seeking {
            return false;
        }
        match pointer.target(self.progress.duration) {
            Some(target) => {
                self.apply_seek(target);
                true
            }
            None => false,
        }
    }

    /// Pointer released or left the control
    ///
    /// Sampling resumes on the next natural tick.
    pub fn seek_release(&mut self) {
        self.progress.is_seeking = false;
    }

    /// Jump to an absolute position
    pub fn seek_to(&mut self, seconds: f64) -> bool {
        if self.current_track.is_none() || self.progress.duration <= 0.0 || !seconds.is_finite() {
            return false;
        }
        self.apply_seek(seconds.clamp(0.0, self.progress.duration));
        true
    }

    fn apply_seek(&mut self, target: f64) {
        self.bridge.seek_to(target);
        self.progress.current_time = target;
        self.emit_position();
    }

    // ===== Volume =====

    /// Set volume level (0-100); does not unmute
    pub fn set_volume(&mut self, level: u8) {
        self.volume.set_level(level);
        self.push_volume();
    }

    pub fn mute(&mut self) {
        self.volume.mute();
        self.push_volume();
    }

    pub fn unmute(&mut self) {
        self.volume.unmute();
        self.push_volume();
    }

    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.push_volume();
    }

    fn push_volume(&mut self) {
        if self.current_track.is_some() {
            self.bridge.set_volume(self.volume.effective_level());
        }
        self.emit(PlayerEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }

    // ===== Inbound =====

    /// Apply a widget callback
    ///
    /// Callbacks for superseded sessions are dropped without effect.
    pub fn handle_embed_event(&mut self, event: EmbedEvent) {
        let Some(kind) = self.bridge.accept(event) else {
            return;
        };

        match kind {
            EmbedEventKind::Ready { duration } => {
                // Ask the widget when the callback carries no usable length
                self.progress.duration = if duration.is_finite() && duration > 0.0 {
                    duration
                } else {
                    self.bridge.duration()
                };
                self.emit(PlayerEvent::DurationChanged {
                    duration: self.progress.duration,
                });
                self.dispatch(Input::EmbedReady);
            }
            EmbedEventKind::StateChanged(state) => {
                self.dispatch(Input::EmbedState(state));
            }
            EmbedEventKind::Error { code } => {
                if machine::transition(self.state, self.intent, Input::EmbedFailed).is_none() {
                    debug!(%code, state = ?self.state, "Ignoring embed error");
                    return;
                }
                warn!(
                    track_id = ?self.current_track.as_ref().map(|t| t.id.as_str()),
                    %code,
                    "Embed reported an error"
                );
                let error = PlaybackError::Embed { code };
                self.intent = Intent::Pause;
                self.emit(PlayerEvent::Error {
                    message: error.to_string(),
                    retryable: error.is_retryable(),
                });
                self.last_error = Some(error);
                self.dispatch(Input::EmbedFailed);
            }
        }
    }

    /// Apply a sampler tick
    ///
    /// Ticks from a cancelled run, while not playing, or during a seek
    /// gesture change nothing.
    pub fn on_sample_tick(&mut self, tick: SamplerTick) {
        if !self.sampler.is_live(tick.token()) {
            trace!("Dropping tick from stopped sampler");
            return;
        }
        if self.state != PlaybackState::Playing || self.progress.is_seeking {
            return;
        }
        self.progress.current_time = self.bridge.current_time();
        self.emit_position();
    }

    /// React to the credential gate opening or closing
    ///
    /// Closing pauses playback; opening only re-enables the controls.
    pub fn credential_changed(&mut self, open: bool) {
        if open {
            info!("Credential available, playback enabled");
            return;
        }
        if self.intent == Intent::Play && self.current_track.is_some() {
            info!("Credential removed, pausing playback");
            let _ = self.pause();
        }
    }

    /// Tear down: stop sampling and orphan every in-flight embed callback
    pub fn unmount(&mut self) {
        self.supersede_session(None);
        self.intent = Intent::Pause;
        self.dispatch(Input::Unmounted);
        debug!("Playback controller unmounted");
    }

    // ===== Reads =====

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn progress(&self) -> ProgressState {
        self.progress
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    /// Session the embed is currently bound to
    pub fn session(&self) -> SessionToken {
        self.bridge.session()
    }

    /// Whether a sampler run is live
    pub fn is_sampling(&self) -> bool {
        self.sampler.is_running()
    }

    /// Token of the live sampler run
    pub fn sampler_token(&self) -> Option<SamplerToken> {
        self.sampler.live_token()
    }

    /// The wrapped widget
    pub fn widget(&self) -> &W {
        self.bridge.widget()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state,
            intent: self.intent,
            current_track: self.current_track.clone(),
            current_index: self.queue.current_index(),
            queue_len: self.queue.len(),
            progress: self.progress,
            volume: self.volume,
            is_loading: self.state.is_loading(),
            has_credential: self.gate.has_credential(),
            last_error: self.last_error.clone(),
        }
    }

    /// Take the events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internals =====

    fn require_credential(&self) -> Result<()> {
        if self.gate.has_credential() {
            Ok(())
        } else {
            debug!("Playback refused: no credential");
            Err(PlaybackError::CredentialRequired)
        }
    }

    /// Make `track` current through a direct user selection
    fn select_track(&mut self, track: Track) {
        info!(track_id = %track.id, title = %track.title, "Selecting track");
        self.supersede_session(Some(&track));
        self.intent = Intent::Play;
        self.last_error = None;
        self.dispatch(Input::TrackSelected);
    }

    /// End the current session and, with `track`, begin the next one
    ///
    /// Cancels the sampler, invalidates every in-flight embed command and
    /// callback, and drops any held seek gesture in one step.
    fn supersede_session(&mut self, track: Option<&Track>) {
        self.stop_sampler();
        self.progress.is_seeking = false;

        match track {
            Some(track) => {
                self.bridge.load(&track.id);
                self.bridge.set_volume(self.volume.effective_level());

                let previous = self.current_track.replace(track.clone());
                self.emit(PlayerEvent::TrackChanged {
                    track_id: track.id.clone(),
                    previous_track_id: previous.map(|t| t.id),
                });
            }
            None => {
                self.bridge.invalidate();
            }
        }
    }

    fn dispatch(&mut self, input: Input) {
        self.inbox.push_back(input);
        if self.dispatching {
            return;
        }

        self.dispatching = true;
        while let Some(input) = self.inbox.pop_front() {
            self.step(input);
        }
        self.dispatching = false;
    }

    fn step(&mut self, input: Input) {
        let Some(transition) = machine::transition(self.state, self.intent, input) else {
            trace!(state = ?self.state, ?input, "Input ignored");
            return;
        };

        let from = self.state;
        self.state = transition.to;
        if from != transition.to {
            debug!(?from, to = ?transition.to, ?input, "Playback state changed");
            self.emit(PlayerEvent::StateChanged {
                state: transition.to,
            });
        }

        for effect in transition.effects {
            self.run_effect(*effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::StartSampler => self.start_sampler(),
            Effect::StopSampler => self.stop_sampler(),
            Effect::IssuePlay => self.bridge.play(),
            Effect::IssuePause => self.bridge.pause(),
            Effect::SeekToStart => self.bridge.seek_to(0.0),
            Effect::ResetProgress => {
                self.progress.reset();
                self.emit_position();
            }
            Effect::AutoAdvance => self.auto_advance(),
        }
    }

    /// Resolve "next" against the queue as it is now
    fn auto_advance(&mut self) {
        if let Some(finished) = &self.current_track {
            self.pending_events.push(PlayerEvent::TrackFinished {
                track_id: finished.id.clone(),
            });
        }

        let next = if self.gate.has_credential() {
            self.queue.advance().cloned()
        } else {
            None
        };

        match next {
            Some(track) => {
                info!(track_id = %track.id, "Auto-advancing");
                self.supersede_session(Some(&track));
                self.intent = Intent::Play;
                self.dispatch(Input::AdvanceSucceeded);
            }
            None => {
                info!("Reached end of queue");
                self.intent = Intent::Pause;
                self.emit(PlayerEvent::QueueExhausted);
                self.dispatch(Input::AdvanceExhausted);
            }
        }
    }

    fn start_sampler(&mut self) {
        self.sampler_token = Some(self.sampler.start());
    }

    fn stop_sampler(&mut self) {
        if let Some(token) = self.sampler_token.take() {
            self.sampler.stop(token);
        }
    }

    fn emit_position(&mut self) {
        self.emit(PlayerEvent::PositionUpdate {
            current_time: self.progress.current_time,
            duration: self.progress.duration,
        });
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.pending_events.push(event);
    }
}
