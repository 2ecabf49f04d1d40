//! Embed bridge
//!
//! The only code that talks to the embedded video widget. Outbound commands
//! are tagged with the session they were issued in and held back until the
//! widget reports ready. Inbound callbacks travel through an
//! [`EmbedEventSender`] channel, so a widget can never call back into the
//! controller while a transition is running, and are dropped when their
//! session has been superseded.

use crate::error::PlaybackError;
use crate::session::{SessionCounter, SessionToken};
use coder_core::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// Control surface of the embedded widget
///
/// Implemented by the platform glue (or a fake in tests). Callbacks are not
/// part of the trait: the widget reports them through the
/// [`EmbedEventSender`] it was constructed with, tagging each one with the
/// session passed to [`EmbedWidget::load`].
#[cfg_attr(test, mockall::automock)]
pub trait EmbedWidget {
    /// Cue a video; events for it must carry `session`
    fn load(&mut self, video_id: &str, session: SessionToken);

    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Jump to a position in seconds
    fn seek_to(&mut self, seconds: f64);

    /// Set the output level (0-100)
    fn set_volume(&mut self, level: u8);

    /// Elapsed seconds
    fn current_time(&self) -> f64;

    /// Track length in seconds (0 until ready)
    fn duration(&self) -> f64;
}

/// Player state reported by the widget
///
/// Wire codes: unstarted=-1, ended=0, playing=1, paused=2, buffering=3.
/// The widget's "cued" code (5) is folded into `Unstarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedStateKind {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
}

impl EmbedStateKind {
    /// Numeric code used by the widget
    pub fn code(self) -> i32 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
        }
    }
}

impl TryFrom<i32> for EmbedStateKind {
    type Error = PlaybackError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            -1 | 5 => Ok(Self::Unstarted),
            0 => Ok(Self::Ended),
            1 => Ok(Self::Playing),
            2 => Ok(Self::Paused),
            3 => Ok(Self::Buffering),
            other => Err(PlaybackError::UnknownEmbedState(other)),
        }
    }
}

/// Failure reported by the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedErrorCode {
    /// Malformed video id (2)
    InvalidParameter,
    /// HTML5 player failure (5)
    Html5,
    /// Video removed or private (100)
    NotFound,
    /// Owner does not allow embedding (101 or 150)
    EmbeddingDisallowed(i32),
    /// Anything else
    Other(i32),
}

impl EmbedErrorCode {
    /// Classify a raw widget error code
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => Self::InvalidParameter,
            5 => Self::Html5,
            100 => Self::NotFound,
            101 | 150 => Self::EmbeddingDisallowed(code),
            other => Self::Other(other),
        }
    }

    /// Raw widget error code
    pub fn code(self) -> i32 {
        match self {
            Self::InvalidParameter => 2,
            Self::Html5 => 5,
            Self::NotFound => 100,
            Self::EmbeddingDisallowed(code) | Self::Other(code) => code,
        }
    }
}

impl fmt::Display for EmbedErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid video id (2)"),
            Self::Html5 => write!(f, "HTML5 player error (5)"),
            Self::NotFound => write!(f, "video not found (100)"),
            Self::EmbeddingDisallowed(code) => write!(f, "embedding not allowed ({})", code),
            Self::Other(code) => write!(f, "error code {}", code),
        }
    }
}

/// Callback payload from the widget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EmbedEventKind {
    /// Enough is buffered to know the real duration
    Ready {
        /// Duration in seconds
        duration: f64,
    },

    /// Player state changed
    StateChanged(EmbedStateKind),

    /// Playback failed
    Error {
        /// Classified widget error
        code: EmbedErrorCode,
    },
}

/// Widget callback tagged with the session it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmbedEvent {
    pub session: SessionToken,
    pub kind: EmbedEventKind,
}

/// Create the channel widgets use to report callbacks
pub fn event_channel() -> (EmbedEventSender, mpsc::UnboundedReceiver<EmbedEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EmbedEventSender { tx }, rx)
}

/// Handle a widget uses to report callbacks
///
/// Every method returns `false` when the controller is gone.
#[derive(Debug, Clone)]
pub struct EmbedEventSender {
    tx: mpsc::UnboundedSender<EmbedEvent>,
}

impl EmbedEventSender {
    /// Report an event
    pub fn send(&self, session: SessionToken, kind: EmbedEventKind) -> bool {
        self.tx.send(EmbedEvent { session, kind }).is_ok()
    }

    /// Report readiness with the authoritative duration
    pub fn ready(&self, session: SessionToken, duration: f64) -> bool {
        self.send(session, EmbedEventKind::Ready { duration })
    }

    /// Report a state change
    pub fn state_changed(&self, session: SessionToken, state: EmbedStateKind) -> bool {
        self.send(session, EmbedEventKind::StateChanged(state))
    }

    /// Report a raw state code as delivered by the widget
    ///
    /// Unknown codes are logged and not forwarded.
    pub fn state_code(&self, session: SessionToken, code: i32) -> bool {
        match EmbedStateKind::try_from(code) {
            Ok(state) => self.state_changed(session, state),
            Err(e) => {
                warn!(session = session.value(), "Ignoring widget state: {}", e);
                false
            }
        }
    }

    /// Report a raw error code
    pub fn error(&self, session: SessionToken, code: i32) -> bool {
        self.send(
            session,
            EmbedEventKind::Error {
                code: EmbedErrorCode::from_code(code),
            },
        )
    }
}

/// Command held back until the widget is ready
#[derive(Debug, Clone, Copy, PartialEq)]
enum EmbedCommand {
    Play,
    Pause,
    SeekTo(f64),
    SetVolume(u8),
}

#[derive(Debug, Clone, Copy)]
struct PendingCommand {
    session: SessionToken,
    command: EmbedCommand,
}

/// Adapter between the controller and one widget instance
pub struct EmbedBridge<W> {
    widget: W,
    sessions: SessionCounter,
    track: Option<TrackId>,
    ready: bool,
    pending: Vec<PendingCommand>,
}

impl<W: EmbedWidget> EmbedBridge<W> {
    /// Wrap a widget
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            sessions: SessionCounter::new(),
            track: None,
            ready: false,
            pending: Vec::new(),
        }
    }

    /// Start a new session for `track_id`
    ///
    /// Every command and callback of the previous session becomes stale.
    pub fn load(&mut self, track_id: &TrackId) -> SessionToken {
        let session = self.sessions.advance();
        self.ready = false;
        self.discard_stale();
        self.track = Some(track_id.clone());

        debug!(track_id = %track_id, session = session.value(), "Loading track into embed");
        self.widget.load(track_id.as_str(), session);
        session
    }

    /// End the current session without loading anything
    pub fn invalidate(&mut self) -> SessionToken {
        let session = self.sessions.advance();
        self.ready = false;
        self.track = None;
        self.discard_stale();
        session
    }

    /// Token of the live session
    pub fn session(&self) -> SessionToken {
        self.sessions.current()
    }

    /// Track the live session belongs to
    pub fn track(&self) -> Option<&TrackId> {
        self.track.as_ref()
    }

    /// Whether the widget reported ready for the live session
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Number of commands waiting for ready
    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    pub fn play(&mut self) {
        self.issue(EmbedCommand::Play);
    }

    pub fn pause(&mut self) {
        self.issue(EmbedCommand::Pause);
    }

    pub fn seek_to(&mut self, seconds: f64) {
        self.issue(EmbedCommand::SeekTo(seconds.max(0.0)));
    }

    pub fn set_volume(&mut self, level: u8) {
        self.issue(EmbedCommand::SetVolume(level.min(100)));
    }

    /// Elapsed seconds, 0 until the widget is ready
    pub fn current_time(&self) -> f64 {
        if self.ready {
            self.widget.current_time().max(0.0)
        } else {
            0.0
        }
    }

    /// Track length reported by the widget, 0 until ready
    pub fn duration(&self) -> f64 {
        let duration = if self.ready { self.widget.duration() } else { 0.0 };
        if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        }
    }

    /// Filter a widget callback
    ///
    /// Returns the payload when it belongs to the live session; stale
    /// callbacks are dropped. A ready callback flushes the held commands.
    pub fn accept(&mut self, event: EmbedEvent) -> Option<EmbedEventKind> {
        if !self.sessions.is_current(event.session) {
            debug!(
                session = event.session.value(),
                current = self.sessions.current().value(),
                kind = ?event.kind,
                "Dropping stale embed event"
            );
            return None;
        }

        if let EmbedEventKind::Ready { .. } = event.kind {
            self.ready = true;
            self.flush(event.session);
        }
        Some(event.kind)
    }

    /// Access the wrapped widget
    pub fn widget(&self) -> &W {
        &self.widget
    }

    fn issue(&mut self, command: EmbedCommand) {
        let session = self.sessions.current();
        if self.ready {
            self.apply(command);
        } else {
            trace!(session = session.value(), ?command, "Holding command until ready");
            self.pending.push(PendingCommand { session, command });
        }
    }

    fn flush(&mut self, ready_session: SessionToken) {
        for pending in std::mem::take(&mut self.pending) {
            if pending.session == ready_session && self.sessions.is_current(pending.session) {
                self.apply(pending.command);
            } else {
                debug!(
                    session = pending.session.value(),
                    command = ?pending.command,
                    "Dropping command for superseded track"
                );
            }
        }
    }

    fn discard_stale(&mut self) {
        let current = self.sessions.current();
        self.pending.retain(|p| p.session == current);
    }

    fn apply(&mut self, command: EmbedCommand) {
        match command {
            EmbedCommand::Play => self.widget.play(),
            EmbedCommand::Pause => self.widget.pause(),
            EmbedCommand::SeekTo(seconds) => self.widget.seek_to(seconds),
            EmbedCommand::SetVolume(level) => self.widget.set_volume(level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn ready(session: SessionToken, duration: f64) -> EmbedEvent {
        EmbedEvent {
            session,
            kind: EmbedEventKind::Ready { duration },
        }
    }

    #[test]
    fn state_codes_round_trip() {
        for kind in [
            EmbedStateKind::Unstarted,
            EmbedStateKind::Ended,
            EmbedStateKind::Playing,
            EmbedStateKind::Paused,
            EmbedStateKind::Buffering,
        ] {
            assert_eq!(EmbedStateKind::try_from(kind.code()).unwrap(), kind);
        }
        assert_eq!(EmbedStateKind::try_from(5).unwrap(), EmbedStateKind::Unstarted);
        assert_eq!(
            EmbedStateKind::try_from(42),
            Err(PlaybackError::UnknownEmbedState(42))
        );
    }

    #[test]
    fn error_codes_are_classified() {
        assert_eq!(EmbedErrorCode::from_code(100), EmbedErrorCode::NotFound);
        assert_eq!(
            EmbedErrorCode::from_code(150),
            EmbedErrorCode::EmbeddingDisallowed(150)
        );
        assert_eq!(EmbedErrorCode::from_code(7).code(), 7);
        assert_eq!(
            EmbedErrorCode::NotFound.to_string(),
            "video not found (100)"
        );
    }

    #[test]
    fn commands_before_ready_are_held_then_applied() {
        let mut widget = MockEmbedWidget::new();
        widget.expect_load().times(1).return_const(());
        widget.expect_seek_to().with(eq(0.0)).times(1).return_const(());
        widget.expect_set_volume().with(eq(40)).times(1).return_const(());

        let mut bridge = EmbedBridge::new(widget);
        let session = bridge.load(&TrackId::new("a"));
        bridge.seek_to(0.0);
        bridge.set_volume(40);
        assert_eq!(bridge.pending_commands(), 2);

        assert!(bridge.accept(ready(session, 180.0)).is_some());
        assert!(bridge.is_ready());
        assert_eq!(bridge.pending_commands(), 0);
    }

    #[test]
    fn commands_for_superseded_track_are_dropped() {
        let mut widget = MockEmbedWidget::new();
        widget.expect_load().times(2).return_const(());
        // Only the second track's seek may reach the widget
        widget.expect_seek_to().with(eq(10.0)).times(1).return_const(());

        let mut bridge = EmbedBridge::new(widget);
        let first = bridge.load(&TrackId::new("a"));
        bridge.seek_to(99.0);

        let second = bridge.load(&TrackId::new("b"));
        bridge.seek_to(10.0);

        // Late ready for the first track changes nothing
        assert!(bridge.accept(ready(first, 100.0)).is_none());
        assert!(!bridge.is_ready());

        assert!(bridge.accept(ready(second, 200.0)).is_some());
    }

    #[test]
    fn commands_after_ready_go_straight_through() {
        let mut widget = MockEmbedWidget::new();
        widget.expect_load().return_const(());
        widget.expect_play().times(1).return_const(());
        widget.expect_pause().times(1).return_const(());
        widget.expect_current_time().return_const(12.5);

        let mut bridge = EmbedBridge::new(widget);
        let session = bridge.load(&TrackId::new("a"));
        assert_eq!(bridge.current_time(), 0.0);

        bridge.accept(ready(session, 60.0));
        bridge.play();
        bridge.pause();
        assert_eq!(bridge.current_time(), 12.5);
    }

    #[test]
    fn invalidate_makes_everything_stale() {
        let mut widget = MockEmbedWidget::new();
        widget.expect_load().return_const(());

        let mut bridge = EmbedBridge::new(widget);
        let session = bridge.load(&TrackId::new("a"));
        bridge.play();

        bridge.invalidate();
        assert_eq!(bridge.pending_commands(), 0);
        assert!(bridge.track().is_none());

        let event = EmbedEvent {
            session,
            kind: EmbedEventKind::StateChanged(EmbedStateKind::Playing),
        };
        assert!(bridge.accept(event).is_none());
    }

    #[test]
    fn event_sender_drops_unknown_state_codes() {
        let (sender, mut rx) = event_channel();
        let session = SessionCounter::new().advance();

        assert!(!sender.state_code(session, 9));
        assert!(sender.state_code(session, 3));
        assert!(sender.error(session, 101));

        let first = rx.try_recv().unwrap();
        assert_eq!(
            first.kind,
            EmbedEventKind::StateChanged(EmbedStateKind::Buffering)
        );
        let second = rx.try_recv().unwrap();
        assert_eq!(
            second.kind,
            EmbedEventKind::Error {
                code: EmbedErrorCode::EmbeddingDisallowed(101)
            }
        );
        assert!(rx.try_recv().is_err());
    }
}
