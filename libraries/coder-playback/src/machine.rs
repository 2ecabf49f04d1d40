//! Playback state machine
//!
//! A pure transition table. The controller feeds it inputs one at a time and
//! carries out the returned effects in order; nothing here touches the embed
//! or the sampler directly.

use crate::embed::EmbedStateKind;
use crate::types::{Intent, PlaybackState};

/// Something that happened to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// User picked a track (play, next, previous)
    TrackSelected,
    /// Embed reported ready for the current track
    EmbedReady,
    /// Embed reported a state change
    EmbedState(EmbedStateKind),
    /// Embed reported an error
    EmbedFailed,
    /// User asked to resume
    UserPlay,
    /// User asked to pause
    UserPause,
    /// Track ended and the queue had a next track
    AdvanceSucceeded,
    /// Track ended at the end of the queue
    AdvanceExhausted,
    /// Controller is being torn down
    Unmounted,
}

/// Side effect the controller must carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    StartSampler,
    StopSampler,
    IssuePlay,
    IssuePause,
    SeekToStart,
    ResetProgress,
    AutoAdvance,
}

/// Result of applying an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: PlaybackState,
    pub effects: &'static [Effect],
}

impl Transition {
    const fn new(to: PlaybackState, effects: &'static [Effect]) -> Self {
        Self { to, effects }
    }
}

/// Apply `input` in state `from`
///
/// Returns `None` when the input means nothing in that state; the caller
/// leaves everything untouched.
pub fn transition(from: PlaybackState, intent: Intent, input: Input) -> Option<Transition> {
    use Effect::{
        AutoAdvance, IssuePause, IssuePlay, ResetProgress, SeekToStart, StartSampler, StopSampler,
    };
    use PlaybackState::{Buffering, Ended, Idle, Loading, Paused, Playing};

    let next = match (from, input) {
        (_, Input::Unmounted) => Transition::new(Idle, &[StopSampler]),

        (Idle, Input::TrackSelected) => Transition::new(Loading, &[ResetProgress, SeekToStart]),
        (_, Input::TrackSelected) => {
            Transition::new(Loading, &[StopSampler, ResetProgress, SeekToStart])
        }

        (Loading | Buffering, Input::EmbedReady) => match intent {
            Intent::Play => Transition::new(Playing, &[StartSampler, IssuePlay]),
            Intent::Pause => Transition::new(Paused, &[]),
        },

        (Idle, Input::EmbedState(EmbedStateKind::Buffering)) => return None,
        (_, Input::EmbedState(EmbedStateKind::Buffering)) => {
            Transition::new(Buffering, &[StopSampler])
        }

        (Loading | Buffering | Paused, Input::EmbedState(EmbedStateKind::Playing)) => {
            Transition::new(Playing, &[StartSampler])
        }

        (Playing | Buffering, Input::EmbedState(EmbedStateKind::Paused)) => {
            Transition::new(Paused, &[StopSampler])
        }

        (Playing | Buffering, Input::EmbedState(EmbedStateKind::Ended)) => {
            Transition::new(Ended, &[StopSampler, AutoAdvance])
        }

        (Idle, Input::EmbedFailed) => return None,
        (_, Input::EmbedFailed) => Transition::new(Paused, &[StopSampler]),

        (Playing | Buffering, Input::UserPause) => {
            Transition::new(Paused, &[StopSampler, IssuePause])
        }
        (Paused, Input::UserPlay) => Transition::new(Playing, &[StartSampler, IssuePlay]),

        (Ended, Input::AdvanceSucceeded) => Transition::new(Loading, &[ResetProgress, SeekToStart]),
        (Ended, Input::AdvanceExhausted) => Transition::new(Idle, &[]),

        _ => return None,
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use PlaybackState::*;

    fn to(from: PlaybackState, intent: Intent, input: Input) -> Option<PlaybackState> {
        transition(from, intent, input).map(|t| t.to)
    }

    #[test]
    fn idle_track_selection_seeks_to_start() {
        let t = transition(Idle, Intent::Play, Input::TrackSelected).unwrap();
        assert_eq!(t.to, Loading);
        assert!(t.effects.contains(&Effect::SeekToStart));
        assert!(!t.effects.contains(&Effect::StopSampler));
    }

    #[test]
    fn direct_selection_from_any_state_reloads() {
        for from in [Loading, Playing, Paused, Buffering, Ended] {
            let t = transition(from, Intent::Play, Input::TrackSelected).unwrap();
            assert_eq!(t.to, Loading);
            assert_eq!(
                t.effects,
                &[Effect::StopSampler, Effect::ResetProgress, Effect::SeekToStart]
            );
        }
    }

    #[test]
    fn ready_resolves_intent() {
        let play = transition(Loading, Intent::Play, Input::EmbedReady).unwrap();
        assert_eq!(play.to, Playing);
        assert_eq!(play.effects, &[Effect::StartSampler, Effect::IssuePlay]);

        let pause = transition(Loading, Intent::Pause, Input::EmbedReady).unwrap();
        assert_eq!(pause.to, Paused);
        assert!(pause.effects.is_empty());
    }

    #[test]
    fn buffering_stops_sampler_and_playing_restarts_it() {
        let buffering = transition(
            Playing,
            Intent::Play,
            Input::EmbedState(EmbedStateKind::Buffering),
        )
        .unwrap();
        assert_eq!(buffering.to, Buffering);
        assert_eq!(buffering.effects, &[Effect::StopSampler]);

        let resumed = transition(
            Buffering,
            Intent::Play,
            Input::EmbedState(EmbedStateKind::Playing),
        )
        .unwrap();
        assert_eq!(resumed.to, Playing);
        assert_eq!(resumed.effects, &[Effect::StartSampler]);
    }

    #[test]
    fn user_pause_and_play() {
        let paused = transition(Playing, Intent::Pause, Input::UserPause).unwrap();
        assert_eq!(paused.to, Paused);
        assert_eq!(paused.effects, &[Effect::StopSampler, Effect::IssuePause]);

        let playing = transition(Paused, Intent::Play, Input::UserPlay).unwrap();
        assert_eq!(playing.to, Playing);
        assert_eq!(playing.effects, &[Effect::StartSampler, Effect::IssuePlay]);

        assert_eq!(to(Idle, Intent::Play, Input::UserPlay), None);
        assert_eq!(to(Loading, Intent::Pause, Input::UserPause), None);
    }

    #[test]
    fn ended_triggers_auto_advance() {
        for from in [Playing, Buffering] {
            let t = transition(from, Intent::Play, Input::EmbedState(EmbedStateKind::Ended))
                .unwrap();
            assert_eq!(t.to, Ended);
            assert_eq!(t.effects, &[Effect::StopSampler, Effect::AutoAdvance]);
        }
        assert_eq!(
            to(Paused, Intent::Pause, Input::EmbedState(EmbedStateKind::Ended)),
            None
        );
    }

    #[test]
    fn auto_advance_outcomes() {
        assert_eq!(to(Ended, Intent::Play, Input::AdvanceSucceeded), Some(Loading));
        assert_eq!(to(Ended, Intent::Play, Input::AdvanceExhausted), Some(Idle));
        assert_eq!(to(Playing, Intent::Play, Input::AdvanceSucceeded), None);
    }

    #[test]
    fn errors_land_in_paused() {
        for from in [Loading, Playing, Buffering, Paused] {
            assert_eq!(to(from, Intent::Play, Input::EmbedFailed), Some(Paused));
        }
        assert_eq!(to(Idle, Intent::Play, Input::EmbedFailed), None);
    }

    #[test]
    fn unstarted_is_ignored_everywhere() {
        for from in [Idle, Loading, Playing, Paused, Buffering, Ended] {
            assert_eq!(
                to(from, Intent::Play, Input::EmbedState(EmbedStateKind::Unstarted)),
                None
            );
        }
    }

    #[test]
    fn unmount_always_goes_idle() {
        for from in [Idle, Loading, Playing, Paused, Buffering, Ended] {
            let t = transition(from, Intent::Play, Input::Unmounted).unwrap();
            assert_eq!(t.to, Idle);
            assert_eq!(t.effects, &[Effect::StopSampler]);
        }
    }
}
