//! Playback queue
//!
//! An ordered list of tracks with a pointer at the current one. Insertion
//! order is playback order; the whole list is replaced when a new browsing
//! context starts playback.

use coder_core::{Track, TrackId};

/// Ordered tracks plus the current position
///
/// ```text
/// [ A, B, C, D ]
///      ^ current_index = 1
/// ```
///
/// Invariant: `current_index` is `Some(i)` with `i < tracks.len()` when the
/// queue is non-empty, and `None` when it is empty.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<Track>,
    current_index: Option<usize>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole queue
    ///
    /// The pointer moves to `focus` when it is in `tracks`, otherwise to the
    /// first track. An empty list leaves no current track.
    pub fn set_queue(&mut self, tracks: Vec<Track>, focus: Option<&TrackId>) {
        self.current_index = if tracks.is_empty() {
            None
        } else {
            Some(
                focus
                    .and_then(|id| tracks.iter().position(|t| &t.id == id))
                    .unwrap_or(0),
            )
        };
        self.tracks = tracks;
    }

    /// Move the pointer to a track already in the queue
    ///
    /// Returns `false` (and leaves the pointer alone) when the track is absent.
    pub fn focus(&mut self, id: &TrackId) -> bool {
        match self.position_of(id) {
            Some(index) => {
                self.current_index = Some(index);
                true
            }
            None => false,
        }
    }

    /// Move the pointer to a queued track, or back to the first track
    ///
    /// The tracks themselves are never touched. Returns whether `id` was found.
    pub fn focus_or_first(&mut self, id: &TrackId) -> bool {
        if self.focus(id) {
            return true;
        }
        if !self.tracks.is_empty() {
            self.current_index = Some(0);
        }
        false
    }

    /// Track under the pointer
    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.tracks.get(i))
    }

    /// Current position
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Position of a track by identity
    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    /// Whether a track follows the current one
    pub fn has_next(&self) -> bool {
        self.current_index
            .is_some_and(|i| i + 1 < self.tracks.len())
    }

    /// Whether a track precedes the current one
    pub fn has_previous(&self) -> bool {
        self.current_index.is_some_and(|i| i > 0)
    }

    /// Move to the following track
    ///
    /// Does not wrap: at the last position nothing changes and `None` is returned.
    pub fn advance(&mut self) -> Option<&Track> {
        if !self.has_next() {
            return None;
        }
        self.current_index = self.current_index.map(|i| i + 1);
        self.current_track()
    }

    /// Move to the preceding track
    ///
    /// Does not wrap: at position 0 nothing changes and `None` is returned.
    pub fn retreat(&mut self) -> Option<&Track> {
        if !self.has_previous() {
            return None;
        }
        self.current_index = self.current_index.map(|i| i - 1);
        self.current_track()
    }

    /// All tracks in playback order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the queue holds no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
