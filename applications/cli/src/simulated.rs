//! Simulated embed widget
//!
//! Stands in for the browser widget when running headless: it "plays" a
//! video by letting a clock run, and reports ready, playing, paused and
//! ended through the embed event channel exactly like the real widget.

use coder_core::Track;
use coder_playback::{EmbedEventSender, EmbedStateKind, EmbedWidget, SessionToken};
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Length assumed for videos whose duration the catalog did not report
pub const FALLBACK_DURATION_SECS: f64 = 180.0;

/// Delay between `load` and the ready callback
const LOAD_DELAY: Duration = Duration::from_millis(300);

/// Parse a display duration (`m:ss` or `h:mm:ss`) into seconds
pub fn parse_display_duration(display: &str) -> Option<f64> {
    let parts: Vec<&str> = display.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }

    let mut total = 0u64;
    for part in parts {
        total = total.checked_mul(60)?.checked_add(part.parse::<u64>().ok()?)?;
    }
    Some(total as f64)
}

/// Widget that fakes playback with a clock
pub struct SimulatedWidget {
    events: EmbedEventSender,
    durations: HashMap<String, f64>,
    speed: f64,

    session: SessionToken,
    duration: f64,

    // Position at `resumed_at`, advancing at `speed` while playing
    offset: f64,
    resumed_at: Option<Instant>,

    task: Option<JoinHandle<()>>,
}

impl SimulatedWidget {
    /// Create a widget reporting through `events`
    ///
    /// `speed` is simulated seconds per real second.
    pub fn new(events: EmbedEventSender, speed: f64) -> Self {
        Self {
            events,
            durations: HashMap::new(),
            speed: if speed.is_finite() && speed > 0.0 {
                speed
            } else {
                1.0
            },
            session: SessionToken::NONE,
            duration: 0.0,
            offset: 0.0,
            resumed_at: None,
            task: None,
        }
    }

    /// Learn the lengths of `tracks` from their display durations
    pub fn with_tracks(mut self, tracks: &[Track]) -> Self {
        for track in tracks {
            if let Some(seconds) = parse_display_duration(&track.duration) {
                self.durations.insert(track.id.as_str().to_string(), seconds);
            }
        }
        self
    }

    fn position(&self) -> f64 {
        let running = self
            .resumed_at
            .map_or(0.0, |at| at.elapsed().as_secs_f64() * self.speed);
        (self.offset + running).min(self.duration)
    }

    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Schedule the ended callback for the remaining time
    fn schedule_end(&mut self) {
        self.cancel_task();

        let remaining = (self.duration - self.offset).max(0.0) / self.speed;
        let events = self.events.clone();
        let session = self.session;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs_f64(remaining)).await;
            events.state_changed(session, EmbedStateKind::Ended);
        }));
    }
}

impl EmbedWidget for SimulatedWidget {
    fn load(&mut self, video_id: &str, session: SessionToken) {
        self.cancel_task();

        self.session = session;
        self.duration = self
            .durations
            .get(video_id)
            .copied()
            .unwrap_or(FALLBACK_DURATION_SECS);
        self.offset = 0.0;
        self.resumed_at = None;

        debug!(video_id, %session, duration = self.duration, "Simulated load");

        let events = self.events.clone();
        let duration = self.duration;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(LOAD_DELAY).await;
            events.state_changed(session, EmbedStateKind::Buffering);
            events.ready(session, duration);
        }));
    }

    fn play(&mut self) {
        if self.resumed_at.is_some() {
            return;
        }
        self.resumed_at = Some(Instant::now());
        self.schedule_end();
        self.events.state_changed(self.session, EmbedStateKind::Playing);
    }

    fn pause(&mut self) {
        if self.resumed_at.is_none() {
            return;
        }
        self.offset = self.position();
        self.resumed_at = None;
        self.cancel_task();
        self.events.state_changed(self.session, EmbedStateKind::Paused);
    }

    fn seek_to(&mut self, seconds: f64) {
        trace!(seconds, "Simulated seek");
        self.offset = seconds.clamp(0.0, self.duration);
        if self.resumed_at.is_some() {
            self.resumed_at = Some(Instant::now());
            self.schedule_end();
        }
    }

    fn set_volume(&mut self, level: u8) {
        trace!(level, "Simulated volume");
    }

    fn current_time(&self) -> f64 {
        self.position()
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}

impl Drop for SimulatedWidget {
    fn drop(&mut self) {
        self.cancel_task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coder_playback::{event_channel, EmbedEventKind, SessionCounter};

    #[test]
    fn display_durations() {
        assert_eq!(parse_display_duration("3:05"), Some(185.0));
        assert_eq!(parse_display_duration("1:02:03"), Some(3723.0));
        assert_eq!(parse_display_duration(""), None);
        assert_eq!(parse_display_duration("soon"), None);
        assert_eq!(parse_display_duration("99999999999999999:00:00"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn reports_ready_then_ended() {
        let (sender, mut rx) = event_channel();
        let tracks = vec![Track::new("a", "A").with_duration("0:10")];
        let mut widget = SimulatedWidget::new(sender, 1.0).with_tracks(&tracks);
        let session = SessionCounter::new().advance();

        widget.load("a", session);
        assert_eq!(
            rx.recv().await.unwrap().kind,
            EmbedEventKind::StateChanged(EmbedStateKind::Buffering)
        );
        assert_eq!(
            rx.recv().await.unwrap().kind,
            EmbedEventKind::Ready { duration: 10.0 }
        );

        widget.play();
        assert_eq!(
            rx.recv().await.unwrap().kind,
            EmbedEventKind::StateChanged(EmbedStateKind::Playing)
        );

        let ended = rx.recv().await.unwrap();
        assert_eq!(ended.session, session);
        assert_eq!(
            ended.kind,
            EmbedEventKind::StateChanged(EmbedStateKind::Ended)
        );
        assert_eq!(widget.current_time(), 10.0);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_position() {
        let (sender, mut rx) = event_channel();
        let mut widget = SimulatedWidget::new(sender, 2.0);
        widget.load("unknown", SessionCounter::new().advance());
        assert_eq!(widget.duration(), FALLBACK_DURATION_SECS);

        // Buffering, then ready
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        widget.play();
        tokio::time::sleep(Duration::from_secs(5)).await;
        widget.pause();
        let paused_at = widget.current_time();
        assert_eq!(paused_at, 10.0);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(widget.current_time(), paused_at);

        widget.seek_to(500.0);
        assert_eq!(widget.current_time(), FALLBACK_DURATION_SECS);

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(event.kind);
        }
        assert_eq!(
            kinds,
            vec![
                EmbedEventKind::StateChanged(EmbedStateKind::Playing),
                EmbedEventKind::StateChanged(EmbedStateKind::Paused),
            ]
        );
    }
}
