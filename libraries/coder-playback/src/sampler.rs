//! Progress sampler and seek gesture math
//!
//! The sampler is a fixed-cadence timer task. Starting it hands out a
//! [`SamplerToken`]; stopping needs that token back, and every tick carries
//! the token of the task that produced it. At most one task is alive per
//! [`Sampler`], so a late tick from a cancelled task is recognisable and
//! dropped.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

/// Identity of one sampler run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerToken(u64);

/// Tick produced by a sampler run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerTick {
    token: SamplerToken,
}

impl SamplerTick {
    /// Run that produced the tick
    pub fn token(self) -> SamplerToken {
        self.token
    }
}

/// Receiving end of a sampler's ticks
pub type SamplerTicks = mpsc::UnboundedReceiver<SamplerTick>;

/// Cancellable fixed-cadence timer
pub struct Sampler {
    period: Duration,
    tx: mpsc::UnboundedSender<SamplerTick>,
    next_token: u64,
    live: Option<LiveSampler>,
}

struct LiveSampler {
    token: SamplerToken,
    task: JoinHandle<()>,
}

impl Sampler {
    /// Create a stopped sampler and the channel its ticks arrive on
    pub fn new(period: Duration) -> (Self, SamplerTicks) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sampler = Self {
            period: period.max(Duration::from_millis(1)),
            tx,
            next_token: 0,
            live: None,
        };
        (sampler, rx)
    }

    /// Start ticking, cancelling any run already in progress
    ///
    /// The first tick arrives one period after the call. Must be called
    /// from within a Tokio runtime.
    pub fn start(&mut self) -> SamplerToken {
        self.cancel_live();

        self.next_token += 1;
        let token = SamplerToken(self.next_token);
        let period = self.period;
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(SamplerTick { token }).is_err() {
                    break;
                }
            }
        });

        trace!(token = token.0, "Sampler started");
        self.live = Some(LiveSampler { token, task });
        token
    }

    /// Stop the run identified by `token`
    ///
    /// Returns `false` when that run is no longer the live one.
    pub fn stop(&mut self, token: SamplerToken) -> bool {
        if self.is_live(token) {
            self.cancel_live();
            true
        } else {
            false
        }
    }

    /// Whether `token` identifies the live run
    pub fn is_live(&self, token: SamplerToken) -> bool {
        self.live.as_ref().is_some_and(|live| live.token == token)
    }

    /// Whether any run is live
    pub fn is_running(&self) -> bool {
        self.live.is_some()
    }

    /// Token of the live run
    pub fn live_token(&self) -> Option<SamplerToken> {
        self.live.as_ref().map(|live| live.token)
    }

    fn cancel_live(&mut self) {
        if let Some(live) = self.live.take() {
            live.task.abort();
            trace!(token = live.token.0, "Sampler stopped");
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.cancel_live();
    }
}

/// Pointer position over the progress control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekPointer {
    /// Pointer x coordinate
    pub pointer_x: f64,
    /// Left edge of the control
    pub track_left: f64,
    /// Width of the control
    pub track_width: f64,
}

impl SeekPointer {
    pub fn new(pointer_x: f64, track_left: f64, track_width: f64) -> Self {
        Self {
            pointer_x,
            track_left,
            track_width,
        }
    }

    /// Horizontal position as a fraction of the control, clamped to [0, 1]
    ///
    /// `None` when the control has no usable width.
    pub fn fraction(&self) -> Option<f64> {
        if !(self.track_width.is_finite() && self.track_width > 0.0) || !self.pointer_x.is_finite()
        {
            return None;
        }
        Some(((self.pointer_x - self.track_left) / self.track_width).clamp(0.0, 1.0))
    }

    /// Seek target in seconds for a track of `duration` seconds
    ///
    /// `None` while the duration is unknown.
    pub fn target(&self, duration: f64) -> Option<f64> {
        if !(duration.is_finite() && duration > 0.0) {
            return None;
        }
        self.fraction().map(|f| f * duration)
    }
}

/// Format seconds as `m:ss`
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
