//! Playback session settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for a [`Player`](super::Player) session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackOptions {
    /// Seconds counted down before the first event. 0 = start immediately.
    pub countdown_secs: u32,
    /// Maximum progress notifications per second.
    pub progress_hz: f64,
    /// How far past the last event the clock runs before auto-pausing.
    pub end_grace_secs: f64,
    /// Events within this window of the first due event share one batch.
    pub batch_tolerance_secs: f64,
    /// Poll interval while paused, in milliseconds.
    pub pause_poll_ms: u64,
    /// Poll interval after the last event, in milliseconds.
    pub idle_poll_ms: u64,
    /// Ask the OS for 1 ms timer resolution for the session.
    pub fine_timer: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            countdown_secs: 0,
            progress_hz: 30.0,
            end_grace_secs: 0.1,
            batch_tolerance_secs: 0.0005,
            pause_poll_ms: 50,
            idle_poll_ms: 5,
            fine_timer: true,
        }
    }
}

impl PlaybackOptions {
    /// Minimum spacing between progress notifications.
    pub fn progress_interval(&self) -> Duration {
        if self.progress_hz > 0.0 && self.progress_hz.is_finite() {
            Duration::from_secs_f64(1.0 / self.progress_hz)
        } else {
            Duration::ZERO
        }
    }

    pub fn pause_poll(&self) -> Duration {
        Duration::from_millis(self.pause_poll_ms.max(1))
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms.max(1))
    }
}
