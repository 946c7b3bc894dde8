//! Session state machine.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Where a playback session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PlaybackState {
    Idle = 0,
    Countdown = 1,
    Playing = 2,
    Paused = 3,
    /// Paused automatically after the last event.
    Finished = 4,
    /// Terminal.
    Stopped = 5,
}

impl PlaybackState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => PlaybackState::Countdown,
            2 => PlaybackState::Playing,
            3 => PlaybackState::Paused,
            4 => PlaybackState::Finished,
            5 => PlaybackState::Stopped,
            _ => PlaybackState::Idle,
        }
    }

    pub fn is_paused(self) -> bool {
        matches!(self, PlaybackState::Paused | PlaybackState::Finished)
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Countdown => "countdown",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Finished => "finished",
            PlaybackState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Atomic cell holding a [`PlaybackState`].
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new(state: PlaybackState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn get(&self) -> PlaybackState {
        PlaybackState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: PlaybackState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Set `state` unless the session already stopped.
    pub fn set_unless_stopped(&self, state: PlaybackState) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != PlaybackState::Stopped as u8).then_some(state as u8)
            })
            .is_ok()
    }
}
