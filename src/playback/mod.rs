//! Real-time playback of a compiled key-event sequence.
//!
//! A [`Player`] owns one session: a dedicated worker thread that waits for
//! each event with a hybrid sleep/spin, batches near-simultaneous events and
//! drives an [`OutputBackend`](crate::backend::OutputBackend). A
//! [`PlayerControl`] handle pauses, seeks and stops it from any thread by
//! overwriting atomic state the worker polls every iteration.

pub mod batch;
pub mod clock;
pub mod notify;
pub mod options;
pub mod player;
pub mod state;
pub mod timer;

pub use batch::{dispatch_batch, take_batch, BATCH_TOLERANCE};
pub use clock::TimeBase;
pub use notify::{
    notification_channel, NotificationReceiver, NotificationSender, Notifier,
    PlaybackNotification,
};
pub use options::PlaybackOptions;
pub use player::{Player, PlayerControl};
pub use state::PlaybackState;
pub use timer::TimerResolution;

use std::io;

/// Errors starting a playback session.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("playback session already started")]
    AlreadyStarted,
    #[error("playback session was stopped before it started")]
    Stopped,
    #[error("failed to spawn playback worker: {0}")]
    Spawn(#[from] io::Error),
}
