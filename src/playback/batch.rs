//! Batch extraction and same-instant dispatch order.

use crate::backend::OutputBackend;
use crate::model::{ActionBand, KeyAction, KeyEvent, PedalAction};

use super::notify::{Notifier, PlaybackNotification};

/// Default window for absorbing near-simultaneous events into one batch.
pub const BATCH_TOLERANCE: f64 = 0.0005;

/// End (exclusive) of the batch starting at `start`: every following event
/// within `tolerance` seconds of `events[start]`.
pub fn take_batch(events: &[KeyEvent], start: usize, tolerance: f64) -> usize {
    let Some(first) = events.get(start) else {
        return start;
    };
    let limit = first.time + tolerance;
    start
        + events[start..]
            .iter()
            .take_while(|e| e.time <= limit)
            .count()
}

/// Run one batch as pedal, then releases, then presses.
///
/// Backend failures are logged and skipped. `keep_going` is checked before
/// each action so a stop lands mid-batch. Returns the number of actions run.
pub fn dispatch_batch(
    batch: &[KeyEvent],
    backend: &mut dyn OutputBackend,
    notifier: &Notifier,
    keep_going: impl Fn() -> bool,
) -> usize {
    let mut dispatched = 0;
    for band in [ActionBand::Pedal, ActionBand::Release, ActionBand::Press] {
        for event in batch.iter().filter(|e| e.action.band() == band) {
            if !keep_going() {
                return dispatched;
            }
            dispatch_one(event, backend, notifier);
            dispatched += 1;
        }
    }
    dispatched
}

fn dispatch_one(event: &KeyEvent, backend: &mut dyn OutputBackend, notifier: &Notifier) {
    let result = match event.action {
        KeyAction::Pedal(PedalAction::Down) => backend.pedal_on(),
        KeyAction::Pedal(PedalAction::Up) => backend.pedal_off(),
        KeyAction::Release { pitch } => backend.note_off(pitch),
        KeyAction::Press { pitch, velocity } => backend.note_on(pitch, velocity),
    };
    if let Err(e) = result {
        tracing::warn!(time = event.time, action = ?event.action, error = %e, "dispatch failed");
    }
    match event.action {
        KeyAction::Press { pitch, .. } => notifier.send(PlaybackNotification::NoteActive {
            pitch,
            active: true,
        }),
        KeyAction::Release { pitch } => notifier.send(PlaybackNotification::NoteActive {
            pitch,
            active: false,
        }),
        KeyAction::Pedal(_) => {}
    }
}
