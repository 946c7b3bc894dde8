//! Compiled key events and their same-instant ordering rule.
//!
//! Events sharing a timestamp always execute pedal first, then releases, then
//! presses. Releasing before pressing is what lets a sustained note be
//! re-struck at the same instant without an "already down" conflict.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sustain pedal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PedalAction {
    Down,
    Up,
}

/// What a [`KeyEvent`] does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAction {
    Press { pitch: u8, velocity: u8 },
    Release { pitch: u8 },
    Pedal(PedalAction),
}

/// Execution band of an action within one time slice. Lower bands run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionBand {
    Pedal = 0,
    Release = 1,
    Press = 2,
}

impl KeyAction {
    pub fn band(&self) -> ActionBand {
        match self {
            KeyAction::Pedal(_) => ActionBand::Pedal,
            KeyAction::Release { .. } => ActionBand::Release,
            KeyAction::Press { .. } => ActionBand::Press,
        }
    }

    /// Pitch touched by this action, if any.
    pub fn pitch(&self) -> Option<u8> {
        match self {
            KeyAction::Press { pitch, .. } | KeyAction::Release { pitch } => Some(*pitch),
            KeyAction::Pedal(_) => None,
        }
    }
}

/// One scheduled dispatch at a playback time in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub time: f64,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn press(time: f64, pitch: u8, velocity: u8) -> Self {
        Self {
            time,
            action: KeyAction::Press { pitch, velocity },
        }
    }

    pub fn release(time: f64, pitch: u8) -> Self {
        Self {
            time,
            action: KeyAction::Release { pitch },
        }
    }

    pub fn pedal(time: f64, action: PedalAction) -> Self {
        Self {
            time,
            action: KeyAction::Pedal(action),
        }
    }

    /// Total order used for compiled sequences: time, then band.
    pub fn schedule_cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.action.band().cmp(&other.action.band()))
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            KeyAction::Press { pitch, velocity } => {
                write!(f, "{:>9.4}s  press    {pitch:>3} vel {velocity}", self.time)
            }
            KeyAction::Release { pitch } => write!(f, "{:>9.4}s  release  {pitch:>3}", self.time),
            KeyAction::Pedal(PedalAction::Down) => write!(f, "{:>9.4}s  pedal    down", self.time),
            KeyAction::Pedal(PedalAction::Up) => write!(f, "{:>9.4}s  pedal    up", self.time),
        }
    }
}

/// Stable sort by `(time, band)`. Events equal on both keep their relative order.
pub fn sort_events(events: &mut [KeyEvent]) {
    events.sort_by(KeyEvent::schedule_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_order_pedal_release_press() {
        assert!(ActionBand::Pedal < ActionBand::Release);
        assert!(ActionBand::Release < ActionBand::Press);
    }

    #[test]
    fn same_time_sorts_by_band() {
        let mut events = vec![
            KeyEvent::press(1.0, 60, 90),
            KeyEvent::release(1.0, 60),
            KeyEvent::pedal(1.0, PedalAction::Down),
        ];
        sort_events(&mut events);
        assert_eq!(events[0].action.band(), ActionBand::Pedal);
        assert_eq!(events[1].action.band(), ActionBand::Release);
        assert_eq!(events[2].action.band(), ActionBand::Press);
    }

    #[test]
    fn time_dominates_band() {
        let mut events = vec![KeyEvent::pedal(2.0, PedalAction::Up), KeyEvent::press(1.0, 60, 90)];
        sort_events(&mut events);
        assert_eq!(events[0].time, 1.0);
    }

    #[test]
    fn equal_keys_keep_insertion_order() {
        let mut events = vec![
            KeyEvent::press(0.0, 64, 90),
            KeyEvent::press(0.0, 60, 90),
            KeyEvent::press(0.0, 67, 90),
        ];
        sort_events(&mut events);
        let pitches: Vec<_> = events.iter().filter_map(|e| e.action.pitch()).collect();
        assert_eq!(pitches, vec![64, 60, 67]);
    }

    #[test]
    fn pedal_has_no_pitch() {
        assert_eq!(KeyAction::Pedal(PedalAction::Down).pitch(), None);
        assert_eq!(KeyAction::Release { pitch: 12 }.pitch(), Some(12));
    }
}
