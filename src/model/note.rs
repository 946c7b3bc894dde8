//! Input note entity.

use serde::{Deserialize, Serialize};

/// Which hand a note was assigned to by the analysis stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Left,
    Right,
    #[default]
    Unknown,
}

/// A single note of the analyzed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI pitch (0–127).
    pub pitch: u8,
    /// MIDI velocity (0–127).
    pub velocity: u8,
    /// Onset in seconds from the start of the score.
    pub start_time: f64,
    /// Sounding length in seconds.
    pub duration: f64,
    #[serde(default)]
    pub hand: Hand,
}

impl Note {
    pub fn new(pitch: u8, velocity: u8, start_time: f64, duration: f64, hand: Hand) -> Self {
        Self {
            pitch,
            velocity,
            start_time,
            duration,
            hand,
        }
    }

    /// Time at which the note is released.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Latest release time over all notes, or 0.0 for an empty score.
pub fn total_duration(notes: &[Note]) -> f64 {
    notes.iter().map(Note::end_time).fold(0.0, f64::max)
}
