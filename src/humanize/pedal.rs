//! Default sustain pedal generator.
//!
//! Pedal changes are emitted as an `Up` immediately followed by a `Down` at the
//! same timestamp; both sit in the pedal band, so they fire before any release
//! or press sharing that instant.

use super::config::PedalStyle;
use super::PedalGenerator;
use crate::compile::CompileConfig;
use crate::model::{total_duration, KeyEvent, MusicalSection, Note, PedalAction};

/// Places pedal changes according to the configured [`PedalStyle`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPedalGenerator;

impl StandardPedalGenerator {
    /// Down at the first boundary, up+down at each later one, up at `end`.
    fn changes_at(boundaries: &[f64], end: f64) -> Vec<KeyEvent> {
        let mut events = Vec::with_capacity(boundaries.len() * 2 + 1);
        for (i, &t) in boundaries.iter().enumerate() {
            if i > 0 {
                events.push(KeyEvent::pedal(t, PedalAction::Up));
            }
            events.push(KeyEvent::pedal(t, PedalAction::Down));
        }
        if !boundaries.is_empty() {
            events.push(KeyEvent::pedal(end, PedalAction::Up));
        }
        events
    }
}

impl PedalGenerator for StandardPedalGenerator {
    fn generate_pedal_events(
        &self,
        config: &CompileConfig,
        notes: &[Note],
        sections: &[MusicalSection],
    ) -> Vec<KeyEvent> {
        if notes.is_empty() {
            return Vec::new();
        }
        let first_onset = notes
            .iter()
            .map(|n| n.start_time)
            .fold(f64::INFINITY, f64::min);
        let end = total_duration(notes);

        let boundaries: Vec<f64> = match config.pedal {
            PedalStyle::None => return Vec::new(),
            PedalStyle::Sustain => vec![first_onset],
            PedalStyle::Sections => {
                let mut starts: Vec<f64> = sections
                    .iter()
                    .map(|s| s.start_time)
                    .filter(|&t| t < end)
                    .collect();
                starts.sort_by(f64::total_cmp);
                starts.dedup();
                starts
            }
            PedalStyle::Measures => config.tempo.measure_boundaries(end),
        };

        Self::changes_at(&boundaries, end)
    }
}
