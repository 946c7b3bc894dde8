//! Humanization and pedal collaborators of the event compiler.
//!
//! The compiler only talks to the [`Humanizer`] and [`PedalGenerator`] traits.
//! [`SeededHumanizer`] and [`StandardPedalGenerator`] are the defaults; both
//! are fully deterministic for a fixed seed and input.

pub mod config;
pub mod pedal;
pub mod resync;
pub mod seeded;

pub use config::{HumanizeConfig, PedalStyle};
pub use pedal::StandardPedalGenerator;
pub use resync::ResyncPoints;
pub use seeded::SeededHumanizer;

use crate::compile::CompileConfig;
use crate::model::{Hand, KeyEvent, MusicalSection, Note};

/// Per-hand timing perturbation and whole-score rubato.
pub trait Humanizer {
    /// Perturb one hand's notes in place. Onsets that fall on a resync point
    /// must stay where they are so the hands meet again there.
    fn apply_to_hand(&mut self, notes: &mut [Note], hand: Hand, resync: &ResyncPoints);

    /// Apply tempo rubato over the recombined, time-sorted notes.
    fn apply_tempo_rubato(&mut self, notes: &mut [Note], sections: &[MusicalSection]);
}

/// Source of sustain pedal events for a compiled score.
pub trait PedalGenerator {
    fn generate_pedal_events(
        &self,
        config: &CompileConfig,
        notes: &[Note],
        sections: &[MusicalSection],
    ) -> Vec<KeyEvent>;
}

impl<F> PedalGenerator for F
where
    F: Fn(&CompileConfig, &[Note], &[MusicalSection]) -> Vec<KeyEvent>,
{
    fn generate_pedal_events(
        &self,
        config: &CompileConfig,
        notes: &[Note],
        sections: &[MusicalSection],
    ) -> Vec<KeyEvent> {
        self(config, notes, sections)
    }
}
