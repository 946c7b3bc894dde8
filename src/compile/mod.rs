//! Event compiler: turns analyzed notes into one time-ordered [`KeyEvent`] sequence.
//!
//! The pipeline is:
//! 1. snapshot the caller's notes (they are never mutated),
//! 2. optionally humanize each hand around shared resync points, then apply rubato,
//! 3. walk the notes in time order emitting press/release pairs, with optional
//!    once-per-pitch-per-section mistake injection,
//! 4. merge the pedal generator's events,
//! 5. stable-sort by `(time, band)` where the band is pedal < release < press.
//!
//! Output is deterministic for a fixed seed and deterministic collaborators.

pub mod mistake;

pub use mistake::{mistake_pitch, slip_candidates, MistakeSource, RngDraws};

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::humanize::{
    HumanizeConfig, Humanizer, PedalGenerator, PedalStyle, ResyncPoints, SeededHumanizer,
    StandardPedalGenerator,
};
use crate::model::{
    section_index_at, sort_events, Hand, KeyEvent, MusicalSection, Note, TempoMap,
};

/// Shortest press-to-release gap. Keeps a zero-length note from sorting its
/// release ahead of its own press.
pub const MIN_HOLD: f64 = 0.001;

/// Offset between the humanizer seed and the mistake seed, so the two passes
/// draw from independent streams.
const MISTAKE_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

/// Settings for one compile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    pub humanize: HumanizeConfig,
    pub enable_mistakes: bool,
    /// Probability of a mistake per eligible note, in percent (0–100).
    pub mistake_chance: f64,
    pub seed: u64,
    pub pedal: PedalStyle,
    pub tempo: TempoMap,
}

impl CompileConfig {
    /// Mistake probability as a fraction, clamped to `[0, 1]`.
    pub fn mistake_probability(&self) -> f64 {
        (self.mistake_chance / 100.0).clamp(0.0, 1.0)
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            humanize: HumanizeConfig::default(),
            enable_mistakes: false,
            mistake_chance: 0.0,
            seed: 0,
            pedal: PedalStyle::None,
            tempo: TempoMap::default(),
        }
    }
}

/// Compiles notes with pluggable humanizer, pedal generator and mistake draws.
///
/// The default humanizer and mistake draws are re-seeded from `config.seed` at
/// the start of every [`compile`](Self::compile), so one compiler gives the same
/// output for the same input on every call. Collaborators installed with the
/// `with_*` builders keep their own state across calls.
pub struct EventCompiler {
    config: CompileConfig,
    humanizer: Box<dyn Humanizer>,
    pedals: Box<dyn PedalGenerator>,
    mistakes: Box<dyn MistakeSource>,
    seeded_humanizer: bool,
    seeded_mistakes: bool,
}

impl EventCompiler {
    /// Compiler with the default seeded collaborators.
    pub fn new(config: CompileConfig) -> Self {
        Self {
            humanizer: Box::new(seeded_humanizer(&config)),
            pedals: Box::new(StandardPedalGenerator),
            mistakes: Box::new(seeded_mistakes(&config)),
            seeded_humanizer: true,
            seeded_mistakes: true,
            config,
        }
    }

    pub fn with_humanizer(mut self, humanizer: impl Humanizer + 'static) -> Self {
        self.humanizer = Box::new(humanizer);
        self.seeded_humanizer = false;
        self
    }

    pub fn with_pedal_generator(mut self, pedals: impl PedalGenerator + 'static) -> Self {
        self.pedals = Box::new(pedals);
        self
    }

    pub fn with_mistake_source(mut self, mistakes: impl MistakeSource + 'static) -> Self {
        self.mistakes = Box::new(mistakes);
        self.seeded_mistakes = false;
        self
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Compile `notes` into a sorted event sequence.
    ///
    /// Never fails: a note outside every section is placed in the unindexed bucket.
    pub fn compile(&mut self, notes: &[Note], sections: &[MusicalSection]) -> Vec<KeyEvent> {
        self.reseed();
        let mut work = notes.to_vec();

        if self.config.humanize.any_enabled() {
            work = self.humanize(work, sections);
        } else {
            work.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        }

        let mut events = Vec::with_capacity(work.len() * 2);
        let probability = self.mistake_probability();
        let mut played_in_section: HashSet<u8> = HashSet::new();
        let mut current_section: Option<usize> = None;
        let mut mistakes = 0usize;

        for note in &work {
            let section = section_index_at(sections, note.start_time);
            if section != current_section {
                played_in_section.clear();
                current_section = section;
            }

            let mut pitch = note.pitch;
            if let Some(p) = probability {
                if !played_in_section.contains(&note.pitch) && self.mistakes.draw() < p {
                    if let Some(wrong) = mistake_pitch(note.pitch, self.mistakes.as_mut()) {
                        pitch = wrong;
                        mistakes += 1;
                    }
                }
            }

            let release_at = note.end_time().max(note.start_time + MIN_HOLD);
            events.push(KeyEvent::press(note.start_time, pitch, note.velocity));
            events.push(KeyEvent::release(release_at, pitch));

            played_in_section.insert(note.pitch);
        }

        events.extend(
            self.pedals
                .generate_pedal_events(&self.config, &work, sections),
        );
        sort_events(&mut events);

        tracing::debug!(
            notes = notes.len(),
            events = events.len(),
            mistakes,
            "compiled score"
        );
        events
    }

    /// Restart the default random streams from the configured seed.
    fn reseed(&mut self) {
        if self.seeded_humanizer {
            self.humanizer = Box::new(seeded_humanizer(&self.config));
        }
        if self.seeded_mistakes {
            self.mistakes = Box::new(seeded_mistakes(&self.config));
        }
    }

    fn mistake_probability(&self) -> Option<f64> {
        if self.config.enable_mistakes {
            Some(self.config.mistake_probability())
        } else {
            None
        }
    }

    /// Per-hand humanization around resync points, recombination, then rubato.
    fn humanize(&mut self, work: Vec<Note>, sections: &[MusicalSection]) -> Vec<Note> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut other = Vec::new();
        for note in work {
            match note.hand {
                Hand::Left => left.push(note),
                Hand::Right => right.push(note),
                Hand::Unknown => other.push(note),
            }
        }

        let resync = ResyncPoints::between(&left, &right);
        tracing::trace!(resync_points = resync.len(), "humanizing hands");
        self.humanizer.apply_to_hand(&mut left, Hand::Left, &resync);
        self.humanizer.apply_to_hand(&mut right, Hand::Right, &resync);

        let mut combined = left;
        combined.extend(right);
        combined.extend(other);
        combined.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        self.humanizer.apply_tempo_rubato(&mut combined, sections);
        combined
    }
}

fn seeded_humanizer(config: &CompileConfig) -> SeededHumanizer {
    SeededHumanizer::new(config.humanize.clone(), config.seed)
}

fn seeded_mistakes(config: &CompileConfig) -> RngDraws<ChaCha8Rng> {
    RngDraws(ChaCha8Rng::seed_from_u64(
        config.seed.wrapping_add(MISTAKE_SEED_OFFSET),
    ))
}

/// Compile with the default collaborators seeded from `config.seed`.
pub fn compile(notes: &[Note], sections: &[MusicalSection], config: &CompileConfig) -> Vec<KeyEvent> {
    EventCompiler::new(config.clone()).compile(notes, sections)
}
