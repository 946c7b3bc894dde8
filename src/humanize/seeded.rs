//! Default humanizer driven by a seeded ChaCha8 RNG.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::config::HumanizeConfig;
use super::resync::ResyncPoints;
use super::Humanizer;
use crate::model::{Hand, MusicalSection, Note};

/// Onsets closer than this belong to the same chord.
const CHORD_WINDOW: f64 = 0.005;

/// Shortest duration articulation or rubato may leave a note with.
const MIN_DURATION: f64 = 0.02;

/// Widest span a single jitter draw may cover, in seconds or duration fraction.
const MAX_JITTER: f64 = 1.0;

/// Cap on rubato amplitude relative to section length / π, keeping the warp monotone.
const SWAY_SLOPE_LIMIT: f64 = 0.25;

/// Humanizer with deterministic output for a given seed and call order.
pub struct SeededHumanizer {
    config: HumanizeConfig,
    rng: ChaCha8Rng,
}

impl SeededHumanizer {
    pub fn new(config: HumanizeConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &HumanizeConfig {
        &self.config
    }

    /// Uniform value in `[-amount, amount]` with `amount` capped at [`MAX_JITTER`].
    ///
    /// Zero for a non-positive or non-finite amount.
    fn jitter(&mut self, amount: f64) -> f64 {
        if amount.is_finite() && amount > 0.0 {
            let amount = amount.min(MAX_JITTER);
            self.rng.gen_range(-amount..=amount)
        } else {
            0.0
        }
    }
}

impl Humanizer for SeededHumanizer {
    fn apply_to_hand(&mut self, notes: &mut [Note], _hand: Hand, resync: &ResyncPoints) {
        notes.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        let mut drift = 0.0;
        let mut i = 0;
        while i < notes.len() {
            let onset = notes[i].start_time;
            let mut j = i + 1;
            while j < notes.len() && notes[j].start_time - onset < CHORD_WINDOW {
                j += 1;
            }

            let offset = if resync.contains(onset) {
                drift = 0.0;
                0.0
            } else if self.config.vary_timing {
                drift += self.jitter(self.config.drift_step);
                if self.config.enable_drift_correction {
                    drift *= 0.5;
                }
                self.jitter(self.config.timing_variance) + drift
            } else {
                0.0
            };

            let group = &mut notes[i..j];
            if self.config.enable_chord_roll && group.len() >= 3 {
                group.sort_by_key(|n| n.pitch);
                let spread = self.config.chord_roll_spread;
                for (k, note) in group.iter_mut().enumerate() {
                    note.start_time += k as f64 * spread;
                }
            }

            for k in i..j {
                let scale = if self.config.vary_articulation {
                    1.0 + self.jitter(self.config.articulation_variance)
                } else {
                    1.0
                };
                let note = &mut notes[k];
                note.start_time = (note.start_time + offset).max(0.0);
                note.duration = (note.duration * scale).max(MIN_DURATION);
            }

            i = j;
        }
    }

    fn apply_tempo_rubato(&mut self, notes: &mut [Note], sections: &[MusicalSection]) {
        if !self.config.enable_tempo_sway || sections.is_empty() {
            return;
        }

        let amplitudes: Vec<f64> = sections
            .iter()
            .map(|s| {
                let limit = SWAY_SLOPE_LIMIT * s.length().max(0.0) / std::f64::consts::PI;
                let amp = self.config.tempo_sway_amount.min(limit);
                self.jitter(amp)
            })
            .collect();

        let warp = |t: f64| -> f64 {
            match sections.iter().position(|s| s.contains(t)) {
                Some(i) => {
                    let s = &sections[i];
                    let phase = (t - s.start_time) / s.length();
                    t + amplitudes[i] * (std::f64::consts::PI * phase).sin()
                }
                None => t,
            }
        };

        for note in notes.iter_mut() {
            let start = warp(note.start_time);
            let end = warp(note.end_time());
            note.start_time = start;
            note.duration = (end - start).max(MIN_DURATION);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(times: &[f64], hand: Hand) -> Vec<Note> {
        times
            .iter()
            .enumerate()
            .map(|(i, &t)| Note::new(60 + i as u8, 80, t, 0.4, hand))
            .collect()
    }

    fn timing_config() -> HumanizeConfig {
        HumanizeConfig {
            vary_timing: true,
            timing_variance: 0.02,
            ..HumanizeConfig::default()
        }
    }

    #[test]
    fn same_seed_same_result() {
        let run = |seed| {
            let mut h = SeededHumanizer::new(timing_config(), seed);
            let mut notes = hand(&[0.0, 0.5, 1.0, 1.5], Hand::Right);
            h.apply_to_hand(&mut notes, Hand::Right, &ResyncPoints::default());
            notes
        };
        assert_eq!(run(7), run(7));
        assert_ne!(run(7), run(8));
    }

    #[test]
    fn resync_onsets_are_not_moved() {
        let left = hand(&[0.0, 0.5, 1.0], Hand::Left);
        let right = hand(&[0.0, 0.75, 1.0], Hand::Right);
        let resync = ResyncPoints::between(&left, &right);

        let mut h = SeededHumanizer::new(timing_config(), 3);
        let mut l = left.clone();
        let mut r = right.clone();
        h.apply_to_hand(&mut l, Hand::Left, &resync);
        h.apply_to_hand(&mut r, Hand::Right, &resync);

        assert_eq!(l[0].start_time, 0.0);
        assert_eq!(r[0].start_time, 0.0);
        assert_eq!(l[2].start_time, 1.0);
        assert_eq!(r[2].start_time, 1.0);
    }

    #[test]
    fn offsets_stay_within_bounds_without_drift() {
        let config = HumanizeConfig {
            drift_step: 0.0,
            ..timing_config()
        };
        let mut h = SeededHumanizer::new(config, 11);
        let original = hand(&[0.5, 1.0, 1.5, 2.0, 2.5], Hand::Right);
        let mut notes = original.clone();
        h.apply_to_hand(&mut notes, Hand::Right, &ResyncPoints::default());
        for (a, b) in original.iter().zip(&notes) {
            assert!((a.start_time - b.start_time).abs() <= 0.02 + 1e-12);
        }
    }

    #[test]
    fn chord_members_move_together() {
        let mut h = SeededHumanizer::new(timing_config(), 5);
        let mut notes = vec![
            Note::new(60, 80, 1.0, 0.5, Hand::Left),
            Note::new(64, 80, 1.0, 0.5, Hand::Left),
        ];
        h.apply_to_hand(&mut notes, Hand::Left, &ResyncPoints::default());
        assert_eq!(notes[0].start_time, notes[1].start_time);
    }

    #[test]
    fn chord_roll_staggers_ascending_pitch() {
        let config = HumanizeConfig {
            enable_chord_roll: true,
            chord_roll_spread: 0.01,
            ..HumanizeConfig::default()
        };
        let mut h = SeededHumanizer::new(config, 1);
        let mut notes = vec![
            Note::new(67, 80, 1.0, 0.5, Hand::Right),
            Note::new(60, 80, 1.0, 0.5, Hand::Right),
            Note::new(64, 80, 1.0, 0.5, Hand::Right),
        ];
        h.apply_to_hand(&mut notes, Hand::Right, &ResyncPoints::default());
        let pitches: Vec<u8> = notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![60, 64, 67]);
        assert!((notes[1].start_time - 1.01).abs() < 1e-9);
        assert!((notes[2].start_time - 1.02).abs() < 1e-9);
    }

    #[test]
    fn articulation_never_below_minimum() {
        let config = HumanizeConfig {
            vary_articulation: true,
            articulation_variance: 0.9,
            ..HumanizeConfig::default()
        };
        let mut h = SeededHumanizer::new(config, 2);
        let mut notes: Vec<Note> = (0..50)
            .map(|i| Note::new(60, 80, i as f64 * 0.1, 0.03, Hand::Right))
            .collect();
        h.apply_to_hand(&mut notes, Hand::Right, &ResyncPoints::default());
        assert!(notes.iter().all(|n| n.duration >= MIN_DURATION));
    }

    #[test]
    fn rubato_keeps_section_boundaries_and_order() {
        let config = HumanizeConfig {
            enable_tempo_sway: true,
            tempo_sway_amount: 0.5,
            ..HumanizeConfig::default()
        };
        let sections = vec![MusicalSection::new(0, 0.0, 4.0), MusicalSection::new(1, 4.0, 8.0)];
        let mut notes: Vec<Note> = (0..16)
            .map(|i| Note::new(60, 80, i as f64 * 0.5, 0.25, Hand::Right))
            .collect();
        let mut h = SeededHumanizer::new(config, 9);
        h.apply_tempo_rubato(&mut notes, &sections);

        assert_eq!(notes[0].start_time, 0.0);
        assert!((notes[8].start_time - 4.0).abs() < 1e-12);
        assert!(notes.windows(2).all(|w| w[0].start_time < w[1].start_time));
    }

    #[test]
    fn unusable_amounts_do_not_panic() {
        for amount in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN, 1e308, -1e308] {
            let config = HumanizeConfig {
                vary_timing: true,
                vary_articulation: true,
                enable_tempo_sway: true,
                timing_variance: amount,
                drift_step: amount,
                articulation_variance: amount,
                tempo_sway_amount: amount,
                ..HumanizeConfig::default()
            };
            let mut h = SeededHumanizer::new(config, 4);
            let mut notes = hand(&[0.0, 0.5, 1.0, 1.5], Hand::Right);
            h.apply_to_hand(&mut notes, Hand::Right, &ResyncPoints::default());
            h.apply_tempo_rubato(&mut notes, &[MusicalSection::new(0, 0.0, 2.0)]);
            for note in &notes {
                assert!(note.start_time.is_finite() && note.start_time >= 0.0);
                assert!(note.duration.is_finite() && note.duration >= MIN_DURATION);
            }
        }
    }

    #[test]
    fn oversized_amount_is_capped() {
        let config = HumanizeConfig {
            drift_step: 0.0,
            timing_variance: 50.0,
            ..timing_config()
        };
        let mut h = SeededHumanizer::new(config, 12);
        let original = hand(&[5.0, 10.0, 15.0], Hand::Right);
        let mut notes = original.clone();
        h.apply_to_hand(&mut notes, Hand::Right, &ResyncPoints::default());
        for (a, b) in original.iter().zip(&notes) {
            assert!((a.start_time - b.start_time).abs() <= MAX_JITTER + 1e-12);
        }
    }

    #[test]
    fn rubato_disabled_is_identity() {
        let mut h = SeededHumanizer::new(HumanizeConfig::default(), 9);
        let original = hand(&[0.0, 1.0, 2.0], Hand::Right);
        let mut notes = original.clone();
        h.apply_tempo_rubato(&mut notes, &[MusicalSection::new(0, 0.0, 3.0)]);
        assert_eq!(notes, original);
    }
}
