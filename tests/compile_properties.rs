//! Compiler properties over generated scores: ordering and determinism.

use pianola::compile::{CompileConfig, EventCompiler};
use pianola::humanize::{HumanizeConfig, PedalStyle};
use pianola::model::{ActionBand, Hand, KeyAction, MusicalSection, Note};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Helper: a random two-handed score with chords and shared onsets.
fn random_score(seed: u64, count: usize) -> (Vec<Note>, Vec<MusicalSection>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut notes = Vec::with_capacity(count);
    let mut t = 0.0;
    while notes.len() < count {
        t += rng.gen_range(0..4) as f64 * 0.125;
        let voices = rng.gen_range(1..=4);
        for _ in 0..voices {
            let hand = match rng.gen_range(0..10) {
                0 => Hand::Unknown,
                1..=4 => Hand::Left,
                _ => Hand::Right,
            };
            notes.push(Note::new(
                rng.gen_range(21..=108),
                rng.gen_range(30..=120),
                t,
                rng.gen_range(0..8) as f64 * 0.1,
                hand,
            ));
        }
    }
    let end = t + 1.0;
    let sections = vec![
        MusicalSection::new(0, 0.0, end / 3.0),
        MusicalSection::new(1, end / 3.0, 2.0 * end / 3.0),
        MusicalSection::new(2, 2.0 * end / 3.0, end),
    ];
    (notes, sections)
}

fn all_on() -> CompileConfig {
    CompileConfig {
        humanize: HumanizeConfig {
            vary_timing: true,
            vary_articulation: true,
            enable_drift_correction: true,
            enable_chord_roll: true,
            enable_tempo_sway: true,
            ..Default::default()
        },
        pedal: PedalStyle::Sections,
        seed: 11,
        ..Default::default()
    }
}

#[test]
fn event_times_never_decrease() {
    for seed in 0..20 {
        let (notes, sections) = random_score(seed, 120);
        for config in [CompileConfig::default(), all_on()] {
            let events = EventCompiler::new(config).compile(&notes, &sections);
            for pair in events.windows(2) {
                assert!(
                    pair[0].time <= pair[1].time,
                    "seed {seed}: {} after {}",
                    pair[1],
                    pair[0]
                );
                if pair[0].time == pair[1].time {
                    assert!(pair[0].action.band() <= pair[1].action.band());
                }
            }
        }
    }
}

#[test]
fn same_seed_compiles_identically() {
    let (notes, sections) = random_score(3, 200);
    let first = EventCompiler::new(all_on()).compile(&notes, &sections);
    let second = EventCompiler::new(all_on()).compile(&notes, &sections);
    assert_eq!(first, second);
}

#[test]
fn same_seed_with_mistakes_compiles_identically() {
    let (notes, sections) = random_score(4, 200);
    let config = CompileConfig {
        enable_mistakes: true,
        mistake_chance: 25.0,
        ..all_on()
    };
    let first = EventCompiler::new(config.clone()).compile(&notes, &sections);
    let second = EventCompiler::new(config).compile(&notes, &sections);
    assert_eq!(first, second);
}

#[test]
fn every_note_yields_one_press_and_one_release() {
    let (notes, sections) = random_score(5, 150);
    let events = EventCompiler::new(all_on()).compile(&notes, &sections);
    let presses = events
        .iter()
        .filter(|e| e.action.band() == ActionBand::Press)
        .count();
    let releases = events
        .iter()
        .filter(|e| matches!(e.action, KeyAction::Release { .. }))
        .count();
    assert_eq!(presses, notes.len());
    assert_eq!(releases, notes.len());
}

#[test]
fn input_notes_are_left_untouched() {
    let (notes, sections) = random_score(6, 80);
    let snapshot = notes.clone();
    let _ = EventCompiler::new(all_on()).compile(&notes, &sections);
    assert_eq!(notes, snapshot);
}

#[test]
fn no_event_before_zero() {
    let (notes, sections) = random_score(7, 100);
    let events = EventCompiler::new(all_on()).compile(&notes, &sections);
    assert!(events.iter().all(|e| e.time >= 0.0));
}
