//! Wrong-note selection for mistake injection.
//!
//! A mistake replaces the intended keystroke: only the substitute pitch is
//! played. Black keys slip by one or two semitones either way; white keys
//! slip only onto neighbouring white keys within two semitones.

use rand::Rng;

use crate::model::is_black_key;

const SLIP_OFFSETS: [i16; 4] = [-2, -1, 1, 2];

/// Random draws consumed by mistake injection.
pub trait MistakeSource {
    /// Uniform draw in `[0, 1)`, compared against the mistake probability.
    fn draw(&mut self) -> f64;

    /// Uniform index in `0..len`. Only called with `len > 0`.
    fn choose(&mut self, len: usize) -> usize;
}

/// [`MistakeSource`] backed by any `rand` RNG.
#[derive(Debug, Clone)]
pub struct RngDraws<R>(pub R);

impl<R: Rng> MistakeSource for RngDraws<R> {
    fn draw(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    fn choose(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// Pitches a player could plausibly hit instead of `pitch`, lowest first.
pub fn slip_candidates(pitch: u8) -> Vec<u8> {
    let black = is_black_key(pitch);
    SLIP_OFFSETS
        .iter()
        .map(|&off| pitch as i16 + off)
        .filter(|p| (0..=127).contains(p))
        .map(|p| p as u8)
        .filter(|&p| black || !is_black_key(p))
        .collect()
}

/// Pick a wrong pitch for `pitch`, or `None` when no neighbour qualifies.
pub fn mistake_pitch(pitch: u8, source: &mut dyn MistakeSource) -> Option<u8> {
    let candidates = slip_candidates(pitch);
    if candidates.is_empty() {
        return None;
    }
    let idx = source.choose(candidates.len()).min(candidates.len() - 1);
    Some(candidates[idx])
}
