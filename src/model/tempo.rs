//! Fixed tempo map: converts between beats and seconds and answers
//! measure-boundary queries over a score's duration.

use serde::{Deserialize, Serialize};

/// Default tempo when a score does not state one.
pub const DEFAULT_BPM: f64 = 120.0;

/// Default time signature numerator.
pub const DEFAULT_BEATS_PER_BAR: u32 = 4;

/// Fastest tempo a score may declare.
pub const MAX_BPM: f64 = 1000.0;

/// Most bar starts [`TempoMap::measure_boundaries`] will list.
pub const MAX_MEASURES: usize = 100_000;

/// A constant-tempo map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoMap {
    pub bpm: f64,
    pub beats_per_bar: u32,
}

impl TempoMap {
    pub fn new(bpm: f64, beats_per_bar: u32) -> Self {
        Self { bpm, beats_per_bar }
    }

    /// Length of one beat in seconds.
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Length of one bar in seconds.
    pub fn seconds_per_bar(&self) -> f64 {
        self.seconds_per_beat() * self.beats_per_bar.max(1) as f64
    }

    /// Bar start times in `[0, total_duration)`, beginning with 0.0.
    ///
    /// Returns an empty list for a non-positive duration, a degenerate tempo,
    /// or more than [`MAX_MEASURES`] bars.
    pub fn measure_boundaries(&self, total_duration: f64) -> Vec<f64> {
        let bar = self.seconds_per_bar();
        if total_duration.is_nan() || total_duration <= 0.0 || !bar.is_finite() || bar <= 0.0 {
            return Vec::new();
        }
        let count = (total_duration / bar).ceil();
        if count > MAX_MEASURES as f64 {
            return Vec::new();
        }
        (0..count as usize).map(|i| i as f64 * bar).collect()
    }
}

impl Default for TempoMap {
    fn default() -> Self {
        Self::new(DEFAULT_BPM, DEFAULT_BEATS_PER_BAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_length_at_120_bpm_in_four_four() {
        let t = TempoMap::default();
        assert!((t.seconds_per_bar() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn boundaries_cover_duration() {
        let t = TempoMap::new(120.0, 4);
        assert_eq!(t.measure_boundaries(5.0), vec![0.0, 2.0, 4.0]);
        assert_eq!(t.measure_boundaries(4.0), vec![0.0, 2.0]);
    }

    #[test]
    fn empty_for_zero_duration() {
        assert!(TempoMap::default().measure_boundaries(0.0).is_empty());
    }

    #[test]
    fn degenerate_tempo_yields_nothing() {
        assert!(TempoMap::new(0.0, 4).measure_boundaries(10.0).is_empty());
    }

    #[test]
    fn absurd_tempo_yields_nothing() {
        assert!(TempoMap::new(1e12, 4).measure_boundaries(100.0).is_empty());
        assert!(TempoMap::new(f64::INFINITY, 4).measure_boundaries(100.0).is_empty());
        assert!(TempoMap::default().measure_boundaries(f64::INFINITY).is_empty());
        assert!(TempoMap::default().measure_boundaries(f64::NAN).is_empty());
    }

    #[test]
    fn boundary_count_is_capped() {
        let t = TempoMap::new(60.0, 1);
        let limit = MAX_MEASURES as f64;
        assert_eq!(t.measure_boundaries(limit).len(), MAX_MEASURES);
        assert!(t.measure_boundaries(limit * 2.0).is_empty());
    }

    #[test]
    fn three_four_time() {
        let t = TempoMap::new(60.0, 3);
        assert_eq!(t.measure_boundaries(7.0), vec![0.0, 3.0, 6.0]);
    }
}
