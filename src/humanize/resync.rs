//! Resync points: onsets shared by both hands.
//!
//! Timestamps are compared after rounding to hundredths of a second, so two
//! onsets a few milliseconds apart in the analyzed score still count as
//! simultaneous.

use std::collections::HashSet;

use crate::model::Note;

/// Rounding scale: 100 → two decimal places.
const RESYNC_SCALE: f64 = 100.0;

fn resync_key(time: f64) -> i64 {
    (time * RESYNC_SCALE).round() as i64
}

/// Set of onset times where the left and right hand start together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncPoints {
    keys: HashSet<i64>,
}

impl ResyncPoints {
    /// Intersect the rounded onsets of the two hands.
    pub fn between(left: &[Note], right: &[Note]) -> Self {
        let left_keys: HashSet<i64> = left.iter().map(|n| resync_key(n.start_time)).collect();
        let keys = right
            .iter()
            .map(|n| resync_key(n.start_time))
            .filter(|k| left_keys.contains(k))
            .collect();
        Self { keys }
    }

    /// Whether `time` rounds onto a resync point.
    pub fn contains(&self, time: f64) -> bool {
        self.keys.contains(&resync_key(time))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
