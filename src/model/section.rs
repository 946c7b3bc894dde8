//! Structural sections of a score.

use serde::{Deserialize, Serialize};

/// A contiguous `[start_time, end_time)` region of the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicalSection {
    pub index: usize,
    pub start_time: f64,
    pub end_time: f64,
}

impl MusicalSection {
    pub fn new(index: usize, start_time: f64, end_time: f64) -> Self {
        Self {
            index,
            start_time,
            end_time,
        }
    }

    /// Whether `time` falls inside this section (start inclusive, end exclusive).
    pub fn contains(&self, time: f64) -> bool {
        self.start_time <= time && time < self.end_time
    }

    pub fn length(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Position of the first section containing `time`.
///
/// `None` is the unindexed bucket: a note outside every section is valid and
/// is grouped with the other unmatched notes.
pub fn section_index_at(sections: &[MusicalSection], time: f64) -> Option<usize> {
    sections.iter().position(|s| s.contains(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<MusicalSection> {
        vec![
            MusicalSection::new(0, 0.0, 2.0),
            MusicalSection::new(1, 2.0, 4.0),
            MusicalSection::new(2, 6.0, 8.0),
        ]
    }

    #[test]
    fn start_is_inclusive_end_is_exclusive() {
        let s = MusicalSection::new(0, 1.0, 2.0);
        assert!(s.contains(1.0));
        assert!(s.contains(1.999));
        assert!(!s.contains(2.0));
        assert!(!s.contains(0.999));
    }

    #[test]
    fn lookup_finds_containing_section() {
        let secs = sections();
        assert_eq!(section_index_at(&secs, 0.0), Some(0));
        assert_eq!(section_index_at(&secs, 2.0), Some(1));
        assert_eq!(section_index_at(&secs, 7.5), Some(2));
    }

    #[test]
    fn gap_between_sections_is_unindexed() {
        let secs = sections();
        assert_eq!(section_index_at(&secs, 5.0), None);
        assert_eq!(section_index_at(&secs, 100.0), None);
        assert_eq!(section_index_at(&[], 0.0), None);
    }
}
