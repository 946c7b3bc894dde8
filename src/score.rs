//! Score files: analyzed notes, sections and tempo as YAML.
//!
//! ```yaml
//! bpm: 96
//! beats_per_bar: 3
//! sections:
//!   - { index: 0, start_time: 0.0, end_time: 7.5 }
//! notes:
//!   - { pitch: 60, velocity: 80, start_time: 0.0, duration: 0.5, hand: right }
//! ```

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{
    total_duration, MusicalSection, Note, TempoMap, DEFAULT_BEATS_PER_BAR, DEFAULT_BPM, MAX_BPM,
};

/// Errors loading a score.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("cannot read score {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid score: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("note {index}: {reason}")]
    InvalidNote { index: usize, reason: &'static str },
    #[error("section {index}: end time before start time")]
    InvalidSection { index: usize },
    #[error("tempo {0} bpm is not positive or exceeds the maximum")]
    InvalidTempo(f64),
}

fn default_bpm() -> f64 {
    DEFAULT_BPM
}

fn default_beats_per_bar() -> u32 {
    DEFAULT_BEATS_PER_BAR
}

/// An analyzed score ready to compile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default = "default_bpm")]
    pub bpm: f64,
    #[serde(default = "default_beats_per_bar")]
    pub beats_per_bar: u32,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub sections: Vec<MusicalSection>,
}

impl Score {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ScoreError> {
        let score: Score = serde_yaml::from_str(yaml)?;
        score.validate()?;
        Ok(score)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ScoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Reject tempos, notes and sections no device could play.
    pub fn validate(&self) -> Result<(), ScoreError> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 || self.bpm > MAX_BPM {
            return Err(ScoreError::InvalidTempo(self.bpm));
        }
        for (index, note) in self.notes.iter().enumerate() {
            let reason = if note.pitch > 127 {
                Some("pitch above 127")
            } else if note.velocity > 127 {
                Some("velocity above 127")
            } else if !note.start_time.is_finite() || note.start_time < 0.0 {
                Some("start time must be finite and non-negative")
            } else if !note.duration.is_finite() || note.duration < 0.0 {
                Some("duration must be finite and non-negative")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ScoreError::InvalidNote { index, reason });
            }
        }
        for (index, section) in self.sections.iter().enumerate() {
            if section.end_time < section.start_time {
                return Err(ScoreError::InvalidSection { index });
            }
        }
        Ok(())
    }

    pub fn tempo(&self) -> TempoMap {
        TempoMap::new(self.bpm, self.beats_per_bar)
    }

    /// Latest note release, in seconds.
    pub fn total_duration(&self) -> f64 {
        total_duration(&self.notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Hand;
    use assert_approx_eq::assert_approx_eq;
    use std::io::Write;

    const SCORE: &str = r#"
bpm: 96
beats_per_bar: 3
sections:
  - { index: 0, start_time: 0.0, end_time: 2.0 }
  - { index: 1, start_time: 2.0, end_time: 4.0 }
notes:
  - { pitch: 48, velocity: 70, start_time: 0.0, duration: 1.0, hand: left }
  - { pitch: 64, velocity: 90, start_time: 0.5, duration: 3.0, hand: right }
  - { pitch: 67, velocity: 90, start_time: 1.0, duration: 0.25 }
"#;

    #[test]
    fn parses_notes_sections_and_tempo() {
        let score = Score::from_yaml_str(SCORE).unwrap();
        assert_eq!(score.notes.len(), 3);
        assert_eq!(score.sections.len(), 2);
        assert_eq!(score.notes[0].hand, Hand::Left);
        assert_eq!(score.notes[2].hand, Hand::Unknown);
        assert_eq!(score.tempo(), TempoMap::new(96.0, 3));
        assert_approx_eq!(score.total_duration(), 3.5);
    }

    #[test]
    fn missing_tempo_uses_defaults() {
        let score = Score::from_yaml_str("notes: []\n").unwrap();
        assert_eq!(score.tempo(), TempoMap::default());
        assert_eq!(score.total_duration(), 0.0);
    }

    #[test]
    fn rejects_out_of_range_pitch() {
        let yaml = "notes:\n  - { pitch: 130, velocity: 1, start_time: 0.0, duration: 1.0 }\n";
        let err = Score::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidNote { index: 0, .. }));
    }

    #[test]
    fn rejects_negative_duration() {
        let yaml = "notes:\n  - { pitch: 60, velocity: 1, start_time: 0.0, duration: -1.0 }\n";
        assert!(matches!(
            Score::from_yaml_str(yaml),
            Err(ScoreError::InvalidNote { .. })
        ));
    }

    #[test]
    fn rejects_inverted_section() {
        let yaml = "sections:\n  - { index: 0, start_time: 3.0, end_time: 1.0 }\n";
        assert!(matches!(
            Score::from_yaml_str(yaml),
            Err(ScoreError::InvalidSection { index: 0 })
        ));
    }

    #[test]
    fn rejects_unplayable_tempo() {
        for bpm in ["0", "-60", ".inf", ".nan", "1.0e12"] {
            let yaml = format!("bpm: {bpm}\nnotes: []\n");
            assert!(
                matches!(Score::from_yaml_str(&yaml), Err(ScoreError::InvalidTempo(_))),
                "bpm {bpm} accepted"
            );
        }
        assert!(Score::from_yaml_str("bpm: 1000\n").is_ok());
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCORE.as_bytes()).unwrap();
        let score = Score::from_path(file.path()).unwrap();
        assert_eq!(score.notes[1].pitch, 64);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Score::from_path(dir.path().join("nope.yaml")),
            Err(ScoreError::Read { .. })
        ));
    }
}
