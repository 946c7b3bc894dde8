//! Humanization and pedal settings.

use serde::{Deserialize, Serialize};

/// Switches and amounts for the default humanizer.
///
/// Amounts are in seconds except `articulation_variance`, which is a fraction
/// of the written duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanizeConfig {
    pub vary_timing: bool,
    pub vary_articulation: bool,
    pub enable_drift_correction: bool,
    pub enable_chord_roll: bool,
    pub enable_tempo_sway: bool,
    /// Maximum onset offset per chord, ± seconds.
    pub timing_variance: f64,
    /// Maximum random-walk step of a hand's drift per onset group.
    pub drift_step: f64,
    /// Maximum relative change of a note's duration.
    pub articulation_variance: f64,
    /// Delay between successive notes of a rolled chord.
    pub chord_roll_spread: f64,
    /// Maximum mid-section rubato displacement, ± seconds.
    pub tempo_sway_amount: f64,
}

impl HumanizeConfig {
    /// Whether any humanization pass is switched on.
    pub fn any_enabled(&self) -> bool {
        self.vary_timing
            || self.vary_articulation
            || self.enable_drift_correction
            || self.enable_chord_roll
            || self.enable_tempo_sway
    }
}

impl Default for HumanizeConfig {
    fn default() -> Self {
        Self {
            vary_timing: false,
            vary_articulation: false,
            enable_drift_correction: false,
            enable_chord_roll: false,
            enable_tempo_sway: false,
            timing_variance: 0.012,
            drift_step: 0.004,
            articulation_variance: 0.15,
            chord_roll_spread: 0.008,
            tempo_sway_amount: 0.06,
        }
    }
}

/// How the default pedal generator places sustain pedal changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PedalStyle {
    /// No pedal events at all.
    #[default]
    None,
    /// Hold the pedal from the first onset to the last release.
    Sustain,
    /// Change pedal at every section start.
    Sections,
    /// Change pedal at every bar line of the tempo map.
    Measures,
}
