//! Output selection.

use serde::{Deserialize, Serialize};

/// Which backend playback drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Numpad relay frames written to stdout.
    #[default]
    Numpad,
    /// A MIDI output port.
    Midi,
    /// Record and log calls without touching any device.
    DryRun,
}

/// Backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
    /// Preferred MIDI output device name (substring match). None = first available.
    pub midi_device: Option<String>,
    /// MIDI channel (0-15).
    pub midi_channel: u8,
    /// Pause after every numpad frame, in milliseconds.
    pub inter_message_delay_ms: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Numpad,
            midi_device: None,
            midi_channel: 0,
            inter_message_delay_ms: 0,
        }
    }
}
