//! MIDI output backend: note on/off and CC 64 sustain on a midir output port.

use midir::{MidiOutput, MidiOutputConnection};

use super::held::HeldKeys;
use super::{BackendError, OutputBackend};

/// Sustain pedal controller number.
pub const SUSTAIN_CC: u8 = 64;

pub fn note_on_message(channel: u8, pitch: u8, velocity: u8) -> [u8; 3] {
    [0x90 | (channel & 0x0F), pitch & 0x7F, velocity.min(127)]
}

pub fn note_off_message(channel: u8, pitch: u8) -> [u8; 3] {
    [0x80 | (channel & 0x0F), pitch & 0x7F, 0]
}

pub fn sustain_message(channel: u8, down: bool) -> [u8; 3] {
    [0xB0 | (channel & 0x0F), SUSTAIN_CC, if down { 127 } else { 0 }]
}

/// Active MIDI output connection.
pub struct MidiBackend {
    connection: MidiOutputConnection,
    port_name: String,
    channel: u8,
    held: HeldKeys,
}

impl MidiBackend {
    /// Connect to a port whose name contains `device_name`, or the first port.
    pub fn connect(device_name: Option<&str>, channel: u8) -> Result<Self, BackendError> {
        let midi_out =
            MidiOutput::new("pianola").map_err(|e| BackendError::MidiInit(e.to_string()))?;

        let ports = midi_out.ports();
        if ports.is_empty() {
            return Err(BackendError::NoPorts);
        }

        let (port, port_name) = if let Some(name_filter) = device_name {
            ports
                .iter()
                .find_map(|p| {
                    let name = midi_out.port_name(p).unwrap_or_default();
                    if name.contains(name_filter) {
                        Some((p.clone(), name))
                    } else {
                        None
                    }
                })
                .ok_or_else(|| BackendError::DeviceNotFound(name_filter.to_string()))?
        } else {
            let p = ports[0].clone();
            let name = midi_out
                .port_name(&p)
                .unwrap_or_else(|_| "unknown".to_string());
            (p, name)
        };

        let connection = midi_out
            .connect(&port, "pianola-output")
            .map_err(|e| BackendError::Connect(e.to_string()))?;
        tracing::info!(port = %port_name, channel, "connected MIDI output");

        Ok(Self {
            connection,
            port_name,
            channel,
            held: HeldKeys::new(),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// List all available MIDI output device names.
    pub fn list_devices() -> Vec<String> {
        let Ok(midi_out) = MidiOutput::new("pianola-list") else {
            return Vec::new();
        };
        midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect()
    }

    fn send(&mut self, message: &[u8]) -> Result<(), BackendError> {
        self.connection
            .send(message)
            .map_err(|e| BackendError::Send(e.to_string()))
    }
}

impl OutputBackend for MidiBackend {
    fn note_on(&mut self, pitch: u8, velocity: u8) -> Result<(), BackendError> {
        self.held.press(pitch);
        self.send(&note_on_message(self.channel, pitch, velocity))
    }

    fn note_off(&mut self, pitch: u8) -> Result<(), BackendError> {
        self.held.release(pitch);
        self.send(&note_off_message(self.channel, pitch))
    }

    fn pedal_on(&mut self) -> Result<(), BackendError> {
        if self.held.pedal_down() {
            self.send(&sustain_message(self.channel, true))?;
        }
        Ok(())
    }

    fn pedal_off(&mut self) -> Result<(), BackendError> {
        if self.held.pedal_up() {
            self.send(&sustain_message(self.channel, false))?;
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), BackendError> {
        let (notes, pedal) = self.held.take_all();
        let mut first_err = None;
        for pitch in notes {
            if let Err(e) = self.send(&note_off_message(self.channel, pitch)) {
                first_err.get_or_insert(e);
            }
        }
        if pedal {
            if let Err(e) = self.send(&sustain_message(self.channel, false)) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
