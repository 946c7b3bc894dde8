//! Output backends: the device-facing side of playback.
//!
//! The player only knows the [`OutputBackend`] trait. All backend calls happen
//! on the playback worker thread, so implementations need `Send` but never
//! `Sync`. `shutdown()` is the single safe release point: it must lift every
//! held note and the pedal, and do nothing on a second call.

pub mod config;
pub mod frame;
pub mod held;
pub mod midi;
pub mod numpad;
pub mod recording;

pub use config::{OutputConfig, OutputMode};
pub use frame::{NumpadFrame, NumpadKey, PEDAL_SENTINEL};
pub use held::HeldKeys;
pub use midi::MidiBackend;
pub use numpad::{KeystrokeSink, NumpadBackend, WriterSink};
pub use recording::{BackendCall, RecordingBackend};

use std::io;
use std::time::Duration;

/// Errors raised by output backends.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("output write failed: {0}")]
    Io(#[from] io::Error),
    #[error("MIDI init: {0}")]
    MidiInit(String),
    #[error("no MIDI output ports available")]
    NoPorts,
    #[error("MIDI output device matching '{0}' not found")]
    DeviceNotFound(String),
    #[error("MIDI connect: {0}")]
    Connect(String),
    #[error("MIDI send: {0}")]
    Send(String),
}

/// Sink for note and pedal actions.
pub trait OutputBackend: Send {
    fn note_on(&mut self, pitch: u8, velocity: u8) -> Result<(), BackendError>;

    fn note_off(&mut self, pitch: u8) -> Result<(), BackendError>;

    fn pedal_on(&mut self) -> Result<(), BackendError>;

    fn pedal_off(&mut self) -> Result<(), BackendError>;

    /// Release every active note and the pedal. Safe to call repeatedly.
    fn shutdown(&mut self) -> Result<(), BackendError>;
}

impl<B: OutputBackend + ?Sized> OutputBackend for Box<B> {
    fn note_on(&mut self, pitch: u8, velocity: u8) -> Result<(), BackendError> {
        (**self).note_on(pitch, velocity)
    }

    fn note_off(&mut self, pitch: u8) -> Result<(), BackendError> {
        (**self).note_off(pitch)
    }

    fn pedal_on(&mut self) -> Result<(), BackendError> {
        (**self).pedal_on()
    }

    fn pedal_off(&mut self) -> Result<(), BackendError> {
        (**self).pedal_off()
    }

    fn shutdown(&mut self) -> Result<(), BackendError> {
        (**self).shutdown()
    }
}

/// Build the backend selected by `config`.
///
/// `OutputMode::Numpad` writes frames to stdout for an external key injector.
/// `OutputMode::DryRun` records calls and reports them through `tracing`.
pub fn create_backend(config: &OutputConfig) -> Result<Box<dyn OutputBackend>, BackendError> {
    let backend: Box<dyn OutputBackend> = match config.mode {
        OutputMode::Numpad => Box::new(NumpadBackend::new(
            WriterSink::new(io::stdout()),
            Duration::from_millis(config.inter_message_delay_ms),
        )),
        OutputMode::Midi => Box::new(MidiBackend::connect(
            config.midi_device.as_deref(),
            config.midi_channel,
        )?),
        OutputMode::DryRun => Box::new(RecordingBackend::detached()),
    };
    Ok(backend)
}
