//! Recording backend: reports every call over a channel and through `tracing`.
//!
//! Used for dry runs and as the observable backend in tests.

use std::sync::mpsc;

use super::held::HeldKeys;
use super::{BackendError, OutputBackend};

/// One call made on a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    NoteOn { pitch: u8, velocity: u8 },
    NoteOff { pitch: u8 },
    PedalOn,
    PedalOff,
    /// A shutdown, with what it had to release.
    Shutdown { released: Vec<u8>, pedal: bool },
}

/// Backend that forwards calls to an `mpsc` receiver.
pub struct RecordingBackend {
    tx: Option<mpsc::Sender<BackendCall>>,
    held: HeldKeys,
}

impl RecordingBackend {
    /// Create a recorder and the receiver that observes it.
    pub fn new() -> (Self, mpsc::Receiver<BackendCall>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                tx: Some(tx),
                held: HeldKeys::new(),
            },
            rx,
        )
    }

    /// A recorder nobody observes; calls only show up in the log.
    pub fn detached() -> Self {
        Self {
            tx: None,
            held: HeldKeys::new(),
        }
    }

    pub fn held(&self) -> &HeldKeys {
        &self.held
    }

    fn record(&self, call: BackendCall) {
        tracing::info!(?call, "backend call");
        if let Some(tx) = &self.tx {
            let _ = tx.send(call);
        }
    }
}

impl OutputBackend for RecordingBackend {
    fn note_on(&mut self, pitch: u8, velocity: u8) -> Result<(), BackendError> {
        self.held.press(pitch);
        self.record(BackendCall::NoteOn { pitch, velocity });
        Ok(())
    }

    fn note_off(&mut self, pitch: u8) -> Result<(), BackendError> {
        self.held.release(pitch);
        self.record(BackendCall::NoteOff { pitch });
        Ok(())
    }

    fn pedal_on(&mut self) -> Result<(), BackendError> {
        self.held.pedal_down();
        self.record(BackendCall::PedalOn);
        Ok(())
    }

    fn pedal_off(&mut self) -> Result<(), BackendError> {
        self.held.pedal_up();
        self.record(BackendCall::PedalOff);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), BackendError> {
        let (released, pedal) = self.held.take_all();
        self.record(BackendCall::Shutdown { released, pedal });
        Ok(())
    }
}
