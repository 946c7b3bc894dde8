//! Numpad relay backend: encodes every action as a five-keystroke frame.
//!
//! Keystroke injection itself is behind [`KeystrokeSink`]. [`WriterSink`]
//! writes one line of key names per frame, which an external injector process
//! can read from a pipe.

use std::io::Write;
use std::thread;
use std::time::Duration;

use super::frame::{NumpadFrame, NumpadKey, FRAME_LEN};
use super::held::HeldKeys;
use super::{BackendError, OutputBackend};

/// Pedal level sent for "down".
const PEDAL_DOWN_LEVEL: u8 = 127;

/// Destination for numpad keystrokes.
pub trait KeystrokeSink: Send {
    fn send_frame(&mut self, keys: &[NumpadKey; FRAME_LEN]) -> Result<(), BackendError>;
}

/// Writes each frame as a space-separated line of key names.
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> KeystrokeSink for WriterSink<W> {
    fn send_frame(&mut self, keys: &[NumpadKey; FRAME_LEN]) -> Result<(), BackendError> {
        let line: Vec<&str> = keys.iter().map(|k| k.name()).collect();
        writeln!(self.writer, "{}", line.join(" "))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Backend speaking the numpad relay protocol.
pub struct NumpadBackend<S> {
    sink: S,
    held: HeldKeys,
    inter_message_delay: Duration,
}

impl<S: KeystrokeSink> NumpadBackend<S> {
    pub fn new(sink: S, inter_message_delay: Duration) -> Self {
        Self {
            sink,
            held: HeldKeys::new(),
            inter_message_delay,
        }
    }

    pub fn held(&self) -> &HeldKeys {
        &self.held
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn send(&mut self, frame: NumpadFrame) -> Result<(), BackendError> {
        self.sink.send_frame(&frame.keys())?;
        if !self.inter_message_delay.is_zero() {
            thread::sleep(self.inter_message_delay);
        }
        Ok(())
    }
}

impl<S: KeystrokeSink> OutputBackend for NumpadBackend<S> {
    fn note_on(&mut self, pitch: u8, velocity: u8) -> Result<(), BackendError> {
        self.held.press(pitch);
        self.send(NumpadFrame::note_on(pitch, velocity))
    }

    fn note_off(&mut self, pitch: u8) -> Result<(), BackendError> {
        self.held.release(pitch);
        self.send(NumpadFrame::note_off(pitch))
    }

    fn pedal_on(&mut self) -> Result<(), BackendError> {
        if self.held.pedal_down() {
            self.send(NumpadFrame::pedal(PEDAL_DOWN_LEVEL))?;
        }
        Ok(())
    }

    fn pedal_off(&mut self) -> Result<(), BackendError> {
        if self.held.pedal_up() {
            self.send(NumpadFrame::pedal(0))?;
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), BackendError> {
        let (notes, pedal) = self.held.take_all();
        let mut first_err = None;
        for pitch in notes {
            if let Err(e) = self.send(NumpadFrame::note_off(pitch)) {
                first_err.get_or_insert(e);
            }
        }
        if pedal {
            if let Err(e) = self.send(NumpadFrame::pedal(0)) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
