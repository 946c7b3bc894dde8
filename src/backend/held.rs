//! Bookkeeping of what a backend currently holds down.

use std::collections::BTreeSet;

/// Notes and pedal currently held by a backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    notes: BTreeSet<u8>,
    pedal: bool,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, pitch: u8) {
        self.notes.insert(pitch);
    }

    /// Returns `true` if the note was held.
    pub fn release(&mut self, pitch: u8) -> bool {
        self.notes.remove(&pitch)
    }

    /// Mark the pedal down. Returns `true` if that changed anything.
    pub fn pedal_down(&mut self) -> bool {
        !std::mem::replace(&mut self.pedal, true)
    }

    /// Mark the pedal up. Returns `true` if that changed anything.
    pub fn pedal_up(&mut self) -> bool {
        std::mem::replace(&mut self.pedal, false)
    }

    pub fn is_held(&self, pitch: u8) -> bool {
        self.notes.contains(&pitch)
    }

    pub fn is_pedal_down(&self) -> bool {
        self.pedal
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && !self.pedal
    }

    /// Clear everything, returning the held notes (ascending) and whether the
    /// pedal was down.
    pub fn take_all(&mut self) -> (Vec<u8>, bool) {
        let notes = std::mem::take(&mut self.notes).into_iter().collect();
        let pedal = std::mem::replace(&mut self.pedal, false);
        (notes, pedal)
    }
}
