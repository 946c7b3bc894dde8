//! Numpad relay frame codec.
//!
//! Every note or pedal event travels as five keystrokes: a `Multiply` prefix,
//! then four base-12 digits typed on `Num0`–`Num9`, `Subtract` (10) and
//! `Add` (11). Digits outside `0..=11` are clamped.
//!
//! | event    | d0           | d1          | d2             | d3            |
//! |----------|--------------|-------------|----------------|---------------|
//! | note on  | pitch / 12   | pitch % 12  | velocity / 12  | velocity % 12 |
//! | note off | pitch / 12   | pitch % 12  | 0              | 0             |
//! | pedal    | 143 / 12     | 143 % 12    | level / 12     | level % 12    |
//!
//! The pedal header 143 cannot come from a valid pitch (at most 127), so the
//! receiver tells the two apart from the first two digits alone.

use std::fmt;

/// Header value that marks a pedal frame.
pub const PEDAL_SENTINEL: u16 = 143;

/// Keystrokes per frame (prefix + four digits).
pub const FRAME_LEN: usize = 5;

/// Largest value a single digit keystroke carries.
pub const MAX_DIGIT: u8 = 11;

/// A numpad key used by the relay protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumpadKey {
    Multiply,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Subtract,
    Add,
}

/// Digit keys indexed by the value they encode.
pub const DIGIT_KEYS: [NumpadKey; 12] = [
    NumpadKey::Num0,
    NumpadKey::Num1,
    NumpadKey::Num2,
    NumpadKey::Num3,
    NumpadKey::Num4,
    NumpadKey::Num5,
    NumpadKey::Num6,
    NumpadKey::Num7,
    NumpadKey::Num8,
    NumpadKey::Num9,
    NumpadKey::Subtract,
    NumpadKey::Add,
];

impl NumpadKey {
    /// Key for a digit value, clamped to `0..=11`.
    pub fn for_digit(value: u8) -> Self {
        DIGIT_KEYS[value.min(MAX_DIGIT) as usize]
    }

    /// Digit value carried by this key; `None` for the prefix key.
    pub fn digit(self) -> Option<u8> {
        DIGIT_KEYS.iter().position(|&k| k == self).map(|i| i as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            NumpadKey::Multiply => "multiply",
            NumpadKey::Num0 => "numpad0",
            NumpadKey::Num1 => "numpad1",
            NumpadKey::Num2 => "numpad2",
            NumpadKey::Num3 => "numpad3",
            NumpadKey::Num4 => "numpad4",
            NumpadKey::Num5 => "numpad5",
            NumpadKey::Num6 => "numpad6",
            NumpadKey::Num7 => "numpad7",
            NumpadKey::Num8 => "numpad8",
            NumpadKey::Num9 => "numpad9",
            NumpadKey::Subtract => "subtract",
            NumpadKey::Add => "add",
        }
    }
}

impl fmt::Display for NumpadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Four clamped base-12 digits of one relay message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumpadFrame {
    digits: [u8; 4],
}

impl NumpadFrame {
    /// Build a frame from raw values, clamping each into `0..=11`.
    pub fn new(d0: u16, d1: u16, d2: u16, d3: u16) -> Self {
        let clamp = |v: u16| v.min(MAX_DIGIT as u16) as u8;
        Self {
            digits: [clamp(d0), clamp(d1), clamp(d2), clamp(d3)],
        }
    }

    pub fn note_on(pitch: u8, velocity: u8) -> Self {
        let pitch = pitch as u16;
        let velocity = velocity.min(127) as u16;
        Self::new(pitch / 12, pitch % 12, velocity / 12, velocity % 12)
    }

    pub fn note_off(pitch: u8) -> Self {
        let pitch = pitch as u16;
        Self::new(pitch / 12, pitch % 12, 0, 0)
    }

    /// Sustain pedal level (0 = up, 127 = fully down).
    pub fn pedal(level: u8) -> Self {
        let level = level.min(127) as u16;
        Self::new(
            PEDAL_SENTINEL / 12,
            PEDAL_SENTINEL % 12,
            level / 12,
            level % 12,
        )
    }

    pub fn digits(&self) -> [u8; 4] {
        self.digits
    }

    /// Value of the first digit pair: the pitch, or [`PEDAL_SENTINEL`].
    pub fn header(&self) -> u16 {
        decode_pair(self.digits[0], self.digits[1])
    }

    /// Value of the second digit pair: velocity or pedal level.
    pub fn payload(&self) -> u16 {
        decode_pair(self.digits[2], self.digits[3])
    }

    pub fn is_pedal(&self) -> bool {
        self.header() == PEDAL_SENTINEL
    }

    /// The five keystrokes, prefix first.
    pub fn keys(&self) -> [NumpadKey; FRAME_LEN] {
        [
            NumpadKey::Multiply,
            NumpadKey::for_digit(self.digits[0]),
            NumpadKey::for_digit(self.digits[1]),
            NumpadKey::for_digit(self.digits[2]),
            NumpadKey::for_digit(self.digits[3]),
        ]
    }

    /// Parse five keystrokes back into a frame. `None` if the prefix or a digit is wrong.
    pub fn from_keys(keys: &[NumpadKey; FRAME_LEN]) -> Option<Self> {
        if keys[0] != NumpadKey::Multiply {
            return None;
        }
        let mut digits = [0u8; 4];
        for (slot, key) in digits.iter_mut().zip(&keys[1..]) {
            *slot = key.digit()?;
        }
        Some(Self { digits })
    }
}

impl fmt::Display for NumpadFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self.keys();
        write!(
            f,
            "{} {} {} {} {}",
            keys[0], keys[1], keys[2], keys[3], keys[4]
        )
    }
}

/// Combine a high and low base-12 digit.
pub fn decode_pair(hi: u8, lo: u8) -> u16 {
    hi as u16 * 12 + lo as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pitch_and_velocity_decodes_exactly() {
        for pitch in 0..=127u8 {
            for velocity in 0..=127u8 {
                let frame = NumpadFrame::note_on(pitch, velocity);
                assert_eq!(frame.header(), pitch as u16);
                assert_eq!(frame.payload(), velocity as u16);
                assert!(frame.digits().iter().all(|&d| d <= MAX_DIGIT));
            }
        }
    }

    #[test]
    fn pedal_frames_carry_sentinel() {
        for level in [0u8, 1, 64, 127, 200] {
            let frame = NumpadFrame::pedal(level);
            assert_eq!(frame.header(), PEDAL_SENTINEL);
            assert!(frame.is_pedal());
            assert_eq!(frame.payload(), level.min(127) as u16);
        }
    }

    #[test]
    fn note_frames_are_never_pedal_frames() {
        for pitch in 0..=127u8 {
            assert!(!NumpadFrame::note_on(pitch, 100).is_pedal());
        }
    }

    #[test]
    fn note_off_zeroes_velocity() {
        let frame = NumpadFrame::note_off(61);
        assert_eq!(frame.digits(), [5, 1, 0, 0]);
    }

    #[test]
    fn out_of_range_digits_clamp() {
        let frame = NumpadFrame::new(30, 12, 11, 0);
        assert_eq!(frame.digits(), [11, 11, 11, 0]);
    }

    #[test]
    fn keys_start_with_prefix_and_parse_back() {
        let frame = NumpadFrame::note_on(127, 127);
        let keys = frame.keys();
        assert_eq!(keys[0], NumpadKey::Multiply);
        assert_eq!(keys[1], NumpadKey::Subtract);
        assert_eq!(keys[2], NumpadKey::Num7);
        assert_eq!(NumpadFrame::from_keys(&keys), Some(frame));
    }

    #[test]
    fn from_keys_rejects_missing_prefix() {
        let mut keys = NumpadFrame::note_on(60, 64).keys();
        keys[0] = NumpadKey::Num0;
        assert_eq!(NumpadFrame::from_keys(&keys), None);
        let mut keys = NumpadFrame::note_on(60, 64).keys();
        keys[3] = NumpadKey::Multiply;
        assert_eq!(NumpadFrame::from_keys(&keys), None);
    }

    #[test]
    fn display_lists_key_names() {
        assert_eq!(
            NumpadFrame::pedal(127).to_string(),
            "multiply add add subtract numpad7"
        );
    }
}
