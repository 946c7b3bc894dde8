//! Keyboard geometry helpers.

/// Pitch classes of the black keys (C# D# F# G# A#).
const BLACK_PITCH_CLASSES: [u8; 5] = [1, 3, 6, 8, 10];

/// Whether a MIDI pitch sits on a black key.
pub fn is_black_key(pitch: u8) -> bool {
    BLACK_PITCH_CLASSES.contains(&(pitch % 12))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_major_scale_is_all_white() {
        for p in [60, 62, 64, 65, 67, 69, 71, 72] {
            assert!(!is_black_key(p), "pitch {p} should be white");
        }
    }

    #[test]
    fn sharps_are_black() {
        for p in [61, 63, 66, 68, 70] {
            assert!(is_black_key(p), "pitch {p} should be black");
        }
    }

    #[test]
    fn classification_repeats_every_octave() {
        for p in 0..116u8 {
            assert_eq!(is_black_key(p), is_black_key(p + 12));
        }
    }
}
