//! Score and event data model: the value types shared by the compiler and the player.
//!
//! [`Note`] and [`MusicalSection`] come from the analysis stage and are treated
//! as read-only. [`KeyEvent`] is produced only by the event compiler and never
//! mutated afterwards.

pub mod key_event;
pub mod keys;
pub mod note;
pub mod section;
pub mod tempo;

pub use key_event::{sort_events, ActionBand, KeyAction, KeyEvent, PedalAction};
pub use keys::is_black_key;
pub use note::{total_duration, Hand, Note};
pub use section::{section_index_at, MusicalSection};
pub use tempo::{TempoMap, DEFAULT_BEATS_PER_BAR, DEFAULT_BPM, MAX_BPM, MAX_MEASURES};
