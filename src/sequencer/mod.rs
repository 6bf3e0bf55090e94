// Sequencer module
// Multitrack event containers, the chronological cursor, the tick/ms time
// base and the time-domain transformations built on them.

pub mod cursor;
pub mod multitrack;
pub mod render;
pub mod timebase;
pub mod transform;

pub use cursor::{Cursor, CursorState};
pub use multitrack::{DEFAULT_RESOLUTION, Event, MultiTrack, Tick, Track};
pub use render::{event_as_text, multitrack_as_text};
pub use timebase::{DEFAULT_MICROS_PER_BEAT, TempoMap};
pub use transform::{
    add_ending_pause, clip_to_duration, compress_leading_silence, prolong_last_events,
};
