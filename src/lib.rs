// midikit - multitrack MIDI sequencing and time-domain transformations
//
// Chronological iteration over multitrack event streams plus the rewrites
// built on it: leading-silence compression, duration-bounded clipping, tail
// prolongation and ending-pause insertion, with a Standard MIDI File codec
// and diagnostic text rendering.

pub mod error;
pub mod io;
pub mod midi;
pub mod sequencer;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use midi::Message;
pub use sequencer::{
    Cursor, CursorState, Event, MultiTrack, TempoMap, Tick, Track, add_ending_pause,
    clip_to_duration, compress_leading_silence, event_as_text, multitrack_as_text,
    prolong_last_events,
};
