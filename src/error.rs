// Error types shared across the crate

use crate::sequencer::multitrack::Tick;

/// Errors produced by the sequencing core and the file codec
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("track index {index} out of range ({tracks} tracks)")]
    TrackOutOfRange { index: usize, tracks: usize },

    #[error("event at tick {time} would break track order (last event at tick {last})")]
    AppendOutOfOrder { time: Tick, last: Tick },

    #[error("invalid duration: {0} seconds")]
    InvalidDuration(f64),

    #[error("SMPTE time base is not supported, only metrical (ticks per beat) timing")]
    UnsupportedTiming,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed MIDI file: {0}")]
    Parse(String),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;
