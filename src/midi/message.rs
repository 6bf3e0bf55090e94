// MIDI message model
// Channel voice and meta messages, plus the sequencer-internal variants,
// with the classification predicates the sequencing core relies on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A MIDI message without timing information
///
/// Covers the channel voice messages found in track data, the meta messages
/// the time base cares about, and two sequencer-internal variants: `NoOp`
/// (bookkeeping, never part of audible output) and `BeatMarker` (synthesized
/// by the cursor at beat boundaries, never present in source data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    PolyAftertouch { channel: u8, key: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelAftertouch { channel: u8, pressure: u8 },
    /// Raw 14-bit bend value (0..=16383, center 8192)
    PitchBend { channel: u8, bend: u16 },
    /// Tempo change, in microseconds per quarter note
    Tempo { micros_per_beat: u32 },
    /// Time signature; denominator is the actual note value (4, 8, ...)
    TimeSignature { numerator: u8, denominator: u8 },
    TrackName(String),
    EndOfTrack,
    /// Sequencer bookkeeping; never emitted to output
    NoOp,
    /// Beat boundary marker synthesized by the cursor
    BeatMarker { beat: u32 },
}

impl Message {
    /// Build a note-on message
    ///
    /// Velocity 0 is conventionally a note-off; `add_ending_pause` uses
    /// `note_on(0, 0, 0)` to silence a track's tail.
    pub fn note_on(channel: u8, key: u8, velocity: u8) -> Self {
        Message::NoteOn {
            channel,
            key,
            velocity,
        }
    }

    /// Sequencer-internal bookkeeping message, filtered from all output
    pub fn is_service(&self) -> bool {
        matches!(self, Message::NoOp)
    }

    /// Any note-on, including velocity 0
    pub fn is_note_on(&self) -> bool {
        matches!(self, Message::NoteOn { .. })
    }

    /// Note-on with velocity 0 (a note-off by convention)
    pub fn is_note_on_v0(&self) -> bool {
        matches!(self, Message::NoteOn { velocity: 0, .. })
    }

    /// Marker synthesized by the cursor, not part of source data
    pub fn is_beat_marker(&self) -> bool {
        matches!(self, Message::BeatMarker { .. })
    }

    /// Meta message (tempo, time signature, names, end of track)
    pub fn is_meta(&self) -> bool {
        matches!(
            self,
            Message::Tempo { .. }
                | Message::TimeSignature { .. }
                | Message::TrackName(_)
                | Message::EndOfTrack
        )
    }

    /// Channel this message is addressed to, if it is a channel voice message
    pub fn channel(&self) -> Option<u8> {
        match self {
            Message::NoteOn { channel, .. }
            | Message::NoteOff { channel, .. }
            | Message::PolyAftertouch { channel, .. }
            | Message::ControlChange { channel, .. }
            | Message::ProgramChange { channel, .. }
            | Message::ChannelAftertouch { channel, .. }
            | Message::PitchBend { channel, .. } => Some(*channel),
            _ => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::NoteOn {
                channel,
                key,
                velocity,
            } => write!(f, "NOTE ON   ch {channel} key {key} vel {velocity}"),
            Message::NoteOff {
                channel,
                key,
                velocity,
            } => write!(f, "NOTE OFF  ch {channel} key {key} vel {velocity}"),
            Message::PolyAftertouch {
                channel,
                key,
                pressure,
            } => write!(f, "POLY AT   ch {channel} key {key} val {pressure}"),
            Message::ControlChange {
                channel,
                controller,
                value,
            } => write!(f, "CTRL CHG  ch {channel} ctrl {controller} val {value}"),
            Message::ProgramChange { channel, program } => {
                write!(f, "PROG CHG  ch {channel} prog {program}")
            }
            Message::ChannelAftertouch { channel, pressure } => {
                write!(f, "CHAN AT   ch {channel} val {pressure}")
            }
            Message::PitchBend { channel, bend } => {
                write!(f, "BEND      ch {channel} val {bend}")
            }
            Message::Tempo { micros_per_beat } => {
                let bpm = 60_000_000.0 / *micros_per_beat as f64;
                write!(f, "TEMPO     {bpm:.2} bpm")
            }
            Message::TimeSignature {
                numerator,
                denominator,
            } => write!(f, "TIME SIG  {numerator}/{denominator}"),
            Message::TrackName(name) => write!(f, "TRACK NAME {name}"),
            Message::EndOfTrack => write!(f, "END OF TRACK"),
            Message::NoOp => write!(f, "NO-OP"),
            Message::BeatMarker { beat } => write!(f, "BEAT {beat}"),
        }
    }
}
