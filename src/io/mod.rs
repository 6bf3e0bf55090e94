// Standard MIDI File codec
// Thin adapter between midly's delta-timed track events and this crate's
// absolute-tick multitrack model. Running-status packing on write is
// midly-internal and opaque to the core.

use crate::error::{Error, Result};
use crate::midi::Message;
use crate::sequencer::multitrack::{Event, MultiTrack, Tick};
use crate::sequencer::timebase::TempoMap;
use midly::num::{u4, u7, u14, u15, u24, u28};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::fs;
use std::path::Path;

/// Read a Standard MIDI File into a multitrack
///
/// Delta times are accumulated into absolute ticks, one `Track` per SMF
/// track. Only metrical (ticks-per-beat) timing is supported; SMPTE files
/// are rejected. Message kinds the model does not represent (sysex, escape
/// sequences, uncommon metas) are skipped.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<MultiTrack> {
    let bytes = fs::read(path)?;
    let smf = Smf::parse(&bytes).map_err(|error| Error::Parse(error.to_string()))?;

    let resolution = match smf.header.timing {
        Timing::Metrical(ticks_per_beat) => ticks_per_beat.as_int(),
        Timing::Timecode(..) => return Err(Error::UnsupportedTiming),
    };

    let mut mt = MultiTrack::with_tracks(resolution, smf.tracks.len());
    for (index, track) in smf.tracks.iter().enumerate() {
        let dst = mt.track_mut(index)?;
        let mut tick: Tick = 0;
        for event in track {
            tick += event.delta.as_int() as Tick;
            if let Some(message) = message_from_midly(&event.kind) {
                dst.push_event(Event::new(tick, message))?;
            }
        }
    }
    Ok(mt)
}

/// Write a multitrack as a Standard MIDI File
///
/// Only tracks containing at least one event are written. Each written
/// track is terminated with an end-of-track meta if the source does not
/// already carry one; service messages and beat markers never reach the
/// file.
pub fn write_file<P: AsRef<Path>>(mt: &MultiTrack, path: P) -> Result<()> {
    let format = if mt.tracks_with_events() == 1 {
        Format::SingleTrack
    } else {
        Format::Parallel
    };
    let timing = Timing::Metrical(u15::new(mt.resolution() & 0x7fff));
    let mut smf = Smf::new(Header::new(format, timing));

    for track in mt.tracks().filter(|track| !track.is_empty()) {
        let mut events: Vec<TrackEvent<'_>> = Vec::with_capacity(track.len() + 1);
        let mut last_tick: Tick = 0;
        for event in track {
            let Some(kind) = message_to_midly(&event.message) else {
                continue;
            };
            let delta = (event.time - last_tick) as u32;
            last_tick = event.time;
            events.push(TrackEvent {
                delta: u28::new(delta),
                kind,
            });
        }
        let terminated = matches!(
            events.last(),
            Some(TrackEvent {
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
                ..
            })
        );
        if !terminated {
            events.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            });
        }
        smf.tracks.push(events);
    }

    smf.save(path)?;
    Ok(())
}

/// Total duration of a MIDI file in seconds
pub fn duration_secs<P: AsRef<Path>>(path: P) -> Result<f64> {
    let mt = read_file(path)?;
    Ok(TempoMap::from_multitrack(&mt).duration_secs(&mt))
}

fn message_from_midly(kind: &TrackEventKind<'_>) -> Option<Message> {
    match kind {
        TrackEventKind::Midi { channel, message } => {
            let channel = channel.as_int();
            // Note-ons with velocity 0 are kept as note-ons: the distinction
            // matters to the compression phase transition.
            Some(match message {
                MidiMessage::NoteOn { key, vel } => Message::NoteOn {
                    channel,
                    key: key.as_int(),
                    velocity: vel.as_int(),
                },
                MidiMessage::NoteOff { key, vel } => Message::NoteOff {
                    channel,
                    key: key.as_int(),
                    velocity: vel.as_int(),
                },
                MidiMessage::Aftertouch { key, vel } => Message::PolyAftertouch {
                    channel,
                    key: key.as_int(),
                    pressure: vel.as_int(),
                },
                MidiMessage::Controller { controller, value } => Message::ControlChange {
                    channel,
                    controller: controller.as_int(),
                    value: value.as_int(),
                },
                MidiMessage::ProgramChange { program } => Message::ProgramChange {
                    channel,
                    program: program.as_int(),
                },
                MidiMessage::ChannelAftertouch { vel } => Message::ChannelAftertouch {
                    channel,
                    pressure: vel.as_int(),
                },
                MidiMessage::PitchBend { bend } => Message::PitchBend {
                    channel,
                    bend: bend.0.as_int(),
                },
            })
        }
        TrackEventKind::Meta(meta) => match meta {
            MetaMessage::Tempo(micros_per_beat) => Some(Message::Tempo {
                micros_per_beat: micros_per_beat.as_int(),
            }),
            MetaMessage::TimeSignature(numerator, denominator_log2, _, _) => {
                Some(Message::TimeSignature {
                    numerator: *numerator,
                    denominator: 2u8.saturating_pow(*denominator_log2 as u32),
                })
            }
            MetaMessage::TrackName(name) => {
                Some(Message::TrackName(String::from_utf8_lossy(name).into_owned()))
            }
            MetaMessage::EndOfTrack => Some(Message::EndOfTrack),
            _ => None,
        },
        TrackEventKind::SysEx(_) | TrackEventKind::Escape(_) => None,
    }
}

fn message_to_midly(message: &Message) -> Option<TrackEventKind<'_>> {
    let midi = |channel: u8, message: MidiMessage| TrackEventKind::Midi {
        channel: u4::new(channel & 0x0f),
        message,
    };
    Some(match message {
        Message::NoteOn {
            channel,
            key,
            velocity,
        } => midi(
            *channel,
            MidiMessage::NoteOn {
                key: u7::new(key & 0x7f),
                vel: u7::new(velocity & 0x7f),
            },
        ),
        Message::NoteOff {
            channel,
            key,
            velocity,
        } => midi(
            *channel,
            MidiMessage::NoteOff {
                key: u7::new(key & 0x7f),
                vel: u7::new(velocity & 0x7f),
            },
        ),
        Message::PolyAftertouch {
            channel,
            key,
            pressure,
        } => midi(
            *channel,
            MidiMessage::Aftertouch {
                key: u7::new(key & 0x7f),
                vel: u7::new(pressure & 0x7f),
            },
        ),
        Message::ControlChange {
            channel,
            controller,
            value,
        } => midi(
            *channel,
            MidiMessage::Controller {
                controller: u7::new(controller & 0x7f),
                value: u7::new(value & 0x7f),
            },
        ),
        Message::ProgramChange { channel, program } => midi(
            *channel,
            MidiMessage::ProgramChange {
                program: u7::new(program & 0x7f),
            },
        ),
        Message::ChannelAftertouch { channel, pressure } => midi(
            *channel,
            MidiMessage::ChannelAftertouch {
                vel: u7::new(pressure & 0x7f),
            },
        ),
        Message::PitchBend { channel, bend } => midi(
            *channel,
            MidiMessage::PitchBend {
                bend: midly::PitchBend(u14::new(bend & 0x3fff)),
            },
        ),
        Message::Tempo { micros_per_beat } => TrackEventKind::Meta(MetaMessage::Tempo(u24::new(
            micros_per_beat & 0x00ff_ffff,
        ))),
        Message::TimeSignature {
            numerator,
            denominator,
        } => TrackEventKind::Meta(MetaMessage::TimeSignature(
            *numerator,
            (*denominator).max(1).trailing_zeros() as u8,
            24,
            8,
        )),
        Message::TrackName(name) => TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
        Message::EndOfTrack => TrackEventKind::Meta(MetaMessage::EndOfTrack),
        // Sequencer-internal messages never reach the file
        Message::NoOp | Message::BeatMarker { .. } => return None,
    })
}
