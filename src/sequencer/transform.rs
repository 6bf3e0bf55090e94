// Time-domain transformations over multitracks
// Leading-silence compression, duration-bounded clipping, tail prolongation
// and ending-pause insertion. The first two are cursor-driven rewrites into
// a fresh destination; the last two mutate one track in place.

use crate::error::{Error, Result};
use crate::midi::Message;
use crate::sequencer::cursor::Cursor;
use crate::sequencer::multitrack::{Event, MultiTrack, Tick};

/// Compression phase
///
/// Starts in `Compressing`; flips to `PassThrough` on the first genuine
/// note-on and never flips back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Compressing,
    PassThrough,
}

/// Collapse the leading silence of `src` into `dst`
///
/// Until the first genuine note-on (non-zero velocity), every distinct
/// original tick time is re-stamped onto a counter that grows by exactly one
/// per distinct time, so arbitrary pauses between time points shrink to a
/// single tick while simultaneous events stay simultaneous. From that
/// note-on onwards the original timeline is kept, shifted left so the note
/// lands at its compressed position.
///
/// `dst` receives `src`'s resolution and track count and only non-service
/// events, routed to their source track index. An empty source leaves `dst`
/// resized but empty; that is not an error.
pub fn compress_leading_silence(src: &MultiTrack, dst: &mut MultiTrack) -> Result<()> {
    dst.clear_and_resize(src.track_count());
    dst.set_resolution(src.resolution());

    let mut cursor = Cursor::new(src);
    cursor.seek_to_start();
    if cursor.peek_next_tick_time().is_none() {
        return Ok(());
    }

    let mut phase = Phase::Compressing;
    let mut previous_original: Tick = 0;
    let mut compressed: Tick = 0;
    let mut offset: Tick = 0;

    while let Some((track_index, mut event)) = cursor.next_event() {
        match phase {
            Phase::Compressing => {
                let original = event.time;
                if original > previous_original {
                    compressed += 1;
                }
                previous_original = original;
                event.time = compressed;

                if event.message.is_note_on() && !event.message.is_note_on_v0() {
                    phase = Phase::PassThrough;
                    offset = original - compressed;
                }
            }
            Phase::PassThrough => {
                event.time -= offset;
            }
        }
        dst.track_mut(track_index)?.push_event(event)?;
    }
    Ok(())
}

/// Copy `src` into `dst`, truncated to `max_secs` of elapsed time
///
/// Events are copied in chronological order; after each copy the elapsed
/// time of the event just copied is tested against the budget, so exactly
/// one event at or past the boundary is included, never more. The inclusive
/// boundary is intentional. An empty source leaves `dst` resized but empty.
pub fn clip_to_duration(src: &MultiTrack, dst: &mut MultiTrack, max_secs: f64) -> Result<()> {
    if !max_secs.is_finite() || max_secs < 0.0 {
        return Err(Error::InvalidDuration(max_secs));
    }

    dst.clear_and_resize(src.track_count());
    dst.set_resolution(src.resolution());

    let max_ms = 1000.0 * max_secs;

    let mut cursor = Cursor::new(src);
    cursor.seek_to_start_ms();
    let Some(mut event_ms) = cursor.peek_next_time_ms() else {
        return Ok(());
    };

    while let Some((track_index, event)) = cursor.next_event() {
        dst.track_mut(track_index)?.push_event(event)?;

        if event_ms >= max_ms {
            break;
        }
        match cursor.peek_next_time_ms() {
            Some(next_ms) => event_ms = next_ms,
            None => break,
        }
    }
    Ok(())
}

/// Push the final simultaneous events of one track `add_ticks` later
///
/// Walks backward from the last event while the timestamp equals the
/// maximum, so a closing chord is extended as a whole rather than one note
/// at a time. An empty track is a no-op.
pub fn prolong_last_events(mt: &mut MultiTrack, track_index: usize, add_ticks: Tick) -> Result<()> {
    let track = mt.track_mut(track_index)?;
    let events = track.events_mut();
    let Some(last) = events.last() else {
        return Ok(());
    };

    let tmax = last.time;
    for event in events.iter_mut().rev() {
        if event.time != tmax {
            break;
        }
        event.time = tmax + add_ticks;
    }
    Ok(())
}

/// Append a silent tail to one track
///
/// Adds the lowest note-on with velocity 0 (a note-off by convention) on
/// channel 0 at `last_event_time + pause_ticks`, so the track does not end
/// mid-sustain. The append result is surfaced, not swallowed.
pub fn add_ending_pause(mt: &mut MultiTrack, track_index: usize, pause_ticks: Tick) -> Result<()> {
    let track = mt.track_mut(track_index)?;
    let time = track.last_event_time() + pause_ticks;
    track.push_event(Event::new(time, Message::note_on(0, 0, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(key: u8, velocity: u8) -> Message {
        Message::note_on(0, key, velocity)
    }

    fn single_track(resolution: u16, events: &[(Tick, Message)]) -> MultiTrack {
        let mut mt = MultiTrack::with_tracks(resolution, 1);
        let track = mt.track_mut(0).unwrap();
        for (time, message) in events {
            track.push_event(Event::new(*time, message.clone())).unwrap();
        }
        mt
    }

    fn times(mt: &MultiTrack, track_index: usize) -> Vec<Tick> {
        mt.track(track_index)
            .unwrap()
            .iter()
            .map(|event| event.time)
            .collect()
    }

    #[test]
    fn test_compress_collapses_leading_pauses() {
        // [0,0,5,5,20,20(note-on)] compresses to [0,0,1,1,2,2]; the genuine
        // note-on ends the compressing phase with offset 20 - 2 = 18.
        let src = single_track(
            96,
            &[
                (0, Message::ControlChange { channel: 0, controller: 7, value: 100 }),
                (0, Message::ProgramChange { channel: 0, program: 5 }),
                (5, note(60, 0)),
                (5, note(64, 0)),
                (20, note(60, 0)),
                (20, note(60, 64)),
            ],
        );
        let mut dst = MultiTrack::default();
        compress_leading_silence(&src, &mut dst).unwrap();

        assert_eq!(times(&dst, 0), vec![0, 0, 1, 1, 2, 2]);
        assert_eq!(dst.resolution(), 96);
        assert_eq!(dst.track_count(), 1);
    }

    #[test]
    fn test_compress_preserves_spacing_after_first_note() {
        // First genuine note-on at tick 20 lands at compressed tick 1
        // (offset 19); everything after keeps its natural relative spacing.
        let src = single_track(
            96,
            &[
                (20, note(60, 64)),
                (50, note(60, 0)),
                (110, note(62, 64)),
            ],
        );
        let mut dst = MultiTrack::default();
        compress_leading_silence(&src, &mut dst).unwrap();

        assert_eq!(times(&dst, 0), vec![1, 31, 91]);
    }

    #[test]
    fn test_compress_keeps_chords_simultaneous() {
        let src = single_track(
            96,
            &[
                (40, note(60, 64)),
                (40, note(64, 64)),
                (40, note(67, 64)),
                (80, note(60, 0)),
            ],
        );
        let mut dst = MultiTrack::default();
        compress_leading_silence(&src, &mut dst).unwrap();

        // First chord note flips the phase; its companions at the same
        // original tick stay at the same rewritten tick.
        assert_eq!(times(&dst, 0), vec![1, 1, 1, 41]);
    }

    #[test]
    fn test_compress_empty_source() {
        let src = MultiTrack::with_tracks(96, 3);
        let mut dst = MultiTrack::default();
        compress_leading_silence(&src, &mut dst).unwrap();

        assert_eq!(dst.track_count(), 3);
        assert_eq!(dst.total_events(), 0);
        assert_eq!(dst.resolution(), 96);
    }

    #[test]
    fn test_compress_drops_service_messages() {
        let src = single_track(
            96,
            &[(0, Message::NoOp), (10, note(60, 64)), (15, Message::NoOp)],
        );
        let mut dst = MultiTrack::default();
        compress_leading_silence(&src, &mut dst).unwrap();

        assert_eq!(dst.total_events(), 1);
    }

    #[test]
    fn test_compress_keeps_track_routing() {
        let mut src = MultiTrack::with_tracks(96, 2);
        src.track_mut(0)
            .unwrap()
            .push_event(Event::new(10, note(60, 64)))
            .unwrap();
        src.track_mut(1)
            .unwrap()
            .push_event(Event::new(5, note(40, 64)))
            .unwrap();

        let mut dst = MultiTrack::default();
        compress_leading_silence(&src, &mut dst).unwrap();

        assert_eq!(dst.track(0).unwrap().len(), 1);
        assert_eq!(dst.track(1).unwrap().len(), 1);
    }

    #[test]
    fn test_clip_inclusive_boundary() {
        // Events at 0, 500, 1000, 1500 ms; clipping to 0.9 s keeps the event
        // that reaches past the boundary (1000 ms) and stops there.
        // Resolution 96 at the default 120 BPM: one beat = 500 ms.
        let src = single_track(
            96,
            &[
                (0, note(60, 64)),
                (96, note(62, 64)),
                (192, note(64, 64)),
                (288, note(65, 64)),
            ],
        );
        let mut dst = MultiTrack::default();
        clip_to_duration(&src, &mut dst, 0.9).unwrap();

        assert_eq!(times(&dst, 0), vec![0, 96, 192]);
    }

    #[test]
    fn test_clip_copies_everything_when_shorter_than_budget() {
        let src = single_track(96, &[(0, note(60, 64)), (96, note(60, 0))]);
        let mut dst = MultiTrack::default();
        clip_to_duration(&src, &mut dst, 100.0).unwrap();

        assert_eq!(times(&dst, 0), vec![0, 96]);
    }

    #[test]
    fn test_clip_empty_source() {
        let src = MultiTrack::with_tracks(96, 2);
        let mut dst = MultiTrack::default();
        clip_to_duration(&src, &mut dst, 1.0).unwrap();

        assert_eq!(dst.track_count(), 2);
        assert_eq!(dst.total_events(), 0);
    }

    #[test]
    fn test_clip_rejects_negative_duration() {
        let src = single_track(96, &[(0, note(60, 64))]);
        let mut dst = MultiTrack::default();

        assert!(matches!(
            clip_to_duration(&src, &mut dst, -1.0),
            Err(Error::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_clip_is_idempotent() {
        let src = single_track(
            96,
            &[
                (0, note(60, 64)),
                (96, note(62, 64)),
                (192, note(64, 64)),
                (288, note(65, 64)),
            ],
        );
        let mut clipped = MultiTrack::default();
        clip_to_duration(&src, &mut clipped, 0.9).unwrap();

        // Re-clipping to any budget at or past the first is the identity
        let mut reclipped = MultiTrack::default();
        clip_to_duration(&clipped, &mut reclipped, 0.9).unwrap();
        assert_eq!(reclipped, clipped);

        let mut wider = MultiTrack::default();
        clip_to_duration(&clipped, &mut wider, 5.0).unwrap();
        assert_eq!(wider, clipped);
    }

    #[test]
    fn test_prolong_moves_all_trailing_simultaneous_events() {
        // The three events at tick 40 all move to 50; the earlier event at
        // tick 38 is untouched.
        let mut mt = single_track(
            96,
            &[
                (38, note(55, 0)),
                (40, note(60, 0)),
                (40, note(64, 0)),
                (40, note(67, 0)),
            ],
        );
        prolong_last_events(&mut mt, 0, 10).unwrap();

        assert_eq!(times(&mt, 0), vec![38, 50, 50, 50]);
    }

    #[test]
    fn test_prolong_empty_track_is_noop() {
        let mut mt = MultiTrack::with_tracks(96, 1);
        prolong_last_events(&mut mt, 0, 10).unwrap();
        assert_eq!(mt.total_events(), 0);
    }

    #[test]
    fn test_prolong_out_of_range_track() {
        let mut mt = MultiTrack::with_tracks(96, 1);
        assert!(matches!(
            prolong_last_events(&mut mt, 3, 10),
            Err(Error::TrackOutOfRange { index: 3, tracks: 1 })
        ));
    }

    #[test]
    fn test_ending_pause_extends_last_event_time() {
        let mut mt = single_track(96, &[(0, note(60, 64)), (100, note(60, 0))]);
        add_ending_pause(&mut mt, 0, 48).unwrap();

        let track = mt.track(0).unwrap();
        assert_eq!(track.last_event_time(), 148);
        let tail = track.get(track.len() - 1).unwrap();
        assert!(tail.message.is_note_on_v0());
    }

    #[test]
    fn test_ending_pause_on_empty_track_starts_from_zero() {
        let mut mt = MultiTrack::with_tracks(96, 1);
        add_ending_pause(&mut mt, 0, 48).unwrap();

        assert_eq!(mt.track(0).unwrap().last_event_time(), 48);
    }

    #[test]
    fn test_ending_pause_out_of_range_track() {
        let mut mt = MultiTrack::with_tracks(96, 1);
        assert!(matches!(
            add_ending_pause(&mut mt, 2, 48),
            Err(Error::TrackOutOfRange { index: 2, tracks: 1 })
        ));
    }
}
