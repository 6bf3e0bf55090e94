// Diagnostic text rendering
// Walks a multitrack chronologically and formats one line per event.

use crate::sequencer::cursor::Cursor;
use crate::sequencer::multitrack::{Event, MultiTrack};
use std::fmt::Write;

/// Render a whole multitrack as a chronological text report
///
/// One line per event: source track index, tick time, millisecond time and
/// the message's own text form. Beat markers from the cursor walk are
/// skipped; purely a diagnostic view.
pub fn multitrack_as_text(mt: &MultiTrack) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Ticks per beat  {}", mt.resolution());
    let _ = writeln!(out);

    let mut cursor = Cursor::new(mt).with_beat_markers();
    cursor.seek_to_start();
    while let Some((track_index, event)) = cursor.next_event() {
        if event.message.is_beat_marker() {
            continue;
        }
        let _ = writeln!(
            out,
            "Track {track_index}  Tick {tick:>6}  Ms {ms:>10.3}  {message}",
            tick = cursor.current_tick_time(),
            ms = cursor.current_time_ms(),
            message = event.message,
        );
    }
    out
}

/// Render a single event
pub fn event_as_text(event: &Event) -> String {
    format!("Tick {:>6}  {}", event.time, event.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::Message;
    use crate::sequencer::multitrack::{Event, MultiTrack};

    fn sample_multitrack() -> MultiTrack {
        let mut mt = MultiTrack::with_tracks(96, 2);
        mt.track_mut(0)
            .unwrap()
            .push_event(Event::new(0, Message::note_on(0, 60, 64)))
            .unwrap();
        mt.track_mut(1)
            .unwrap()
            .push_event(Event::new(96, Message::note_on(1, 64, 80)))
            .unwrap();
        mt
    }

    #[test]
    fn test_report_header_and_line_per_event() {
        let report = multitrack_as_text(&sample_multitrack());

        assert!(report.starts_with("Ticks per beat  96\n"));
        let event_lines: Vec<&str> = report
            .lines()
            .filter(|line| line.starts_with("Track"))
            .collect();
        assert_eq!(event_lines.len(), 2);
        assert!(event_lines[0].contains("Track 0"));
        assert!(event_lines[0].contains("NOTE ON"));
        // Second event: tick 96 at 120 BPM = 500 ms
        assert!(event_lines[1].contains("Track 1"));
        assert!(event_lines[1].contains("500.000"));
    }

    #[test]
    fn test_report_skips_beat_markers() {
        let report = multitrack_as_text(&sample_multitrack());
        assert!(!report.contains("BEAT"));
    }

    #[test]
    fn test_report_order_is_chronological() {
        let report = multitrack_as_text(&sample_multitrack());
        let first = report.find("Track 0").unwrap();
        let second = report.find("Track 1").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_empty_multitrack_report() {
        let mt = MultiTrack::with_tracks(480, 4);
        let report = multitrack_as_text(&mt);

        assert!(report.starts_with("Ticks per beat  480\n"));
        assert!(!report.contains("Track "));
    }

    #[test]
    fn test_event_as_text() {
        let event = Event::new(42, Message::note_on(0, 60, 100));
        let text = event_as_text(&event);
        assert!(text.contains("42"));
        assert!(text.contains("NOTE ON"));
    }
}
