// TempoMap - tick to millisecond conversion
// Collects the tempo changes embedded in a multitrack and exposes the
// wall-clock time base the cursor and the clipping algorithm run on.

use crate::midi::Message;
use crate::sequencer::multitrack::{MultiTrack, Tick};

/// MIDI default tempo: 120 BPM
pub const DEFAULT_MICROS_PER_BEAT: u32 = 500_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TempoChange {
    tick: Tick,
    micros_per_beat: u32,
}

/// Piecewise tick-to-millisecond converter
///
/// Built once from a multitrack; a pure value afterwards, holding no
/// reference to the source. Tempo messages from all tracks are merged into
/// one tick-ordered change list. When several tracks carry a tempo change at
/// the same tick, the highest track index wins.
#[derive(Debug, Clone)]
pub struct TempoMap {
    resolution: u16,
    changes: Vec<TempoChange>,
}

impl TempoMap {
    pub fn from_multitrack(mt: &MultiTrack) -> Self {
        let mut changes = Vec::new();
        for track in mt.tracks() {
            for event in track {
                if let Message::Tempo { micros_per_beat } = event.message {
                    changes.push(TempoChange {
                        tick: event.time,
                        micros_per_beat,
                    });
                }
            }
        }
        // Stable by tick; later tracks override earlier ones at the same tick
        changes.sort_by_key(|change| change.tick);

        Self {
            resolution: mt.resolution(),
            changes,
        }
    }

    /// Milliseconds elapsed from tick 0 to `tick`
    ///
    /// Accumulates across tempo segments; the default tempo applies from
    /// tick 0 until the first tempo change.
    pub fn ticks_to_ms(&self, tick: Tick) -> f64 {
        let ticks_per_ms_base = self.resolution as f64 * 1000.0;

        let mut elapsed_ms = 0.0;
        let mut segment_start = 0;
        let mut micros_per_beat = DEFAULT_MICROS_PER_BEAT as f64;

        for change in &self.changes {
            if change.tick >= tick {
                break;
            }
            elapsed_ms += (change.tick - segment_start) as f64 * micros_per_beat / ticks_per_ms_base;
            segment_start = change.tick;
            micros_per_beat = change.micros_per_beat as f64;
        }

        elapsed_ms + (tick - segment_start) as f64 * micros_per_beat / ticks_per_ms_base
    }

    /// Duration of the whole multitrack in milliseconds
    pub fn duration_ms(&self, mt: &MultiTrack) -> f64 {
        self.ticks_to_ms(mt.last_event_time())
    }

    /// Duration of the whole multitrack in seconds
    pub fn duration_secs(&self, mt: &MultiTrack) -> f64 {
        self.duration_ms(mt) / 1000.0
    }

    pub fn resolution(&self) -> u16 {
        self.resolution
    }
}
