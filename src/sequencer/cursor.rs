// Chronological cursor over a multitrack
// Merges the per-track event sequences into one globally time-ordered
// stream, in both the tick and the millisecond domain.

use crate::midi::Message;
use crate::sequencer::multitrack::{Event, MultiTrack, Tick};
use crate::sequencer::timebase::TempoMap;

/// Cursor position state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorState {
    /// Freshly constructed; a seek is required before iteration
    #[default]
    Unpositioned,
    /// Somewhere in the stream; `next_event` yields events
    Positioned,
    /// All tracks drained; `next_event` and `peek_*` return `None`
    Exhausted,
}

impl CursorState {
    pub fn is_positioned(&self) -> bool {
        matches!(self, CursorState::Positioned)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, CursorState::Exhausted)
    }
}

/// Read-only chronological view over a `MultiTrack`
///
/// Keeps one read index per track and selects the earliest head each call
/// (k-way merge). Ties at the same tick are drained in ascending track-index
/// order; within one track, insertion order is preserved. Service messages
/// are consumed and skipped transparently and never reach the caller.
///
/// With `with_beat_markers`, the cursor synthesizes a `BeatMarker` event at
/// every beat boundary (multiples of the resolution) crossed before the next
/// real event; markers are tagged with track 0 and are not source data.
///
/// The cursor never mutates the multitrack it is bound to.
pub struct Cursor<'a> {
    multitrack: &'a MultiTrack,
    tempo_map: TempoMap,
    positions: Vec<usize>,
    state: CursorState,
    current_tick: Tick,
    current_ms: f64,
    beat_markers: bool,
    next_beat: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(multitrack: &'a MultiTrack) -> Self {
        Self {
            multitrack,
            tempo_map: TempoMap::from_multitrack(multitrack),
            positions: vec![0; multitrack.track_count()],
            state: CursorState::Unpositioned,
            current_tick: 0,
            current_ms: 0.0,
            beat_markers: false,
            next_beat: 0,
        }
    }

    /// Enable beat-marker synthesis
    pub fn with_beat_markers(mut self) -> Self {
        self.beat_markers = true;
        self
    }

    /// Reset to tick time zero
    ///
    /// Re-synchronizes every per-track index to the first non-service event
    /// and re-arms an exhausted cursor.
    pub fn seek_to_start(&mut self) {
        for (index, position) in self.positions.iter_mut().enumerate() {
            *position = Self::skip_service(self.multitrack, index, 0);
        }
        self.current_tick = 0;
        self.current_ms = 0.0;
        self.next_beat = 0;
        self.state = if self.peek_winner().is_some() {
            CursorState::Positioned
        } else {
            CursorState::Exhausted
        };
    }

    /// Reset to millisecond time zero
    ///
    /// Both domains share the same position state, so this performs the same
    /// re-synchronization as `seek_to_start`; millisecond-domain consumers
    /// (clipping) use it to name the clock they run on.
    pub fn seek_to_start_ms(&mut self) {
        self.seek_to_start();
    }

    /// Tick time of the next unconsumed event, without advancing
    pub fn peek_next_tick_time(&self) -> Option<Tick> {
        if !self.state.is_positioned() {
            return None;
        }
        let (_, time) = self.peek_winner()?;
        match self.pending_beat_boundary(time) {
            Some(boundary) => Some(boundary),
            None => Some(time),
        }
    }

    /// Millisecond time of the next unconsumed event, without advancing
    pub fn peek_next_time_ms(&self) -> Option<f64> {
        self.peek_next_tick_time()
            .map(|tick| self.tempo_map.ticks_to_ms(tick))
    }

    /// Return and consume the chronologically next event
    ///
    /// Yields `(source_track_index, event)`. Returns `None` once every track
    /// is drained (the cursor is then exhausted until the next seek).
    pub fn next_event(&mut self) -> Option<(usize, Event)> {
        if !self.state.is_positioned() {
            return None;
        }
        let Some((track_index, time)) = self.peek_winner() else {
            self.state = CursorState::Exhausted;
            return None;
        };

        if let Some(boundary) = self.pending_beat_boundary(time) {
            let beat = self.next_beat;
            self.next_beat += 1;
            self.set_current(boundary);
            return Some((0, Event::new(boundary, Message::BeatMarker { beat })));
        }

        let event = self
            .multitrack
            .track(track_index)
            .ok()?
            .get(self.positions[track_index])?
            .clone();
        self.positions[track_index] =
            Self::skip_service(self.multitrack, track_index, self.positions[track_index] + 1);
        self.set_current(event.time);
        Some((track_index, event))
    }

    /// Tick time of the most recently returned event
    pub fn current_tick_time(&self) -> Tick {
        self.current_tick
    }

    /// Millisecond time of the most recently returned event
    pub fn current_time_ms(&self) -> f64 {
        self.current_ms
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn tempo_map(&self) -> &TempoMap {
        &self.tempo_map
    }

    fn set_current(&mut self, tick: Tick) {
        self.current_tick = tick;
        self.current_ms = self.tempo_map.ticks_to_ms(tick);
    }

    /// Earliest per-track head: `(track_index, tick_time)`
    ///
    /// Linear scan; `<` (not `<=`) keeps the lowest track index on ties.
    fn peek_winner(&self) -> Option<(usize, Tick)> {
        let mut winner: Option<(usize, Tick)> = None;
        for (index, &position) in self.positions.iter().enumerate() {
            let Ok(track) = self.multitrack.track(index) else {
                continue;
            };
            let Some(event) = track.get(position) else {
                continue;
            };
            if winner.is_none_or(|(_, time)| event.time < time) {
                winner = Some((index, event.time));
            }
        }
        winner
    }

    /// Beat boundary to emit before an event at `next_time`, if any
    fn pending_beat_boundary(&self, next_time: Tick) -> Option<Tick> {
        if !self.beat_markers || self.tempo_map.resolution() == 0 {
            return None;
        }
        let boundary = self.next_beat as Tick * self.tempo_map.resolution() as Tick;
        (boundary <= next_time).then_some(boundary)
    }

    /// First index at or after `from` that is not a service message
    fn skip_service(multitrack: &MultiTrack, track_index: usize, from: usize) -> usize {
        let Ok(track) = multitrack.track(track_index) else {
            return from;
        };
        let mut position = from;
        while let Some(event) = track.get(position) {
            if !event.message.is_service() {
                break;
            }
            position += 1;
        }
        position
    }
}
