// Event, Track and MultiTrack containers
// A MultiTrack is an ordered set of time-ordered event tracks sharing one
// tick resolution; it is the unit every transformation operates on.

use crate::error::{Error, Result};
use crate::midi::Message;
use serde::{Deserialize, Serialize};

/// Integer musical time, relative to a resolution in ticks per beat
pub type Tick = u64;

/// Default resolution (ticks per beat) for newly created multitracks
pub const DEFAULT_RESOLUTION: u16 = 480;

/// A message stamped with its tick time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: Tick,
    pub message: Message,
}

impl Event {
    pub fn new(time: Tick, message: Message) -> Self {
        Self { time, message }
    }
}

/// An ordered sequence of events
///
/// Events are kept in non-decreasing time order; `push_event` enforces the
/// invariant by rejecting out-of-order appends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    events: Vec<Event>,
}

impl Track {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event at the tail
    ///
    /// Every producer in this crate emits events in increasing time order, so
    /// an event earlier than the current tail is a caller bug and is rejected.
    pub fn push_event(&mut self, event: Event) -> Result<()> {
        if let Some(last) = self.events.last() {
            if event.time < last.time {
                return Err(Error::AppendOutOfOrder {
                    time: event.time,
                    last: last.time,
                });
            }
        }
        self.events.push(event);
        Ok(())
    }

    /// Time of the last event, or 0 for an empty track
    ///
    /// The sentinel is meaningless on an empty track; callers that care must
    /// check `is_empty` first.
    pub fn last_event_time(&self) -> Tick {
        self.events.last().map_or(0, |event| event.time)
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Mutable access for in-place timestamp rewrites (tail prolongation)
    pub(crate) fn events_mut(&mut self) -> &mut [Event] {
        &mut self.events
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// An ordered set of tracks plus the resolution they share
///
/// The track index is the identity used for output routing: transformations
/// copy events back into the destination track with the same index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiTrack {
    tracks: Vec<Track>,
    resolution: u16,
}

impl MultiTrack {
    /// Create an empty multitrack with no tracks
    pub fn new(resolution: u16) -> Self {
        Self {
            tracks: Vec::new(),
            resolution,
        }
    }

    /// Create a multitrack with `tracks` empty tracks
    pub fn with_tracks(resolution: u16, tracks: usize) -> Self {
        Self {
            tracks: vec![Track::new(); tracks],
            resolution,
        }
    }

    /// Discard all contents and allocate `tracks` empty tracks
    ///
    /// The resolution is kept; any cursor bound to this multitrack is
    /// invalidated (the borrow checker enforces this statically).
    pub fn clear_and_resize(&mut self, tracks: usize) {
        self.tracks.clear();
        self.tracks.resize_with(tracks, Track::new);
    }

    /// Ticks per beat shared by every track
    pub fn resolution(&self) -> u16 {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: u16) {
        self.resolution = resolution;
    }

    pub fn track(&self, index: usize) -> Result<&Track> {
        self.tracks.get(index).ok_or(Error::TrackOutOfRange {
            index,
            tracks: self.tracks.len(),
        })
    }

    pub fn track_mut(&mut self, index: usize) -> Result<&mut Track> {
        let tracks = self.tracks.len();
        self.tracks
            .get_mut(index)
            .ok_or(Error::TrackOutOfRange { index, tracks })
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Number of tracks containing at least one event
    ///
    /// The file codec writes only these.
    pub fn tracks_with_events(&self) -> usize {
        self.tracks.iter().filter(|track| !track.is_empty()).count()
    }

    /// Total number of events across all tracks
    pub fn total_events(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    pub fn tracks(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    /// Latest event time across all tracks, 0 when there are no events
    pub fn last_event_time(&self) -> Tick {
        self.tracks
            .iter()
            .map(Track::last_event_time)
            .max()
            .unwrap_or(0)
    }
}

impl Default for MultiTrack {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}
