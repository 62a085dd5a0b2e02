//! Playlist table built from one snapshot.
//!
//! Relative times are not wall-clock deltas: they are running sums of the
//! server-reported track durations, seeded from `elapsed`.  A wrong duration
//! upstream shifts every row after it.

use crate::format::{format_duration, format_track};
use crate::model::{Listeners, PlaylistSnapshot, StreamData, Track};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowTiming {
    /// Finished this many seconds ago.
    Ago(f64),
    Current,
    /// Starts in this many seconds.
    In(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistRow {
    pub track: Track,
    pub text: String,
    pub timing: RowTiming,
}

impl PlaylistRow {
    /// Duration column text; empty for the current track.
    pub fn when(&self) -> String {
        match self.timing {
            RowTiming::Ago(secs) => format!("{} ago", format_duration(secs)),
            RowTiming::Current => String::new(),
            RowTiming::In(secs) => format!("in {}", format_duration(secs)),
        }
    }

    pub fn is_current(&self) -> bool {
        self.timing == RowTiming::Current
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistView {
    pub now_playing: String,
    pub album: String,
    /// Played tracks oldest first, then the current track, then upcoming.
    pub rows: Vec<PlaylistRow>,
    pub elapsed: f64,
    pub length: f64,
    pub listeners: Option<Listeners>,
    pub stream: Option<StreamData>,
}

impl PlaylistView {
    pub fn from_snapshot(snapshot: &PlaylistSnapshot) -> Self {
        let mut rows = Vec::with_capacity(snapshot.before.len() + snapshot.after.len() + 1);

        let mut ago = snapshot.elapsed;
        for track in &snapshot.before {
            rows.push(PlaylistRow {
                track: track.clone(),
                text: format_track(track),
                timing: RowTiming::Ago(ago),
            });
            ago += track.time;
        }
        // `before` is most-recent-first; the table reads top to bottom in time.
        rows.reverse();

        rows.push(PlaylistRow {
            track: snapshot.current.clone(),
            text: format_track(&snapshot.current),
            timing: RowTiming::Current,
        });

        let mut until = snapshot.current.time - snapshot.elapsed;
        for track in &snapshot.after {
            rows.push(PlaylistRow {
                track: track.clone(),
                text: format_track(track),
                timing: RowTiming::In(until),
            });
            until += track.time;
        }

        Self {
            now_playing: format_track(&snapshot.current),
            album: snapshot.current.album.clone(),
            rows,
            elapsed: snapshot.elapsed,
            length: snapshot.current.time,
            listeners: snapshot.listeners.clone(),
            stream: snapshot.stream_data.clone().filter(|s| s.live),
        }
    }

    pub fn is_live(&self) -> bool {
        self.stream.is_some()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.rows.iter().position(PlaylistRow::is_current)
    }

    pub fn played(&self) -> &[PlaylistRow] {
        match self.current_index() {
            Some(i) => &self.rows[..i],
            None => &[],
        }
    }

    pub fn current(&self) -> Option<&PlaylistRow> {
        self.current_index().map(|i| &self.rows[i])
    }

    pub fn upcoming(&self) -> &[PlaylistRow] {
        match self.current_index() {
            Some(i) => &self.rows[i + 1..],
            None => &[],
        }
    }
}
