//! Wire documents served by the station: the Icecast status JSON, the
//! per-channel playlist snapshot and the weekly schedule.
//!
//! The station backend is loose about types (durations arrive as numbers or
//! numeric strings, Icecast emits purely numeric titles unquoted), so every
//! field goes through a tolerant deserializer and falls back to an empty or
//! zero value instead of failing the whole document.

use serde::{Deserialize, Deserializer, Serialize};

// ── Codec ─────────────────────────────────────────────────────────────────────

/// Codec of a physical source mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    Ogg,
    Mp3,
}

impl Codec {
    pub const ALL: [Codec; 2] = [Codec::Ogg, Codec::Mp3];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Ogg => "ogg",
            Self::Mp3 => "mp3",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "ogg" => Some(Self::Ogg),
            "mp3" => Some(Self::Mp3),
            _ => None,
        }
    }

    /// Codec of a stream URL.  Anything not ending in `ogg` is treated as mp3,
    /// which is also what an empty source resolves to.
    pub fn from_url(url: &str) -> Self {
        if url.ends_with("ogg") {
            Self::Ogg
        } else {
            Self::Mp3
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

// ── Playlist snapshot ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub title: String,
    #[serde(default, deserialize_with = "de_text")]
    pub album: String,
    /// Duration in seconds.
    #[serde(default, deserialize_with = "de_secs")]
    pub time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listeners {
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub peak: Option<u64>,
}

/// Live DJ metadata.  Only meaningful when `live` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamData {
    #[serde(default)]
    pub live: bool,
    #[serde(default, deserialize_with = "de_text")]
    pub dj_name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub stream_desc: String,
    #[serde(default, deserialize_with = "de_text")]
    pub dj_pic: String,
}

/// One poll of `/playlist/<channel>.json`.  Replaces all prior playlist state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSnapshot {
    #[serde(default)]
    pub current: Track,
    /// Most recent first.
    #[serde(default)]
    pub before: Vec<Track>,
    #[serde(default)]
    pub after: Vec<Track>,
    /// Seconds into `current`.
    #[serde(default, deserialize_with = "de_secs")]
    pub elapsed: f64,
    #[serde(default)]
    pub listeners: Option<Listeners>,
    #[serde(default)]
    pub stream_data: Option<StreamData>,
}

impl PlaylistSnapshot {
    pub fn is_live(&self) -> bool {
        self.stream_data.as_ref().map(|s| s.live).unwrap_or(false)
    }
}

// ── Icecast status ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IcecastStatus {
    #[serde(default)]
    pub icestats: IceStats,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IceStats {
    /// Icecast omits `source` when nothing is mounted and emits a bare object
    /// when exactly one mount exists.
    #[serde(default, deserialize_with = "de_sources")]
    pub source: Vec<IcecastSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IcecastSource {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub server_name: Option<String>,
    #[serde(default)]
    pub listeners: Option<u64>,
    #[serde(default)]
    pub listener_peak: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub server_description: Option<String>,
}

/// Listener totals and stream metadata for one logical channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelStatus {
    pub channel: String,
    pub listeners: u64,
    pub listener_peak: u64,
    pub artist: String,
    pub title: String,
    pub description: String,
}

// ── Schedule ──────────────────────────────────────────────────────────────────

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// `/schedule.json`: one entry per weekday starting Monday, empty meaning
/// nothing is scheduled.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Vec<Option<String>>")]
pub struct Schedule {
    days: [String; 7],
}

impl Schedule {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut days: [String; 7] = Default::default();
        for (slot, entry) in days.iter_mut().zip(entries) {
            *slot = entry.into();
        }
        Self { days }
    }

    /// Entry for a weekday index (0 = Monday).  `None` when nothing is scheduled.
    pub fn entry(&self, day: usize) -> Option<&str> {
        self.days
            .get(day)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn days(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> {
        WEEKDAYS.iter().enumerate().map(|(i, name)| (*name, self.entry(i)))
    }
}

impl From<Vec<Option<String>>> for Schedule {
    fn from(entries: Vec<Option<String>>) -> Self {
        Self::from_entries(entries.into_iter().map(Option::unwrap_or_default))
    }
}

// ── Tolerant field deserializers ──────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Loose {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    fn into_secs(self) -> f64 {
        match self {
            Self::Text(s) => s.trim().parse().unwrap_or(0.0),
            Self::Int(n) => n as f64,
            Self::Float(n) => n,
            Self::Bool(_) => 0.0,
        }
    }
}

fn de_opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Loose>::deserialize(d)?.map(Loose::into_text))
}

fn de_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(de_opt_text(d)?.unwrap_or_default())
}

fn de_secs<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let secs = Option::<Loose>::deserialize(d)?
        .map(Loose::into_secs)
        .unwrap_or(0.0);
    Ok(if secs.is_finite() { secs } else { 0.0 })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<IcecastSource>),
    One(Box<IcecastSource>),
}

fn de_sources<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<IcecastSource>, D::Error> {
    Ok(match Option::<OneOrMany>::deserialize(d)? {
        Some(OneOrMany::Many(v)) => v,
        Some(OneOrMany::One(s)) => vec![*s],
        None => Vec::new(),
    })
}
