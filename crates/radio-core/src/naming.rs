//! Channel ↔ source-mount naming.
//!
//! Every logical channel is exposed as one mount per codec, named
//! `<prefix><channel> (<codec>)`.  Older deployments have no prefix, newer
//! ones use `[mpd] `.  Matching is always on the fully parsed channel name so
//! that `jazz` never picks up `jazz2`'s mounts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::{ChannelStatus, Codec, IcecastSource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingConvention {
    /// Prefix in front of the channel name, e.g. `"[mpd] "`.  Written as
    /// `""` in config for deployments without one.
    #[serde(
        default = "default_source_prefix",
        serialize_with = "serialize_prefix",
        deserialize_with = "deserialize_prefix"
    )]
    pub source_prefix: Option<String>,
    /// Aggregate channel that is never offered in the channel list.
    #[serde(default = "default_aggregate_channel")]
    pub aggregate_channel: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            source_prefix: default_source_prefix(),
            aggregate_channel: default_aggregate_channel(),
        }
    }
}

fn default_source_prefix() -> Option<String> {
    Some("[mpd] ".to_string())
}

fn serialize_prefix<S: Serializer>(prefix: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(prefix.as_deref().unwrap_or(""))
}

fn deserialize_prefix<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let prefix = String::deserialize(d)?;
    Ok((!prefix.is_empty()).then_some(prefix))
}

fn default_aggregate_channel() -> String {
    "everything".to_string()
}

impl NamingConvention {
    pub fn new(source_prefix: Option<&str>, aggregate_channel: &str) -> Self {
        Self {
            source_prefix: source_prefix.map(str::to_string),
            aggregate_channel: aggregate_channel.to_string(),
        }
    }

    /// Build the mount name for `channel` in `codec`.
    pub fn source_name(&self, channel: &str, codec: Codec) -> String {
        format!(
            "{}{} ({})",
            self.source_prefix.as_deref().unwrap_or(""),
            channel,
            codec.extension()
        )
    }

    /// Split a mount name into channel and codec.  Returns `None` for mounts
    /// that don't follow the convention (live relays, foreign mounts).
    pub fn parse_source_name<'a>(&self, name: &'a str) -> Option<(&'a str, Codec)> {
        let rest = match self.source_prefix.as_deref() {
            Some(prefix) => name.strip_prefix(prefix)?,
            None => name,
        };
        let rest = rest.strip_suffix(')')?;
        let (channel, ext) = rest.rsplit_once(" (")?;
        let codec = Codec::from_extension(ext)?;
        if channel.is_empty() {
            return None;
        }
        Some((channel, codec))
    }

    /// Sorted, de-duplicated channel names, excluding the aggregate channel.
    pub fn channel_list(&self, sources: &[IcecastSource]) -> Vec<String> {
        let mut channels: Vec<String> = sources
            .iter()
            .filter_map(|s| s.server_name.as_deref())
            .filter_map(|name| self.parse_source_name(name))
            .map(|(channel, _)| channel)
            .filter(|channel| *channel != self.aggregate_channel)
            .map(str::to_string)
            .collect();
        channels.sort();
        channels.dedup();
        channels
    }

    /// Listener totals and metadata for `channel`.
    ///
    /// The ogg and mp3 audiences are assumed disjoint and simply added.  Text
    /// metadata comes from the ogg mount when there is one because the mp3
    /// transcode mangles non-ASCII titles.
    pub fn channel_status(&self, sources: &[IcecastSource], channel: &str) -> ChannelStatus {
        let mut status = ChannelStatus {
            channel: channel.to_string(),
            ..ChannelStatus::default()
        };
        let mut meta_from: Option<(&IcecastSource, Codec)> = None;

        for source in sources {
            let Some(name) = source.server_name.as_deref() else {
                continue;
            };
            let Some((ch, codec)) = self.parse_source_name(name) else {
                continue;
            };
            if ch != channel {
                continue;
            }
            status.listeners += source.listeners.unwrap_or(0);
            status.listener_peak += source.listener_peak.unwrap_or(0);

            let better = match meta_from {
                None => true,
                Some((_, prev)) => prev != Codec::Ogg && codec == Codec::Ogg,
            };
            if better {
                meta_from = Some((source, codec));
            }
        }

        if let Some((source, _)) = meta_from {
            status.artist = source.artist.clone().unwrap_or_default();
            status.title = source.title.clone().unwrap_or_default();
            status.description = source.server_description.clone().unwrap_or_default();
        }
        status
    }

    /// True if any mount belongs to `channel`.
    pub fn has_channel(&self, sources: &[IcecastSource], channel: &str) -> bool {
        sources
            .iter()
            .filter_map(|s| s.server_name.as_deref())
            .filter_map(|name| self.parse_source_name(name))
            .any(|(ch, _)| ch == channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, listeners: u64, peak: u64) -> IcecastSource {
        IcecastSource {
            server_name: Some(name.to_string()),
            listeners: Some(listeners),
            listener_peak: Some(peak),
            ..IcecastSource::default()
        }
    }

    #[test]
    fn test_parse_recovers_channel_name() {
        for prefix in [None, Some("[mpd] ")] {
            let naming = NamingConvention::new(prefix, "everything");
            for name in ["jazz", "jazz2", "lo-fi (late)", "a b"] {
                for codec in Codec::ALL {
                    let mount = naming.source_name(name, codec);
                    assert_eq!(naming.parse_source_name(&mount), Some((name, codec)));
                }
            }
        }
    }

    #[test]
    fn test_parse_rejects_foreign_mounts() {
        let naming = NamingConvention::default();
        assert_eq!(naming.parse_source_name("jazz (ogg)"), None);
        assert_eq!(naming.parse_source_name("[mpd] jazz (flac)"), None);
        assert_eq!(naming.parse_source_name("[mpd] jazz"), None);
        assert_eq!(naming.parse_source_name("[mpd] (ogg)"), None);
    }

    #[test]
    fn test_channel_list_sorted_deduped_without_aggregate() {
        let naming = NamingConvention::default();
        let sources = vec![
            source("[mpd] rock (ogg)", 0, 0),
            source("[mpd] everything (mp3)", 0, 0),
            source("[mpd] rock (mp3)", 0, 0),
            source("[mpd] classical (mp3)", 0, 0),
            source("cyberia (mp3)", 0, 0),
            IcecastSource::default(),
        ];
        assert_eq!(naming.channel_list(&sources), vec!["classical", "rock"]);
    }

    #[test]
    fn test_listener_totals_do_not_leak_across_prefixes() {
        let naming = NamingConvention::new(None, "everything");
        let sources = vec![
            source("jazz (ogg)", 3, 10),
            source("jazz (mp3)", 2, 4),
            source("jazz2 (ogg)", 100, 200),
            source("jazz2 (mp3)", 50, 60),
        ];
        let status = naming.channel_status(&sources, "jazz");
        assert_eq!(status.listeners, 5);
        assert_eq!(status.listener_peak, 14);

        let status = naming.channel_status(&sources, "jazz2");
        assert_eq!(status.listeners, 150);
        assert_eq!(status.listener_peak, 260);
    }

    #[test]
    fn test_combined_single_entry() {
        let naming = NamingConvention::default();
        let sources = vec![source("[mpd] cyberia (mp3)", 7, 12)];
        let status = naming.channel_status(&sources, "cyberia");
        assert_eq!((status.listeners, status.listener_peak), (7, 12));
    }

    #[test]
    fn test_metadata_prefers_ogg_mount() {
        let naming = NamingConvention::new(None, "everything");
        let mut mp3 = source("jazz (mp3)", 1, 1);
        mp3.title = Some("Caf\u{fffd}".to_string());
        let mut ogg = source("jazz (ogg)", 1, 1);
        ogg.artist = Some("Bill Evans".to_string());
        ogg.title = Some("Café".to_string());
        ogg.server_description = Some("smooth".to_string());
        let status = naming.channel_status(&[mp3, ogg], "jazz");
        assert_eq!(status.title, "Café");
        assert_eq!(status.artist, "Bill Evans");
        assert_eq!(status.description, "smooth");
    }

    #[test]
    fn test_missing_listener_tags_count_as_zero() {
        let naming = NamingConvention::new(None, "everything");
        let sources = vec![IcecastSource {
            server_name: Some("jazz (ogg)".to_string()),
            ..IcecastSource::default()
        }];
        let status = naming.channel_status(&sources, "jazz");
        assert_eq!(status.listeners, 0);
        assert!(naming.has_channel(&sources, "jazz"));
        assert!(!naming.has_channel(&sources, "rock"));
    }
}
