//! AppState — everything the panes render, folded from dashboard events.
//!
//! Components read this but never mutate it.  `apply` is the only writer.
//! Each region stays `None` (drawn as "waiting for station") until its first
//! update arrives.

use std::collections::VecDeque;

use radio_core::client::StreamLinks;
use radio_core::dashboard::DashboardEvent;
use radio_core::model::{ChannelStatus, Schedule};
use radio_core::player::PlayerView;
use radio_core::playlist::PlaylistView;
use radio_core::progress::ProgressView;

use crate::widgets::status_bar::InputMode;

const MAX_LOGS: usize = 200;

#[derive(Debug, Default)]
pub struct AppState {
    /// Channel the dashboard is tuned to.
    pub channel: String,
    pub channels: Vec<String>,
    pub playlist: Option<PlaylistView>,
    pub status: Option<ChannelStatus>,
    pub schedule: Option<Schedule>,
    pub progress: Option<ProgressView>,
    pub player: Option<PlayerView>,
    pub links: StreamLinks,
    pub input_mode: InputMode,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ..Self::default()
        }
    }

    /// Fold one event into the state.  Returns the message of a `Log` event
    /// so the caller can surface it.
    pub fn apply(&mut self, event: DashboardEvent) -> Option<String> {
        match event {
            DashboardEvent::ChannelsListed { channels, .. } => self.channels = channels,
            DashboardEvent::PlaylistUpdated(view) => self.playlist = Some(view),
            DashboardEvent::StatusUpdated(status) => self.status = Some(status),
            DashboardEvent::ScheduleUpdated(schedule) => self.schedule = Some(schedule),
            DashboardEvent::Progress(view) => self.progress = Some(view),
            DashboardEvent::Player(view) => {
                self.channel = view.channel.clone();
                self.player = Some(view);
            }
            DashboardEvent::Links { channel, links } => {
                if channel != self.channel {
                    // Regions of the old channel must not linger under the new name.
                    self.playlist = None;
                    self.status = None;
                    self.progress = None;
                }
                self.channel = channel;
                self.links = links;
            }
            DashboardEvent::Log(msg) => {
                self.push_log(msg.clone());
                return Some(msg);
            }
        }
        None
    }

    pub fn push_log(&mut self, msg: String) {
        self.logs.push_back(msg);
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.player
            .as_ref()
            .is_some_and(|p| p.indicator == radio_core::player::PlayIndicator::Pause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_core::model::Codec;
    use radio_core::player::{PlayIndicator, VolumeIcon};

    fn player_view(channel: &str, indicator: PlayIndicator) -> PlayerView {
        PlayerView {
            channel: channel.to_string(),
            codec: Codec::Ogg,
            indicator,
            volume: 0.51,
            muted: false,
            volume_icon: VolumeIcon::Low,
        }
    }

    #[test]
    fn test_regions_start_waiting() {
        let state = AppState::new("cyberia");
        assert!(state.playlist.is_none());
        assert!(state.status.is_none());
        assert!(state.schedule.is_none());
        assert!(!state.is_playing());
    }

    #[test]
    fn test_channel_switch_clears_old_regions() {
        let mut state = AppState::new("cyberia");
        state.apply(DashboardEvent::StatusUpdated(ChannelStatus {
            channel: "cyberia".into(),
            listeners: 3,
            ..ChannelStatus::default()
        }));
        state.apply(DashboardEvent::ScheduleUpdated(Schedule::from_entries(["Mon"])));
        state.apply(DashboardEvent::Links {
            channel: "jazz".into(),
            links: StreamLinks {
                ogg_m3u: "http://radio.test/radio/jazz.ogg.m3u".into(),
                ..StreamLinks::default()
            },
        });
        assert_eq!(state.channel, "jazz");
        assert!(state.status.is_none());
        assert!(state.schedule.is_some());
        assert!(state.links.ogg_m3u.ends_with("jazz.ogg.m3u"));
    }

    #[test]
    fn test_player_and_log_events() {
        let mut state = AppState::new("cyberia");
        assert_eq!(
            state.apply(DashboardEvent::Player(player_view("cyberia", PlayIndicator::Pause))),
            None
        );
        assert!(state.is_playing());

        let surfaced = state.apply(DashboardEvent::Log("audio: no output".into()));
        assert_eq!(surfaced.as_deref(), Some("audio: no output"));
        assert_eq!(state.logs.back().map(String::as_str), Some("audio: no output"));
    }

    #[test]
    fn test_log_is_capped() {
        let mut state = AppState::default();
        for i in 0..(MAX_LOGS + 10) {
            state.push_log(format!("line {}", i));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert_eq!(state.logs.front().map(String::as_str), Some("line 10"));
    }
}
