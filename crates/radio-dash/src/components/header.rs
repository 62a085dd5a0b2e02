//! Header — 3-row now-playing strip.  Not focusable.
//!
//! Row 1: play indicator, channel, now playing, live badge.
//! Row 2: album or DJ, listeners, stream description.
//! Row 3: progress bar | volume.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use radio_core::format::{format_listeners, format_track};
use radio_core::model::{ChannelStatus, Track};
use radio_core::player::{PlayIndicator, PlayerView, VolumeIcon};

use crate::{
    app_state::AppState,
    theme::{
        style_muted, style_playing, style_secondary, C_ACCENT, C_BADGE_LIVE, C_DJ, C_LISTENERS,
        C_PRIMARY,
    },
    widgets::progress_bar::draw_progress,
};

pub const HEADER_HEIGHT: u16 = 3;
const VOLUME_WIDTH: u16 = 14;
const WAITING: &str = "waiting for station…";

#[derive(Default)]
pub struct Header;

impl Header {
    pub fn draw(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        frame.render_widget(Clear, area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        frame.render_widget(Paragraph::new(now_playing_line(state, rows[0].width)), rows[0]);
        frame.render_widget(Paragraph::new(details_line(state, rows[1].width)), rows[1]);

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(VOLUME_WIDTH)])
            .split(rows[2]);
        match &state.progress {
            Some(progress) => draw_progress(frame, cols[0], progress),
            None => frame.render_widget(Paragraph::new(Span::styled(WAITING, style_muted())), cols[0]),
        }
        frame.render_widget(
            Paragraph::new(volume_line(state.player.as_ref())).alignment(Alignment::Right),
            cols[1],
        );
    }
}

fn now_playing_line(state: &AppState, width: u16) -> Line<'static> {
    let (icon, icon_style) = match state.player.as_ref().map(|p| p.indicator) {
        Some(PlayIndicator::Pause) => ("▶ ", style_playing()),
        _ => ("⏸ ", style_muted()),
    };
    let mut spans = vec![
        Span::styled(icon, icon_style),
        Span::styled(
            format!("{}  ", state.channel),
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        ),
    ];

    let live = state.playlist.as_ref().is_some_and(|p| p.is_live());
    let badge_w = if live { 7 } else { 0 };
    let used = spans.iter().map(|s| s.width()).sum::<usize>() + badge_w;
    let room = (width as usize).saturating_sub(used);

    let now_playing = match &state.playlist {
        Some(playlist) => Some(playlist.now_playing.clone()),
        None => state.status.as_ref().and_then(status_now_playing),
    };
    match now_playing {
        Some(text) => spans.push(Span::styled(
            truncate(&text, room),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        )),
        None => spans.push(Span::styled(WAITING, style_muted())),
    }
    if live {
        spans.push(Span::styled(
            "  LIVE ",
            Style::default().fg(C_BADGE_LIVE).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

/// Track metadata from the Icecast mount, for when the playlist endpoint has
/// not answered.
fn status_now_playing(status: &ChannelStatus) -> Option<String> {
    if status.title.trim().is_empty() {
        return None;
    }
    Some(format_track(&Track {
        artist: Some(status.artist.clone()),
        title: status.title.clone(),
        ..Track::default()
    }))
}

fn details_line(state: &AppState, width: u16) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();

    if let Some(playlist) = &state.playlist {
        match playlist.stream.as_ref().filter(|s| s.live) {
            Some(stream) if !stream.dj_name.is_empty() => {
                spans.push(Span::styled(
                    format!("dj {}", stream.dj_name),
                    Style::default().fg(C_DJ),
                ));
            }
            _ if !playlist.album.is_empty() => {
                spans.push(Span::styled(playlist.album.clone(), style_secondary()));
            }
            _ => {}
        }
    }

    if let Some(status) = &state.status {
        if !spans.is_empty() {
            spans.push(Span::styled("  ·  ", style_muted()));
        }
        spans.push(Span::styled(
            format!(
                "listeners {}",
                format_listeners(status.listeners, Some(status.listener_peak))
            ),
            Style::default().fg(C_LISTENERS),
        ));
        if !status.description.is_empty() {
            spans.push(Span::styled("  ·  ", style_muted()));
            let used: usize = spans.iter().map(|s| s.width()).sum();
            spans.push(Span::styled(
                truncate(&status.description, (width as usize).saturating_sub(used)),
                style_secondary(),
            ));
        }
    }

    if spans.is_empty() {
        spans.push(Span::styled(WAITING, style_muted()));
    }
    Line::from(spans)
}

fn volume_line(player: Option<&PlayerView>) -> Line<'static> {
    let Some(player) = player else {
        return Line::default();
    };
    let icon = match player.volume_icon {
        VolumeIcon::Off => "vol ×",
        VolumeIcon::Low => "vol ▂▄",
        VolumeIcon::High => "vol ▂▄▆",
    };
    let pct = if player.muted {
        "muted".to_string()
    } else {
        format!("{:>3}%", (player.volume * 100.0).round() as u32)
    };
    Line::from(vec![
        Span::styled(format!("{} ", icon), style_secondary()),
        Span::styled(pct, style_muted()),
    ])
}

/// Cut `text` to `width` display cells, ending in `…` when shortened.
pub fn truncate(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_core::model::Codec;

    #[test]
    fn test_truncate_respects_display_width() {
        assert_eq!(truncate("Roygbiv", 10), "Roygbiv");
        assert_eq!(truncate("Boards of Canada", 6), "Board…");
        assert_eq!(truncate("東京の夜", 5), "東京…");
        assert_eq!(truncate("anything", 0), "");
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn status(artist: &str, title: &str) -> ChannelStatus {
        ChannelStatus {
            channel: "cyberia".into(),
            listeners: 5,
            listener_peak: 14,
            artist: artist.into(),
            title: title.into(),
            description: String::new(),
        }
    }

    #[test]
    fn test_now_playing_falls_back_to_status() {
        let mut state = AppState::new("cyberia");
        assert!(line_text(&now_playing_line(&state, 80)).ends_with(WAITING));

        state.status = Some(status("Boards of Canada", "Roygbiv"));
        assert!(line_text(&now_playing_line(&state, 80)).ends_with("Boards of Canada - Roygbiv"));

        state.status = Some(status("", "Roygbiv"));
        assert!(line_text(&now_playing_line(&state, 80)).ends_with("cyberia  Roygbiv"));

        state.status = Some(status("Boards of Canada", ""));
        assert!(line_text(&now_playing_line(&state, 80)).ends_with(WAITING));
    }

    #[test]
    fn test_volume_line_shows_mute() {
        let view = PlayerView {
            channel: "cyberia".into(),
            codec: Codec::Ogg,
            indicator: PlayIndicator::Play,
            volume: 0.51,
            muted: true,
            volume_icon: VolumeIcon::Off,
        };
        let text: String = volume_line(Some(&view))
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(text, "vol × muted");
        assert!(volume_line(None).spans.is_empty());
    }
}
