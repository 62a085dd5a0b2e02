//! PlaylistPanel — played / current / upcoming tracks with relative times.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use radio_core::playlist::{PlaylistRow, PlaylistView, RowTiming};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_default, style_muted, style_playing, style_secondary, C_BADGE_LIVE},
    widgets::pane_chrome::{pane_chrome, Badge},
};

const WHEN_WIDTH: u16 = 16;

/// Scroll position.  `follow` keeps the current track centred across polls
/// until the user scrolls by hand.
pub struct PlaylistPanel {
    offset: usize,
    follow: bool,
}

impl PlaylistPanel {
    pub fn new() -> Self {
        Self {
            offset: 0,
            follow: true,
        }
    }

    fn scroll(&mut self, delta: isize, state: &AppState) {
        let len = state.playlist.as_ref().map_or(0, |p| p.rows.len());
        self.follow = false;
        self.offset = self
            .offset
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
    }

    /// First visible row for a view of `height` rows.
    fn first_row(&mut self, playlist: &PlaylistView, height: usize) -> usize {
        let max = playlist.rows.len().saturating_sub(height);
        if self.follow {
            let current = playlist.current_index().unwrap_or(0);
            self.offset = current.saturating_sub(height / 2);
        }
        self.offset = self.offset.min(max);
        self.offset
    }
}

impl Default for PlaylistPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn table_row(row: &PlaylistRow) -> Row<'static> {
    let (marker, text_style, when_style) = if row.is_current() {
        ("▶ ", style_playing(), style_playing())
    } else if matches!(row.timing, RowTiming::Ago(_)) {
        ("  ", style_secondary(), style_muted())
    } else {
        ("  ", style_default(), style_secondary())
    };
    let when = if row.is_current() {
        "now".to_string()
    } else {
        row.when()
    };
    Row::new(vec![
        Cell::from(Span::styled(format!("{}{}", marker, row.text), text_style)),
        Cell::from(Span::styled(when, when_style)),
    ])
}

impl Component for PlaylistPanel {
    fn id(&self) -> ComponentId {
        ComponentId::Playlist
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll(-1, state),
            KeyCode::Down | KeyCode::Char('j') => self.scroll(1, state),
            KeyCode::PageUp => self.scroll(-10, state),
            KeyCode::PageDown => self.scroll(10, state),
            KeyCode::Home | KeyCode::Char('g') => self.follow = true,
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll(-1, state),
            MouseEventKind::ScrollDown => self.scroll(1, state),
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let live = state.playlist.as_ref().is_some_and(PlaylistView::is_live);
        let badge = live.then(|| Badge {
            text: "LIVE".to_string(),
            color: C_BADGE_LIVE,
        });
        let block = pane_chrome("playlist", Some('2'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(playlist) = &state.playlist else {
            frame.render_widget(
                Paragraph::new(Span::styled(" waiting for station…", style_muted())),
                inner,
            );
            return;
        };

        let height = inner.height as usize;
        let first = self.first_row(playlist, height);
        let rows: Vec<Row> = playlist
            .rows
            .iter()
            .skip(first)
            .take(height)
            .map(table_row)
            .collect();
        let table = Table::new(rows, [Constraint::Min(10), Constraint::Length(WHEN_WIDTH)])
            .column_spacing(1);
        frame.render_widget(table, inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_core::model::{PlaylistSnapshot, Track};

    fn track(title: &str, time: f64) -> Track {
        Track {
            artist: None,
            title: title.to_string(),
            album: String::new(),
            time,
        }
    }

    fn view(before: usize, after: usize) -> PlaylistView {
        PlaylistView::from_snapshot(&PlaylistSnapshot {
            current: track("Now", 300.0),
            before: (0..before).map(|i| track(&format!("B{}", i), 200.0)).collect(),
            after: (0..after).map(|i| track(&format!("A{}", i), 200.0)).collect(),
            elapsed: 10.0,
            ..PlaylistSnapshot::default()
        })
    }

    #[test]
    fn test_follow_centres_current_track() {
        let mut panel = PlaylistPanel::new();
        let v = view(10, 10);
        let current = v.current_index().unwrap();
        let first = panel.first_row(&v, 6);
        assert_eq!(first, current - 3);
    }

    #[test]
    fn test_manual_scroll_stops_following() {
        let mut state = AppState::new("cyberia");
        state.playlist = Some(view(2, 2));
        let mut panel = PlaylistPanel::new();
        panel.scroll(1, &state);
        assert!(!panel.follow);
        let first = panel.first_row(state.playlist.as_ref().unwrap(), 3);
        assert_eq!(first, 1);
        panel.scroll(-5, &state);
        assert_eq!(panel.offset, 0);
    }

    #[test]
    fn test_short_playlist_never_scrolls() {
        let mut panel = PlaylistPanel::new();
        assert_eq!(panel.first_row(&view(1, 1), 20), 0);
    }
}
