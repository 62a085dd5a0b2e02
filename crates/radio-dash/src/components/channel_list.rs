//! ChannelList — left pane: channels from the Icecast status with a `/` filter.

use std::time::Instant;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_default, style_muted, style_playing, style_secondary, style_selected, C_FILTER_FG,
    },
    widgets::{
        filter_input::{FilterAction, FilterInput},
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

const DOUBLE_CLICK_MS: u128 = 400;

pub struct ChannelList {
    list: ScrollableList<String>,
    filter: FilterInput,
    /// Channels last copied from state.
    known: Vec<String>,
    last_click: Option<(usize, Instant)>,
}

fn channel_matches(channel: &String, query: &str) -> bool {
    let channel = channel.to_lowercase();
    query
        .to_lowercase()
        .split_whitespace()
        .all(|term| channel.contains(term))
}

impl ChannelList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(channel_matches),
            filter: FilterInput::default(),
            known: Vec::new(),
            last_click: None,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.list.selected_item().map(String::as_str)
    }

    fn tune_selected(&self) -> Vec<Action> {
        self.selected()
            .map(|ch| vec![Action::SelectChannel(ch.to_string())])
            .unwrap_or_default()
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Up => self.list.select_up(1),
            KeyCode::Down => self.list.select_down(1),
            _ => match self.filter.handle_key(key) {
                FilterAction::Changed(q) => self.list.set_filter(&q),
                FilterAction::Confirmed => return vec![Action::CloseFilter],
                FilterAction::Cancelled => {
                    self.list.set_filter("");
                    return vec![Action::CloseFilter];
                }
            },
        }
        vec![]
    }
}

impl Default for ChannelList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ChannelList {
    fn id(&self) -> ComponentId {
        ComponentId::ChannelList
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if self.filter.is_active() {
            return self.handle_filter_key(key);
        }

        let step = if key.modifiers.contains(KeyModifiers::SHIFT) { 5 } else { 1 };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(step),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter => return self.tune_selected(),
            KeyCode::Char('/') => {
                self.filter.activate();
                return vec![Action::OpenFilter];
            }
            _ => {}
        }
        vec![]
    }

    /// Click selects; a second click on the same row within 400ms tunes in.
    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                let row = event.row.saturating_sub(area.y + 1) as usize;
                if !self.list.handle_click(row) {
                    self.last_click = None;
                    return vec![];
                }
                let double = self
                    .last_click
                    .is_some_and(|(r, t)| r == row && t.elapsed().as_millis() < DOUBLE_CLICK_MS);
                if double {
                    self.last_click = None;
                    return self.tune_selected();
                }
                self.last_click = Some((row, Instant::now()));
            }
            _ => {}
        }
        vec![]
    }

    fn on_state_changed(&mut self, state: &AppState) {
        if self.known != state.channels {
            self.known = state.channels.clone();
            self.list.set_items(state.channels.clone());
            self.list.select_where(|ch| *ch == state.channel);
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let show_filter = self.filter.is_active() || !self.filter.text().is_empty();
        let badge = show_filter.then(|| Badge {
            text: format!("{}/{}", self.list.len(), self.list.total_len()),
            color: C_FILTER_FG,
        });
        let block = pane_chrome("channels", Some('1'), focused, badge);
        let mut inner = block.inner(area);
        frame.render_widget(block, area);

        if show_filter && inner.height > 0 {
            let filter_area = Rect {
                y: inner.bottom() - 1,
                height: 1,
                ..inner
            };
            self.filter.draw(frame, filter_area);
            inner.height -= 1;
        }

        if state.channels.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(" waiting for station…", style_muted()))
                    .wrap(Wrap { trim: false }),
                inner,
            );
            return;
        }
        if self.list.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(" no channels match", style_muted())),
                inner,
            );
            return;
        }

        let height = inner.height as usize;
        self.list.ensure_visible(height);
        let selected_row = self.list.selected_in_view();
        let lines: Vec<Line> = self
            .list
            .visible_items(height)
            .enumerate()
            .map(|(row, channel)| {
                let current = *channel == state.channel;
                let marker = if current && state.is_playing() {
                    Span::styled(" ▶ ", style_playing())
                } else if current {
                    Span::styled(" • ", style_secondary())
                } else {
                    Span::raw("   ")
                };
                let name_style = if current { style_playing() } else { style_default() };
                let line = Line::from(vec![marker, Span::styled(channel.clone(), name_style)]);
                if row == selected_row {
                    line.style(style_selected(focused))
                } else {
                    line
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> AppState {
        let mut s = AppState::new("jazz");
        s.channels = vec!["cyberia".into(), "jazz".into(), "swing".into()];
        s
    }

    fn list(state: &AppState) -> ChannelList {
        let mut c = ChannelList::new();
        c.on_state_changed(state);
        c
    }

    #[test]
    fn test_starts_on_current_channel() {
        let s = state();
        let c = list(&s);
        assert_eq!(c.selected(), Some("jazz"));
    }

    #[test]
    fn test_enter_tunes_selected() {
        let s = state();
        let mut c = list(&s);
        c.handle_key(key(KeyCode::Char('j')), &s);
        assert_eq!(
            c.handle_key(key(KeyCode::Enter), &s),
            vec![Action::SelectChannel("swing".into())]
        );
    }

    #[test]
    fn test_filter_swallows_keys() {
        let s = state();
        let mut c = list(&s);
        assert_eq!(c.handle_key(key(KeyCode::Char('/')), &s), vec![Action::OpenFilter]);
        assert!(c.filter.is_active());
        assert!(c.handle_key(key(KeyCode::Char('c')), &s).is_empty());
        assert_eq!(c.selected(), Some("cyberia"));
        assert_eq!(c.handle_key(key(KeyCode::Enter), &s), vec![Action::CloseFilter]);
        assert!(!c.filter.is_active());
        assert_eq!(
            c.handle_key(key(KeyCode::Enter), &s),
            vec![Action::SelectChannel("cyberia".into())]
        );
    }

    #[test]
    fn test_channel_matching_is_case_insensitive() {
        assert!(channel_matches(&"Cyberia".to_string(), "cyb"));
        assert!(channel_matches(&"late night jazz".to_string(), "jazz late"));
        assert!(!channel_matches(&"swing".to_string(), "jazz"));
    }
}
