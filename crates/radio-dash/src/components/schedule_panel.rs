//! SchedulePanel — the weekly schedule with today highlighted, plus the
//! channel's stream links.

use chrono::Datelike;
use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use radio_core::client::StreamLinks;
use radio_core::model::Schedule;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_default, style_muted, style_secondary, C_TODAY},
    widgets::pane_chrome::pane_chrome,
};

const DAY_WIDTH: usize = 10;

#[derive(Default)]
pub struct SchedulePanel;

/// Weekday index with Monday = 0, matching `Schedule`.
pub fn today_index() -> usize {
    chrono::Local::now().weekday().num_days_from_monday() as usize
}

fn schedule_lines(schedule: &Schedule, today: usize) -> Vec<Line<'static>> {
    schedule
        .days()
        .enumerate()
        .map(|(i, (day, entry))| {
            let (day_style, entry_style) = if i == today {
                let s = Style::default().fg(C_TODAY).add_modifier(Modifier::BOLD);
                (s, s)
            } else {
                (style_secondary(), style_default())
            };
            let entry = match entry {
                Some(text) => Span::styled(text.to_string(), entry_style),
                None => Span::styled("—", style_muted()),
            };
            Line::from(vec![
                Span::styled(format!(" {:<width$}", day, width = DAY_WIDTH), day_style),
                entry,
            ])
        })
        .collect()
}

fn link_lines(links: &StreamLinks) -> Vec<Line<'static>> {
    if links.ogg_m3u.is_empty() {
        return Vec::new();
    }
    [
        ("ogg", &links.ogg_m3u),
        ("mp3", &links.mp3_m3u),
        ("files", &links.file_list),
    ]
    .into_iter()
    .map(|(label, url)| {
        Line::from(vec![
            Span::styled(format!(" {:<width$}", label, width = DAY_WIDTH), style_muted()),
            Span::styled(url.clone(), style_secondary()),
        ])
    })
    .collect()
}

impl Component for SchedulePanel {
    fn id(&self) -> ComponentId {
        ComponentId::Schedule
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("schedule", Some('3'), focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = match &state.schedule {
            Some(schedule) => schedule_lines(schedule, today_index()),
            None => vec![Line::from(Span::styled(" waiting for station…", style_muted()))],
        };
        let links = link_lines(&state.links);
        if !links.is_empty() {
            lines.push(Line::default());
            lines.extend(links);
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
