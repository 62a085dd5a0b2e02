//! Status bar — bottom rows with the last log line, input mode and key hints.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_MODE_FILTER, C_MODE_NORMAL, C_MUTED, C_SECONDARY, C_SEPARATOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// The channel filter has the keyboard; global keys are off.
    Filter,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "RADIO",
            Self::Filter => "FILTER",
        }
    }

    fn hints(self) -> &'static str {
        match self {
            Self::Normal => {
                "↑↓/jk select  Enter tune  Space play/pause  s stop  m mute  +/- vol  v cycle vol  r refresh  y copy link  / filter  Tab panes  q quit"
            }
            Self::Filter => "type to filter  ↑↓ move  Enter keep  Esc clear/close",
        }
    }
}

pub fn draw_log_bar(frame: &mut Frame, area: Rect, last_log: Option<&str>) {
    let line = Line::from(Span::styled(
        last_log.unwrap_or(""),
        Style::default().fg(C_SECONDARY),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode) {
    let color = match mode {
        InputMode::Normal => C_MODE_NORMAL,
        InputMode::Filter => C_MODE_FILTER,
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", mode.hints()), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
