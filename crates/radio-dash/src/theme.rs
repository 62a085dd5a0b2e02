//! Color palette and style constants for the dashboard.

use ratatui::style::{Color, Modifier, Style};

// ── Palette ───────────────────────────────────────────────────────────────────
// Warm amber on near-black; green is reserved for "audio is flowing".

pub const C_BG: Color = Color::Rgb(16, 15, 14);
pub const C_ACCENT: Color = Color::Rgb(240, 140, 60);
pub const C_PLAYING: Color = Color::Rgb(110, 200, 110);
pub const C_PRIMARY: Color = Color::Rgb(222, 214, 200);
pub const C_SECONDARY: Color = Color::Rgb(140, 130, 118);
pub const C_MUTED: Color = Color::Rgb(84, 78, 72);
pub const C_SEPARATOR: Color = Color::Rgb(44, 40, 36);
pub const C_SELECTION_BG: Color = Color::Rgb(38, 32, 26);
pub const C_BORDER: Color = Color::Rgb(48, 44, 40);
pub const C_BORDER_FOCUSED: Color = Color::Rgb(240, 140, 60);
pub const C_NUMBER_HINT: Color = Color::Rgb(110, 100, 90);
pub const C_FILTER_BG: Color = Color::Rgb(26, 22, 18);
pub const C_FILTER_FG: Color = Color::Rgb(250, 200, 90);
pub const C_DJ: Color = Color::Rgb(200, 140, 210);
pub const C_LISTENERS: Color = Color::Rgb(120, 170, 150);
pub const C_TODAY: Color = Color::Rgb(250, 210, 70);
pub const C_BADGE_LIVE: Color = Color::Rgb(230, 70, 60);

pub const C_TOAST_INFO: Color = Color::Rgb(100, 160, 210);
pub const C_TOAST_SUCCESS: Color = C_PLAYING;
pub const C_TOAST_WARNING: Color = C_FILTER_FG;
pub const C_TOAST_ERROR: Color = Color::Rgb(230, 80, 70);

pub const C_MODE_NORMAL: Color = C_SECONDARY;
pub const C_MODE_FILTER: Color = C_FILTER_FG;

// ── Styles ────────────────────────────────────────────────────────────────────

pub fn style_default() -> Style {
    Style::default().fg(C_PRIMARY)
}

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

pub fn style_playing() -> Style {
    Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD)
}

pub fn style_selected(focused: bool) -> Style {
    let style = Style::default().bg(C_SELECTION_BG).fg(C_PRIMARY);
    if focused {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_BORDER)
}
