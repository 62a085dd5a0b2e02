//! Smooth Unicode progress bar for the current track.

use radio_core::progress::ProgressView;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_BADGE_LIVE, C_MUTED, C_PLAYING, C_SECONDARY};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Fill `width` cells to `ratio` (0.0..=1.0) using eighth blocks.
pub fn smooth_bar(ratio: f64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let eighths = (ratio.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full = eighths / 8;
    let partial = eighths % 8;

    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat('█').take(full));
    if full < width {
        bar.push(BLOCKS[partial]);
        bar.extend(std::iter::repeat('·').take(width - full - 1));
    }
    bar
}

/// Render `"<bar> <label> <percent>%"` into a single row.
pub fn draw_progress(frame: &mut Frame, area: Rect, view: &ProgressView) {
    if area.width < 4 || area.height == 0 {
        return;
    }

    let label = format!(" {} ", view.label);
    let percent = format!("{:>3}%", view.percent);
    let used = (label.chars().count() + percent.len()) as u16;
    let bar_w = area.width.saturating_sub(used).max(4) as usize;

    let bar_color = if view.live { C_BADGE_LIVE } else { C_PLAYING };
    let mut label_style = Style::default().fg(C_SECONDARY);
    if view.live {
        label_style = label_style.add_modifier(Modifier::BOLD);
    }

    let line = Line::from(vec![
        Span::styled(smooth_bar(view.ratio, bar_w), Style::default().fg(bar_color)),
        Span::styled(label, label_style),
        Span::styled(percent, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_bar_width_is_constant() {
        for ratio in [0.0, 0.13, 0.5, 0.99, 1.0, 1.4] {
            assert_eq!(smooth_bar(ratio, 20).chars().count(), 20, "ratio {}", ratio);
        }
    }

    #[test]
    fn test_smooth_bar_fill() {
        assert_eq!(smooth_bar(1.0, 4), "████");
        assert_eq!(smooth_bar(0.5, 4), "██ ·");
        assert_eq!(smooth_bar(0.0, 3), " ··");
        assert_eq!(smooth_bar(0.5, 0), "");
    }
}
