//! TUI widgets

pub mod help;
pub mod overview;
pub mod products;
pub mod spinner;
pub mod tabs;
pub mod users;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Maximum content width (keeps layout clean on wide terminals)
pub const MAX_CONTENT_WIDTH: u16 = 120;

/// Horizontally center `area` at no more than [`MAX_CONTENT_WIDTH`]
pub fn content_area(area: Rect) -> Rect {
    let width = area.width.min(MAX_CONTENT_WIDTH);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y,
        width,
        height: area.height,
    }
}

/// Share bar with filled/empty blocks, e.g. 50% over 10 cells → "█████░░░░░"
pub fn share_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Percentage of `part` in `whole`; 0 when `whole` is 0
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Truncate to `width` chars, marking the cut with an ellipsis
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

pub fn render_separator(area: Rect, buf: &mut Buffer, theme: Theme) {
    let line = "─".repeat(area.width as usize);
    buf.set_string(area.x, area.y, &line, Style::default().fg(theme.muted()));
}

/// Centered `key: action` hint line
pub fn render_keybindings(area: Rect, buf: &mut Buffer, bindings: &[(&str, &str)], theme: Theme) {
    let mut spans = Vec::with_capacity(bindings.len() * 3);
    for (i, (key, action)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme.accent())));
        spans.push(Span::styled(
            format!(": {}", action),
            Style::default().fg(theme.muted()),
        ));
    }
    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_bar() {
        assert_eq!(share_bar(50.0, 10), "█████░░░░░");
        assert_eq!(share_bar(0.0, 4), "░░░░");
        assert_eq!(share_bar(100.0, 4), "████");
        assert_eq!(share_bar(250.0, 4), "████");
    }

    #[test]
    fn test_percent_of_zero_whole() {
        assert_eq!(percent_of(10.0, 0.0), 0.0);
        assert_eq!(percent_of(25.0, 100.0), 25.0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("INJ质押30天", 20), "INJ质押30天");
        assert_eq!(truncate("USDT45天理财计划", 6), "USDT4…");
    }

    #[test]
    fn test_content_area_centers() {
        let area = content_area(Rect::new(0, 0, 200, 10));
        assert_eq!(area.width, MAX_CONTENT_WIDTH);
        assert_eq!(area.x, 40);
    }
}
