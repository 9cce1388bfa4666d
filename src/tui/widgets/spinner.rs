//! Loading spinner widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::tui::theme::Theme;

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const APP_NAME: &str = "subtrack";
const TAGLINE: &str = "Subscription ledger overview";

/// Loading stage for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingStage {
    Reading,
    Aggregating,
}

impl LoadingStage {
    pub fn message(self) -> &'static str {
        match self {
            Self::Reading => "Reading ledger feeds...",
            Self::Aggregating => "Aggregating records...",
        }
    }
}

/// Centered name, tagline and animated stage line
pub struct Spinner {
    frame: usize,
    stage: LoadingStage,
    theme: Theme,
}

impl Spinner {
    pub fn new(frame: usize, stage: LoadingStage, theme: Theme) -> Self {
        Self {
            frame,
            stage,
            theme,
        }
    }

    pub fn current_char(&self) -> char {
        SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()]
    }

    /// Advance to next frame, returning the new frame index
    pub fn next_frame(frame: usize) -> usize {
        (frame + 1) % SPINNER_FRAMES.len()
    }
}

/// X offset that centers `text` (by char count) in `area`
fn centered_x(area: Rect, text: &str) -> u16 {
    area.x + area.width.saturating_sub(text.chars().count() as u16) / 2
}

impl Widget for Spinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 5 || area.width < 35 {
            return;
        }

        // name, tagline, blank, spinner
        let name_y = (area.y + area.height / 2).saturating_sub(2);
        buf.set_string(
            centered_x(area, APP_NAME),
            name_y,
            APP_NAME,
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        );
        buf.set_string(
            centered_x(area, TAGLINE),
            name_y + 1,
            TAGLINE,
            Style::default().fg(self.theme.muted()),
        );

        let line = format!("{} {}", self.current_char(), self.stage.message());
        buf.set_string(
            centered_x(area, &line),
            name_y + 3,
            &line,
            Style::default().fg(self.theme.accent()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_current_char_wraps() {
        let theme = Theme::Dark;
        assert_eq!(Spinner::new(0, LoadingStage::Reading, theme).current_char(), '⠋');
        assert_eq!(Spinner::new(5, LoadingStage::Reading, theme).current_char(), '⠴');
        assert_eq!(Spinner::new(10, LoadingStage::Reading, theme).current_char(), '⠋');
    }

    #[test]
    fn test_next_frame() {
        assert_eq!(Spinner::next_frame(0), 1);
        assert_eq!(Spinner::next_frame(9), 0);
    }

    #[test]
    fn test_loading_stage_message() {
        assert_eq!(LoadingStage::Reading.message(), "Reading ledger feeds...");
        assert_eq!(
            LoadingStage::Aggregating.message(),
            "Aggregating records..."
        );
    }

    #[test]
    fn test_spinner_skips_tiny_area() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        Spinner::new(0, LoadingStage::Reading, Theme::Dark).render(area, &mut buf);
        assert_eq!(buf, Buffer::empty(area));
    }
}
