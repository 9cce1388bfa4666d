//! Tab bar widget for view navigation

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::tui::theme::Theme;

/// Dashboard views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Products,
    Users,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Products => "Products",
            Self::Users => "Users",
        }
    }

    pub fn all() -> &'static [Tab] {
        &[Tab::Overview, Tab::Products, Tab::Users]
    }

    /// Next tab (wrapping)
    pub fn next(self) -> Self {
        match self {
            Self::Overview => Self::Products,
            Self::Products => Self::Users,
            Self::Users => Self::Overview,
        }
    }

    /// Previous tab (wrapping)
    pub fn prev(self) -> Self {
        match self {
            Self::Overview => Self::Users,
            Self::Products => Self::Overview,
            Self::Users => Self::Products,
        }
    }

    /// Tab for a number key (1-3)
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Overview),
            2 => Some(Self::Products),
            3 => Some(Self::Users),
            _ => None,
        }
    }
}

/// Tab bar widget showing available views
pub struct TabBar {
    selected: Tab,
    theme: Theme,
}

impl TabBar {
    pub fn new(selected: Tab, theme: Theme) -> Self {
        Self { selected, theme }
    }
}

impl TabBar {
    /// Display string for a tab: selected tabs are bracketed
    fn display(&self, tab: Tab) -> String {
        if tab == self.selected {
            format!("[{}]", tab.label())
        } else {
            tab.label().to_string()
        }
    }
}

/// Spacing between tab labels
const TAB_GAP: u16 = 2;

impl Widget for TabBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let labels: Vec<(Tab, String)> = Tab::all().iter().map(|t| (*t, self.display(*t))).collect();
        let total_width = labels
            .iter()
            .map(|(_, d)| d.len() as u16 + TAB_GAP)
            .sum::<u16>()
            .saturating_sub(TAB_GAP);

        // Centered
        let mut x = area.x + (area.width.saturating_sub(total_width)) / 2;
        for (tab, display) in labels {
            let width = display.len() as u16;
            if x + width > area.x + area.width {
                break;
            }

            let style = if tab == self.selected {
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted())
            };
            buf.set_string(x, area.y, &display, style);
            x += width + TAB_GAP;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Overview.next(), Tab::Products);
        assert_eq!(Tab::Users.next(), Tab::Overview);
        assert_eq!(Tab::Overview.prev(), Tab::Users);
        assert_eq!(Tab::Products.prev(), Tab::Overview);
    }

    #[test]
    fn test_tab_from_number() {
        assert_eq!(Tab::from_number(1), Some(Tab::Overview));
        assert_eq!(Tab::from_number(3), Some(Tab::Users));
        assert_eq!(Tab::from_number(0), None);
        assert_eq!(Tab::from_number(4), None);
    }

    #[test]
    fn test_tab_bar_highlights_selected() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        TabBar::new(Tab::Products, Theme::Dark).render(area, &mut buf);
        let line: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(line.contains("[Products]"));
        assert!(line.contains("Users"));
        assert!(!line.contains("[Overview]"));
    }
}
