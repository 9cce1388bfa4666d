//! Users view widget - top-user ranking and single-user lookup

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use super::tabs::{Tab, TabBar};
use super::{content_area, render_keybindings, render_separator, truncate};
use crate::services::QueryService;
use crate::tui::theme::Theme;
use crate::types::{format_amount, UserRollup};

const TABLE_WIDTH: u16 = 96;
const USER_WIDTH: usize = 24;
const PRODUCT_WIDTH: usize = 24;

/// Outcome of the last submitted lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found(String),
    NotFound(String),
}

/// Lookup input state owned by the app
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lookup {
    pub input: String,
    pub editing: bool,
    pub result: Option<LookupResult>,
}

impl Lookup {
    /// Resolve the current input against the query service (exact match)
    pub fn submit(&mut self, query: &QueryService) {
        self.editing = false;
        let id = self.input.trim();
        self.result = if id.is_empty() {
            None
        } else if query.user(id).is_some() {
            Some(LookupResult::Found(id.to_string()))
        } else {
            Some(LookupResult::NotFound(id.to_string()))
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of scrollable rows for the current content
    pub fn row_count(&self, query: &QueryService) -> usize {
        match &self.result {
            Some(LookupResult::Found(id)) => query.user(id).map_or(0, |u| u.products.len()),
            _ => query.top_users(None).len(),
        }
    }
}

pub struct UsersView<'a> {
    query: &'a QueryService,
    lookup: &'a Lookup,
    scroll: usize,
    theme: Theme,
}

impl<'a> UsersView<'a> {
    pub fn new(query: &'a QueryService, lookup: &'a Lookup, scroll: usize, theme: Theme) -> Self {
        Self {
            query,
            lookup,
            scroll,
            theme,
        }
    }

    /// Rows left for the table (tabs, separators, input, blank, summary, header, hints)
    pub fn visible_rows(area_height: u16) -> usize {
        area_height.saturating_sub(9) as usize
    }

    pub fn max_scroll(len: usize, area_height: u16) -> usize {
        len.saturating_sub(Self::visible_rows(area_height))
    }
}

impl Widget for UsersView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = content_area(area);
        let chunks = Layout::vertical([
            Constraint::Length(1), // Tabs
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Lookup input
            Constraint::Length(1), // Blank
            Constraint::Length(2), // Summary / status
            Constraint::Length(1), // Table header
            Constraint::Fill(1),   // Rows
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Keybindings
        ])
        .split(area);

        TabBar::new(Tab::Users, self.theme).render(chunks[0], buf);
        render_separator(chunks[1], buf, self.theme);
        self.render_input(chunks[2], buf);

        match &self.lookup.result {
            Some(LookupResult::Found(id)) => match self.query.user(id) {
                Some(user) => {
                    self.render_user_summary(user, chunks[4], buf);
                    self.render_products(user, chunks[5], chunks[6], buf);
                }
                None => self.render_status(&format!("user not found: {}", id), chunks[4], buf),
            },
            Some(LookupResult::NotFound(id)) => {
                self.render_status(&format!("user not found: {}", id), chunks[4], buf);
                self.render_ranking(chunks[5], chunks[6], buf);
            }
            None => {
                let ranked = self.query.top_users(None).len();
                let line = Line::from(Span::styled(
                    format!("Top {} users by total subscribed", ranked),
                    Style::default()
                        .fg(self.theme.header())
                        .add_modifier(Modifier::BOLD),
                ));
                buf.set_line(self.table_x(chunks[4]), chunks[4].y, &line, chunks[4].width);
                self.render_ranking(chunks[5], chunks[6], buf);
            }
        }

        render_separator(chunks[7], buf, self.theme);
        let hints: &[(&str, &str)] = if self.lookup.editing {
            &[("Enter", "Look up"), ("Esc", "Stop editing")]
        } else {
            &[("/", "Look up user"), ("c", "Clear"), ("j/k", "Scroll"), ("q", "Quit")]
        };
        render_keybindings(chunks[8], buf, hints, self.theme);
    }
}

impl UsersView<'_> {
    fn table_x(&self, area: Rect) -> u16 {
        area.x + area.width.saturating_sub(TABLE_WIDTH) / 2
    }

    fn render_input(&self, area: Rect, buf: &mut Buffer) {
        let (cursor, input_style) = if self.lookup.editing {
            ("▏", Style::default().fg(self.theme.accent()))
        } else {
            ("", Style::default().fg(self.theme.text()))
        };
        let line = Line::from(vec![
            Span::styled("Lookup: ", Style::default().fg(self.theme.muted())),
            Span::styled(self.lookup.input.as_str(), input_style),
            Span::styled(cursor, Style::default().fg(self.theme.accent())),
        ]);
        buf.set_line(self.table_x(area), area.y, &line, area.width);
    }

    fn render_status(&self, message: &str, area: Rect, buf: &mut Buffer) {
        buf.set_string(
            self.table_x(area),
            area.y,
            message,
            Style::default().fg(self.theme.due()),
        );
    }

    fn render_user_summary(&self, user: &UserRollup, area: Rect, buf: &mut Buffer) {
        let x = self.table_x(area);
        let first = Line::from(vec![
            Span::styled(
                user.user.as_str(),
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  {}  {} products",
                    user.address.as_deref().unwrap_or("-"),
                    user.count
                ),
                Style::default().fg(self.theme.muted()),
            ),
        ]);
        let second = Line::from(vec![
            Span::styled("Total ", Style::default().fg(self.theme.muted())),
            Span::styled(
                format_amount(user.total),
                Style::default().fg(self.theme.amount()),
            ),
            Span::styled("   Due ", Style::default().fg(self.theme.muted())),
            Span::styled(
                format_amount(user.due_not_refunded),
                Style::default().fg(self.theme.due()),
            ),
            Span::styled("   Not due ", Style::default().fg(self.theme.muted())),
            Span::styled(
                format_amount(user.not_due_total),
                Style::default().fg(self.theme.not_due()),
            ),
            Span::styled("   Refunded ", Style::default().fg(self.theme.muted())),
            Span::styled(
                format_amount(user.total_refunded),
                Style::default().fg(self.theme.amount()),
            ),
        ]);
        buf.set_line(x, area.y, &first, area.width);
        if area.height > 1 {
            buf.set_line(x, area.y + 1, &second, area.width);
        }
    }

    fn header_style(&self) -> Style {
        Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD)
    }

    fn render_ranking(&self, header: Rect, rows: Rect, buf: &mut Buffer) {
        let x = self.table_x(header);
        let style = self.header_style();
        let line = Line::from(vec![
            Span::styled(format!("{:>4} ", "#"), style),
            Span::styled(format!("{:<width$}", "User", width = USER_WIDTH), style),
            Span::styled(format!("{:>7}", "Count"), style),
            Span::styled(format!("{:>18}", "Total"), style),
            Span::styled(format!("{:>18}", "Due"), style),
            Span::styled(format!("{:>18}", "Not due"), style),
        ]);
        buf.set_line(x, header.y, &line, header.width);

        for (i, (rank, user)) in self
            .query
            .top_users(None)
            .into_iter()
            .enumerate()
            .skip(self.scroll)
            .take(rows.height as usize)
            .enumerate()
        {
            let line = Line::from(vec![
                Span::styled(
                    format!("{:>4} ", rank + 1),
                    Style::default().fg(self.theme.muted()),
                ),
                Span::styled(
                    format!("{:<width$}", truncate(&user.user, USER_WIDTH - 1), width = USER_WIDTH),
                    Style::default().fg(self.theme.text()),
                ),
                Span::styled(
                    format!("{:>7}", user.count),
                    Style::default().fg(self.theme.count()),
                ),
                Span::styled(
                    format!("{:>18}", format_amount(user.total)),
                    Style::default().fg(self.theme.amount()),
                ),
                Span::styled(
                    format!("{:>18}", format_amount(user.due_not_refunded)),
                    Style::default().fg(self.theme.due()),
                ),
                Span::styled(
                    format!("{:>18}", format_amount(user.not_due_total)),
                    Style::default().fg(self.theme.not_due()),
                ),
            ]);
            buf.set_line(x, rows.y + i as u16, &line, rows.width);
        }
    }

    fn render_products(&self, user: &UserRollup, header: Rect, rows: Rect, buf: &mut Buffer) {
        let x = self.table_x(header);
        let style = self.header_style();
        let line = Line::from(vec![
            Span::styled(format!("{:<width$}", "Product", width = PRODUCT_WIDTH), style),
            Span::styled(format!("{:>16}", "Amount"), style),
            Span::styled(format!("  {:<20}", "Start"), style),
            Span::styled(format!("{:<20}", "End"), style),
            Span::styled(format!("{:<8}", "Status"), style),
        ]);
        buf.set_line(x, header.y, &line, header.width);

        for (i, detail) in user
            .products
            .iter()
            .skip(self.scroll)
            .take(rows.height as usize)
            .enumerate()
        {
            let line = Line::from(vec![
                Span::styled(
                    format!(
                        "{:<width$}",
                        truncate(&detail.product, PRODUCT_WIDTH - 1),
                        width = PRODUCT_WIDTH
                    ),
                    Style::default().fg(self.theme.text()),
                ),
                Span::styled(
                    format!("{:>16}", format_amount(detail.amount)),
                    Style::default().fg(self.theme.amount()),
                ),
                Span::styled(
                    format!("  {:<20}", truncate(detail.start.as_deref().unwrap_or("-"), 19)),
                    Style::default().fg(self.theme.muted()),
                ),
                Span::styled(
                    format!("{:<20}", truncate(detail.end_date_raw.as_deref().unwrap_or("-"), 19)),
                    Style::default().fg(self.theme.liability(detail.liability)),
                ),
                Span::styled(
                    truncate(detail.status.as_deref().unwrap_or("-"), 8),
                    Style::default().fg(self.theme.text()),
                ),
            ]);
            buf.set_line(x, rows.y + i as u16, &line, rows.width);
        }
    }
}
