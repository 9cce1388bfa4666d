//! Overview widget: global totals, liability split and origin breakdown

use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::tabs::{Tab, TabBar};
use super::{content_area, percent_of, render_keybindings, render_separator, share_bar};
use crate::tui::theme::Theme;
use crate::types::{format_amount, Origin, OverviewReport, OverviewTotals};

const ORIGIN_NAME_WIDTH: usize = 16;
const BAR_WIDTH: usize = 24;

/// Per-origin contribution, derived once from the frozen report
#[derive(Debug, Clone, PartialEq)]
pub struct OriginShare {
    pub origin: Origin,
    pub count: u64,
    pub total: f64,
}

/// Pre-computed data for the overview tab
#[derive(Debug, Clone)]
pub struct OverviewData {
    pub totals: OverviewTotals,
    pub reference_date: DateTime<Utc>,
    pub record_count: u64,
    pub product_count: usize,
    pub user_count: usize,
    pub origins: Vec<OriginShare>,
}

impl OverviewData {
    pub fn from_report(report: &OverviewReport) -> Self {
        let mut origins: Vec<OriginShare> = Origin::all()
            .iter()
            .map(|&origin| OriginShare {
                origin,
                count: 0,
                total: 0.0,
            })
            .collect();

        for detail in report.users.iter().flat_map(|u| u.products.iter()) {
            if let Some(share) = origins.iter_mut().find(|s| s.origin == detail.origin) {
                share.count += 1;
                share.total += detail.amount;
            }
        }

        Self {
            totals: report.totals,
            reference_date: report.reference_date,
            record_count: report.record_count,
            product_count: report.products.len(),
            user_count: report.users.len(),
            origins,
        }
    }
}

pub struct Overview<'a> {
    data: &'a OverviewData,
    theme: Theme,
}

impl<'a> Overview<'a> {
    pub fn new(data: &'a OverviewData, theme: Theme) -> Self {
        Self { data, theme }
    }
}

impl Widget for Overview<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = content_area(area);
        let origin_rows = self.data.origins.len() as u16;

        let chunks = Layout::vertical([
            Constraint::Length(1),           // Tabs
            Constraint::Length(1),           // Separator
            Constraint::Length(3),           // Hero stat
            Constraint::Length(1),           // Due / not due / refunded
            Constraint::Length(1),           // Counts
            Constraint::Length(1),           // Blank
            Constraint::Length(2),           // Liability split
            Constraint::Length(1),           // Blank
            Constraint::Length(1),           // Origins label
            Constraint::Length(origin_rows), // Origin bars
            Constraint::Fill(1),
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Keybindings
        ])
        .split(area);

        TabBar::new(Tab::Overview, self.theme).render(chunks[0], buf);
        render_separator(chunks[1], buf, self.theme);
        self.render_hero_stat(chunks[2], buf);
        self.render_sub_stats(chunks[3], buf);
        self.render_counts(chunks[4], buf);
        self.render_liability_split(chunks[6], buf);
        self.render_label("By origin", chunks[8], buf);
        self.render_origin_bars(chunks[9], buf);
        render_separator(chunks[11], buf, self.theme);
        render_keybindings(
            chunks[12],
            buf,
            &[("Tab", "Switch view"), ("?", "Help"), ("q", "Quit")],
            self.theme,
        );
    }
}

impl Overview<'_> {
    fn render_hero_stat(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(vec![
            Line::from(Span::styled(
                format_amount(self.data.totals.total_subscribed),
                Style::default()
                    .fg(self.theme.total())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "total subscribed as of {}",
                    self.data.reference_date.format("%Y-%m-%d")
                ),
                Style::default().fg(self.theme.muted()),
            )),
        ])
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    fn render_sub_stats(&self, area: Rect, buf: &mut Buffer) {
        let totals = &self.data.totals;
        Paragraph::new(Line::from(vec![
            Span::styled("Due: ", Style::default().fg(self.theme.muted())),
            Span::styled(
                format_amount(totals.due_not_refunded),
                Style::default().fg(self.theme.due()),
            ),
            Span::raw("   "),
            Span::styled("Not due: ", Style::default().fg(self.theme.muted())),
            Span::styled(
                format_amount(totals.not_due_total),
                Style::default().fg(self.theme.not_due()),
            ),
            Span::raw("   "),
            Span::styled("Refunded: ", Style::default().fg(self.theme.muted())),
            Span::styled(
                format_amount(totals.total_refunded),
                Style::default().fg(self.theme.amount()),
            ),
        ]))
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    fn render_counts(&self, area: Rect, buf: &mut Buffer) {
        let text = format!(
            "{} records · {} products · {} users",
            self.data.record_count, self.data.product_count, self.data.user_count
        );
        Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(self.theme.count()),
        )))
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    fn render_liability_split(&self, area: Rect, buf: &mut Buffer) {
        let totals = &self.data.totals;
        let due_pct = percent_of(totals.due_not_refunded, totals.total_subscribed);
        let filled = ((due_pct / 100.0) * BAR_WIDTH as f64 * 2.0).round() as usize;
        let filled = filled.min(BAR_WIDTH * 2);

        Paragraph::new(vec![
            Line::from(vec![
                Span::styled("█".repeat(filled), Style::default().fg(self.theme.due())),
                Span::styled(
                    "█".repeat(BAR_WIDTH * 2 - filled),
                    Style::default().fg(self.theme.not_due()),
                ),
            ]),
            Line::from(Span::styled(
                format!("{:.1}% due · {:.1}% not yet due", due_pct, 100.0 - due_pct),
                Style::default().fg(self.theme.muted()),
            )),
        ])
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    fn render_label(&self, label: &str, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Line::from(Span::styled(
            label,
            Style::default()
                .fg(self.theme.header())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    fn render_origin_bars(&self, area: Rect, buf: &mut Buffer) {
        // name + "  " + bar + "  " + total + "  " + count
        let line_width = ORIGIN_NAME_WIDTH + 2 + BAR_WIDTH + 2 + 16 + 2 + 10;
        let x_offset = area.width.saturating_sub(line_width as u16) / 2;
        let total = self.data.totals.total_subscribed;

        for (i, share) in self.data.origins.iter().enumerate() {
            let y = area.y + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let line = Line::from(vec![
                Span::styled(
                    format!("{:>width$}", share.origin.key(), width = ORIGIN_NAME_WIDTH),
                    Style::default().fg(self.theme.text()),
                ),
                Span::raw("  "),
                Span::styled(
                    share_bar(percent_of(share.total, total), BAR_WIDTH),
                    Style::default().fg(self.theme.not_due()),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("{:>16}", format_amount(share.total)),
                    Style::default().fg(self.theme.amount()),
                ),
                Span::styled(
                    format!("{:>10}", format!("{} rec", share.count)),
                    Style::default().fg(self.theme.muted()),
                ),
            ]);
            buf.set_line(area.x + x_offset, y, &line, area.width - x_offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Aggregator;
    use crate::types::NormalizedRecord;
    use chrono::TimeZone;

    fn record(origin: Origin, user: &str, amount: f64) -> NormalizedRecord {
        NormalizedRecord {
            origin,
            product: "P".into(),
            amount,
            user: user.into(),
            end_date_raw: None,
            end_date: None,
            start: None,
            daily_return: None,
            status: None,
            extra: None,
            address: None,
        }
    }

    fn data() -> OverviewData {
        let today = Utc.with_ymd_and_hms(2026, 2, 17, 0, 0, 0).unwrap();
        let report = Aggregator::new(today).aggregate(vec![
            record(Origin::Inj, "a", 100.0),
            record(Origin::UsdtFinance, "b", 50.0),
            record(Origin::Inj, "b", 25.0),
        ]);
        OverviewData::from_report(&report)
    }

    #[test]
    fn test_origin_shares() {
        let data = data();
        assert_eq!(data.origins.len(), 3);
        assert_eq!(data.origins[0].origin, Origin::Inj);
        assert_eq!(data.origins[0].count, 2);
        assert_eq!(data.origins[0].total, 125.0);
        assert_eq!(data.origins[1].count, 0);
        assert_eq!(data.origins[2].total, 50.0);
        assert_eq!(data.user_count, 2);
        assert_eq!(data.product_count, 1);
    }

    #[test]
    fn test_render_shows_total() {
        let data = data();
        let area = Rect::new(0, 0, 100, 24);
        let mut buf = Buffer::empty(area);
        Overview::new(&data, Theme::Dark).render(area, &mut buf);

        let screen: String = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(screen.contains("175.00"));
        assert!(screen.contains("[Overview]"));
        assert!(screen.contains("usdtFinanceData"));
    }
}
