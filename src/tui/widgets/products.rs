//! Products view widget - per-product rollup table

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use super::tabs::{Tab, TabBar};
use super::{
    content_area, percent_of, render_keybindings, render_separator, share_bar, truncate,
};
use crate::tui::theme::Theme;
use crate::types::{format_amount, ProductRollup};

/// Table width: Product(30) + Count(8) + Total(18) + Share(4 + 20)
const TABLE_WIDTH: u16 = 80;
const NAME_WIDTH: usize = 30;
const BAR_WIDTH: usize = 20;

pub struct ProductsView<'a> {
    products: &'a [ProductRollup],
    total: f64,
    scroll: usize,
    theme: Theme,
}

impl<'a> ProductsView<'a> {
    pub fn new(products: &'a [ProductRollup], total: f64, scroll: usize, theme: Theme) -> Self {
        Self {
            products,
            total,
            scroll,
            theme,
        }
    }

    /// Rows left for the table after tabs, separators, header and hints
    pub fn visible_rows(area_height: u16) -> usize {
        area_height.saturating_sub(5) as usize
    }

    /// Largest useful scroll offset
    pub fn max_scroll(len: usize, area_height: u16) -> usize {
        len.saturating_sub(Self::visible_rows(area_height))
    }
}

impl Widget for ProductsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = content_area(area);
        let chunks = Layout::vertical([
            Constraint::Length(1), // Tabs
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Header
            Constraint::Fill(1),   // Rows
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Keybindings
        ])
        .split(area);

        TabBar::new(Tab::Products, self.theme).render(chunks[0], buf);
        render_separator(chunks[1], buf, self.theme);
        self.render_header(chunks[2], buf);
        self.render_rows(chunks[3], buf);
        render_separator(chunks[4], buf, self.theme);
        render_keybindings(
            chunks[5],
            buf,
            &[("j/k", "Scroll"), ("Tab", "Switch view"), ("q", "Quit")],
            self.theme,
        );
    }
}

impl ProductsView<'_> {
    fn table_x(&self, area: Rect) -> u16 {
        area.x + area.width.saturating_sub(TABLE_WIDTH) / 2
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::styled(format!("{:<width$}", "Product", width = NAME_WIDTH), style),
            Span::styled(format!("{:>8}", "Count"), style),
            Span::styled(format!("{:>18}", "Total"), style),
            Span::styled(format!("    {:<20}", "Share"), style),
        ]);
        buf.set_line(self.table_x(area), area.y, &line, area.width);
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer) {
        if self.products.is_empty() {
            buf.set_string(
                self.table_x(area),
                area.y,
                "No products",
                Style::default().fg(self.theme.muted()),
            );
            return;
        }

        let x = self.table_x(area);
        for (i, product) in self
            .products
            .iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .enumerate()
        {
            let pct = percent_of(product.total, self.total);
            let line = Line::from(vec![
                Span::styled(
                    format!("{:<width$}", truncate(&product.product, NAME_WIDTH - 1), width = NAME_WIDTH),
                    Style::default().fg(self.theme.text()),
                ),
                Span::styled(
                    format!("{:>8}", product.count),
                    Style::default().fg(self.theme.count()),
                ),
                Span::styled(
                    format!("{:>18}", format_amount(product.total)),
                    Style::default().fg(self.theme.amount()),
                ),
                Span::raw("    "),
                Span::styled(
                    share_bar(pct, BAR_WIDTH),
                    Style::default().fg(self.theme.not_due()),
                ),
                Span::styled(
                    format!(" {:>5.1}%", pct),
                    Style::default().fg(self.theme.muted()),
                ),
            ]);
            buf.set_line(x, area.y + i as u16, &line, area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rollup(name: &str, count: u64, total: f64) -> ProductRollup {
        ProductRollup {
            product: name.into(),
            count,
            total,
        }
    }

    fn screen(buf: &Buffer, area: Rect) -> Vec<String> {
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_max_scroll() {
        assert_eq!(ProductsView::max_scroll(3, 20), 0);
        assert_eq!(ProductsView::max_scroll(30, 15), 20);
    }

    #[test]
    fn test_render_rows_in_order() {
        let products = vec![rollup("INJ质押30天", 2, 1300.0), rollup("USDT活期", 2, 99.5)];
        let area = Rect::new(0, 0, 100, 10);
        let mut buf = Buffer::empty(area);
        ProductsView::new(&products, 1399.5, 0, Theme::Dark).render(area, &mut buf);

        let lines = screen(&buf, area);
        assert!(lines[0].contains("[Products]"));
        assert!(lines[2].contains("Product"));
        assert!(lines[3].contains("1,300.00"));
        assert!(lines[4].contains("USDT"));
    }

    #[test]
    fn test_render_scrolled() {
        let products = vec![rollup("A", 1, 1.0), rollup("B", 1, 2.0)];
        let area = Rect::new(0, 0, 100, 10);
        let mut buf = Buffer::empty(area);
        ProductsView::new(&products, 3.0, 1, Theme::Dark).render(area, &mut buf);
        assert!(screen(&buf, area)[3].contains("2.00"));
    }
}
