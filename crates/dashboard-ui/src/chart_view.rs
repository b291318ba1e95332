//! Per-month bar charts, one panel per count column.

use dashboard_core::formatting::{format_count, Locale};
use dashboard_core::models::MonthlyRow;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::components::bar::{bar_width_for, CountBar};
use crate::metric::Metric;
use crate::themes::Theme;

/// Lines of one metric's chart, newest months last.
///
/// When `max_lines` is smaller than the table only the most recent months
/// are kept.
pub fn chart_lines<'a>(
    metric: Metric,
    monthly: &[MonthlyRow],
    inner_width: u16,
    max_lines: usize,
    locale: Locale,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    if monthly.is_empty() {
        return vec![Line::from(Span::styled("No data", theme.dim))];
    }

    let max = monthly
        .iter()
        .map(|r| metric.count(&r.counts))
        .max()
        .unwrap_or(0);
    let widest = format_count(max, locale);
    let bar_width = bar_width_for(inner_width, "YYYY-MM", &widest);

    let skip = monthly.len().saturating_sub(max_lines);
    monthly[skip..]
        .iter()
        .map(|row| {
            let value = metric.count(&row.counts);
            let mut line = CountBar::new(
                row.month.to_string(),
                value,
                max,
                theme.metric_style(metric),
                locale,
                theme,
            )
            .with_width(bar_width)
            .to_line();
            // Right-align the value under the widest one.
            let pad = widest
                .chars()
                .count()
                .saturating_sub(format_count(value, locale).chars().count());
            if pad > 0 {
                line.spans.insert(3, Span::raw(" ".repeat(pad)));
            }
            line
        })
        .collect()
}

/// Render the four per-month charts in a 2×2 grid.
pub fn render_charts(
    frame: &mut Frame,
    area: Rect,
    monthly: &[MonthlyRow],
    locale: Locale,
    theme: &Theme,
) {
    let rows = Layout::vertical([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)]).split(area);
    let mut cells = Vec::with_capacity(4);
    for row in rows.iter() {
        let cols =
            Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)]).split(*row);
        cells.extend(cols.iter().copied());
    }

    for (metric, cell) in Metric::ALL.iter().zip(cells) {
        let inner_width = cell.width.saturating_sub(2);
        let inner_height = cell.height.saturating_sub(2) as usize;
        let lines = chart_lines(*metric, monthly, inner_width, inner_height, locale, theme);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.tile_border)
            .title(Span::styled(
                format!(" {} per month ", metric.label()),
                theme.metric_style(*metric),
            ));
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), cell);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
