//! Monthly aggregate table for the dashboard TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per month plus
//! a highlighted row of the distinct counts over the whole selection.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use dashboard_core::formatting::{format_count, Locale};
use dashboard_core::models::{DistinctCounts, MonthlyRow};

use crate::metric::Metric;
use crate::themes::Theme;

/// Cell text for one table row: month label followed by the four counts.
pub fn row_cells(label: &str, counts: &DistinctCounts, locale: Locale) -> Vec<String> {
    std::iter::once(label.to_string())
        .chain(
            Metric::ALL
                .iter()
                .map(|m| format_count(m.count(counts), locale)),
        )
        .collect()
}

/// Render the monthly table into `area`.
///
/// The bottom row holds `totals`.  It is a distinct count over the whole
/// selection, so it can be smaller than the column sum.
pub fn render_table_view(
    frame: &mut Frame,
    area: Rect,
    rows: &[MonthlyRow],
    totals: &DistinctCounts,
    locale: Locale,
    theme: &Theme,
) {
    let header_cells = std::iter::once("Month")
        .chain(Metric::ALL.iter().map(|m| m.label()))
        .map(|h| Cell::from(h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let mut all_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(row_cells(&row.month.to_string(), &row.counts, locale)).style(style)
        })
        .collect();

    all_rows.push(Row::new(row_cells("Total", totals, locale)).style(theme.table_total));

    let widths = [
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Monthly "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Placeholder shown when the selection matches no record.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No records match the current selection", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Press 'a' to select every option, or 'q' to exit",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Monthly "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
