use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::themes::Theme;

/// A bordered box with a caption and one big value.
#[derive(Debug, Clone)]
pub struct Tile {
    pub title: String,
    pub value: String,
    /// Style of the value text.
    pub style: Style,
}

impl Tile {
    pub fn new(title: impl Into<String>, value: impl Into<String>, style: Style) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            style,
        }
    }
}

/// Shorten `s` to at most `width` display columns, ending in `…` when cut.
pub fn fit_to_width(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Lay `tiles` out side by side in equal columns.
pub fn render_tile_row(frame: &mut Frame, area: Rect, tiles: &[Tile], theme: &Theme) {
    if tiles.is_empty() {
        return;
    }
    let constraints = vec![Constraint::Ratio(1, tiles.len() as u32); tiles.len()];
    let columns = Layout::horizontal(constraints).split(area);

    for (tile, column) in tiles.iter().zip(columns.iter()) {
        let inner_width = column.width.saturating_sub(2) as usize;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.tile_border)
            .title(Span::styled(
                format!(" {} ", fit_to_width(&tile.title, inner_width.saturating_sub(2))),
                theme.tile_title,
            ));
        let value = Paragraph::new(Line::from(Span::styled(
            fit_to_width(&tile.value, inner_width),
            tile.style,
        )))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(value, *column);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_fit_to_width_keeps_short_text() {
        assert_eq!(fit_to_width("Clients", 10), "Clients");
    }

    #[test]
    fn test_fit_to_width_truncates_with_ellipsis() {
        let out = fit_to_width("Invoices per contract", 10);
        assert_eq!(out, "Invoices …");
        assert_eq!(out.width(), 10);
    }

    #[test]
    fn test_fit_to_width_wide_chars() {
        // Each CJK char is two columns wide.
        let out = fit_to_width("請求書請求書", 5);
        assert!(out.width() <= 5, "got {out}");
        assert!(out.ends_with('…'));
    }

    #[test]
    fn test_fit_to_width_zero() {
        assert_eq!(fit_to_width("abc", 0), "");
    }

    #[test]
    fn test_render_tile_row_shows_values() {
        let backend = TestBackend::new(60, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let tiles = vec![
            Tile::new("Invoices", "1.234", theme.series_invoices),
            Tile::new("Clients", "56", theme.series_clients),
        ];

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_tile_row(frame, area, &tiles, &theme);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Invoices"));
        assert!(content.contains("1.234"));
        assert!(content.contains("56"));
    }

    #[test]
    fn test_render_empty_tile_row_does_not_panic() {
        let backend = TestBackend::new(20, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_tile_row(frame, area, &[], &theme);
            })
            .unwrap();
    }
}
