use dashboard_core::formatting::{format_count, Locale};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::themes::Theme;

/// Visual appearance of a horizontal bar.
#[derive(Debug, Clone, Copy)]
pub struct BarConfig {
    /// Columns available for the bar itself (label and value excluded).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: 30,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

// ── CountBar ──────────────────────────────────────────────────────────────────

/// One labelled bar of a count, scaled against the largest value in its
/// series.
///
/// Renders as `label █████░░░░ value`.
pub struct CountBar<'a> {
    pub label: String,
    pub value: usize,
    /// Largest value in the series; a bar of this value is full width.
    pub max: usize,
    /// Fill colour.
    pub style: Style,
    pub locale: Locale,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> CountBar<'a> {
    pub fn new(
        label: impl Into<String>,
        value: usize,
        max: usize,
        style: Style,
        locale: Locale,
        theme: &'a Theme,
    ) -> Self {
        Self {
            label: label.into(),
            value,
            max,
            style,
            locale,
            theme,
            config: BarConfig::default(),
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.config.width = width;
        self
    }

    /// Number of filled cells.  Any non-zero value gets at least one.
    pub fn filled_cells(&self) -> u16 {
        if self.max == 0 || self.value == 0 {
            return 0;
        }
        let ratio = (self.value as f64 / self.max as f64).min(1.0);
        ((ratio * self.config.width as f64).round() as u16).clamp(1, self.config.width)
    }

    pub fn to_line(&self) -> Line<'a> {
        let filled = self.filled_cells();
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        Line::from(vec![
            Span::styled(format!("{} ", self.label), self.theme.bar_label),
            Span::styled(filled_str, self.style),
            Span::styled(empty_str, self.theme.bar_empty),
            Span::styled(
                format!(" {}", format_count(self.value, self.locale)),
                self.theme.value,
            ),
        ])
    }
}

/// Columns a bar may use in a panel `panel_width` wide, after reserving room
/// for the label and the widest formatted value.
pub fn bar_width_for(panel_width: u16, label: &str, widest_value: &str) -> u16 {
    let reserved = label.width() + 1 + widest_value.width() + 1;
    panel_width.saturating_sub(reserved as u16).max(1)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn bar(value: usize, max: usize, theme: &Theme) -> CountBar<'_> {
        CountBar::new(
            "2024-01",
            value,
            max,
            Style::default().fg(Color::Cyan),
            Locale::PtBr,
            theme,
        )
        .with_width(10)
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_full_bar_at_max() {
        let theme = Theme::dark();
        assert_eq!(bar(40, 40, &theme).filled_cells(), 10);
    }

    #[test]
    fn test_half_bar() {
        let theme = Theme::dark();
        assert_eq!(bar(20, 40, &theme).filled_cells(), 5);
    }

    #[test]
    fn test_small_nonzero_value_shows_one_cell() {
        let theme = Theme::dark();
        assert_eq!(bar(1, 1000, &theme).filled_cells(), 1);
    }

    #[test]
    fn test_zero_value_and_zero_max() {
        let theme = Theme::dark();
        assert_eq!(bar(0, 40, &theme).filled_cells(), 0);
        assert_eq!(bar(0, 0, &theme).filled_cells(), 0);
    }

    #[test]
    fn test_line_layout() {
        let theme = Theme::dark();
        let line = bar(1500, 3000, &theme).to_line();
        assert_eq!(line.spans.len(), 4);
        let s = text(&line);
        assert!(s.starts_with("2024-01 "));
        assert!(s.ends_with(" 1.500"), "got: {s}");
        assert_eq!(s.chars().filter(|&c| c == '█').count(), 5);
        assert_eq!(s.chars().filter(|&c| c == '░').count(), 5);
    }

    #[test]
    fn test_bar_width_for_reserves_label_and_value() {
        assert_eq!(bar_width_for(40, "2024-01", "1.500"), 40 - 7 - 1 - 5 - 1);
        assert_eq!(bar_width_for(5, "2024-01", "1.500"), 1);
    }
}
