use ratatui::style::{Color, Modifier, Style};

use crate::metric::Metric;

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 are considered light.  If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Complete theme definition carrying all styles used by the dashboard.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Tiles ────────────────────────────────────────────────────────────────
    pub tile_border: Style,
    pub tile_title: Style,
    pub tile_value: Style,

    // ── Series colours ───────────────────────────────────────────────────────
    pub series_invoices: Style,
    pub series_contracts: Style,
    pub series_clients: Style,
    pub series_projects: Style,
    /// Unfilled portion of a bar.
    pub bar_empty: Style,
    pub bar_label: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_total: Style,

    // ── Sidebar ──────────────────────────────────────────────────────────────
    pub panel_focused: Style,
    pub panel_unfocused: Style,
    pub option_checked: Style,
    pub option_unchecked: Style,
    pub cursor: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Yellow),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            tile_border: Style::default().fg(Color::DarkGray),
            tile_title: Style::default().fg(Color::Gray),
            tile_value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            series_invoices: Style::default().fg(Color::Cyan),
            series_contracts: Style::default().fg(Color::Green),
            series_clients: Style::default().fg(Color::Magenta),
            series_projects: Style::default().fg(Color::Yellow),
            bar_empty: Style::default().fg(Color::DarkGray),
            bar_label: Style::default().fg(Color::Gray),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),

            panel_focused: Style::default().fg(Color::Cyan),
            panel_unfocused: Style::default().fg(Color::DarkGray),
            option_checked: Style::default().fg(Color::Green),
            option_unchecked: Style::default().fg(Color::Gray),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            bold: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            tile_border: Style::default().fg(Color::Gray),
            tile_title: Style::default().fg(Color::DarkGray),
            tile_value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            series_invoices: Style::default().fg(Color::Blue),
            series_contracts: Style::default().fg(Color::Green),
            series_clients: Style::default().fg(Color::Magenta),
            series_projects: Style::default().fg(Color::Red),
            bar_empty: Style::default().fg(Color::Gray),
            bar_label: Style::default().fg(Color::DarkGray),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_total: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),

            panel_focused: Style::default().fg(Color::Blue),
            panel_unfocused: Style::default().fg(Color::Gray),
            option_checked: Style::default().fg(Color::Green),
            option_unchecked: Style::default().fg(Color::DarkGray),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Classic theme using only the basic 8-colour ANSI palette, no bold.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            header_accent: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default().fg(Color::White),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            tile_border: Style::default().fg(Color::DarkGray),
            tile_title: Style::default().fg(Color::Gray),
            tile_value: Style::default().fg(Color::White),

            series_invoices: Style::default().fg(Color::Cyan),
            series_contracts: Style::default().fg(Color::Green),
            series_clients: Style::default().fg(Color::Magenta),
            series_projects: Style::default().fg(Color::Yellow),
            bar_empty: Style::default().fg(Color::DarkGray),
            bar_label: Style::default().fg(Color::White),

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default().fg(Color::Yellow),

            panel_focused: Style::default().fg(Color::Cyan),
            panel_unfocused: Style::default().fg(Color::DarkGray),
            option_checked: Style::default().fg(Color::Green),
            option_unchecked: Style::default().fg(Color::White),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Colour of the series for `metric` in bars and tiles.
    pub fn metric_style(&self, metric: Metric) -> Style {
        match metric {
            Metric::Invoices => self.series_invoices,
            Metric::Contracts => self.series_contracts,
            Metric::Clients => self.series_clients,
            Metric::Projects => self.series_projects,
        }
    }

    /// Border style for a sidebar panel.
    pub fn panel_style(&self, focused: bool) -> Style {
        if focused {
            self.panel_focused
        } else {
            self.panel_unfocused
        }
    }

    /// Style for a multiselect option.
    pub fn option_style(&self, checked: bool) -> Style {
        if checked {
            self.option_checked
        } else {
            self.option_unchecked
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
