use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the application title.
pub const ACCENT: &str = "◆ ◇ ◆";

/// Dashboard header rendering four lines:
///
/// 1. Application title with accents.
/// 2. A 60-column `=` separator.
/// 3. `[ N sources | updated dd/mm/YYYY HH:MM ]`; the stamp is omitted when
///    unknown.
/// 4. An empty line.
pub struct Header<'a> {
    pub source_count: usize,
    pub last_updated: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(source_count: usize, last_updated: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            source_count,
            last_updated,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);
        let sources = if self.source_count == 1 {
            "1 source".to_string()
        } else {
            format!("{} sources", self.source_count)
        };

        let mut info = vec![
            Span::styled("[ ", self.theme.label),
            Span::styled(sources, self.theme.value),
        ];
        if let Some(stamp) = self.last_updated {
            info.push(Span::styled(" | updated ", self.theme.label));
            info.push(Span::styled(stamp.to_string(), self.theme.value));
        }
        info.push(Span::styled(" ]", self.theme.label));

        vec![
            Line::from(vec![
                Span::styled(ACCENT, self.theme.header_accent),
                Span::styled(" INVOICING DASHBOARD ", self.theme.header),
                Span::styled(ACCENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(info),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
