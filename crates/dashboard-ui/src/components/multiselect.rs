use std::collections::BTreeSet;
use std::fmt::Display;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::themes::Theme;

/// Checkbox list with a cursor, used for the division and month filters.
///
/// Items start checked.  An empty check-set places no restriction on the
/// filter, which the panel title points out.
#[derive(Debug, Clone)]
pub struct SelectionList<T> {
    title: String,
    items: Vec<T>,
    checked: Vec<bool>,
    cursor: usize,
}

impl<T: Clone + Ord + Display> SelectionList<T> {
    pub fn new(title: impl Into<String>, items: Vec<T>) -> Self {
        let checked = vec![true; items.len()];
        Self {
            title: title.into(),
            items,
            checked,
            cursor: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.get(index).copied().unwrap_or(false)
    }

    pub fn checked_count(&self) -> usize {
        self.checked.iter().filter(|c| **c).count()
    }

    /// Checked items.
    pub fn selected(&self) -> BTreeSet<T> {
        self.items
            .iter()
            .zip(&self.checked)
            .filter(|(_, c)| **c)
            .map(|(item, _)| item.clone())
            .collect()
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    /// Flip the item under the cursor.
    pub fn toggle(&mut self) {
        if let Some(c) = self.checked.get_mut(self.cursor) {
            *c = !*c;
        }
    }

    pub fn select_all(&mut self) {
        self.checked.iter_mut().for_each(|c| *c = true);
    }

    pub fn clear(&mut self) {
        self.checked.iter_mut().for_each(|c| *c = false);
    }

    /// Check exactly the items in `wanted`.  An empty `wanted` checks all.
    pub fn check_only(&mut self, wanted: &BTreeSet<T>) {
        if wanted.is_empty() {
            self.select_all();
            return;
        }
        for (item, c) in self.items.iter().zip(self.checked.iter_mut()) {
            *c = wanted.contains(item);
        }
    }

    /// Replace the option list, keeping the check state of items that are
    /// still present.  New items start checked.
    pub fn set_items(&mut self, items: Vec<T>) {
        let previously_unchecked: BTreeSet<T> = self
            .items
            .iter()
            .zip(&self.checked)
            .filter(|(_, c)| !**c)
            .map(|(item, _)| item.clone())
            .collect();
        self.checked = items
            .iter()
            .map(|item| !previously_unchecked.contains(item))
            .collect();
        self.items = items;
        self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let list_items: Vec<ListItem> = self
            .items
            .iter()
            .zip(&self.checked)
            .map(|(item, checked)| {
                let mark = if *checked { "[x] " } else { "[ ] " };
                ListItem::new(Line::from(vec![
                    Span::styled(mark, theme.option_style(*checked)),
                    Span::styled(item.to_string(), theme.text),
                ]))
            })
            .collect();

        let hint = if self.checked_count() == 0 { " (none = all)" } else { "" };
        let title = format!(
            " {} {}/{}{} ",
            self.title,
            self.checked_count(),
            self.items.len(),
            hint
        );

        let mut list = List::new(list_items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.panel_style(focused))
                .title(title),
        );
        if focused {
            list = list.highlight_style(theme.cursor);
        }

        let mut state = ListState::default();
        if !self.items.is_empty() {
            state.select(Some(self.cursor));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn list() -> SelectionList<String> {
        SelectionList::new(
            "Divisions",
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
        )
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_starts_all_checked() {
        let l = list();
        assert_eq!(l.checked_count(), 3);
        assert_eq!(l.selected(), set(&["A", "B", "C"]));
    }

    #[test]
    fn test_cursor_bounds() {
        let mut l = list();
        l.move_up();
        assert_eq!(l.cursor(), 0);
        l.move_down();
        l.move_down();
        l.move_down();
        assert_eq!(l.cursor(), 2);
    }

    #[test]
    fn test_toggle_under_cursor() {
        let mut l = list();
        l.move_down();
        l.toggle();
        assert!(!l.is_checked(1));
        assert_eq!(l.selected(), set(&["A", "C"]));
        l.toggle();
        assert!(l.is_checked(1));
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut l = list();
        l.clear();
        assert!(l.selected().is_empty());
        l.select_all();
        assert_eq!(l.checked_count(), 3);
    }

    #[test]
    fn test_check_only() {
        let mut l = list();
        l.check_only(&set(&["B"]));
        assert_eq!(l.selected(), set(&["B"]));
        l.check_only(&BTreeSet::new());
        assert_eq!(l.checked_count(), 3);
    }

    #[test]
    fn test_set_items_keeps_unchecked_state() {
        let mut l = list();
        l.move_down();
        l.move_down();
        l.toggle(); // uncheck C
        l.set_items(vec!["A".to_string(), "C".to_string(), "D".to_string()]);
        assert_eq!(l.selected(), set(&["A", "D"]));
        assert_eq!(l.cursor(), 2);

        l.set_items(Vec::new());
        assert_eq!(l.cursor(), 0);
        assert!(l.selected().is_empty());
    }

    #[test]
    fn test_toggle_on_empty_list_is_noop() {
        let mut l: SelectionList<String> = SelectionList::new("Months", Vec::new());
        l.toggle();
        l.move_down();
        assert_eq!(l.cursor(), 0);
    }

    #[test]
    fn test_render_shows_checkboxes() {
        let backend = TestBackend::new(30, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let mut l = list();
        l.toggle();

        terminal
            .draw(|frame| {
                let area = frame.area();
                l.render(frame, area, true, &theme);
            })
            .unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("[ ] A"));
        assert!(content.contains("[x] B"));
        assert!(content.contains("Divisions 2/3"));
    }
}
