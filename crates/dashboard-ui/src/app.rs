//! Main application state and TUI event loop for the invoicing dashboard.
//!
//! [`App`] owns the theme, the last loaded data set and the two filter
//! lists.  Every change to a filter recomputes the report shown in the
//! tiles, charts and table.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{error, info};

use dashboard_core::error::Result;
use dashboard_core::formatting::{format_count, format_number, format_ratio, percentage, Locale};
use dashboard_core::models::{FilterSelection, MonthBucket};
use dashboard_data::analysis::DashboardReport;
use dashboard_runtime::fetcher::SourceFetcher;
use dashboard_runtime::session::{DashboardSession, LoadedData};

use crate::chart_view;
use crate::components::header::Header;
use crate::components::multiselect::SelectionList;
use crate::components::tiles::{render_tile_row, Tile};
use crate::metric::Metric;
use crate::table_view;
use crate::themes::Theme;

const SIDEBAR_WIDTH: u16 = 30;

// ── Focus / Action ────────────────────────────────────────────────────────────

/// Which filter list receives cursor keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Divisions,
    Months,
}

/// What the event loop must do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
    /// Reload the sources; `force` bypasses the download cache.
    Reload { force: bool },
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub theme: Theme,
    pub locale: Locale,
    pub focus: Focus,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    data: Option<LoadedData>,
    report: Option<DashboardReport>,
    load_error: Option<String>,
    /// Selection from the command line, applied to the first data set only.
    pending_selection: Option<FilterSelection>,
    /// Command-line values still in force for a list the user has not
    /// edited yet.  They may name values the data does not contain.
    division_seed: Option<BTreeSet<String>>,
    month_seed: Option<BTreeSet<MonthBucket>>,
    divisions: SelectionList<String>,
    months: SelectionList<MonthBucket>,
}

/// Checked items, or the empty set when every item is checked so that
/// records without a value in this dimension still pass.
fn dimension<T: Clone + Ord + Display>(list: &SelectionList<T>) -> BTreeSet<T> {
    if list.checked_count() == list.items().len() {
        BTreeSet::new()
    } else {
        list.selected()
    }
}

impl App {
    pub fn new(theme_name: &str, locale: Locale, initial_selection: FilterSelection) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            locale,
            focus: Focus::Divisions,
            should_quit: false,
            data: None,
            report: None,
            load_error: None,
            pending_selection: Some(initial_selection),
            division_seed: None,
            month_seed: None,
            divisions: SelectionList::new("Divisions", Vec::new()),
            months: SelectionList::new("Months", Vec::new()),
        }
    }

    pub fn data(&self) -> Option<&LoadedData> {
        self.data.as_ref()
    }

    pub fn report(&self) -> Option<&DashboardReport> {
        self.report.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn divisions(&self) -> &SelectionList<String> {
        &self.divisions
    }

    pub fn months(&self) -> &SelectionList<MonthBucket> {
        &self.months
    }

    /// The selection the two lists currently describe.
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            divisions: self
                .division_seed
                .clone()
                .unwrap_or_else(|| dimension(&self.divisions)),
            months: self
                .month_seed
                .clone()
                .unwrap_or_else(|| dimension(&self.months)),
        }
    }

    /// Store the outcome of a load.  A failed reload keeps the previous
    /// data on screen and reports the error in the footer.
    pub fn apply_load(&mut self, result: Result<LoadedData>) {
        match result {
            Ok(data) => self.apply_data(data),
            Err(e) => {
                error!("Failed to load dashboard data: {}", e);
                self.load_error = Some(e.to_string());
            }
        }
    }

    pub fn apply_data(&mut self, data: LoadedData) {
        self.divisions.set_items(data.options.divisions.clone());
        self.months.set_items(data.options.months.clone());
        if let Some(initial) = self.pending_selection.take() {
            self.divisions.check_only(&initial.divisions);
            self.months.check_only(&initial.months);
            self.division_seed = Some(initial.divisions).filter(|s| !s.is_empty());
            self.month_seed = Some(initial.months).filter(|s| !s.is_empty());
        }
        self.data = Some(data);
        self.load_error = None;
        self.recompute();
    }

    fn recompute(&mut self) {
        let selection = self.selection();
        self.report = self.data.as_ref().map(|d| d.report(&selection));
    }

    fn with_focused(&mut self, f: impl FnOnce(&mut dyn FocusedList)) {
        match self.focus {
            Focus::Divisions => f(&mut self.divisions),
            Focus::Months => f(&mut self.months),
        }
    }

    /// Change the checks of the focused list.  From then on that list alone
    /// decides its dimension.
    fn edit_focused(&mut self, f: impl FnOnce(&mut dyn FocusedList)) {
        match self.focus {
            Focus::Divisions => self.division_seed = None,
            Focus::Months => self.month_seed = None,
        }
        self.with_focused(f);
        self.recompute();
    }

    /// Apply one key press to the state.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                Action::Quit
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                Action::Quit
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.focus = match self.focus {
                    Focus::Divisions => Focus::Months,
                    Focus::Months => Focus::Divisions,
                };
                Action::Continue
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.with_focused(|l| l.up());
                Action::Continue
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.with_focused(|l| l.down());
                Action::Continue
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.edit_focused(|l| l.flip());
                Action::Continue
            }
            KeyCode::Char('a') => {
                self.edit_focused(|l| l.all());
                Action::Continue
            }
            KeyCode::Char('n') => {
                self.edit_focused(|l| l.none());
                Action::Continue
            }
            KeyCode::Char('r') => Action::Reload { force: false },
            KeyCode::Char('R') => Action::Reload { force: true },
            _ => Action::Continue,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Load the sources through `session` and run the dashboard until the
    /// user quits.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout.  Reloads are
    /// awaited in place; the footer shows a notice while they run.
    pub async fn run<F: SourceFetcher>(mut self, mut session: DashboardSession<F>) -> io::Result<()> {
        self.apply_load(session.load(false).await);

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame, None)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => break Err(e),
            }
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(e) => break Err(e),
            };

            match self.handle_key(key) {
                Action::Quit => break Ok(()),
                Action::Reload { force } => {
                    let notice = if force {
                        "Downloading sources..."
                    } else {
                        "Reloading sources..."
                    };
                    if let Err(e) = terminal.draw(|frame| self.render(frame, Some(notice))) {
                        break Err(e);
                    }
                    info!("Reload requested (force = {})", force);
                    self.apply_load(session.load(force).await);
                }
                Action::Continue => {}
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current state.  `notice` replaces the footer text.
    pub fn render(&self, frame: &mut Frame, notice: Option<&str>) {
        let area = frame.area();
        let (Some(data), Some(report)) = (&self.data, &self.report) else {
            self.render_without_data(frame, area);
            return;
        };

        let [header_area, counts_area, ratios_area, averages_area, body_area, footer_area] =
            Layout::vertical([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .areas(area);

        let header = Header::new(data.stats.sources, data.last_updated.as_deref(), &self.theme);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);

        render_tile_row(frame, counts_area, &self.count_tiles(report), &self.theme);
        render_tile_row(frame, ratios_area, &self.ratio_tiles(report), &self.theme);
        render_tile_row(frame, averages_area, &self.average_tiles(report), &self.theme);

        let [sidebar_area, main_area] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
                .areas(body_area);
        let [divisions_area, months_area] =
            Layout::vertical([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)]).areas(sidebar_area);
        self.divisions.render(
            frame,
            divisions_area,
            self.focus == Focus::Divisions,
            &self.theme,
        );
        self.months
            .render(frame, months_area, self.focus == Focus::Months, &self.theme);

        if report.is_empty() {
            table_view::render_no_data(frame, main_area, &self.theme);
        } else {
            let table_height = (report.monthly.len() as u16).saturating_add(4);
            let [charts_area, table_area] = Layout::vertical([
                Constraint::Min(6),
                Constraint::Max(table_height),
            ])
            .areas(main_area);
            chart_view::render_charts(frame, charts_area, &report.monthly, self.locale, &self.theme);
            table_view::render_table_view(
                frame,
                table_area,
                &report.monthly,
                &report.totals,
                self.locale,
                &self.theme,
            );
        }

        frame.render_widget(Paragraph::new(self.footer_line(notice)), footer_area);
    }

    fn count_tiles(&self, report: &DashboardReport) -> Vec<Tile> {
        Metric::ALL
            .iter()
            .map(|m| {
                Tile::new(
                    m.label(),
                    format_count(m.count(&report.totals), self.locale),
                    self.theme.metric_style(*m),
                )
            })
            .collect()
    }

    fn ratio_tiles(&self, report: &DashboardReport) -> Vec<Tile> {
        let meta = &report.metadata;
        vec![
            Tile::new(
                "Invoices per client",
                format_ratio(report.ratios.invoices_per_client, self.locale),
                self.theme.tile_value,
            ),
            Tile::new(
                "Invoices per contract",
                format_ratio(report.ratios.invoices_per_contract, self.locale),
                self.theme.tile_value,
            ),
            Tile::new(
                "Clients per project",
                format_ratio(report.ratios.clients_per_project, self.locale),
                self.theme.tile_value,
            ),
            Tile::new(
                "Records",
                format!(
                    "{} / {} ({}%)",
                    format_count(meta.records_filtered, self.locale),
                    format_count(meta.records_total, self.locale),
                    format_number(
                        percentage(meta.records_filtered as f64, meta.records_total as f64, 1),
                        1,
                        self.locale
                    )
                ),
                self.theme.value,
            ),
        ]
    }

    fn average_tiles(&self, report: &DashboardReport) -> Vec<Tile> {
        Metric::ALL
            .iter()
            .map(|m| {
                Tile::new(
                    format!("{} / month", m.label()),
                    format_ratio(m.average(&report.monthly_averages), self.locale),
                    self.theme.metric_style(*m),
                )
            })
            .collect()
    }

    fn footer_line(&self, notice: Option<&str>) -> Line<'_> {
        if let Some(notice) = notice {
            return Line::from(Span::styled(notice.to_string(), self.theme.info));
        }
        if let Some(err) = &self.load_error {
            return Line::from(Span::styled(format!("Reload failed: {err}"), self.theme.error));
        }
        Line::from(Span::styled(
            "Tab focus  ↑/↓ move  Space toggle  a all  n none  r reload  R download  q quit",
            self.theme.dim,
        ))
    }

    fn render_without_data(&self, frame: &mut Frame, area: Rect) {
        let lines = match &self.load_error {
            Some(err) => vec![
                Line::from(Span::styled("Could not load the spreadsheets", self.theme.error)),
                Line::from(""),
                Line::from(Span::styled(err.clone(), self.theme.text)),
                Line::from(""),
                Line::from(Span::styled(
                    "Press 'R' to retry or 'q' to exit",
                    self.theme.dim,
                )),
            ],
            None => vec![Line::from(Span::styled("Loading...", self.theme.info))],
        };
        frame.render_widget(
            Paragraph::new(Text::from(lines))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(self.theme.panel_unfocused)
                        .title(" Invoicing dashboard "),
                ),
            area,
        );
    }
}

/// Cursor and check operations shared by both filter lists.
trait FocusedList {
    fn up(&mut self);
    fn down(&mut self);
    fn flip(&mut self);
    fn all(&mut self);
    fn none(&mut self);
}

impl<T: Clone + Ord + Display> FocusedList for SelectionList<T> {
    fn up(&mut self) {
        self.move_up();
    }

    fn down(&mut self) {
        self.move_down();
    }

    fn flip(&mut self) {
        self.toggle();
    }

    fn all(&mut self) {
        self.select_all();
    }

    fn none(&mut self) {
        self.clear();
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
