//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel with the start and end dates, and renders
//! the goods and services panels side by side. Every date change dispatches a
//! [`DATE_RANGE_CHANGED`] event and redraws with the returned chart.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline;
use crate::config::Config;
use crate::data::BeaClient;
use crate::domain::{ChartSpec, DateBounds, DateRange, Panel};
use crate::error::{AppError, EXIT_DATA};
use crate::render::TRACE_COLORS;
use crate::ui::{DATE_RANGE_CHANGED, EventHandlers, date_range_handlers};

mod plotters_chart;

use plotters_chart::PanelChart;

/// Start the TUI.
///
/// The first fetch happens before the terminal is taken over so a missing key
/// or an unreachable API is reported on a normal screen.
pub fn run(config: Config) -> Result<(), AppError> {
    let (loaded, bounds) = {
        let client = BeaClient::new(&config.bea);
        pipeline::bootstrap(&client, &config.tables)?
    };
    let chart = loaded.chart(&bounds.default_range())?;
    let mut app = App::new(date_range_handlers(&config), bounds, Some(chart));

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_DATA, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::new(EXIT_DATA, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(
                EXIT_DATA,
                format!("Failed to enter alternate screen: {e}"),
            ));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

const FIELD_START: usize = 0;
const FIELD_END: usize = 1;

struct App {
    handlers: EventHandlers,
    bounds: DateBounds,
    range: DateRange,
    /// Text being typed into the selected field while `editing`.
    input: String,
    selected_field: usize,
    editing: bool,
    status: String,
    chart: Option<ChartSpec>,
}

impl App {
    fn new(handlers: EventHandlers, bounds: DateBounds, chart: Option<ChartSpec>) -> Self {
        Self {
            handlers,
            bounds,
            range: bounds.default_range(),
            input: String::new(),
            selected_field: FIELD_START,
            editing: false,
            status: format!("Data available {} to {}.", bounds.min, bounds.max),
            chart,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_DATA, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_DATA, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read()
                .map_err(|e| AppError::new(EXIT_DATA, format!("Event read error: {e}")))?
            {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => self.selected_field = FIELD_START,
            KeyCode::Down => self.selected_field = FIELD_END,
            KeyCode::Enter => {
                self.editing = true;
                self.input = self
                    .selected_value()
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                self.status =
                    "Editing date (YYYY-MM-DD, empty clears). Enter to apply, Esc to cancel."
                        .to_string();
            }
            KeyCode::Char('c') => {
                self.range = DateRange::unbounded();
                self.refresh();
            }
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                self.apply_input();
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.input.push(c);
                }
            }
            _ => {}
        }
    }

    fn selected_value(&self) -> Option<NaiveDate> {
        match self.selected_field {
            FIELD_START => self.range.start,
            _ => self.range.end,
        }
    }

    fn apply_input(&mut self) {
        let trimmed = self.input.trim();
        let value = if trimmed.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                Ok(date) => Some(self.bounds.clamp(date)),
                Err(e) => {
                    self.status = format!("Invalid date '{trimmed}': {e}");
                    return;
                }
            }
        };

        match self.selected_field {
            FIELD_START => self.range.start = value,
            _ => self.range.end = value,
        }
        self.refresh();
    }

    /// Dispatch the current range; on failure the previous chart stays up.
    fn refresh(&mut self) {
        match self.handlers.dispatch(DATE_RANGE_CHANGED, self.range) {
            Ok(chart) => {
                let n = chart.goods.points.len();
                self.chart = Some(chart);
                self.status = format!("Showing {n} quarters ({}).", self.range);
            }
            Err(err) => {
                self.status = format!("Update failed, keeping previous chart: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(5),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_panels(frame, chunks[1]);
        self.draw_settings(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = self
            .chart
            .as_ref()
            .map(|c| c.title.as_str())
            .unwrap_or("-");
        let lines = vec![
            Line::from(vec![
                Span::styled("nipa", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" | {title}")),
            ]),
            Line::from(Span::styled(
                format!(
                    "available: {} to {} | range: {}",
                    self.bounds.min, self.bounds.max, self.range
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_panels(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let Some(chart) = &self.chart else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        for ((panel, rect), trace) in chart.panels().into_iter().zip(chunks.iter()).zip(TRACE_COLORS) {
            draw_panel_block(frame, *rect, panel, trace);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let shown = |field: usize, value: Option<NaiveDate>| {
            if self.editing && self.selected_field == field {
                format!("{}_", self.input)
            } else {
                value.map(|d| d.to_string()).unwrap_or_else(|| "(none)".to_string())
            }
        };

        let items = vec![
            ListItem::new(format!("Start: {}", shown(FIELD_START, self.range.start))),
            ListItem::new(format!("End:   {}", shown(FIELD_END, self.range.end))),
        ];

        let highlight = if self.editing {
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Black).bg(Color::White)
        };
        let list = List::new(items)
            .block(Block::default().title("Dates").borders(Borders::ALL))
            .highlight_style(highlight)
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  Enter edit  c clear  r refresh  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_panel_block(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    panel: &Panel,
    trace: plotters::style::RGBColor,
) {
    let title = format!("{} ({} vs {})", panel.title, panel.y_title, panel.x_title);
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);
    frame.render_widget(PanelChart { panel, trace }, inner);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::app::pipeline::testing::sample_table;
    use crate::chart::ChartBuilder;
    use crate::config::TableNames;
    use crate::error::DataError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bounds() -> DateBounds {
        DateBounds::new(date(2008, 1, 1), date(2012, 10, 1))
    }

    fn ok_handlers(calls: Arc<AtomicUsize>) -> EventHandlers {
        let mut handlers = EventHandlers::new();
        handlers.on(DATE_RANGE_CHANGED, move |range| {
            calls.fetch_add(1, Ordering::SeqCst);
            ChartBuilder::new(&TableNames::default()).build(
                &sample_table(20, 100.0),
                &sample_table(20, 80.0),
                &range,
            )
        });
        handlers
    }

    fn failing_handlers() -> EventHandlers {
        let mut handlers = EventHandlers::new();
        handlers.on(DATE_RANGE_CHANGED, |_| {
            Err(DataError::Fetch {
                table: "T20303".to_string(),
                message: "offline".to_string(),
            })
        });
        handlers
    }

    fn type_date(app: &mut App, text: &str) {
        app.handle_key(KeyCode::Enter);
        for _ in 0..16 {
            app.handle_key(KeyCode::Backspace);
        }
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
    }

    #[test]
    fn starts_on_default_range() {
        let app = App::new(ok_handlers(Arc::default()), bounds(), None);
        assert_eq!(app.range, DateRange::between(date(2010, 1, 1), date(2012, 10, 1)));
    }

    #[test]
    fn editing_start_filters_chart() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut app = App::new(ok_handlers(calls.clone()), bounds(), None);

        type_date(&mut app, "2011-01-01");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.range.start, Some(date(2011, 1, 1)));
        // 2011Q1..2012Q4 inclusive
        let chart = app.chart.as_ref().unwrap();
        assert_eq!(chart.goods.points.len(), 8);
    }

    #[test]
    fn out_of_bounds_date_is_clamped() {
        let mut app = App::new(ok_handlers(Arc::default()), bounds(), None);
        app.handle_key(KeyCode::Down);
        type_date(&mut app, "2030-01-01");
        assert_eq!(app.range.end, Some(date(2012, 10, 1)));
    }

    #[test]
    fn invalid_date_does_not_dispatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut app = App::new(ok_handlers(calls.clone()), bounds(), None);
        type_date(&mut app, "2011-13-01");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(app.status.starts_with("Invalid date"));
    }

    #[test]
    fn escape_cancels_edit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut app = App::new(ok_handlers(calls.clone()), bounds(), None);
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('1'));
        app.handle_key(KeyCode::Esc);
        assert!(!app.editing);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(app.range, bounds().default_range());
    }

    #[test]
    fn clear_shows_every_quarter() {
        let mut app = App::new(ok_handlers(Arc::default()), bounds(), None);
        app.handle_key(KeyCode::Char('c'));
        assert_eq!(app.range, DateRange::unbounded());
        assert_eq!(app.chart.as_ref().unwrap().goods.points.len(), 20);
    }

    #[test]
    fn failed_update_keeps_previous_chart() {
        let previous = ChartBuilder::new(&TableNames::default())
            .build(&sample_table(4, 1.0), &sample_table(4, 2.0), &DateRange::unbounded())
            .unwrap();
        let mut app = App::new(failing_handlers(), bounds(), Some(previous.clone()));

        app.handle_key(KeyCode::Char('r'));

        assert_eq!(app.chart, Some(previous));
        assert!(app.status.contains("keeping previous chart"));
    }

    #[test]
    fn q_quits_only_outside_edit_mode() {
        let mut app = App::new(ok_handlers(Arc::default()), bounds(), None);
        app.handle_key(KeyCode::Enter);
        assert!(!app.handle_key(KeyCode::Char('q')));
        app.handle_key(KeyCode::Esc);
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
