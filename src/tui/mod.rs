//! Ratatui-based terminal dashboard.
//!
//! The TUI provides a filter panel (start date, end date, data file), a KPI
//! header, and tabbed charts/tables. Every change recomputes the whole view
//! from the active dataset.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Days, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, Tabs},
};

use crate::analytics::conversion_rate;
use crate::app::pipeline::{Dashboard, DashboardView};
use crate::domain::{DailyConversion, DailyPoint, DateRange, WeekdayRow};
use crate::error::AppError;
use crate::io::export::{DEFAULT_EXPORT_NAME, write_filtered_csv};
use crate::report::fmt_pct;

mod plotters_chart;

use plotters_chart::{ChartSeries, DashPlottersChart, SeriesStyle};

const WALK_IN_COLOR: RGBColor = RGBColor(0, 255, 255); // cyan
const TEST_DRIVE_COLOR: RGBColor = RGBColor(0, 255, 0); // green
const CONVERSION_COLOR: RGBColor = RGBColor(255, 200, 0); // amber

/// Start the TUI.
pub fn run(dashboard: Dashboard, range: DateRange) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(dashboard, range);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Daily,
    Weekday,
    Conversion,
    Cumulative,
    Raw,
}

impl Tab {
    const ALL: [Tab; 5] = [Tab::Daily, Tab::Weekday, Tab::Conversion, Tab::Cumulative, Tab::Raw];

    fn title(self) -> &'static str {
        match self {
            Tab::Daily => "1 Daily Trend",
            Tab::Weekday => "2 Weekday",
            Tab::Conversion => "3 Conversion",
            Tab::Cumulative => "4 Cumulative & Distribution",
            Tab::Raw => "5 Raw Data",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn prev(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Filter panel rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Start,
    End,
    File,
}

impl Field {
    const ALL: [Field; 3] = [Field::Start, Field::End, Field::File];
}

struct App {
    dashboard: Dashboard,
    range: DateRange,
    view: DashboardView,
    selected_field: usize,
    editing: Option<Field>,
    input: String,
    tab: Tab,
    raw_offset: usize,
    status: String,
}

impl App {
    fn new(dashboard: Dashboard, range: DateRange) -> Self {
        let view = dashboard.view(range);
        let status = match dashboard.notice() {
            Some(notice) => notice.to_string(),
            None => loaded_status(&dashboard),
        };
        Self {
            dashboard,
            range,
            view,
            selected_field: 0,
            editing: None,
            input: String::new(),
            tab: Tab::Daily,
            raw_offset: 0,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
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

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if let Some(field) = self.editing {
            self.handle_edit(field, code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < Field::ALL.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.shift_selected_date(-1),
            KeyCode::Right => self.shift_selected_date(1),
            KeyCode::Enter => self.begin_edit(Field::ALL[self.selected_field]),
            KeyCode::Tab => self.set_tab(self.tab.next()),
            KeyCode::BackTab => self.set_tab(self.tab.prev()),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.set_tab(Tab::ALL[idx]);
            }
            KeyCode::PageDown => {
                self.raw_offset = (self.raw_offset + 10).min(self.view.records.len().saturating_sub(1));
            }
            KeyCode::PageUp => {
                self.raw_offset = self.raw_offset.saturating_sub(10);
            }
            KeyCode::Char('o') => {
                self.selected_field = 2;
                self.begin_edit(Field::File);
            }
            KeyCode::Char('x') => {
                self.dashboard.reset_to_default();
                self.reset_range();
                self.status = loaded_status(&self.dashboard);
            }
            KeyCode::Char('a') => {
                self.reset_range();
                self.status = format!("range: {}", self.range);
            }
            KeyCode::Char('e') => self.export(Path::new(DEFAULT_EXPORT_NAME)),
            _ => {}
        }

        false
    }

    fn handle_edit(&mut self, field: Field, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = None;
                self.apply_input(field);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                let accept = match field {
                    Field::Start | Field::End => c.is_ascii_digit() || c == '-',
                    Field::File => true,
                };
                if accept {
                    self.input.push(c);
                }
            }
            _ => {}
        }
    }

    fn begin_edit(&mut self, field: Field) {
        self.input = match field {
            Field::Start => self.range.start.to_string(),
            Field::End => self.range.end.to_string(),
            Field::File => String::new(),
        };
        self.editing = Some(field);
        self.status = match field {
            Field::Start | Field::End => "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string(),
            Field::File => "Path to an alternate .xlsx/.csv file. Enter to load, Esc to cancel.".to_string(),
        };
    }

    fn apply_input(&mut self, field: Field) {
        let trimmed = self.input.trim().to_string();
        match field {
            Field::Start | Field::End => {
                let date = match NaiveDate::parse_from_str(&trimmed, "%Y-%m-%d") {
                    Ok(d) => d,
                    Err(e) => {
                        self.status = format!("Invalid date '{trimmed}': {e}");
                        return;
                    }
                };
                if field == Field::Start {
                    self.range.start = date;
                } else {
                    self.range.end = date;
                }
                self.recompute();
                self.status = format!("range: {}", self.range);
            }
            Field::File => {
                if trimmed.is_empty() {
                    self.status = "No file given.".to_string();
                    return;
                }
                let path = PathBuf::from(&trimmed);
                self.dashboard.open_upload(&path);
                self.reset_range();
                self.status = match self.dashboard.notice() {
                    Some(notice) => notice.to_string(),
                    None => loaded_status(&self.dashboard),
                };
            }
        }
    }

    fn shift_selected_date(&mut self, delta: i64) {
        let field = Field::ALL[self.selected_field];
        let target = match field {
            Field::Start => &mut self.range.start,
            Field::End => &mut self.range.end,
            Field::File => return,
        };
        let shifted = if delta >= 0 {
            target.checked_add_days(Days::new(delta.unsigned_abs()))
        } else {
            target.checked_sub_days(Days::new(delta.unsigned_abs()))
        };
        if let Some(d) = shifted {
            *target = d;
        }
        self.recompute();
        self.status = format!("range: {}", self.range);
    }

    fn reset_range(&mut self) {
        self.range = self
            .dashboard
            .resolve_range(None, None, chrono::Local::now().date_naive());
        self.recompute();
    }

    fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    fn recompute(&mut self) {
        self.view = self.dashboard.view(self.range);
        self.raw_offset = 0;
    }

    fn export(&mut self, path: &Path) {
        self.status = match write_filtered_csv(path, &self.view.records) {
            Ok(()) => format!("Exported {} row(s) to {}", self.view.records.len(), path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);
        self.draw_body(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let s = &self.view.summary;
        let data = self.dashboard.active();
        let which = if self.dashboard.is_using_upload() { "alternate" } else { "default" };

        let lines = vec![
            Line::from(vec![
                Span::styled("showroom", Style::default().fg(Color::Cyan)),
                Span::raw(": Customer Walk-in & Test Drive Dashboard"),
            ]),
            Line::from(Span::styled(
                format!(
                    "Total walk-ins: {} | Total test drives: {} | Conversion: {} | Avg walk-ins/day: {:.1}",
                    s.total_walk_ins,
                    s.total_test_drives,
                    fmt_pct(s.conversion_rate),
                    s.avg_walk_ins_per_day,
                ),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "source: {} ({which}) | rows used: {} | skipped: {} | range: {}",
                    data.source.display(),
                    data.rows_used(),
                    data.rows_skipped(),
                    self.range,
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<&str> = Tab::ALL.iter().map(|t| t.title()).collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL))
            .select(self.tab.index())
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(5)])
            .split(area);

        if self.view.is_empty() {
            let block = Block::default().title(self.tab.title()).borders(Borders::ALL);
            let msg = Paragraph::new("No data in the selected date range.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, chunks[0]);
        } else {
            match self.tab {
                Tab::Daily => self.draw_daily(frame, chunks[0]),
                Tab::Weekday => self.draw_weekday(frame, chunks[0]),
                Tab::Conversion => self.draw_conversion(frame, chunks[0]),
                Tab::Cumulative => self.draw_cumulative(frame, chunks[0]),
                Tab::Raw => self.draw_raw(frame, chunks[0]),
            }
        }
        self.draw_filters(frame, chunks[1]);
    }

    fn draw_daily(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(origin) = self.view.daily.first().map(|p| p.date) else {
            return;
        };
        let walk_ins = day_series(&self.view.daily, origin, |p| p.walk_ins as f64);
        let test_drives = day_series(&self.view.daily, origin, |p| p.test_drives as f64);
        let series = [
            ChartSeries {
                points: &walk_ins,
                color: WALK_IN_COLOR,
                style: SeriesStyle::Line,
            },
            ChartSeries {
                points: &test_drives,
                color: TEST_DRIVE_COLOR,
                style: SeriesStyle::Line,
            },
        ];
        draw_chart(
            frame,
            area,
            "Daily walk-ins (cyan) and test drives (green)",
            &series,
            origin,
            "count",
        );
    }

    fn draw_weekday(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let rows: Vec<Row> = self
            .view
            .weekday
            .iter()
            .map(|r| {
                Row::new(vec![
                    r.label().to_string(),
                    r.days.to_string(),
                    r.walk_ins.to_string(),
                    r.test_drives.to_string(),
                    fmt_pct(r.conversion_rate),
                    fmt_pct(r.mean_daily_conversion),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Length(5),
                Constraint::Length(9),
                Constraint::Length(12),
                Constraint::Length(11),
                Constraint::Length(14),
            ],
        )
        .header(
            Row::new(vec!["Day", "Days", "Walk-ins", "Test drives", "Conversion", "Avg daily conv"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title("Performance by day of week").borders(Borders::ALL));
        frame.render_widget(table, chunks[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        let mut counts = BarChart::default()
            .block(
                Block::default()
                    .title("Walk-ins (cyan) and test drives (green) by weekday")
                    .borders(Borders::ALL),
            )
            .bar_width(3)
            .bar_gap(0)
            .group_gap(2);
        for (label, walk_ins, test_drives) in weekday_count_bars(&self.view.weekday) {
            let bars = [
                Bar::default()
                    .value(walk_ins)
                    .style(Style::default().fg(Color::Cyan))
                    .value_style(Style::default().fg(Color::Black).bg(Color::Cyan)),
                Bar::default()
                    .value(test_drives)
                    .style(Style::default().fg(Color::Green))
                    .value_style(Style::default().fg(Color::Black).bg(Color::Green)),
            ];
            counts = counts.data(BarGroup::default().label(Line::from(label)).bars(&bars));
        }
        frame.render_widget(counts, right[0]);

        let conversion = weekday_conversion_bars(&self.view.weekday);
        let chart = BarChart::default()
            .block(Block::default().title("Avg daily conversion by weekday (%)").borders(Borders::ALL))
            .data(conversion.as_slice())
            .bar_width(5)
            .bar_gap(1)
            .bar_style(Style::default().fg(Color::Yellow))
            .value_style(Style::default().fg(Color::Black).bg(Color::Yellow));
        frame.render_widget(chart, right[1]);
    }

    fn draw_conversion(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(origin) = self.view.daily_conversion.first().map(|p| p.date) else {
            return;
        };
        let rates = conversion_points(&self.view.daily_conversion, origin);
        let series = [
            ChartSeries {
                points: &rates,
                color: CONVERSION_COLOR,
                style: SeriesStyle::Line,
            },
            ChartSeries {
                points: &rates,
                color: TEST_DRIVE_COLOR,
                style: SeriesStyle::Dots,
            },
        ];
        draw_chart(
            frame,
            area,
            "Daily conversion rate (%), zero walk-in days count as 0%",
            &series,
            origin,
            "conv (%)",
        );
    }

    fn draw_cumulative(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        if let Some(origin) = self.view.cumulative.first().map(|p| p.date) {
            let walk_ins: Vec<(f64, f64)> = self
                .view
                .cumulative
                .iter()
                .map(|p| ((p.date - origin).num_days() as f64, p.walk_ins as f64))
                .collect();
            let test_drives: Vec<(f64, f64)> = self
                .view
                .cumulative
                .iter()
                .map(|p| ((p.date - origin).num_days() as f64, p.test_drives as f64))
                .collect();
            let series = [
                ChartSeries {
                    points: &walk_ins,
                    color: WALK_IN_COLOR,
                    style: SeriesStyle::Line,
                },
                ChartSeries {
                    points: &test_drives,
                    color: TEST_DRIVE_COLOR,
                    style: SeriesStyle::Line,
                },
            ];
            draw_chart(
                frame,
                chunks[0],
                "Cumulative walk-ins (cyan) vs test drives (green)",
                &series,
                origin,
                "total",
            );
        }

        let bars: Vec<(&str, u64)> = self
            .view
            .bands
            .iter()
            .map(|b| (b.band.label(), b.days as u64))
            .collect();
        let chart = BarChart::default()
            .block(Block::default().title("Days per daily conversion band").borders(Borders::ALL))
            .data(bars.as_slice())
            .bar_width(8)
            .bar_gap(2)
            .bar_style(Style::default().fg(Color::Yellow))
            .value_style(Style::default().fg(Color::Black).bg(Color::Yellow));
        frame.render_widget(chart, chunks[1]);
    }

    fn draw_raw(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows: Vec<Row> = self
            .view
            .records
            .iter()
            .skip(self.raw_offset)
            .map(|r| {
                Row::new(vec![
                    r.date.to_string(),
                    r.walk_ins.to_string(),
                    r.test_drives.to_string(),
                    fmt_pct(conversion_rate(u64::from(r.test_drives), u64::from(r.walk_ins))),
                ])
            })
            .collect();

        let title = format!(
            "Raw data ({} row(s), from #{}) | PgUp/PgDn scroll, e export",
            self.view.records.len(),
            self.raw_offset + 1
        );
        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Length(18),
                Constraint::Length(12),
                Constraint::Length(16),
            ],
        )
        .header(
            Row::new(vec!["Date", "Walk-in Customer", "Test Drive", "Conversion Rate"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(table, area);
    }

    fn draw_filters(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let value = |field: Field| -> String {
            if self.editing == Some(field) {
                return format!("{}_", self.input);
            }
            match field {
                Field::Start => self.range.start.to_string(),
                Field::End => self.range.end.to_string(),
                Field::File => self.dashboard.active().source.display().to_string(),
            }
        };

        let items = vec![
            ListItem::new(format!("Start: {}", value(Field::Start))),
            ListItem::new(format!("End:   {}", value(Field::End))),
            ListItem::new(format!("File:  {}", value(Field::File))),
        ];

        let list = List::new(items)
            .block(Block::default().title("Filters").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ field  ←/→ ±1 day  Enter edit  Tab/1-5 view  o open  x default  a all dates  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn loaded_status(dashboard: &Dashboard) -> String {
    let data = dashboard.active();
    format!(
        "Loaded {} ({} row(s), {} skipped).",
        data.source.display(),
        data.rows_used(),
        data.rows_skipped()
    )
}

/// Map daily points to `(days since origin, value)`.
fn day_series(daily: &[DailyPoint], origin: NaiveDate, value: impl Fn(&DailyPoint) -> f64) -> Vec<(f64, f64)> {
    daily
        .iter()
        .map(|p| ((p.date - origin).num_days() as f64, value(p)))
        .collect()
}

/// Daily conversion rates as `(days since origin, percent)`.
fn conversion_points(conversion: &[DailyConversion], origin: NaiveDate) -> Vec<(f64, f64)> {
    conversion
        .iter()
        .map(|p| ((p.date - origin).num_days() as f64, p.conversion_rate * 100.0))
        .collect()
}

/// `(weekday, walk-ins, test drives)` per weekday row, for grouped bars.
fn weekday_count_bars(rows: &[WeekdayRow]) -> Vec<(&'static str, u64, u64)> {
    rows.iter().map(|r| (r.label(), r.walk_ins, r.test_drives)).collect()
}

/// Mean daily conversion per weekday, in whole percent.
fn weekday_conversion_bars(rows: &[WeekdayRow]) -> Vec<(&'static str, u64)> {
    rows.iter()
        .map(|r| (r.label(), (r.mean_daily_conversion * 100.0).round().max(0.0) as u64))
        .collect()
}

/// X/Y bounds covering every series. Y always starts at zero (counts and rates).
fn series_bounds(series: &[ChartSeries<'_>]) -> ([f64; 2], [f64; 2]) {
    let mut x_max = 0.0_f64;
    let mut y_max = 0.0_f64;
    for s in series {
        for &(x, y) in s.points {
            x_max = x_max.max(x);
            y_max = y_max.max(y);
        }
    }

    let x_max = if x_max.is_finite() && x_max > 0.0 { x_max } else { 1.0 };
    let y_max = if y_max.is_finite() && y_max > 0.0 { y_max * 1.05 } else { 1.0 };
    ([0.0, x_max], [0.0, y_max])
}

fn draw_chart(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    series: &[ChartSeries<'_>],
    origin: NaiveDate,
    y_label: &str,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let (x_bounds, y_bounds) = series_bounds(series);
    let (chart_rect, insets) = chart_layout(inner);
    let widget = DashPlottersChart {
        series,
        x_bounds,
        y_bounds,
        x_origin: origin,
        y_label,
        fmt_y: fmt_axis_y,
    };

    frame.render_widget(widget, chart_rect);
    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, origin, y_label);
    }
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.0}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

#[allow(clippy::too_many_arguments)]
fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    origin: NaiveDate,
    y_label: &str,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = plotters_chart::fmt_day_offset(origin, x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_y(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_title = Paragraph::new(y_label.to_string())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_title, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Record, RecordSet};
    use crate::io::ingest::LoadedData;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn app() -> App {
        let data = LoadedData {
            source: PathBuf::from("default.csv"),
            records: RecordSet::from_unsorted(vec![
                Record::new(d(1), 10, 3),
                Record::new(d(2), 8, 2),
                Record::new(d(3), 6, 0),
            ]),
            row_errors: Vec::new(),
            rows_read: 3,
        };
        App::new(Dashboard::from_default(data), DateRange::new(d(1), d(3)))
    }

    #[test]
    fn arrows_shift_the_selected_date() {
        let mut app = app();
        app.handle_key(KeyCode::Right);
        assert_eq!(app.range.start, d(2));
        assert_eq!(app.view.summary.total_walk_ins, 14);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Left);
        assert_eq!(app.range.end, d(2));
        assert_eq!(app.view.summary.total_walk_ins, 8);
    }

    #[test]
    fn typed_date_applies_on_enter() {
        let mut app = app();
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.editing, Some(Field::End));
        for _ in 0..10 {
            app.handle_key(KeyCode::Backspace);
        }
        for c in "2024-01-01".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.editing, None);
        assert_eq!(app.range, DateRange::new(d(1), d(1)));
        assert_eq!(app.view.summary.total_walk_ins, 10);
    }

    #[test]
    fn invalid_date_keeps_range() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.range, DateRange::new(d(1), d(3)));
        assert!(app.status.starts_with("Invalid date"));
    }

    #[test]
    fn inverted_range_is_zero_state() {
        let mut app = app();
        for _ in 0..3 {
            app.handle_key(KeyCode::Right);
        }
        assert!(app.range.is_inverted());
        assert!(app.view.is_empty());
        assert_eq!(app.view.summary.conversion_rate, 0.0);

        app.handle_key(KeyCode::Char('a'));
        assert_eq!(app.range, DateRange::new(d(1), d(3)));
    }

    #[test]
    fn failed_open_keeps_default_and_reports() {
        let mut app = app();
        app.handle_key(KeyCode::Char('o'));
        assert_eq!(app.editing, Some(Field::File));
        for c in "nope/missing.xlsx".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
        assert!(!app.dashboard.is_using_upload());
        assert!(app.status.contains("default dataset"));
        assert_eq!(app.view.records.len(), 3);
    }

    #[test]
    fn tabs_cycle_both_ways() {
        let mut app = app();
        app.handle_key(KeyCode::BackTab);
        assert_eq!(app.tab, Tab::Raw);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.tab, Tab::Daily);
        app.handle_key(KeyCode::Char('3'));
        assert_eq!(app.tab, Tab::Conversion);
    }

    #[test]
    fn quit_keys_exit() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char('z')));
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn export_writes_filtered_rows() {
        let mut app = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        app.export(&path);
        assert!(app.status.starts_with("Exported 3 row(s)"));
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 4);
    }

    #[test]
    fn conversion_tab_plots_view_series() {
        let app = app();
        let pts = conversion_points(&app.view.daily_conversion, d(1));
        let expected = [(0.0, 30.0), (1.0, 25.0), (2.0, 0.0)];
        assert_eq!(pts.len(), expected.len());
        for (got, want) in pts.iter().zip(expected) {
            assert_eq!(got.0, want.0);
            assert!((got.1 - want.1).abs() < 1e-9);
        }
    }

    #[test]
    fn weekday_bars_carry_both_counts_and_conversion() {
        // 2024-01-01 is a Monday.
        let app = app();
        assert_eq!(
            weekday_count_bars(&app.view.weekday),
            vec![("Mon", 10, 3), ("Tue", 8, 2), ("Wed", 6, 0)]
        );
        assert_eq!(
            weekday_conversion_bars(&app.view.weekday),
            vec![("Mon", 30), ("Tue", 25), ("Wed", 0)]
        );
    }

    #[test]
    fn bounds_start_at_zero_and_pad_top() {
        let pts = [(0.0, 10.0), (4.0, 20.0)];
        let series = [ChartSeries {
            points: &pts,
            color: WALK_IN_COLOR,
            style: SeriesStyle::Line,
        }];
        let (x, y) = series_bounds(&series);
        assert_eq!(x, [0.0, 4.0]);
        assert_eq!(y[0], 0.0);
        assert!((y[1] - 21.0).abs() < 1e-9);

        let (x, y) = series_bounds(&[]);
        assert_eq!((x, y), ([0.0, 1.0], [0.0, 1.0]));
    }
}
