//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for the pricing request (place or
//! coordinates, window, threshold, exposure, loading) and renders the fitted distribution, the daily
//! series, seasonality and a Q-Q plot next to the premium breakdown.

use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs},
};

use crate::app::pipeline::RunOutput;
use crate::app::session::PricingCache;
use crate::data::{GeocodeClient, GeocodedPlace};
use crate::domain::{DataSource, DateRange, LoadingFactor, Location, PricingConfig, PricingRequest};
use crate::error::AppError;
use crate::models::WeibullModel;
use crate::report::{DEFAULT_BINS, ROLLING_WINDOW, density_curve, histogram, monthly_means, qq_points, rolling_mean};

mod plotters_chart;

use plotters_chart::WindPlottersChart;

/// Start the TUI.
pub fn run(config: PricingConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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
enum Field {
    Place,
    Latitude,
    Longitude,
    Start,
    End,
    Threshold,
    Exposure,
    Loading,
}

const FIELDS: [Field; 8] = [
    Field::Place,
    Field::Latitude,
    Field::Longitude,
    Field::Start,
    Field::End,
    Field::Threshold,
    Field::Exposure,
    Field::Loading,
];

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::Place => "Place",
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
            Field::Start => "Start",
            Field::End => "End",
            Field::Threshold => "Threshold (km/h)",
            Field::Exposure => "Exposure",
            Field::Loading => "Loading",
        }
    }

    /// Changing these invalidates the loaded series.
    fn affects_series(self) -> bool {
        matches!(
            self,
            Field::Place | Field::Latitude | Field::Longitude | Field::Start | Field::End
        )
    }

    /// Free text, resolved through the geocoder on Enter.
    fn is_text(self) -> bool {
        self == Field::Place
    }
}

/// Editable request values. Kept raw so partially edited input can be shown
/// before it validates.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    /// Address of the last geocoded place; cleared when coordinates are edited.
    place: String,
    latitude: f64,
    longitude: f64,
    start: NaiveDate,
    end: NaiveDate,
    threshold: f64,
    exposure: f64,
    loading: f64,
}

impl Settings {
    fn from_request(req: &PricingRequest) -> Self {
        Self {
            place: String::new(),
            latitude: req.location.latitude,
            longitude: req.location.longitude,
            start: req.range.start,
            end: req.range.end,
            threshold: req.threshold,
            exposure: req.exposure,
            loading: req.loading_factor.value(),
        }
    }

    fn request(&self) -> Result<PricingRequest, AppError> {
        Ok(PricingRequest {
            location: Location::new(self.latitude, self.longitude)?,
            range: DateRange::new(self.start, self.end)?,
            threshold: self.threshold,
            exposure: self.exposure,
            loading_factor: LoadingFactor::new(self.loading)?,
        })
    }

    fn display(&self, field: Field) -> String {
        match field {
            Field::Place => self.place.clone(),
            Field::Latitude => format!("{:.4}", self.latitude),
            Field::Longitude => format!("{:.4}", self.longitude),
            Field::Start => self.start.to_string(),
            Field::End => self.end.to_string(),
            Field::Threshold => format!("{:.1}", self.threshold),
            Field::Exposure => format!("{:.0}", self.exposure),
            Field::Loading => format!("{:.2}", self.loading),
        }
    }

    /// Step a field left/right. Dates move by whole years.
    fn adjust(&mut self, field: Field, delta: i32) {
        let d = f64::from(delta);
        if matches!(field, Field::Latitude | Field::Longitude) {
            self.place.clear();
        }
        match field {
            Field::Place => {}
            Field::Latitude => self.latitude = (self.latitude + 0.1 * d).clamp(-90.0, 90.0),
            Field::Longitude => self.longitude = (self.longitude + 0.1 * d).clamp(-180.0, 180.0),
            Field::Start => self.start = shift_years(self.start, delta),
            Field::End => self.end = shift_years(self.end, delta),
            Field::Threshold => self.threshold = (self.threshold + d).max(0.0),
            Field::Exposure => self.exposure = (self.exposure + 50_000.0 * d).max(0.0),
            Field::Loading => self.loading = (self.loading + 0.05 * d).max(1.0),
        }
    }

    fn apply_text(&mut self, field: Field, text: &str) -> Result<(), String> {
        let text = text.trim();
        let number = || text.parse::<f64>().map_err(|e| format!("Invalid number '{text}': {e}"));
        let date = || {
            NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| format!("Invalid date '{text}': {e}"))
        };
        match field {
            Field::Place => self.place = text.to_string(),
            Field::Latitude => {
                self.latitude = number()?;
                self.place.clear();
            }
            Field::Longitude => {
                self.longitude = number()?;
                self.place.clear();
            }
            Field::Start => self.start = date()?,
            Field::End => self.end = date()?,
            Field::Threshold => self.threshold = number()?,
            Field::Exposure => self.exposure = number()?,
            Field::Loading => self.loading = number()?,
        }
        Ok(())
    }

    fn apply_place(&mut self, found: GeocodedPlace) {
        self.place = found.address;
        self.latitude = found.location.latitude;
        self.longitude = found.location.longitude;
    }
}

fn shift_years(date: NaiveDate, delta: i32) -> NaiveDate {
    // Feb 29 falls back to Feb 28 in non-leap years.
    let year = date.year() + delta;
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
        .unwrap_or(date)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Distribution,
    Series,
    Seasonality,
    QQ,
}

const TABS: [Tab; 4] = [Tab::Distribution, Tab::Series, Tab::Seasonality, Tab::QQ];

impl Tab {
    fn title(self) -> &'static str {
        match self {
            Tab::Distribution => "1 Distribution",
            Tab::Series => "2 Time series",
            Tab::Seasonality => "3 Seasonality",
            Tab::QQ => "4 Q-Q",
        }
    }

    fn index(self) -> usize {
        TABS.iter().position(|t| *t == self).unwrap_or(0)
    }
}

struct App {
    settings: Settings,
    source: DataSource,
    ladder: Vec<f64>,
    cache: PricingCache,
    selected_field: usize,
    editing: Option<String>,
    tab: Tab,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(config: PricingConfig) -> Self {
        let mut settings = Settings::from_request(&config.request);
        settings.place = config.place.unwrap_or_default();
        let mut app = Self {
            settings,
            source: config.source,
            ladder: config.ladder,
            cache: PricingCache::new(),
            selected_field: 0,
            editing: None,
            tab: Tab::Distribution,
            status: "Loading observations...".to_string(),
            run: None,
        };
        app.reprice();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
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
        if self.editing.is_some() {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected_field = self.selected_field.saturating_sub(1),
            KeyCode::Down => self.selected_field = (self.selected_field + 1).min(FIELDS.len() - 1),
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                self.editing = Some(self.settings.display(self.field()));
                self.status = format!("Editing {}. Enter to apply, Esc to cancel.", self.field().label());
            }
            KeyCode::Tab => self.tab = TABS[(self.tab.index() + 1) % TABS.len()],
            KeyCode::BackTab => self.tab = TABS[(self.tab.index() + TABS.len() - 1) % TABS.len()],
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.tab = TABS[idx];
            }
            KeyCode::Char('r') => {
                self.cache.clear();
                self.reprice();
            }
            _ => {}
        }
        false
    }

    fn handle_edit(&mut self, code: KeyCode) {
        let Some(buffer) = self.editing.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = buffer.clone();
                self.editing = None;
                let field = self.field();
                if field.is_text() {
                    self.locate(&text);
                    return;
                }
                match self.settings.apply_text(field, &text) {
                    Ok(()) => self.reprice(),
                    Err(msg) => self.status = msg,
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => {
                let accepted = if FIELDS[self.selected_field].is_text() {
                    !c.is_control()
                } else {
                    c.is_ascii_digit() || matches!(c, '-' | '.' | 'e' | 'E')
                };
                if accepted {
                    buffer.push(c);
                }
            }
            _ => {}
        }
    }

    /// Geocode `name` and move the request there.
    fn locate(&mut self, name: &str) {
        self.status = format!("Looking up '{}'...", name.trim());
        match GeocodeClient::from_env().and_then(|client| client.lookup(name)) {
            Ok(found) => {
                self.settings.apply_place(found);
                self.reprice();
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn field(&self) -> Field {
        FIELDS[self.selected_field]
    }

    fn adjust_field(&mut self, delta: i32) {
        let field = self.field();
        self.settings.adjust(field, delta);
        self.reprice();
        if field.affects_series() {
            self.status = format!("{}: {}", field.label(), self.settings.display(field));
        }
    }

    /// Validate settings and reprice. Errors land in the status line; the
    /// last good run stays on screen.
    fn reprice(&mut self) {
        let request = match self.settings.request() {
            Ok(req) => req,
            Err(err) => {
                self.status = err.to_string();
                return;
            }
        };

        match self.cache.price(&request, &self.source, &self.ladder) {
            Ok(run) => {
                self.status = format!(
                    "premium {:.2} | p={:.6} | loads: {}",
                    run.breakdown.total_premium,
                    run.breakdown.exceedance_probability,
                    self.cache.loads()
                );
                self.run = Some(run);
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("wrp", Style::default().fg(Color::Cyan)),
            Span::raw(" - parametric wind cover pricer"),
        ]));

        let s = &self.settings;
        lines.push(Line::from(Span::styled(
            format!(
                "lat {:.4} lon {:.4} | {} .. {} | source: {}",
                s.latitude,
                s.longitude,
                s.start,
                s.end,
                source_label(&self.source),
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            let p = &run.fit.params;
            let d = &run.fit.diagnostics;
            lines.push(Line::from(Span::styled(
                format!(
                    "weibull shape={:.4} scale={:.4} loc=0 | n={} (zeros excluded {}) | days above threshold: {}",
                    p.shape(),
                    p.scale(),
                    d.n_used,
                    d.zeros_excluded,
                    run.exceedance_count,
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(38)])
            .split(area);

        self.draw_chart(frame, chunks[0]);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(FIELDS.len() as u16 + 2), Constraint::Min(0)])
            .split(chunks[1]);
        self.draw_settings(frame, side[0]);
        self.draw_breakdown(frame, side[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let tabs = Tabs::new(TABS.iter().map(|t| t.title()).collect::<Vec<_>>())
            .select(self.tab.index())
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, rows[0]);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, rows[1]);
            return;
        };

        let Some(data) = chart_data(run, self.tab) else {
            let msg = Paragraph::new("Nothing to plot.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, rows[1]);
            return;
        };

        let (chart_rect, insets) = chart_layout(rows[1]);
        let widget = WindPlottersChart {
            bars: &data.bars,
            points: &data.points,
            line: &data.line,
            vline: data.vline,
            hline: data.hline,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: data.x_label,
            y_label: data.y_label,
            fmt_x: data.fmt_x,
            fmt_y: data.fmt_y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, rows[1], chart_rect, insets, &data);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = FIELDS
            .iter()
            .enumerate()
            .map(|(i, &field)| {
                let value = match &self.editing {
                    Some(buffer) if i == self.selected_field => format!("{buffer}_"),
                    _ => self.settings.display(field),
                };
                ListItem::new(format!("{:<17}{value}", field.label()))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_breakdown(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        if let Some(run) = &self.run {
            let b = &run.breakdown;
            let row = |label: &str, value: String| {
                Line::from(vec![
                    Span::styled(format!("{label:<14}"), Style::default().fg(Color::Gray)),
                    Span::raw(value),
                ])
            };
            lines.push(row("P(X > t)", format!("{:.6}", b.exceedance_probability)));
            lines.push(row("Exposure", format!("{:.2}", b.exposure)));
            lines.push(row("Pure premium", format!("{:.2}", b.pure_premium)));
            lines.push(row("Safety margin", format!("{:.2}", b.safety_margin)));
            lines.push(Line::from(vec![
                Span::styled(format!("{:<14}", "Total"), Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("{:.2}", b.total_premium),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(row(
                "Confidence",
                format!("{:.4}", run.request.loading_factor.confidence_level()),
            ));
            let zeros = run.fit.diagnostics.zeros_excluded;
            if zeros > 0 {
                lines.push(Line::from(Span::styled(
                    format!("{zeros} calm day(s) not fitted"),
                    Style::default().fg(Color::Yellow),
                )));
            }

            if !run.ladder.is_empty() {
                lines.push(Line::raw(""));
                for (t, lb) in &run.ladder {
                    lines.push(row(&format!("t={t:.1}"), format!("{:.2}", lb.total_premium)));
                }
            }
        }

        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Premium").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit  Tab/1-4 chart  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn source_label(source: &DataSource) -> String {
    match source {
        DataSource::Archive => "open-meteo archive".to_string(),
        DataSource::Csv(path) => format!("csv {}", path.display()),
        DataSource::Synthetic { shape, scale, seed } => {
            format!("synthetic k={shape} λ={scale} seed={seed}")
        }
    }
}

/// Owned series and bounds for one chart tab.
#[derive(Debug, Clone)]
struct ChartData {
    bars: Vec<(f64, f64, f64)>,
    points: Vec<(f64, f64)>,
    line: Vec<(f64, f64)>,
    vline: Option<f64>,
    hline: Option<f64>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_label: &'static str,
    y_label: &'static str,
    fmt_x: fn(f64) -> String,
    fmt_y: fn(f64) -> String,
}

fn chart_data(run: &RunOutput, tab: Tab) -> Option<ChartData> {
    match tab {
        Tab::Distribution => distribution_chart(run),
        Tab::Series => series_chart(run),
        Tab::Seasonality => seasonality_chart(run),
        Tab::QQ => qq_chart(run),
    }
}

fn distribution_chart(run: &RunOutput) -> Option<ChartData> {
    let values = run.series.cleaned_values();
    let bins = histogram(&values, DEFAULT_BINS);
    let last = bins.last()?;
    let x_max = last.hi.max(run.request.threshold * 1.05);
    let model = WeibullModel::new(run.fit.params).ok()?;
    let line = density_curve(&model, x_max, 200);

    let y_max = bins
        .iter()
        .map(|b| b.density)
        .chain(line.iter().map(|&(_, y)| y))
        .fold(0.0_f64, f64::max);

    Some(ChartData {
        bars: bins.iter().map(|b| (b.lo, b.hi, b.density)).collect(),
        points: Vec::new(),
        line,
        vline: Some(run.request.threshold),
        hline: None,
        x_bounds: [0.0, x_max],
        y_bounds: [0.0, padded_top(y_max)],
        x_label: "wind (km/h)",
        y_label: "density",
        fmt_x: fmt_axis_1,
        fmt_y: fmt_axis_3,
    })
}

fn series_chart(run: &RunOutput) -> Option<ChartData> {
    let points: Vec<(f64, f64)> = run
        .series
        .iter()
        .filter_map(|o| o.valid_value().map(|v| (year_fraction(o.date), v)))
        .collect();
    let line: Vec<(f64, f64)> = run
        .series
        .iter()
        .zip(rolling_mean(&run.series, ROLLING_WINDOW))
        .filter_map(|(o, m)| m.map(|m| (year_fraction(o.date), m)))
        .collect();

    let x0 = year_fraction(run.series.first_date()?);
    let x1 = year_fraction(run.series.last_date()?);
    let x1 = if x1 > x0 { x1 } else { x0 + 1.0 / 365.0 };
    let y_max = points
        .iter()
        .map(|&(_, y)| y)
        .fold(run.request.threshold, f64::max);

    Some(ChartData {
        bars: Vec::new(),
        points,
        line,
        vline: None,
        hline: Some(run.request.threshold),
        x_bounds: [x0, x1],
        y_bounds: [0.0, padded_top(y_max)],
        x_label: "year",
        y_label: "km/h",
        fmt_x: fmt_axis_1,
        fmt_y: fmt_axis_0,
    })
}

fn seasonality_chart(run: &RunOutput) -> Option<ChartData> {
    let means = monthly_means(&run.series);
    let bars: Vec<(f64, f64, f64)> = means
        .iter()
        .enumerate()
        .filter_map(|(i, m)| m.map(|m| (i as f64 + 0.6, i as f64 + 1.4, m)))
        .collect();
    if bars.is_empty() {
        return None;
    }
    let y_max = bars.iter().map(|&(_, _, h)| h).fold(0.0_f64, f64::max);

    Some(ChartData {
        bars,
        points: Vec::new(),
        line: Vec::new(),
        vline: None,
        hline: None,
        x_bounds: [0.5, 12.5],
        y_bounds: [0.0, padded_top(y_max)],
        x_label: "month",
        y_label: "mean km/h",
        fmt_x: fmt_axis_0,
        fmt_y: fmt_axis_0,
    })
}

fn qq_chart(run: &RunOutput) -> Option<ChartData> {
    let model = WeibullModel::new(run.fit.params).ok()?;
    let values: Vec<f64> = run
        .series
        .cleaned_values()
        .into_iter()
        .filter(|v| *v > 0.0)
        .collect();
    let points = qq_points(&model, &values).ok()?;
    let hi = points
        .iter()
        .map(|&(t, e)| t.max(e))
        .fold(0.0_f64, f64::max);
    if hi <= 0.0 {
        return None;
    }
    let top = padded_top(hi);

    Some(ChartData {
        bars: Vec::new(),
        points,
        line: vec![(0.0, 0.0), (top, top)],
        vline: None,
        hline: None,
        x_bounds: [0.0, top],
        y_bounds: [0.0, top],
        x_label: "weibull quantile",
        y_label: "observed",
        fmt_x: fmt_axis_0,
        fmt_y: fmt_axis_0,
    })
}

fn year_fraction(date: NaiveDate) -> f64 {
    let days_in_year = if NaiveDate::from_ymd_opt(date.year(), 2, 29).is_some() {
        366.0
    } else {
        365.0
    };
    f64::from(date.year()) + f64::from(date.ordinal0()) / days_in_year
}

fn padded_top(y_max: f64) -> f64 {
    if y_max.is_finite() && y_max > 0.0 { y_max * 1.05 } else { 1.0 }
}

fn fmt_axis_0(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_1(v: f64) -> String {
    format!("{v:.1}")
}

fn fmt_axis_3(v: f64) -> String {
    format!("{v:.3}")
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

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
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

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    data: &ChartData,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let [x_lo, x_hi] = data.x_bounds;
    let [y_lo, y_hi] = data.y_bounds;

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = (data.fmt_x)(x_lo + u * (x_hi - x_lo));
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
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
        let label = (data.fmt_y)(y_lo + u * (y_hi - y_lo));
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
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

    let x_label = Paragraph::new(data.x_label)
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

    let y_label = Paragraph::new(data.y_label)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_pricing_with_series;
    use crate::data::generate_series;

    fn settings() -> Settings {
        Settings {
            place: String::new(),
            latitude: 44.2971,
            longitude: 0.1178,
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            threshold: 35.0,
            exposure: 1_000_000.0,
            loading: 1.2,
        }
    }

    #[test]
    fn settings_round_trip_through_a_request() {
        let s = settings();
        let req = s.request().unwrap();
        assert_eq!(Settings::from_request(&req), s);
    }

    #[test]
    fn adjustments_stay_in_valid_ranges() {
        let mut s = settings();
        s.loading = 1.02;
        s.adjust(Field::Loading, -1);
        assert_eq!(s.loading, 1.0);

        s.latitude = 89.95;
        s.adjust(Field::Latitude, 1);
        assert_eq!(s.latitude, 90.0);

        s.start = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        s.adjust(Field::Start, -1);
        assert_eq!(s.start, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
        assert!(s.request().is_ok());
    }

    #[test]
    fn text_edits_parse_or_report() {
        let mut s = settings();
        s.apply_text(Field::Threshold, " 42.5 ").unwrap();
        assert_eq!(s.threshold, 42.5);
        assert!(s.apply_text(Field::End, "2023-13-01").is_err());

        // Parses, but the request rejects it.
        s.apply_text(Field::Loading, "0.5").unwrap();
        assert!(s.request().is_err());
    }

    #[test]
    fn geocoded_place_moves_the_request_until_coordinates_change() {
        let mut s = settings();
        s.apply_place(GeocodedPlace {
            address: "Brest, Finistère, France".to_string(),
            location: Location::new(48.3904, -4.4861).unwrap(),
        });
        assert_eq!(s.display(Field::Place), "Brest, Finistère, France");
        let req = s.request().unwrap();
        assert_eq!(req.location, Location::new(48.3904, -4.4861).unwrap());

        // Nudging a coordinate drops the stale address.
        s.adjust(Field::Longitude, 1);
        assert_eq!(s.display(Field::Place), "");
        assert!(Field::Place.affects_series() && Field::Place.is_text());
    }

    #[test]
    fn every_tab_has_chart_data_for_a_synthetic_run() {
        let s = settings();
        let req = s.request().unwrap();
        let series = generate_series(2.0, 20.0, &req.range, 9, 0.01).unwrap();
        let run = run_pricing_with_series(&req, &[], series).unwrap();

        for tab in TABS {
            let data = chart_data(&run, tab).unwrap();
            assert!(data.x_bounds[1] > data.x_bounds[0], "{tab:?}");
            assert!(data.y_bounds[1] > data.y_bounds[0], "{tab:?}");
        }

        let dist = chart_data(&run, Tab::Distribution).unwrap();
        assert_eq!(dist.bars.len(), DEFAULT_BINS);
        assert_eq!(dist.vline, Some(35.0));

        let season = chart_data(&run, Tab::Seasonality).unwrap();
        assert_eq!(season.bars.len(), 12);
    }

    #[test]
    fn year_fraction_is_monotone_across_new_year() {
        let a = year_fraction(NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
        let b = year_fraction(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert!(a < b);
        assert_eq!(b, 2023.0);
    }
}
