//! Ratatui-based terminal UI.
//!
//! The TUI renders the five dashboard views as tabs (Resumen, Demanda,
//! Zonas, Sectores, Precios) over a single loaded dataset, with a
//! real-vs-predicted chart where the view tracks one series.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Terminal,
};

use crate::domain::{DataSource, Dataset, PriceMarket, RunConfig, Sector};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::SeriesChart;

/// Start the TUI.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    let mut app = App::new(config)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

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

/// The five dashboard views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Resumen,
    Demanda,
    Zonas,
    Sectores,
    Precios,
}

impl Tab {
    const ALL: [Tab; 5] = [
        Tab::Resumen,
        Tab::Demanda,
        Tab::Zonas,
        Tab::Sectores,
        Tab::Precios,
    ];

    fn title(self) -> &'static str {
        match self {
            Tab::Resumen => "Resumen",
            Tab::Demanda => "Demanda",
            Tab::Zonas => "Zonas",
            Tab::Sectores => "Sectores",
            Tab::Precios => "Precios",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

struct App {
    config: RunConfig,
    dataset: Dataset,
    tab: Tab,
    sector: Sector,
    market: PriceMarket,
    status: String,
}

impl App {
    fn new(config: RunConfig) -> Result<Self, AppError> {
        let dataset = crate::app::pipeline::load_or_generate(&config)?;
        let status = format!("Fuente: {}", dataset.source.display_name());
        Ok(Self {
            config,
            dataset,
            tab: Tab::Resumen,
            sector: Sector::Residencial,
            market: PriceMarket::HenryHub,
            status,
        })
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
                    if self.handle_key(key.code)? {
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

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Right | KeyCode::Tab => {
                self.tab = self.tab.next();
            }
            KeyCode::Left | KeyCode::BackTab => {
                self.tab = self.tab.prev();
            }
            KeyCode::Up => match self.tab {
                Tab::Sectores => {
                    self.sector = self.sector.prev();
                    self.status = format!("Sector: {}", self.sector.display_name());
                }
                Tab::Precios => {
                    self.market = self.market.next();
                    self.status = format!("Mercado: {}", self.market.display_name());
                }
                _ => {}
            },
            KeyCode::Down => match self.tab {
                Tab::Sectores => {
                    self.sector = self.sector.next();
                    self.status = format!("Sector: {}", self.sector.display_name());
                }
                Tab::Precios => {
                    self.market = self.market.next();
                    self.status = format!("Mercado: {}", self.market.display_name());
                }
                _ => {}
            },
            KeyCode::Char('r') => {
                if self.dataset.source == DataSource::Synthetic {
                    self.config.seed = self.config.seed.wrapping_add(1);
                    self.dataset = crate::data::synthetic::generate_dataset(&self.config)?;
                    self.status = format!("Regenerado con semilla {}", self.config.seed);
                } else {
                    self.status = "Datos de archivo: `r` solo aplica en modo sintético.".to_string();
                }
            }
            _ => {}
        }

        Ok(false)
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_tabs(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .block(
                Block::default()
                    .title("ProyectaGAS")
                    .borders(Borders::ALL),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chart = self.chart_data();

        if chart.is_none() {
            self.draw_report(frame, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        self.draw_report(frame, chunks[0]);
        if let Some(data) = chart {
            self.draw_chart(frame, chunks[1], &data);
        }
    }

    fn draw_report(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let text = match self.report_text() {
            Ok(text) => text,
            Err(err) => format!("Sin datos para esta vista:\n{err}"),
        };
        let p = Paragraph::new(text).block(
            Block::default()
                .title(self.tab.title())
                .borders(Borders::ALL),
        );
        frame.render_widget(p, area);
    }

    fn report_text(&self) -> Result<String, AppError> {
        match self.tab {
            Tab::Resumen => crate::report::format_executive_summary(&self.dataset),
            Tab::Demanda => crate::report::format_demand_report(&self.dataset),
            Tab::Zonas => crate::report::format_zones_report(&self.dataset),
            Tab::Sectores => crate::report::format_sector_report(&self.dataset, self.sector),
            Tab::Precios => crate::report::format_prices_report(&self.dataset, Some(self.market)),
        }
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, data: &ChartData) {
        let block = Block::default()
            .title(format!("Real vs Predicho: {}", data.title))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let widget = SeriesChart {
            real: &data.real,
            pred: &data.pred,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: "día",
            y_label: data.y_label.clone(),
            fmt_x: fmt_axis_day,
            fmt_y: fmt_axis_level,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ pestaña  ↑/↓ sector/mercado  r regenerar  q salir";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn chart_data(&self) -> Option<ChartData> {
        let (table, column, y_label) = match self.tab {
            Tab::Resumen | Tab::Zonas => return None,
            Tab::Demanda => (&self.dataset.model1, "Demanda_Total", "MBTUD"),
            Tab::Sectores => (&self.dataset.model2, self.sector.column_name(), "MBTUD"),
            Tab::Precios => (&self.dataset.model1, self.market.column_name(), "USD/MMBtu"),
        };
        let series = table.get(column)?;
        chart_series(series, self.config.sample_step, y_label)
    }
}

struct ChartData {
    title: String,
    real: Vec<(f64, f64)>,
    pred: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    y_label: String,
}

/// Build chart series for Plotters, subsampling dense horizons.
fn chart_series(
    series: &crate::domain::PairedSeries,
    sample_step: usize,
    y_label: &str,
) -> Option<ChartData> {
    let n = series.real.len().min(series.pred.len());
    if n < 2 {
        return None;
    }
    let step = sample_step.max(1);

    let mut real = Vec::with_capacity(n / step + 2);
    let mut pred = Vec::with_capacity(n / step + 2);
    let push = |i: usize, real_acc: &mut Vec<(f64, f64)>, pred_acc: &mut Vec<(f64, f64)>| {
        real_acc.push((i as f64, series.real[i]));
        pred_acc.push((i as f64, series.pred[i]));
    };
    for i in (0..n).step_by(step) {
        push(i, &mut real, &mut pred);
    }
    if real.last().map(|&(x, _)| x as usize) != Some(n - 1) {
        push(n - 1, &mut real, &mut pred);
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in real.iter().chain(pred.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        return None;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    Some(ChartData {
        title: series.name.clone(),
        real,
        pred,
        x_bounds: [0.0, (n - 1) as f64],
        y_bounds: [y_min - pad, y_max + pad],
        y_label: y_label.to_string(),
    })
}

fn fmt_axis_day(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_level(v: f64) -> String {
    if v.abs() >= 10_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else {
        format!("{v:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_cycling_wraps_both_ways() {
        assert_eq!(Tab::Precios.next(), Tab::Resumen);
        assert_eq!(Tab::Resumen.prev(), Tab::Precios);
        let mut tab = Tab::Resumen;
        for _ in 0..Tab::ALL.len() {
            tab = tab.next();
        }
        assert_eq!(tab, Tab::Resumen);
    }

    #[test]
    fn chart_series_subsamples_and_keeps_last_point() {
        let series = crate::domain::PairedSeries {
            name: "Demanda_Total".to_string(),
            real: (0..100).map(|i| 1000.0 + i as f64).collect(),
            pred: (0..100).map(|i| 1000.0 - i as f64).collect(),
        };
        let data = chart_series(&series, 7, "MBTUD").unwrap();
        assert_eq!(data.real.last().map(|&(x, _)| x as usize), Some(99));
        assert_eq!(data.x_bounds, [0.0, 99.0]);
        assert!(data.y_bounds[0] < 901.0 && data.y_bounds[1] > 1099.0);
    }

    #[test]
    fn flat_series_yields_no_chart() {
        let series = crate::domain::PairedSeries {
            name: "X".to_string(),
            real: vec![5.0; 10],
            pred: vec![5.0; 10],
        };
        assert!(chart_series(&series, 1, "USD/MMBtu").is_none());
    }
}
