//! Ratatui-based interactive curve editor.
//!
//! The chart is the editing surface: sockets (control points) are grabbed,
//! dragged, added and removed with the mouse, and a progress marker rides along
//! the fitted curve while the driver modulates its speed.

use std::io;
use std::time::Instant;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Terminal,
};

use crate::domain::{ControlPoint, CurveSnapshot, PaceConfig, Phase, SocketStrategy};
use crate::error::{AppError, CurveError};
use crate::progress::{ProgressController, RateDriver, PROGRESS_MAX};
use crate::store::ControlPointStore;

mod plotters_chart;
pub mod pointer;

use plotters_chart::CurveChart;
use pointer::{DragTracker, Surface};

/// Arrow-key nudge, in unit-square coordinates.
const NUDGE_STEP: f64 = 0.02;

/// Polynomial scale change per `+` / `-` press; also the smallest scale.
const SCALE_STEP: f64 = 0.25;

/// Curve samples drawn across the surface.
const CURVE_SAMPLES: usize = 200;

/// Start the editor with `points` (empty means the baseline line).
pub fn run(points: Vec<ControlPoint>, config: PaceConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(points, config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen, mouse) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

struct App {
    config: PaceConfig,
    store: ControlPointStore,
    progress: ProgressController,
    driver: RateDriver,
    surface: Surface,
    drag: DragTracker,
    selected: Option<usize>,
    factor: f64,
    status: String,
}

impl App {
    fn new(points: Vec<ControlPoint>, config: PaceConfig) -> Self {
        let store = ControlPointStore::with_points(points, config.scale);
        let status = match store.last_error() {
            Some(err) => format!("Initial points not solvable: {err}"),
            None => "Space to play. Right click to add a socket.".to_string(),
        };
        Self {
            progress: ProgressController::new(config.base_speed),
            driver: RateDriver::from_config(&config),
            surface: Surface::default(),
            drag: DragTracker::default(),
            selected: None,
            factor: 1.0,
            store,
            status,
            config,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        let mut next_tick = Instant::now();
        loop {
            let now = Instant::now();
            if now >= next_tick {
                needs_redraw |= self.on_tick();
                next_tick = now + self.config.tick;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            let timeout = next_tick.saturating_duration_since(Instant::now());
            if !event::poll(timeout).map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Mouse(mouse) => {
                    needs_redraw |= self.handle_mouse(mouse);
                }
                Event::Resize(_, _) => {
                    // Layout is recomputed on draw; the refit republishes the curve.
                    if let Err(err) = self.store.refresh() {
                        self.status = format!("Refit failed: {err}");
                    }
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// One driver step. Returns true when the screen changed.
    fn on_tick(&mut self) -> bool {
        let was_playing = self.progress.is_playing();
        let tick = self.driver.tick(&mut self.progress, self.store.current());
        self.factor = tick.factor;
        if tick.completed {
            self.status = "Completed. Space to play again.".to_string();
        }
        was_playing
    }

    /// Returns true when the editor should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char(' ') => {
                if self.progress.is_playing() {
                    self.progress.pause();
                    self.status = format!("Paused at {:.1}.", self.progress.current());
                } else {
                    self.progress.play();
                    self.status = "Playing.".to_string();
                }
            }
            KeyCode::Char('r') => {
                self.progress.restart();
                self.status = "Restarted.".to_string();
            }
            KeyCode::Char('s') => {
                self.config.socket_strategy = self.config.socket_strategy.toggled();
                self.status = format!("socket strategy: {}", strategy_label(self.config.socket_strategy));
            }
            KeyCode::Char('d') => {
                self.config.drag_model = self.config.drag_model.toggled();
                self.status = format!("drag model: {:?}", self.config.drag_model);
            }
            KeyCode::Char('a') => {
                let x = widest_gap_midpoint(self.store.points());
                self.insert_projected(x);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.step_scale(SCALE_STEP),
            KeyCode::Char('-') => self.step_scale(-SCALE_STEP),
            KeyCode::Tab => self.select_step(1),
            KeyCode::BackTab => self.select_step(-1),
            KeyCode::Left => self.nudge(-NUDGE_STEP, 0.0),
            KeyCode::Right => self.nudge(NUDGE_STEP, 0.0),
            KeyCode::Up => self.nudge(0.0, NUDGE_STEP),
            KeyCode::Down => self.nudge(0.0, -NUDGE_STEP),
            KeyCode::Delete | KeyCode::Backspace => {
                if let Some(index) = self.selected {
                    self.remove_at(index);
                }
            }
            _ => {}
        }
        false
    }

    /// Returns true when the screen changed.
    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let (col, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !self.surface.contains(col, row) {
                    return false;
                }
                let Some(index) = self.surface.hit_test(self.store.points(), col, row) else {
                    return false;
                };
                if self.store.activate(index).is_ok() {
                    self.drag.begin(col, row);
                    self.selected = Some(index);
                    self.status = format!("Dragging socket {index}.");
                }
                true
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                // Keeps following outside the surface until the button is released.
                let Some(index) = self.store.active().filter(|_| self.drag.is_dragging()) else {
                    return false;
                };
                let current = self.store.points()[index];
                let next = self.drag.follow(self.config.drag_model, &self.surface, current, col, row);
                if let Err(err) = self.store.drag_to(next) {
                    self.status = format!("Refit failed: {err}");
                }
                true
            }
            MouseEventKind::Up(MouseButton::Left) => {
                // Release wherever the pointer ended up, inside the surface or not.
                if self.store.active().is_none() && !self.drag.is_dragging() {
                    return false;
                }
                self.store.release();
                self.drag.end();
                self.status = "Released.".to_string();
                true
            }
            MouseEventKind::Down(MouseButton::Right) => {
                if !self.surface.contains(col, row) {
                    return false;
                }
                if let Some(index) = self.surface.hit_test(self.store.points(), col, row) {
                    self.remove_at(index);
                    return true;
                }
                let at = self.surface.to_unit(col, row);
                match self.config.socket_strategy {
                    SocketStrategy::PointToCurve => self.insert_projected(at.x),
                    SocketStrategy::CurveToPoint => self.insert_at(at),
                }
                true
            }
            _ => false,
        }
    }

    fn insert_at(&mut self, point: ControlPoint) {
        let result = self.store.add(point);
        self.report_insert(point, result);
    }

    /// Insert on the current curve at `x`; the curve keeps its shape.
    fn insert_projected(&mut self, x: f64) {
        let (point, result) = self.store.add_projected(x);
        self.report_insert(point, result);
    }

    fn report_insert(&mut self, point: ControlPoint, result: Result<(), CurveError>) {
        match result {
            Ok(()) => self.status = format!("Added socket at ({:.3}, {:.3}).", point.x, point.y),
            Err(err) => self.status = format!("Added socket, refit failed: {err}"),
        }
        self.selected = Some(self.store.len() - 1);
    }

    fn remove_at(&mut self, index: usize) {
        match self.store.remove(index) {
            Ok(()) => self.status = format!("Removed socket {index}."),
            Err(err) => self.status = format!("Removed socket {index}, refit failed: {err}"),
        }
        self.selected = None;
    }

    fn step_scale(&mut self, delta: f64) {
        let scale = (self.store.scale() + delta).max(SCALE_STEP);
        self.config.scale = scale;
        match self.store.set_scale(scale) {
            Ok(()) => self.status = format!("scale: {scale}"),
            Err(err) => self.status = format!("scale: {scale}, refit failed: {err}"),
        }
    }

    fn select_step(&mut self, step: isize) {
        let len = self.store.len();
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(cycle_index(self.selected, step, len));
    }

    fn nudge(&mut self, dx: f64, dy: f64) {
        let Some(index) = self.selected.filter(|&i| i < self.store.len()) else {
            self.status = "No socket selected (Tab to select).".to_string();
            return;
        };
        let p = self.store.points()[index];
        let moved = ControlPoint::new(p.x + dx, p.y + dy).clamped_unit();
        match self.store.move_point(index, moved) {
            Ok(()) => self.status = format!("Socket {index} at ({:.3}, {:.3}).", moved.x, moved.y),
            Err(err) => self.status = format!("Refit failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
        self.draw_gauge(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let snapshot = self.store.current();
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("pace", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                " | y(x) = {}",
                crate::report::format_polynomial(&snapshot.display)
            )),
        ]));

        let mut info = vec![Span::styled(
            format!(
                "phase: {} | factor: {:.3} | strategy: {} | drag: {:?} | scale: {}",
                self.progress.phase().label(),
                self.factor,
                strategy_label(self.config.socket_strategy),
                self.config.drag_model,
                self.store.scale(),
            ),
            Style::default().fg(Color::Gray),
        )];
        if let Some(err) = self.store.last_error() {
            info.push(Span::raw(" | "));
            info.push(Span::styled(format!("{err}"), Style::default().fg(Color::Red)));
        }
        lines.push(Line::from(info));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Rate curve").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let (chart_rect, insets) = chart_layout(inner);
        self.surface = Surface::new(chart_rect);

        let snapshot = self.store.current();
        let (curve, points) = chart_series(snapshot, CURVE_SAMPLES);
        let selected = self
            .store
            .active()
            .or(self.selected)
            .and_then(|i| self.store.points().get(i))
            .map(|p| (p.x, p.y));
        let marker = match self.progress.phase() {
            Phase::Idle => None,
            _ => Some((self.progress.current() / PROGRESS_MAX).clamp(0.0, 1.0)),
        };

        let widget = CurveChart {
            curve: &curve,
            points: &points,
            selected,
            marker,
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 1.0],
        };
        frame.render_widget(widget, chart_rect);

        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets);
        }
    }

    fn draw_gauge(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let value = self.progress.current().clamp(0.0, PROGRESS_MAX);
        let gauge = Gauge::default()
            .block(Block::default().title("Progress").borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(value / PROGRESS_MAX)
            .label(format!("{value:.1} / {PROGRESS_MAX:.0}"));
        frame.render_widget(gauge, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "space play/pause  r restart  s strategy  d drag  a add  +/- scale  Tab select  ←↑↓→ nudge  Del remove  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn strategy_label(strategy: SocketStrategy) -> &'static str {
    match strategy {
        SocketStrategy::PointToCurve => "point-to-curve",
        SocketStrategy::CurveToPoint => "curve-to-point",
    }
}

/// Next index after `current` moving by `step`, wrapping around `len`.
fn cycle_index(current: Option<usize>, step: isize, len: usize) -> usize {
    let len = len as isize;
    let next = match current {
        Some(i) => i as isize + step,
        None if step >= 0 => 0,
        None => len - 1,
    };
    next.rem_euclid(len) as usize
}

/// Midpoint of the widest x-gap in `[0, 1]` not yet covered by a socket.
fn widest_gap_midpoint(points: &[ControlPoint]) -> f64 {
    let mut xs: Vec<f64> = points
        .iter()
        .map(|p| p.x.clamp(0.0, 1.0))
        .filter(|x| x.is_finite())
        .collect();
    xs.push(0.0);
    xs.push(1.0);
    xs.sort_by(f64::total_cmp);

    xs.windows(2)
        .max_by(|a, b| (a[1] - a[0]).total_cmp(&(b[1] - b[0])))
        .map(|w| 0.5 * (w[0] + w[1]))
        .unwrap_or(0.5)
}

/// Sample the display curve over `[0, 1]` and clip it into the unit square.
fn chart_series(snapshot: &CurveSnapshot, n: usize) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let curve = crate::plot::sample_curve(&snapshot.display, 0.0, 1.0, n)
        .into_iter()
        .filter(|(_, y)| y.is_finite())
        .map(|(x, y)| (x, y.clamp(0.0, 1.0)))
        .collect();
    let points = snapshot
        .points
        .iter()
        .map(|p| (p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0)))
        .collect();
    (curve, points)
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
        left: 5,
        right: 2,
        top: 1,
        bottom: 1,
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

fn draw_axis_ticks(frame: &mut ratatui::Frame<'_>, inner: Rect, chart: Rect, insets: AxisInsets) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format!("{u:.2}");
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height {
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
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{u:.2}");
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

    let title = Paragraph::new("x: progress / 100   y: speed factor")
        .alignment(Alignment::Right)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let title_rect = Rect {
        x: chart.x,
        y: inner.y,
        width: chart.width,
        height: 1,
    };
    frame.render_widget(title, title_rect);
}
