//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - control points: `o`
//! - fitted curve: `*`
//! - optional progress marker: `X`

use crate::domain::{Coefficients, ControlPoint};

/// Render the curve over the unit domain (widened to include every point).
///
/// `marker` is a progress value in `[0, 100]`, drawn on the curve at
/// `x = marker / 100`.
pub fn render_ascii_plot(
    points: &[ControlPoint],
    curve: &Coefficients,
    marker: Option<f64>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(points);
    let samples = sample_curve(curve, x_min, x_max, width);
    let marker = marker.map(|p| {
        let x = (p / 100.0).clamp(0.0, 1.0);
        (x, curve.evaluate(x))
    });

    let (y_min, y_max) = y_range(points, &samples, marker).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points and the marker overlay it.
    draw_curve(&mut grid, &samples, x_min, x_max, y_min, y_max);

    for p in points {
        let x = map_x(p.x, x_min, x_max, width);
        let y = map_y(p.y, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    if let Some((mx, my)) = marker {
        let x = map_x(mx, x_min, x_max, width);
        let y = map_y(my, y_min, y_max, height);
        grid[y][x] = 'X';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.3}, {y_max:.3}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Sample `curve` at `n` evenly spaced x-values in `[x_min, x_max]`.
pub fn sample_curve(curve: &Coefficients, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x_min + u * (x_max - x_min);
            (x, curve.evaluate(x))
        })
        .collect()
}

fn x_range(points: &[ControlPoint]) -> (f64, f64) {
    let mut min_x: f64 = 0.0;
    let mut max_x: f64 = 1.0;
    for p in points.iter().filter(|p| p.x.is_finite()) {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
    }
    (min_x, max_x)
}

fn y_range(
    points: &[ControlPoint],
    curve: &[(f64, f64)],
    marker: Option<(f64, f64)>,
) -> Option<(f64, f64)> {
    let ys = points
        .iter()
        .map(|p| p.y)
        .chain(curve.iter().map(|&(_, y)| y))
        .chain(marker.map(|(_, y)| y))
        .filter(|y| y.is_finite());

    let (min_y, max_y) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
        (lo.min(y), hi.max(y))
    });

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, cx, cy, '*');
        } else {
            grid[cy][cx] = '*';
        }
        prev = Some((cx, cy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
