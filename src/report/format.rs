//! Formatted terminal output for fits and simulations.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (and covered by string tests)

use serde::Serialize;

use crate::app::pipeline::{FitRun, SimulationRun};
use crate::domain::{Coefficients, ControlPoint};
use crate::error::AppError;
use crate::report::{PointCheck, max_abs_residual};

/// Render coefficients as a readable polynomial, e.g. `0.5x^2 - x + 0.25`.
pub fn format_polynomial(coefficients: &Coefficients) -> String {
    let Some(degree) = coefficients.degree() else {
        return "0".to_string();
    };

    let mut out = String::new();
    for (i, &c) in coefficients.as_slice().iter().enumerate() {
        let power = degree - i;
        // Interior zeros carry no information; the leading one never exists.
        if c == 0.0 && !(out.is_empty() && power == 0) {
            continue;
        }

        let magnitude = c.abs();
        if out.is_empty() {
            if c < 0.0 {
                out.push('-');
            }
        } else {
            out.push_str(if c < 0.0 { " - " } else { " + " });
        }

        let show_magnitude = magnitude != 1.0 || power == 0;
        if show_magnitude {
            out.push_str(&fmt_num(magnitude));
        }
        match power {
            0 => {}
            1 => out.push('x'),
            _ => out.push_str(&format!("x^{power}")),
        }
    }

    if out.is_empty() { "0".to_string() } else { out }
}

/// Format the `pace fit` summary: coefficients, polynomial and point checks.
pub fn format_fit_summary(run: &FitRun) -> String {
    let mut out = String::new();

    out.push_str("=== pace - polynomial curve fit ===\n");
    out.push_str(&format!("Points: n={}\n", run.points.len()));
    out.push_str(&format!(
        "Degree: {}\n",
        run.display
            .degree()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    out.push_str(&format!("Coefficients: {}\n", fmt_vec(run.display.as_slice())));
    out.push_str(&format!("y(x) = {}\n", format_polynomial(&run.display)));
    if run.scale != 1.0 {
        out.push_str(&format!(
            "Rate curve (scale {}): {}\n",
            fmt_num(run.scale),
            format_polynomial(&run.rate)
        ));
    }

    out.push_str("\nPoint checks:\n");
    out.push_str(&format_checks(&run.checks));
    out.push_str(&format!("max |residual| = {:.2e}\n", max_abs_residual(&run.checks)));

    out
}

/// Format the per-point table.
pub fn format_checks(checks: &[PointCheck]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>3}  {:>10}  {:>10}  {:>10}  {:>10}\n",
        "#", "x", "y", "fit", "residual"
    ));
    for (i, c) in checks.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:>10.5}  {:>10.5}  {:>10.5}  {:>10.2e}\n",
            i, c.point.x, c.point.y, c.fitted, c.residual
        ));
    }
    out
}

/// Format a simulated progress timeline.
pub fn format_timeline(run: &SimulationRun) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>9}  {:>9}  {:>7}  progress\n", "t (s)", "value", "factor"));
    for s in &run.samples {
        let filled = (s.progress / 100.0 * 30.0).round().clamp(0.0, 30.0) as usize;
        out.push_str(&format!(
            "{:>9.3}  {:>9.3}  {:>7.4}  [{}{}]\n",
            s.elapsed.as_secs_f64(),
            s.progress,
            s.factor,
            "#".repeat(filled),
            " ".repeat(30 - filled),
        ));
    }

    match run.completed_after {
        Some(t) => out.push_str(&format!(
            "\nCompleted after {:.3}s ({} ticks).\n",
            t.as_secs_f64(),
            run.ticks
        )),
        None => out.push_str(&format!(
            "\nNot completed ({} ticks, state: {}).\n",
            run.ticks,
            run.final_phase.label()
        )),
    }
    out
}

#[derive(Serialize)]
struct FitJson<'a> {
    points: &'a [ControlPoint],
    coefficients: &'a Coefficients,
    rate_coefficients: &'a Coefficients,
    scale: f64,
    polynomial: String,
    checks: &'a [PointCheck],
}

/// Machine-readable fit output for `pace fit --json`.
pub fn format_fit_json(run: &FitRun) -> Result<String, AppError> {
    let doc = FitJson {
        points: &run.points,
        coefficients: &run.display,
        rate_coefficients: &run.rate,
        scale: run.scale,
        polynomial: format_polynomial(&run.display),
        checks: &run.checks,
    };
    serde_json::to_string_pretty(&doc)
        .map_err(|e| AppError::new(4, format!("Failed to encode fit as JSON: {e}")))
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| fmt_num(*v)).collect();
    format!("[{}]", parts.join(", "))
}

/// Print with up to 5 decimals, trimming trailing zeros.
fn fmt_num(v: f64) -> String {
    let s = format!("{v:.5}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
