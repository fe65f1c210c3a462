//! Reporting utilities: per-point checks and formatted terminal output.

use serde::Serialize;

use crate::domain::{Coefficients, ControlPoint};

pub mod format;

pub use format::*;

/// How closely the fitted curve passes through one control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointCheck {
    pub point: ControlPoint,
    pub fitted: f64,
    pub residual: f64,
}

/// Evaluate `coefficients` at every control point.
pub fn check_points(points: &[ControlPoint], coefficients: &Coefficients) -> Vec<PointCheck> {
    points
        .iter()
        .map(|&point| {
            let fitted = coefficients.evaluate(point.x);
            PointCheck {
                point,
                fitted,
                residual: point.y - fitted,
            }
        })
        .collect()
}

/// Largest absolute residual, 0 for an empty list.
pub fn max_abs_residual(checks: &[PointCheck]) -> f64 {
    checks.iter().map(|c| c.residual.abs()).fold(0.0, f64::max)
}
