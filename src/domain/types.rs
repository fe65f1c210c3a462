//! Shared domain types.
//!
//! These types are intentionally kept small and copyable so they can be:
//!
//! - mutated by the point store during editing
//! - handed to the progress driver as an immutable snapshot
//! - printed/serialized by the CLI front-end

use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::evaluate;

/// A user-placed coordinate the fitted curve must pass through.
///
/// Coordinates are conventionally in `[0, 1]` but the fitter does not enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
}

impl ControlPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Multiply both axes by `scale`.
    pub fn scaled(self, scale: f64) -> Self {
        Self::new(self.x * scale, self.y * scale)
    }

    /// Clamp both axes into the unit square.
    pub fn clamped_unit(self) -> Self {
        Self::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }
}

/// Seed used when a fit is requested on an empty store: the identity line.
pub const BASELINE_POINTS: [ControlPoint; 2] =
    [ControlPoint::new(0.0, 0.0), ControlPoint::new(1.0, 1.0)];

/// Polynomial coefficients, highest retained degree first, constant term last.
///
/// Values produced by the fitter are rounded to 5 decimals and carry no
/// leading zeros; an empty list is the zero polynomial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coefficients(Vec<f64>);

impl Coefficients {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Effective degree, `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.0.len().checked_sub(1)
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        evaluate(&self.0, x)
    }
}

/// Anything that maps a position to a value; the progress driver only ever
/// sees the curve through this trait.
pub trait Curve {
    fn sample(&self, x: f64) -> f64;
}

impl Curve for Coefficients {
    fn sample(&self, x: f64) -> f64 {
        self.evaluate(x)
    }
}

/// One complete, immutable result of a refit.
///
/// The store swaps snapshots wholesale, so readers never see a point set whose
/// coefficients have not been recomputed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSnapshot {
    /// Points the coefficients were fitted from.
    pub points: Vec<ControlPoint>,
    /// Fit at scale 1, used for drawing and for projected inserts.
    pub display: Coefficients,
    /// Fit at the configured polynomial scale, used as the velocity profile.
    pub rate: Coefficients,
    /// Increments on every successful publish.
    pub revision: u64,
}

impl Curve for CurveSnapshot {
    fn sample(&self, x: f64) -> f64 {
        self.rate.evaluate(x)
    }
}

/// Lifecycle of the progress scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    Paused,
    Completed,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Playing => "playing",
            Phase::Paused => "paused",
            Phase::Completed => "completed",
        }
    }
}

/// How a click on empty surface turns into a new control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SocketStrategy {
    /// Keep the pointer's x but place the point on the current curve (no visible jump).
    PointToCurve,
    /// Insert the pointer position as-is and bend the curve through it.
    CurveToPoint,
}

impl SocketStrategy {
    pub fn toggled(self) -> Self {
        match self {
            SocketStrategy::PointToCurve => SocketStrategy::CurveToPoint,
            SocketStrategy::CurveToPoint => SocketStrategy::PointToCurve,
        }
    }
}

/// How pointer motion updates the active control point while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DragModel {
    /// Accumulate per-sample pointer deltas onto the point's position.
    Relative,
    /// Recompute the point from the pointer position inside the surface.
    Absolute,
}

impl DragModel {
    pub fn toggled(self) -> Self {
        match self {
            DragModel::Relative => DragModel::Absolute,
            DragModel::Absolute => DragModel::Relative,
        }
    }
}

/// Runtime configuration shared by every front-end.
#[derive(Debug, Clone, PartialEq)]
pub struct PaceConfig {
    /// Fraction of a segment covered per second at speed factor 1.
    pub base_speed: f64,
    /// Smallest speed factor the driver may apply (must stay above zero).
    pub rate_floor: f64,
    /// Largest speed factor the driver may apply.
    pub rate_ceiling: f64,
    /// Driver cadence.
    pub tick: Duration,
    /// Uniform rescale applied to both axes before fitting the rate curve.
    pub scale: f64,
    pub socket_strategy: SocketStrategy,
    pub drag_model: DragModel,
}

impl Default for PaceConfig {
    fn default() -> Self {
        Self {
            base_speed: 0.1,
            rate_floor: 0.001,
            rate_ceiling: 1.0,
            tick: Duration::from_millis(16),
            scale: 1.0,
            socket_strategy: SocketStrategy::PointToCurve,
            drag_model: DragModel::Relative,
        }
    }
}

impl PaceConfig {
    /// Reject settings that would stall progress or produce a degenerate fit.
    pub fn validate(self) -> Result<Self, AppError> {
        if !(self.base_speed.is_finite() && self.base_speed > 0.0) {
            return Err(AppError::new(
                2,
                format!("base speed must be positive, got {}", self.base_speed),
            ));
        }
        if !(self.rate_floor.is_finite() && self.rate_floor > 0.0) {
            return Err(AppError::new(
                2,
                format!(
                    "rate floor must be strictly positive (a zero floor stalls progress), got {}",
                    self.rate_floor
                ),
            ));
        }
        if !(self.rate_ceiling.is_finite() && self.rate_ceiling >= self.rate_floor) {
            return Err(AppError::new(
                2,
                format!(
                    "rate ceiling must be >= rate floor ({}), got {}",
                    self.rate_floor, self.rate_ceiling
                ),
            ));
        }
        if self.tick.is_zero() {
            return Err(AppError::new(2, "tick interval must be non-zero"));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(AppError::new(
                2,
                format!("polynomial scale must be positive, got {}", self.scale),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PaceConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_rate_floor_is_rejected() {
        let config = PaceConfig {
            rate_floor: 0.0,
            ..PaceConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn ceiling_below_floor_is_rejected() {
        let config = PaceConfig {
            rate_floor: 0.5,
            rate_ceiling: 0.25,
            ..PaceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_coefficients_have_no_degree() {
        let c = Coefficients::default();
        assert_eq!(c.degree(), None);
        assert_eq!(c.sample(0.3), 0.0);
    }
}
