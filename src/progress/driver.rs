//! The feedback loop between the published curve and the progress controller.
//!
//! On every tick the driver:
//!
//! 1. settles completion (progress reached 100)
//! 2. samples the curve at `current / 100`
//! 3. clamps the sample into `[floor, ceiling]`
//! 4. feeds it back as the controller's speed factor
//!
//! The driver only ever sees the curve through the `Curve` trait; it never
//! touches control points.

use crate::domain::{Curve, PaceConfig};
use crate::progress::clock::Clock;
use crate::progress::controller::{PROGRESS_MAX, ProgressController};

/// Default lower bound on the speed factor. Zero would stall forever.
pub const DEFAULT_RATE_FLOOR: f64 = 0.001;
pub const DEFAULT_RATE_CEILING: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateDriver {
    floor: f64,
    ceiling: f64,
}

/// What happened during one driver tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverTick {
    /// Progress read at the start of the tick.
    pub progress: f64,
    /// Clamped factor fed back to the controller.
    pub factor: f64,
    /// True on the tick that moved the controller into `Completed`.
    pub completed: bool,
}

impl Default for RateDriver {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_FLOOR, DEFAULT_RATE_CEILING)
    }
}

impl RateDriver {
    /// `floor` must be positive and not above `ceiling` (see `PaceConfig::validate`).
    pub fn new(floor: f64, ceiling: f64) -> Self {
        Self { floor, ceiling }
    }

    pub fn from_config(config: &PaceConfig) -> Self {
        Self::new(config.rate_floor, config.rate_ceiling)
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    /// Clamp a raw curve sample into the allowed factor range.
    ///
    /// Non-finite samples (a wildly extrapolated curve) fall back to the floor.
    pub fn clamp_factor(&self, raw: f64) -> f64 {
        if raw.is_nan() {
            return self.floor;
        }
        raw.clamp(self.floor, self.ceiling)
    }

    pub fn tick<C: Clock>(
        &self,
        controller: &mut ProgressController<C>,
        curve: &(impl Curve + ?Sized),
    ) -> DriverTick {
        let progress = controller.current();
        let completed = controller.settle();

        let factor = self.clamp_factor(curve.sample(progress.min(PROGRESS_MAX) / PROGRESS_MAX));
        controller.set_speed_factor(factor);

        DriverTick {
            progress,
            factor,
            completed,
        }
    }
}
