//! Shared workflows used by the CLI front-ends.
//!
//! Keeping these here lets `pace fit` and `pace simulate` focus on
//! presentation while the TUI drives the same pieces interactively:
//! points -> fit -> per-point checks, and curve -> controller + driver loop.

use std::time::Duration;

use crate::domain::{BASELINE_POINTS, Coefficients, ControlPoint, Curve, PaceConfig, Phase};
use crate::error::AppError;
use crate::fit::fit_points;
use crate::progress::{ManualClock, ProgressController, RateDriver};
use crate::report::{PointCheck, check_points};

/// All computed outputs of a single `pace fit` run.
#[derive(Debug, Clone)]
pub struct FitRun {
    pub points: Vec<ControlPoint>,
    /// Fit at scale 1.
    pub display: Coefficients,
    /// Fit at the requested scale.
    pub rate: Coefficients,
    pub scale: f64,
    pub checks: Vec<PointCheck>,
}

/// Fit `points` (or the baseline when empty) at scale 1 and at `scale`.
///
/// Unlike the interactive store there is no previous curve to fall back to,
/// so fit failures are returned.
pub fn run_fit(points: Vec<ControlPoint>, scale: f64) -> Result<FitRun, AppError> {
    let points = if points.is_empty() {
        BASELINE_POINTS.to_vec()
    } else {
        points
    };

    let display = fit_points(&points, 1.0)?;
    let rate = fit_points(&points, scale)?;
    let checks = check_points(&points, &display);

    Ok(FitRun {
        points,
        display,
        rate,
        scale,
        checks,
    })
}

/// One row of a simulated progress timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineSample {
    pub elapsed: Duration,
    pub progress: f64,
    pub factor: f64,
}

#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub samples: Vec<TimelineSample>,
    pub completed_after: Option<Duration>,
    pub ticks: u64,
    pub final_phase: Phase,
}

/// Run the driver loop headlessly on a manual clock.
///
/// The clock advances by `config.tick` per iteration, so the result is
/// deterministic and independent of machine speed. A sample is recorded
/// every `report_every` ticks and on completion.
pub fn run_simulation(
    curve: &(impl Curve + ?Sized),
    config: &PaceConfig,
    max_duration: Duration,
    report_every: usize,
) -> SimulationRun {
    let clock = ManualClock::new();
    let mut controller = ProgressController::with_clock(config.base_speed, clock.clone());
    let driver = RateDriver::from_config(config);
    let report_every = report_every.max(1) as u64;

    controller.play();
    let mut samples = Vec::new();
    let mut completed_after = None;
    let mut ticks = 0u64;

    while clock.elapsed() < max_duration {
        let tick = driver.tick(&mut controller, curve);
        if ticks % report_every == 0 || tick.completed {
            samples.push(TimelineSample {
                elapsed: clock.elapsed(),
                progress: if tick.completed { controller.current() } else { tick.progress },
                factor: tick.factor,
            });
        }
        if tick.completed {
            completed_after = Some(clock.elapsed());
            break;
        }
        ticks += 1;
        clock.advance(config.tick);
    }

    log::debug!("simulation finished after {ticks} ticks: {:?}", controller.phase());

    SimulationRun {
        samples,
        completed_after,
        ticks,
        final_phase: controller.phase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CurveError;

    #[test]
    fn empty_point_list_fits_the_baseline() {
        let run = run_fit(Vec::new(), 1.0).unwrap();
        assert_eq!(run.points, BASELINE_POINTS.to_vec());
        assert_eq!(run.display.as_slice(), &[1.0, 0.0]);
        assert!(run.checks.iter().all(|c| c.residual.abs() < 1e-9));
    }

    #[test]
    fn duplicate_x_surfaces_as_fit_error() {
        let points = vec![ControlPoint::new(0.5, 0.1), ControlPoint::new(0.5, 0.2)];
        let err = run_fit(points, 1.0).unwrap_err();
        let expected: AppError = CurveError::SingularMatrix { row: 1 }.into();
        assert_eq!(err.exit_code(), expected.exit_code());
    }

    #[test]
    fn constant_full_speed_completes_in_ten_seconds() {
        let config = PaceConfig::default();
        let curve = Coefficients::new(vec![1.0]);
        let run = run_simulation(&curve, &config, Duration::from_secs(60), 50);

        assert_eq!(run.final_phase, Phase::Completed);
        let done = run.completed_after.unwrap();
        assert!(done >= Duration::from_secs(10));
        assert!(done <= Duration::from_secs(10) + config.tick);
        assert_eq!(run.samples.last().map(|s| s.progress), Some(100.0));
    }

    #[test]
    fn slower_curve_takes_longer() {
        let config = PaceConfig::default();
        let fast = run_simulation(&Coefficients::new(vec![1.0]), &config, Duration::from_secs(120), 10);
        let slow = run_simulation(&Coefficients::new(vec![0.25]), &config, Duration::from_secs(120), 10);
        assert!(slow.completed_after.unwrap() > fast.completed_after.unwrap());
    }

    #[test]
    fn stops_at_max_duration_when_unfinished() {
        let config = PaceConfig::default();
        let run = run_simulation(&Coefficients::default(), &config, Duration::from_secs(1), 1);
        assert_eq!(run.completed_after, None);
        assert_eq!(run.final_phase, Phase::Playing);
        assert!(run.samples.windows(2).all(|w| w[0].progress <= w[1].progress));
    }
}
