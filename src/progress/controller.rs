//! Rate-modulated progress scalar.
//!
//! The value is never stored per frame. It is derived on read from the last
//! committed value and the time elapsed since the last control action:
//!
//! ```text
//! candidate = value + span · elapsed · speed
//! current   = target            if |candidate − value| > |target − value|
//!           = candidate         otherwise
//! ```
//!
//! `span` is the distance of the segment installed by the last `set_next`.
//! Every action that changes the motion (pause, speed change, new target)
//! first commits `value = current()` and restarts the elapsed timer, so the
//! value is continuous and never moves backwards.

use std::time::Instant;

use crate::domain::Phase;
use crate::progress::clock::{Clock, SystemClock};

/// Upper end of the progress range.
pub const PROGRESS_MAX: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct ProgressController<C: Clock = SystemClock> {
    clock: C,
    value: f64,
    target: f64,
    span: f64,
    start: Instant,
    base_speed: f64,
    speed: f64,
    phase: Phase,
}

impl ProgressController<SystemClock> {
    pub fn new(base_speed: f64) -> Self {
        Self::with_clock(base_speed, SystemClock)
    }
}

impl<C: Clock> ProgressController<C> {
    pub fn with_clock(base_speed: f64, clock: C) -> Self {
        let start = clock.now();
        Self {
            clock,
            value: 0.0,
            target: 0.0,
            span: 0.0,
            start,
            base_speed,
            speed: base_speed,
            phase: Phase::Idle,
        }
    }

    /// Progress right now, in `[0, 100]`.
    pub fn current(&self) -> f64 {
        if self.phase != Phase::Playing {
            return self.value;
        }
        let distance = self.target - self.value;
        let elapsed = self.clock.now().saturating_duration_since(self.start).as_secs_f64();
        let candidate = self.value + self.span * elapsed * self.speed;
        if (candidate - self.value).abs() > distance.abs() {
            self.target
        } else {
            candidate
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Last committed value (not advanced by elapsed time).
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Effective speed: base speed times the last accepted factor.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn base_speed(&self) -> f64 {
        self.base_speed
    }

    /// Start or resume advancing toward 100.
    ///
    /// Playing from a finished state restarts at 0 first.
    pub fn play(&mut self) {
        match self.phase {
            Phase::Playing => return,
            Phase::Completed => self.restart(),
            Phase::Idle | Phase::Paused if self.value >= PROGRESS_MAX => self.restart(),
            Phase::Idle | Phase::Paused => {}
        }

        if self.phase == Phase::Idle {
            self.set_next(PROGRESS_MAX);
        } else {
            // Resume from the frozen value toward the retained target.
            self.start = self.clock.now();
        }
        self.phase = Phase::Playing;
        log::debug!("progress: play from {:.3} toward {:.1}", self.value, self.target);
    }

    /// Freeze at the exact current value; the target is kept.
    pub fn pause(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.commit();
        self.phase = Phase::Paused;
        log::debug!("progress: paused at {:.3}", self.value);
    }

    /// Back to 0 and idle; does not start playback.
    pub fn restart(&mut self) {
        self.value = 0.0;
        self.target = 0.0;
        self.span = 0.0;
        self.start = self.clock.now();
        self.phase = Phase::Idle;
        log::debug!("progress: restart");
    }

    /// Install a new target without a discontinuity.
    pub fn set_next(&mut self, target: f64) {
        self.commit();
        self.target = target;
        self.span = target - self.value;
    }

    /// Set `speed = base_speed · factor`.
    ///
    /// Callers clamp `factor` into a positive range; zero, negative and
    /// non-finite factors would stall progress and are ignored.
    pub fn set_speed_factor(&mut self, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            log::warn!("progress: ignoring speed factor {factor}");
            return;
        }
        self.commit();
        self.speed = self.base_speed * factor;
    }

    /// Mark playback as finished once the value reaches 100.
    ///
    /// Returns true on the transition into `Completed`.
    pub fn settle(&mut self) -> bool {
        if self.phase != Phase::Playing || self.current() < PROGRESS_MAX {
            return false;
        }
        self.value = PROGRESS_MAX;
        self.target = PROGRESS_MAX;
        self.start = self.clock.now();
        self.phase = Phase::Completed;
        log::debug!("progress: completed");
        true
    }

    fn commit(&mut self) {
        self.value = self.current();
        self.start = self.clock.now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::clock::ManualClock;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::time::Duration;

    fn controller() -> (ProgressController<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (ProgressController::with_clock(0.1, clock.clone()), clock)
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn idle_controller_reads_zero() {
        let (c, clock) = controller();
        clock.advance(secs(5.0));
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.current(), 0.0);
    }

    #[test]
    fn play_advances_linearly_and_caps_at_target() {
        let (mut c, clock) = controller();
        c.play();
        for t in [0.5, 2.0, 7.5] {
            clock.advance(secs(t) - clock.elapsed());
            assert_abs_diff_eq!(c.current(), 100.0 * 0.1 * t, epsilon = 1e-9);
        }
        clock.advance(secs(20.0));
        assert_eq!(c.current(), 100.0);
    }

    #[test]
    fn pause_freezes_exact_value_and_resume_continues() {
        let (mut c, clock) = controller();
        c.play();
        clock.advance(secs(3.0));
        let at_pause = c.current();
        c.pause();
        assert_eq!(c.phase(), Phase::Paused);
        assert_eq!(c.current(), at_pause);
        assert_eq!(c.target(), 100.0);

        clock.advance(secs(4.0));
        assert_eq!(c.current(), at_pause);

        c.play();
        assert_eq!(c.current(), at_pause);
        clock.advance(secs(1.0));
        assert_abs_diff_eq!(c.current(), at_pause + 10.0, epsilon = 1e-9);
    }

    #[test]
    fn restart_reads_zero_from_any_state() {
        let (mut c, clock) = controller();
        c.restart();
        assert_eq!(c.current(), 0.0);

        c.play();
        clock.advance(secs(2.0));
        c.restart();
        assert_eq!(c.current(), 0.0);
        assert_eq!(c.phase(), Phase::Idle);

        c.play();
        clock.advance(secs(2.0));
        c.pause();
        c.restart();
        assert_eq!(c.current(), 0.0);

        c.play();
        clock.advance(secs(30.0));
        assert!(c.settle());
        c.restart();
        assert_eq!(c.current(), 0.0);
        assert_eq!(c.target(), 0.0);
    }

    #[test]
    fn settle_clamps_to_exactly_one_hundred() {
        let (mut c, clock) = controller();
        c.play();
        clock.advance(secs(9.0));
        assert!(!c.settle());
        clock.advance(secs(5.0));
        assert!(c.settle());
        assert_eq!(c.phase(), Phase::Completed);
        assert_eq!(c.current(), 100.0);
        clock.advance(secs(5.0));
        assert_eq!(c.current(), 100.0);
        assert!(!c.settle());
    }

    #[test]
    fn play_after_completion_starts_over() {
        let (mut c, clock) = controller();
        c.play();
        clock.advance(secs(15.0));
        c.settle();

        c.play();
        assert_eq!(c.phase(), Phase::Playing);
        assert_eq!(c.current(), 0.0);
        clock.advance(secs(1.0));
        assert_abs_diff_eq!(c.current(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn play_when_paused_at_one_hundred_starts_over() {
        let (mut c, clock) = controller();
        c.play();
        clock.advance(secs(12.0));
        c.pause();
        assert_eq!(c.value(), 100.0);
        c.play();
        assert_eq!(c.current(), 0.0);
    }

    #[test]
    fn set_next_mid_flight_is_continuous() {
        let (mut c, clock) = controller();
        c.play();
        clock.advance(secs(2.0));
        let before = c.current();
        c.set_next(50.0);
        assert_eq!(c.current(), before);
        assert_eq!(c.target(), 50.0);
        clock.advance(secs(60.0));
        assert_eq!(c.current(), 50.0);
    }

    #[test]
    fn speed_factor_scales_velocity_without_jumps() {
        let (mut c, clock) = controller();
        c.play();
        clock.advance(secs(1.0));
        let before = c.current();
        c.set_speed_factor(0.5);
        assert_eq!(c.current(), before);
        assert_abs_diff_eq!(c.speed(), 0.05, epsilon = 1e-12);
        clock.advance(secs(2.0));
        assert_abs_diff_eq!(c.current(), before + 10.0, epsilon = 1e-9);
    }

    #[test]
    fn non_positive_factors_are_ignored() {
        let (mut c, _clock) = controller();
        c.set_speed_factor(0.0);
        c.set_speed_factor(-1.0);
        c.set_speed_factor(f64::NAN);
        assert_eq!(c.speed(), 0.1);
    }

    #[test]
    fn current_is_monotone_under_changing_speeds() {
        let (mut c, clock) = controller();
        let mut rng = StdRng::seed_from_u64(11);
        c.play();
        let mut last = c.current();
        for _ in 0..2_000 {
            clock.advance(Duration::from_millis(rng.gen_range(1..40)));
            c.set_speed_factor(rng.gen_range(0.001..=1.0));
            let now = c.current();
            assert!(now >= last, "went backwards: {last} -> {now}");
            assert!(now <= c.target());
            last = now;
        }
    }
}
