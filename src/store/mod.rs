//! Ordered, mutable set of user-placed control points.
//!
//! The store owns the point sequence and its mutation policy. Every edit is
//! followed by a synchronous refit; a successful fit replaces the published
//! `CurveSnapshot` wholesale (single writer, readers hold an `Rc`).
//!
//! Fit failures are fail-soft: the edit is kept so the user sees it, the
//! previous snapshot stays published, and the error is remembered for display.

use std::rc::Rc;

use crate::domain::{BASELINE_POINTS, Coefficients, ControlPoint, CurveSnapshot};
use crate::error::CurveError;
use crate::fit::fit_points;

#[derive(Debug, Clone)]
pub struct ControlPointStore {
    points: Vec<ControlPoint>,
    scale: f64,
    snapshot: Rc<CurveSnapshot>,
    last_error: Option<CurveError>,
    active: Option<usize>,
}

impl ControlPointStore {
    /// Empty store; the first fit seeds it with the baseline line.
    pub fn new(scale: f64) -> Self {
        Self::with_points(Vec::new(), scale)
    }

    /// Store pre-populated with `points`.
    ///
    /// If they cannot be fitted, the baseline curve is published until an
    /// edit makes them solvable (see `last_error`).
    pub fn with_points(points: Vec<ControlPoint>, scale: f64) -> Self {
        let mut store = Self {
            points,
            scale,
            snapshot: Rc::new(baseline_snapshot(scale)),
            last_error: None,
            active: None,
        };
        // Failure is recorded in `last_error`.
        let _ = store.refresh();
        store
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest successfully fitted snapshot.
    pub fn snapshot(&self) -> Rc<CurveSnapshot> {
        Rc::clone(&self.snapshot)
    }

    /// Borrow the latest snapshot without bumping the reference count.
    pub fn current(&self) -> &CurveSnapshot {
        &self.snapshot
    }

    /// Error from the most recent refit, cleared by the next successful one.
    pub fn last_error(&self) -> Option<&CurveError> {
        self.last_error.as_ref()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Change the rate-curve scale and refit.
    pub fn set_scale(&mut self, scale: f64) -> Result<(), CurveError> {
        self.scale = scale;
        self.refit()
    }

    /// Append a point as given.
    pub fn add(&mut self, point: ControlPoint) -> Result<(), CurveError> {
        self.points.push(point);
        self.refit()
    }

    /// Append a point at `x` lying on the currently published curve.
    ///
    /// The projected y is clamped into `[0, 1]` so the socket stays on the
    /// editing surface. The inserted point is returned even when the
    /// following refit fails.
    pub fn add_projected(&mut self, x: f64) -> (ControlPoint, Result<(), CurveError>) {
        let y = self.snapshot.display.evaluate(x).clamp(0.0, 1.0);
        let point = ControlPoint::new(x, y);
        (point, self.add(point))
    }

    pub fn remove(&mut self, index: usize) -> Result<(), CurveError> {
        self.check_index(index)?;
        self.points.remove(index);
        self.active = match self.active {
            Some(a) if a == index => None,
            Some(a) if a > index => Some(a - 1),
            other => other,
        };
        self.refit()
    }

    pub fn move_point(&mut self, index: usize, point: ControlPoint) -> Result<(), CurveError> {
        self.check_index(index)?;
        self.points[index] = point;
        self.refit()
    }

    /// Force a refit and republish without changing any point.
    ///
    /// Used when the drawing surface changes size.
    pub fn refresh(&mut self) -> Result<(), CurveError> {
        self.refit()
    }

    /// Mark a point as being dragged.
    pub fn activate(&mut self, index: usize) -> Result<(), CurveError> {
        self.check_index(index)?;
        self.active = Some(index);
        Ok(())
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Move the active point; returns `Ok(false)` if no point is active.
    pub fn drag_to(&mut self, point: ControlPoint) -> Result<bool, CurveError> {
        let Some(index) = self.active else {
            return Ok(false);
        };
        self.move_point(index, point)?;
        Ok(true)
    }

    /// End the drag, wherever the release happened.
    pub fn release(&mut self) {
        self.active = None;
    }

    fn check_index(&self, index: usize) -> Result<(), CurveError> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(CurveError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
        }
    }

    fn refit(&mut self) -> Result<(), CurveError> {
        if self.points.is_empty() {
            log::debug!("no control points, seeding baseline");
            self.points.extend_from_slice(&BASELINE_POINTS);
        }

        let fitted = fit_points(&self.points, 1.0).and_then(|display| {
            let rate = if self.scale == 1.0 {
                display.clone()
            } else {
                fit_points(&self.points, self.scale)?
            };
            Ok((display, rate))
        });

        match fitted {
            Ok((display, rate)) => {
                let revision = self.snapshot.revision + 1;
                log::debug!(
                    "refit #{revision}: {} points, degree {:?}",
                    self.points.len(),
                    display.degree()
                );
                self.snapshot = Rc::new(CurveSnapshot {
                    points: self.points.clone(),
                    display,
                    rate,
                    revision,
                });
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                log::warn!("refit failed, keeping previous curve: {err}");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }
}

fn baseline_snapshot(scale: f64) -> CurveSnapshot {
    let identity = || Coefficients::new(vec![1.0, 0.0]);
    CurveSnapshot {
        points: BASELINE_POINTS.to_vec(),
        display: identity(),
        rate: fit_points(&BASELINE_POINTS, scale).unwrap_or_else(|_| identity()),
        revision: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn p(x: f64, y: f64) -> ControlPoint {
        ControlPoint::new(x, y)
    }

    #[test]
    fn empty_store_is_seeded_with_baseline() {
        let store = ControlPointStore::new(1.0);
        assert_eq!(store.points(), &BASELINE_POINTS);
        assert_eq!(store.current().display.as_slice(), &[1.0, 0.0]);
        assert_eq!(store.current().revision, 1);
        assert!(store.last_error().is_none());
    }

    #[test]
    fn add_refits_and_publishes() {
        let mut store = ControlPointStore::new(1.0);
        store.add(p(0.5, 0.25)).unwrap();
        let snap = store.snapshot();
        assert_eq!(snap.points, store.points());
        assert_eq!(snap.display.as_slice(), &[1.0, 0.0, 0.0]);
        assert_eq!(snap.revision, 2);
    }

    #[test]
    fn projected_insert_keeps_the_curve() {
        let mut store = ControlPointStore::with_points(vec![p(0.0, 0.0), p(0.5, 0.25), p(1.0, 1.0)], 1.0);
        let before = store.current().display.clone();
        let (point, result) = store.add_projected(0.3);
        result.unwrap();
        assert_abs_diff_eq!(point.y, 0.09, epsilon = 1e-12);
        assert_eq!(store.current().display, before);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn projected_insert_clamps_into_unit_square() {
        // Dips to -0.5 at x = 0.4.
        let mut store = ControlPointStore::with_points(vec![p(0.0, 1.0), p(0.2, 0.0), p(1.0, 1.0)], 1.0);
        assert!(store.current().display.evaluate(0.4) < 0.0);

        let (point, result) = store.add_projected(0.4);
        result.unwrap();
        assert_eq!(point, p(0.4, 0.0));
        assert_eq!(store.points()[3], p(0.4, 0.0));
    }

    #[test]
    fn failed_fit_keeps_last_good_curve_but_records_the_edit() {
        let mut store = ControlPointStore::new(1.0);
        let good = store.snapshot();

        let err = store.add(p(1.0, 0.4)).unwrap_err();
        assert!(matches!(err, CurveError::SingularMatrix { .. }));
        assert_eq!(store.len(), 3);
        assert_eq!(*store.snapshot(), *good);
        assert_eq!(store.last_error(), Some(&err));

        // Moving the offending point to a fresh x restores solvability.
        store.move_point(2, p(0.5, 0.4)).unwrap();
        assert!(store.last_error().is_none());
        assert_eq!(store.current().points.len(), 3);
        assert!(store.current().revision > good.revision);
    }

    #[test]
    fn removing_to_one_point_is_insufficient_and_to_zero_reseeds() {
        let mut store = ControlPointStore::with_points(vec![p(0.1, 0.2), p(0.9, 0.7)], 1.0);
        let good = store.snapshot();

        let err = store.remove(0).unwrap_err();
        assert_eq!(err, CurveError::InsufficientPoints { found: 1 });
        assert_eq!(*store.snapshot(), *good);

        store.remove(0).unwrap();
        assert_eq!(store.points(), &BASELINE_POINTS);
        assert_eq!(store.current().display.as_slice(), &[1.0, 0.0]);
    }

    #[test]
    fn remove_then_readd_reproduces_coefficients() {
        let points = vec![p(0.0, 0.1), p(0.3, 0.8), p(0.6, 0.35), p(1.0, 0.9)];
        let mut store = ControlPointStore::with_points(points.clone(), 1.0);
        let original = store.current().display.clone();

        store.remove(1).unwrap();
        store.add(points[1]).unwrap();

        let again = &store.current().display;
        assert_eq!(again.len(), original.len());
        for (a, b) in again.as_slice().iter().zip(original.as_slice()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 2e-5);
        }
    }

    #[test]
    fn out_of_range_index_changes_nothing() {
        let mut store = ControlPointStore::new(1.0);
        let revision = store.current().revision;
        assert_eq!(
            store.move_point(5, p(0.5, 0.5)),
            Err(CurveError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert!(store.remove(2).is_err());
        assert!(store.activate(9).is_err());
        assert_eq!(store.current().revision, revision);
        assert!(store.last_error().is_none());
    }

    #[test]
    fn drag_updates_active_point_until_release() {
        let mut store = ControlPointStore::new(1.0);
        assert_eq!(store.drag_to(p(0.4, 0.4)), Ok(false));

        store.activate(1).unwrap();
        assert_eq!(store.drag_to(p(0.8, 0.6)), Ok(true));
        assert_eq!(store.points()[1], p(0.8, 0.6));

        store.release();
        assert_eq!(store.active(), None);
        assert_eq!(store.drag_to(p(0.2, 0.2)), Ok(false));
        assert_eq!(store.points()[1], p(0.8, 0.6));
    }

    #[test]
    fn removing_points_keeps_active_index_consistent() {
        let mut store = ControlPointStore::with_points(
            vec![p(0.0, 0.0), p(0.25, 0.1), p(0.5, 0.5), p(1.0, 1.0)],
            1.0,
        );
        store.activate(3).unwrap();
        store.remove(0).unwrap();
        assert_eq!(store.active(), Some(2));
        store.remove(2).unwrap();
        assert_eq!(store.active(), None);
    }

    #[test]
    fn refresh_republishes_without_changing_points() {
        let mut store = ControlPointStore::new(1.0);
        let before = store.snapshot();
        store.refresh().unwrap();
        let after = store.snapshot();
        assert_eq!(after.points, before.points);
        assert_eq!(after.revision, before.revision + 1);
    }

    #[test]
    fn rate_curve_uses_configured_scale() {
        let mut store = ControlPointStore::with_points(vec![p(0.0, 0.0), p(0.5, 0.25), p(1.0, 1.0)], 1.0);
        assert_eq!(store.current().rate, store.current().display);

        store.set_scale(2.0).unwrap();
        assert_eq!(store.current().display.as_slice(), &[1.0, 0.0, 0.0]);
        assert_eq!(store.current().rate.as_slice(), &[0.5, 0.0, 0.0]);
    }
}
