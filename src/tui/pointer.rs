//! Translation of terminal mouse cells into normalized surface coordinates.
//!
//! The chart occupies a `Rect` of terminal cells. Column `rect.x` maps to
//! `x = 0`, the last column to `x = 1`; the top row maps to `y = 1` and the
//! bottom row to `y = 0`. Positions outside the rect are clamped onto its edge.

use ratatui::layout::Rect;

use crate::domain::{ControlPoint, DragModel};

/// Hit radius for grabbing a socket, in cells.
const HIT_RADIUS_CELLS: f64 = 1.5;

/// The drawing surface as last laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Surface {
    pub rect: Rect,
}

impl Surface {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.rect.x && col < self.rect.right() && row >= self.rect.y && row < self.rect.bottom()
    }

    /// Cell to unit-square point, clamped to the surface.
    pub fn to_unit(&self, col: u16, row: u16) -> ControlPoint {
        if self.rect.width == 0 || self.rect.height == 0 {
            return ControlPoint::new(0.0, 0.0);
        }
        let col = col.clamp(self.rect.x, self.rect.right() - 1);
        let row = row.clamp(self.rect.y, self.rect.bottom() - 1);
        let x = f64::from(col - self.rect.x) / span(self.rect.width);
        let y = 1.0 - f64::from(row - self.rect.y) / span(self.rect.height);
        ControlPoint::new(x, y)
    }

    /// Unit-square point to fractional cell position `(col, row)`.
    pub fn to_cell(&self, p: ControlPoint) -> (f64, f64) {
        let col = f64::from(self.rect.x) + p.x * span(self.rect.width);
        let row = f64::from(self.rect.y) + (1.0 - p.y) * span(self.rect.height);
        (col, row)
    }

    /// Pointer movement in cells expressed in unit-square coordinates.
    pub fn delta_to_unit(&self, dcol: i32, drow: i32) -> (f64, f64) {
        (
            f64::from(dcol) / span(self.rect.width),
            -f64::from(drow) / span(self.rect.height),
        )
    }

    /// Index of the point nearest to the cell, if within grabbing distance.
    pub fn hit_test(&self, points: &[ControlPoint], col: u16, row: u16) -> Option<usize> {
        let (c, r) = (f64::from(col), f64::from(row));
        points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let (pc, pr) = self.to_cell(*p);
                (i, (pc - c).hypot(pr - r))
            })
            .filter(|(_, d)| *d <= HIT_RADIUS_CELLS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }
}

fn span(len: u16) -> f64 {
    f64::from(len.saturating_sub(1).max(1))
}

/// Remembers the previous pointer sample while a point is being dragged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragTracker {
    last: Option<(u16, u16)>,
}

impl DragTracker {
    pub fn begin(&mut self, col: u16, row: u16) {
        self.last = Some((col, row));
    }

    pub fn end(&mut self) {
        self.last = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    /// New position for the dragged point after the pointer moved to `(col, row)`.
    ///
    /// Relative: the pointer's per-sample delta is added to `current`, so a
    /// stale surface position does not make the point jump. Absolute: the
    /// point snaps to the pointer. Both results are clamped to the unit square.
    pub fn follow(
        &mut self,
        model: DragModel,
        surface: &Surface,
        current: ControlPoint,
        col: u16,
        row: u16,
    ) -> ControlPoint {
        let target = match model {
            DragModel::Absolute => surface.to_unit(col, row),
            DragModel::Relative => {
                let (last_col, last_row) = self.last.unwrap_or((col, row));
                let (dx, dy) = surface.delta_to_unit(
                    i32::from(col) - i32::from(last_col),
                    i32::from(row) - i32::from(last_row),
                );
                ControlPoint::new(current.x + dx, current.y + dy).clamped_unit()
            }
        };
        self.last = Some((col, row));
        target
    }
}
