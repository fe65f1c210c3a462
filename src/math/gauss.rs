//! Gaussian elimination for the small, dense, square systems produced by
//! exact point interpolation.
//!
//! The solver works on an `n × (n + 1)` augmented matrix `[A | b]`:
//!
//! - forward elimination to upper-triangular form, rows taken in the order given
//! - back substitution
//!
//! There is no pivot search. Callers arrange rows so a structurally zero pivot
//! does not come first (the fitter defers the `x = 0` row to the end); any
//! pivot that is still exactly zero is reported as `SingularMatrix`.

use nalgebra::{DMatrix, DVector};

use crate::error::CurveError;

/// Solve an augmented system `[A | b]` and return `x` with `A x = b`.
pub fn solve_augmented(mut aug: DMatrix<f64>) -> Result<DVector<f64>, CurveError> {
    let n = aug.nrows();
    if aug.ncols() != n + 1 {
        // Only square systems are meaningful here.
        return Err(CurveError::SingularMatrix { row: 0 });
    }
    if n == 0 {
        return Ok(DVector::zeros(0));
    }

    for i in 0..n {
        let pivot = aug[(i, i)];
        if pivot == 0.0 {
            return Err(CurveError::SingularMatrix { row: i });
        }
        for j in (i + 1)..n {
            let ratio = aug[(j, i)] / pivot;
            if ratio == 0.0 {
                continue;
            }
            // Columns left of `i` are already zero in both rows.
            for k in i..=n {
                aug[(j, k)] -= ratio * aug[(i, k)];
            }
        }
    }

    let mut x = DVector::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut acc = aug[(i, n)];
        for j in (i + 1)..n {
            acc -= aug[(i, j)] * x[j];
        }
        x[i] = acc / aug[(i, i)];
    }

    if let Some(row) = x.iter().position(|v| !v.is_finite()) {
        return Err(CurveError::SingularMatrix { row });
    }

    Ok(x)
}
