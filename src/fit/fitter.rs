//! Exact polynomial interpolation through a set of control points.
//!
//! Given `n` points we solve for the unique polynomial of degree `n - 1`
//! passing through all of them (not a least-squares fit):
//!
//! - one augmented row per point: `[x^(n-1), .., x, 1 | y]`
//! - rows in the order given, except that an `x = 0` point goes last
//!   (its row is zero apart from the constant term and would be a zero pivot first)
//! - Gaussian elimination + back substitution
//! - coefficients rounded to 5 decimals, leading zeros stripped

use nalgebra::DMatrix;

use crate::domain::{Coefficients, ControlPoint};
use crate::error::CurveError;
use crate::math::{COEFFICIENT_DIGITS, round_to, solve_augmented, strip_leading_zeros};

/// Fit the interpolating polynomial through `points` at scale 1.
pub fn fit(points: &[ControlPoint]) -> Result<Coefficients, CurveError> {
    fit_points(points, 1.0)
}

/// Fit the interpolating polynomial after multiplying both axes by `scale`.
pub fn fit_points(points: &[ControlPoint], scale: f64) -> Result<Coefficients, CurveError> {
    if points.len() < 2 {
        return Err(CurveError::InsufficientPoints {
            found: points.len(),
        });
    }

    let scaled: Vec<ControlPoint> = points.iter().map(|p| p.scaled(scale)).collect();
    ensure_distinct_x(&scaled)?;

    let solution = solve_augmented(build_augmented(&scaled))?;
    let rounded: Vec<f64> = solution
        .iter()
        .map(|c| round_to(*c, COEFFICIENT_DIGITS))
        .collect();

    Ok(Coefficients::new(strip_leading_zeros(rounded)))
}

/// Parse a point list such as `"0 0, 0.5 0.8, 1 1"`.
///
/// Points are separated by commas; each point is two whitespace-separated
/// numbers. Blank input yields an empty list.
pub fn parse_points(input: &str) -> Result<Vec<ControlPoint>, CurveError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    input
        .split(',')
        .enumerate()
        .map(|(idx, chunk)| {
            let fields: Vec<&str> = chunk.split_whitespace().collect();
            let [x, y] = fields.as_slice() else {
                return Err(parse_error(
                    input,
                    format!("point {} needs exactly two numbers, got {}", idx + 1, fields.len()),
                ));
            };
            let x = parse_coord(input, idx, x)?;
            let y = parse_coord(input, idx, y)?;
            Ok(ControlPoint::new(x, y))
        })
        .collect()
}

fn parse_coord(input: &str, idx: usize, raw: &str) -> Result<f64, CurveError> {
    let value: f64 = raw
        .parse()
        .map_err(|e| parse_error(input, format!("point {}: '{raw}' is not a number ({e})", idx + 1)))?;
    if !value.is_finite() {
        return Err(parse_error(input, format!("point {}: '{raw}' is not finite", idx + 1)));
    }
    Ok(value)
}

fn parse_error(input: &str, reason: String) -> CurveError {
    CurveError::Parse {
        input: input.to_string(),
        reason,
    }
}

/// Two points with the same x make the system singular no matter how rounding
/// plays out during elimination, so reject them up front.
fn ensure_distinct_x(points: &[ControlPoint]) -> Result<(), CurveError> {
    for (i, p) in points.iter().enumerate().skip(1) {
        if points[..i].iter().any(|q| q.x == p.x) {
            return Err(CurveError::SingularMatrix { row: i });
        }
    }
    Ok(())
}

fn build_augmented(points: &[ControlPoint]) -> DMatrix<f64> {
    let n = points.len();
    let mut aug = DMatrix::<f64>::zeros(n, n + 1);

    let ordered = points
        .iter()
        .filter(|p| p.x != 0.0)
        .chain(points.iter().filter(|p| p.x == 0.0));

    for (row, p) in ordered.enumerate() {
        for col in 0..n {
            aug[(row, col)] = p.x.powi((n - 1 - col) as i32);
        }
        aug[(row, n)] = p.y;
    }

    aug
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn pts(raw: &[(f64, f64)]) -> Vec<ControlPoint> {
        raw.iter().map(|&(x, y)| ControlPoint::new(x, y)).collect()
    }

    #[test]
    fn baseline_is_the_identity_line() {
        let c = fit(&pts(&[(0.0, 0.0), (1.0, 1.0)])).unwrap();
        assert_eq!(c.as_slice(), &[1.0, 0.0]);
        assert_abs_diff_eq!(c.evaluate(0.5), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn parabola_through_three_points() {
        let c = fit(&pts(&[(0.0, 0.0), (0.5, 0.25), (1.0, 1.0)])).unwrap();
        assert_eq!(c.as_slice(), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn collinear_points_drop_the_quadratic_term() {
        let c = fit(&pts(&[(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)])).unwrap();
        assert_eq!(c.as_slice(), &[1.0, 0.0]);
        assert_eq!(c.degree(), Some(1));
    }

    #[test]
    fn tiny_leading_coefficient_is_kept() {
        let a = 0.00002;
        let c = fit(&pts(&[(0.0, 0.0), (0.5, 0.5 + a * 0.25), (1.0, 1.0 + a)])).unwrap();
        assert_eq!(c.len(), 3);
        assert_abs_diff_eq!(c.as_slice()[0], a, epsilon = 1e-9);
    }

    #[test]
    fn zero_x_point_listed_first_still_fits() {
        // Without deferring the x = 0 row this would be a zero leading pivot.
        let c = fit(&pts(&[(0.0, 1.0), (1.0, 2.0)])).unwrap();
        assert_eq!(c.as_slice(), &[1.0, 1.0]);
    }

    #[test]
    fn scale_multiplies_both_axes() {
        let c = fit_points(&pts(&[(0.0, 0.0), (0.5, 0.25), (1.0, 1.0)]), 2.0).unwrap();
        assert_eq!(c.as_slice(), &[0.5, 0.0, 0.0]);
    }

    #[test]
    fn duplicate_x_is_singular() {
        let err = fit(&pts(&[(0.2, 0.1), (0.7, 0.4), (0.2, 0.9)])).unwrap_err();
        assert_eq!(err, CurveError::SingularMatrix { row: 2 });

        let err = fit(&pts(&[(0.0, 0.1), (0.0, 0.9)])).unwrap_err();
        assert!(matches!(err, CurveError::SingularMatrix { .. }));
    }

    #[test]
    fn fewer_than_two_points_is_insufficient() {
        assert_eq!(fit(&[]), Err(CurveError::InsufficientPoints { found: 0 }));
        assert_eq!(
            fit(&pts(&[(0.3, 0.3)])),
            Err(CurveError::InsufficientPoints { found: 1 })
        );
    }

    #[test]
    fn fit_is_deterministic() {
        let points = pts(&[(0.1, 0.9), (0.4, 0.2), (0.75, 0.6), (1.0, 0.3)]);
        assert_eq!(fit(&points).unwrap(), fit(&points).unwrap());
    }

    #[test]
    fn random_distinct_points_are_interpolated() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let n = rng.gen_range(2..=5);
            let mut points: Vec<ControlPoint> = (0..n)
                .map(|i| {
                    let x = (i as f64 + 1.0 + 0.5 * rng.r#gen::<f64>()) / (n as f64 + 1.0);
                    ControlPoint::new(x, rng.r#gen::<f64>())
                })
                .collect();
            if rng.gen_bool(0.3) {
                points[0].x = 0.0;
            }
            points.shuffle(&mut rng);

            let c = fit(&points).unwrap();
            for p in &points {
                assert_abs_diff_eq!(c.evaluate(p.x), p.y, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn parses_point_lists() {
        let parsed = parse_points("1 2, 4 5, 78 12").unwrap();
        assert_eq!(parsed, pts(&[(1.0, 2.0), (4.0, 5.0), (78.0, 12.0)]));
        assert!(parse_points("   ").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_point_lists() {
        assert!(matches!(parse_points("1 2, 3"), Err(CurveError::Parse { .. })));
        assert!(matches!(parse_points("1 x"), Err(CurveError::Parse { .. })));
        assert!(matches!(parse_points("1 2,"), Err(CurveError::Parse { .. })));
        assert!(matches!(parse_points("inf 2"), Err(CurveError::Parse { .. })));
    }
}
