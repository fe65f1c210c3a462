//! Polynomial helpers shared by the fitter and the curve snapshot.
//!
//! Coefficients are stored highest degree first, so for `c = [c0, c1, .., cd]`:
//!
//! ```text
//! p(x) = c0 x^d + c1 x^(d-1) + ... + cd
//! ```

/// Decimal digits kept on every fitted coefficient.
pub const COEFFICIENT_DIGITS: i32 = 5;

/// Round `value` to `digits` decimal places, ties toward positive infinity.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let prec = 10f64.powi(digits);
    let rounded = (value * prec + 0.5).floor() / prec;
    // Normalize -0.0 so printed coefficients never show a signed zero.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Drop leading coefficients that are exactly zero.
///
/// This is a strict equality test: `1e-6` survives as a real high-degree term.
pub fn strip_leading_zeros(mut coeffs: Vec<f64>) -> Vec<f64> {
    let first_nonzero = coeffs.iter().position(|c| *c != 0.0).unwrap_or(coeffs.len());
    coeffs.drain(..first_nonzero);
    coeffs
}

/// Evaluate the polynomial as a plain power sum `Σ c_i · x^(d - i)`.
///
/// The empty coefficient list evaluates to 0.
pub fn evaluate(coeffs: &[f64], x: f64) -> f64 {
    let degree = coeffs.len();
    coeffs
        .iter()
        .enumerate()
        .map(|(i, c)| c * x.powi((degree - 1 - i) as i32))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_five_digits() {
        assert_eq!(round_to(0.123456, COEFFICIENT_DIGITS), 0.12346);
        assert_eq!(round_to(-0.000004, COEFFICIENT_DIGITS), 0.0);
        assert!(round_to(-0.000004, COEFFICIENT_DIGITS).is_sign_positive());
    }

    #[test]
    fn ties_round_toward_positive_infinity() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -2.0);
        assert_eq!(round_to(-0.5, 0), 0.0);
        assert!(round_to(-0.5, 0).is_sign_positive());
    }

    #[test]
    fn strips_only_exact_leading_zeros() {
        assert_eq!(strip_leading_zeros(vec![0.0, 0.0, 1.0, 0.0]), vec![1.0, 0.0]);
        assert_eq!(strip_leading_zeros(vec![1e-6, 2.0]), vec![1e-6, 2.0]);
        assert!(strip_leading_zeros(vec![0.0, 0.0]).is_empty());
    }

    #[test]
    fn evaluates_power_sum() {
        // 2x^2 - x + 3 at x = 2 => 8 - 2 + 3
        assert_eq!(evaluate(&[2.0, -1.0, 3.0], 2.0), 9.0);
        assert_eq!(evaluate(&[], 0.7), 0.0);
        assert_eq!(evaluate(&[4.0], 100.0), 4.0);
    }
}
