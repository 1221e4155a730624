//! Numerical stability utilities.
//!
//! Provides safe implementations of common nonlinear transforms
//! that are prone to overflow/underflow in naïve form.
//! The functions here follow guarded strategies similar to those
//! in major ML libraries, using explicit cutoffs to keep `f64`
//! arithmetic in a well-conditioned regime.
//!
//! # Provided items
//! - [`BOUNDARY_EPS`]: relative margin used to pull starting points strictly
//!   inside a box before the inverse transform.
//! - [`safe_logistic(x)`]: stable `1 / (1 + exp(-x))`.
//! - [`safe_logit(t)`]: inverse of the logistic map on `(0, 1)`.
//! - [`log_sum_exp(xs)`]: max-shifted `ln Σ exp(xᵢ)`.
//! - [`to_bounded`], [`to_unconstrained`], [`bounded_jacobian`]: the smooth
//!   box transform `x = lo + (hi − lo)·σ(u)` and its pieces.
//!
//! # Rationale
//! Box constraints are enforced by reparameterization: the optimizer walks
//! an unconstrained `u` and every evaluation happens at `x(u)`, which can
//! never leave `(lo, hi)`.

/// Relative margin keeping transformed starting points off the box faces.
///
/// A start exactly on a face would map to `u = ±∞`; clamping to
/// `lo + ε·(hi − lo)` keeps the inverse finite.
pub const BOUNDARY_EPS: f64 = 1e-9;

/// Numerically stable logistic function `σ(x) = 1 / (1 + exp(−x))`.
///
/// Branches on the sign of `x` so that `exp` is only ever evaluated on a
/// non-positive argument.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Stable logit `ln(t / (1 − t))` for `t ∈ (0, 1)`.
///
/// Inputs are clamped into `[BOUNDARY_EPS, 1 − BOUNDARY_EPS]` first.
pub fn safe_logit(t: f64) -> f64 {
    let t = t.clamp(BOUNDARY_EPS, 1.0 - BOUNDARY_EPS);
    t.ln() - (-t).ln_1p()
}

/// Max-shifted log-sum-exp over a slice.
///
/// Returns `-∞` for an empty slice, matching `ln(0)`.
pub fn log_sum_exp(xs: &[f64]) -> f64 {
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = xs.iter().map(|&x| (x - max).exp()).sum();
    max + sum.ln()
}

/// Map an unconstrained coordinate into `(lo, hi)`.
pub fn to_bounded(u: f64, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * safe_logistic(u)
}

/// Inverse of [`to_bounded`]; `x` outside the box is clamped onto it first.
pub fn to_unconstrained(x: f64, lo: f64, hi: f64) -> f64 {
    safe_logit((x - lo) / (hi - lo))
}

/// `dx/du` of [`to_bounded`] at `u`.
pub fn bounded_jacobian(u: f64, lo: f64, hi: f64) -> f64 {
    let s = safe_logistic(u);
    (hi - lo) * s * (1.0 - s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn logistic_matches_naive_formula_and_saturates() {
        for &x in &[-30.0_f64, -2.5, 0.0, 1.0, 12.0] {
            let naive = 1.0 / (1.0 + (-x).exp());
            assert_relative_eq!(safe_logistic(x), naive, max_relative = 1e-12);
        }
        assert_eq!(safe_logistic(-1000.0), 0.0);
        assert_eq!(safe_logistic(1000.0), 1.0);
    }

    #[test]
    fn log_sum_exp_is_shift_stable() {
        let xs = [1000.0, 1000.0];
        assert_relative_eq!(log_sum_exp(&xs), 1000.0 + 2.0_f64.ln(), max_relative = 1e-12);
        assert_eq!(log_sum_exp(&[]), f64::NEG_INFINITY);
    }

    #[test]
    // Purpose
    // -------
    // The box transform and its inverse agree inside the box, and the
    // analytic Jacobian matches a central difference.
    fn box_transform_round_trips_and_has_correct_jacobian() {
        let (lo, hi) = (1e-5, 10.0);
        for &x in &[0.001, 0.5, 3.0, 9.99] {
            let u = to_unconstrained(x, lo, hi);
            assert_relative_eq!(to_bounded(u, lo, hi), x, max_relative = 1e-9);

            let h = 1e-6;
            let fd = (to_bounded(u + h, lo, hi) - to_bounded(u - h, lo, hi)) / (2.0 * h);
            assert_relative_eq!(bounded_jacobian(u, lo, hi), fd, max_relative = 1e-6);
        }
    }

    #[test]
    fn inverse_transform_stays_finite_on_the_faces() {
        assert!(to_unconstrained(-10.0, -10.0, 10.0).is_finite());
        assert!(to_unconstrained(10.0, -10.0, 10.0).is_finite());
        assert!(to_unconstrained(25.0, -10.0, 10.0).is_finite());
    }
}
