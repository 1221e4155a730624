//! BTL (Bradley–Terry–Luce) likelihood of an ordered preference, in log space.
//!
//! A preference `u₀ ≻ u₁ ≻ … ≻ u_{k−1}` is scored as a sequence of Luce
//! choices (the Plackett–Luce extension of BTL): `u₀` is chosen from the
//! whole list, `u₁` from the remainder, and so on. With `zᵢ = yᵢ / s`
//!
//! ```text
//! log P = Σ_{i=0}^{k−2} [ zᵢ − LSE(zᵢ, …, z_{k−1}) ]
//! ```
//!
//! For `k = 2` this is the classical pairwise BTL `σ((y₀ − y₁)/s)`.
//! Every term is evaluated through a max-shifted log-sum-exp, so large
//! utility gaps never underflow.
use crate::{
    optimization::numerical_stability::transformations::log_sum_exp,
    preference::core::preference::Preference,
};
use ndarray::{ArrayView1, ArrayViewMut1};

/// `log P(order)` for utilities listed best-first, with sharpness `scale`.
pub fn btl_log_likelihood(utilities: &[f64], scale: f64) -> f64 {
    let z: Vec<f64> = utilities.iter().map(|&u| u / scale).collect();
    let k = z.len();
    (0..k.saturating_sub(1)).map(|i| z[i] - log_sum_exp(&z[i..])).sum()
}

/// Gradient of [`btl_log_likelihood`] with respect to each utility.
///
/// `∂/∂y_m = ( [m ≤ k−2] − Σ_{i ≤ min(m, k−2)} exp(z_m − LSEᵢ) ) / s`.
pub fn btl_log_likelihood_grad(utilities: &[f64], scale: f64) -> Vec<f64> {
    let z: Vec<f64> = utilities.iter().map(|&u| u / scale).collect();
    let k = z.len();
    let mut grad = vec![0.0; k];
    for i in 0..k.saturating_sub(1) {
        let lse = log_sum_exp(&z[i..]);
        grad[i] += 1.0;
        for m in i..k {
            grad[m] -= (z[m] - lse).exp();
        }
    }
    grad.iter_mut().for_each(|g| *g /= scale);
    grad
}

/// Log-likelihood of one stored preference under utilities `y`.
pub fn preference_log_likelihood(preference: &Preference, y: ArrayView1<f64>, scale: f64) -> f64 {
    let utilities: Vec<f64> = preference.indices().iter().map(|&i| y[i]).collect();
    btl_log_likelihood(&utilities, scale)
}

/// Scatter-add the gradient of one preference into `grad_y`.
pub fn accumulate_preference_grad(
    preference: &Preference, y: ArrayView1<f64>, scale: f64, mut grad_y: ArrayViewMut1<f64>,
) {
    let utilities: Vec<f64> = preference.indices().iter().map(|&i| y[i]).collect();
    let local = btl_log_likelihood_grad(&utilities, scale);
    for (&idx, g) in preference.indices().iter().zip(local) {
        grad_y[idx] += g;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    #[test]
    // Purpose
    // -------
    // The pairwise case reduces to the logistic form of BTL.
    fn pairwise_case_is_logistic() {
        let (y0, y1, s): (f64, f64, f64) = (0.3, -0.1, 0.2);
        let expected = -(1.0 + (-(y0 - y1) / s).exp()).ln();
        assert_relative_eq!(btl_log_likelihood(&[y0, y1], s), expected, max_relative = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Widening the gap in the asserted direction strictly raises the
    // log-likelihood; shrinking the scale sharpens it.
    fn widening_the_gap_increases_log_likelihood() {
        let s = 0.5;
        let mut last = f64::NEG_INFINITY;
        for gap in [-1.0, -0.2, 0.0, 0.4, 1.5, 4.0] {
            let ll = btl_log_likelihood(&[gap, 0.0, -0.3], s);
            assert!(ll > last);
            last = ll;
        }
        assert!(btl_log_likelihood(&[1.0, 0.0], 0.1) > btl_log_likelihood(&[1.0, 0.0], 1.0));
    }

    #[test]
    fn huge_gaps_stay_finite() {
        let ll = btl_log_likelihood(&[-10.0, 10.0], 0.01);
        assert!(ll.is_finite());
        assert_relative_eq!(ll, -2000.0, max_relative = 1e-9);
        assert!(btl_log_likelihood_grad(&[10.0, -10.0, 0.0], 0.01).iter().all(|g| g.is_finite()));
    }

    #[test]
    // Purpose
    // -------
    // The closed-form gradient matches central differences for a 4-way order.
    fn gradient_matches_central_differences() {
        let u = [0.2, 0.5, -0.3, 0.1];
        let s = 0.7;
        let g = btl_log_likelihood_grad(&u, s);
        let h = 1e-6;
        for m in 0..u.len() {
            let (mut up, mut dn) = (u, u);
            up[m] += h;
            dn[m] -= h;
            let fd = (btl_log_likelihood(&up, s) - btl_log_likelihood(&dn, s)) / (2.0 * h);
            assert_relative_eq!(g[m], fd, epsilon = 1e-7, max_relative = 1e-6);
        }
    }

    #[test]
    fn scatter_uses_preference_indices() {
        let pref = Preference::new(vec![2, 0]).unwrap();
        let y = array![0.1, 9.0, 0.4];
        let mut grad = Array1::zeros(3);
        accumulate_preference_grad(&pref, y.view(), 1.0, grad.view_mut());
        let direct = btl_log_likelihood_grad(&[0.4, 0.1], 1.0);
        assert_eq!(grad[1], 0.0);
        assert_relative_eq!(grad[2], direct[0]);
        assert_relative_eq!(grad[0], direct[1]);
        assert_relative_eq!(
            preference_log_likelihood(&pref, y.view(), 1.0),
            btl_log_likelihood(&[0.4, 0.1], 1.0)
        );
    }
}
