//! High-level entry point for maximizing a user-provided `LogLikelihood` over a box.
//!
//! This selects an L-BFGS solver with either Hager–Zhang or More–Thuente line
//! search, wraps the model in an `ArgMinAdapter` (which *minimizes* `-ℓ(θ(u))`
//! over unconstrained `u`), and delegates the run to `run_lbfgs`.
use std::cell::RefCell;

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::{ArgMinAdapter, BestIterate},
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{Bounds, LineSearcher, LogLikelihood, MLEOptions},
    },
    numerical_stability::transformations::BOUNDARY_EPS,
};

/// Maximize a log-likelihood `ℓ(θ)` subject to `lower ≤ θ ≤ upper`.
///
/// # Behavior
/// - Checks `theta0` against `bounds` and clamps it strictly inside the box.
/// - Validates the clamped start via `f.check(theta0, data)`.
/// - Maps the start into unconstrained space and runs L-BFGS with the line
///   search named by `opts.line_searcher`.
/// - Returns `theta_hat` in the original, bounded space.
///
/// # Errors
/// - [`OptError::BoundsDimMismatch`] if `theta0.len() != bounds.len()`.
/// - Propagates any error from `f.check`.
/// - Propagates builder errors and unrecoverable runtime errors from
///   `run_lbfgs`.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use preference_regression::optimization::errors::{OptError, OptResult};
/// use preference_regression::optimization::loglik_optimizer::{
///     maximize, Bounds, LogLikelihood, MLEOptions, Theta,
/// };
///
/// struct Peak;
/// impl LogLikelihood for Peak {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-(theta[0] - 2.0).powi(2))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let bounds = Bounds::new(array![0.0], array![5.0])?;
/// let out = maximize(&Peak, array![1.0], &bounds, &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, bounds: &Bounds, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    if theta0.len() != bounds.len() {
        return Err(OptError::BoundsDimMismatch { expected: bounds.len(), found: theta0.len() });
    }
    let theta0 = clamp_inside(theta0, bounds);
    f.check(&theta0, data)?;

    let best = RefCell::new(BestIterate::new());
    let problem = ArgMinAdapter::new(f, data, bounds, &best);
    let u0 = problem.to_unconstrained(&theta0);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(u0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(u0, opts, problem, solver)
        }
    }
}

fn clamp_inside(mut theta: Theta, bounds: &Bounds) -> Theta {
    for ((t, &lo), &hi) in theta.iter_mut().zip(bounds.lower().iter()).zip(bounds.upper().iter()) {
        let margin = BOUNDARY_EPS * (hi - lo);
        *t = t.clamp(lo + margin, hi - margin);
    }
    theta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::{Cost, Grad};
    use approx::assert_relative_eq;
    use ndarray::array;

    // ℓ(θ) = -Σ (θᵢ − cᵢ)² with an analytic gradient.
    struct Peak {
        centre: Theta,
    }

    impl LogLikelihood for Peak {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            Ok(-(theta - &self.centre).mapv(|d| d * d).sum())
        }

        fn check(&self, theta: &Theta, _: &()) -> OptResult<()> {
            if theta.len() != self.centre.len() {
                return Err(OptError::GradientDimMismatch {
                    expected: self.centre.len(),
                    found: theta.len(),
                });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            Ok((theta - &self.centre).mapv(|d| -2.0 * d))
        }
    }

    #[test]
    // Purpose
    // -------
    // An interior optimum is found with both line searches.
    //
    // Given
    // -----
    // - A concave quadratic peaked at (1, -2) inside [-5, 5]².
    //
    // Expect
    // ------
    // - θ̂ ≈ (1, -2) and ℓ(θ̂) ≈ 0.
    fn maximize_finds_interior_optimum() {
        let f = Peak { centre: array![1.0, -2.0] };
        let bounds = Bounds::new(array![-5.0, -5.0], array![5.0, 5.0]).unwrap();
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            let opts = MLEOptions { line_searcher: ls, ..MLEOptions::default() };
            let out = maximize(&f, array![0.0, 0.0], &bounds, &(), &opts).unwrap();
            assert_relative_eq!(out.theta_hat[0], 1.0, epsilon = 1e-3);
            assert_relative_eq!(out.theta_hat[1], -2.0, epsilon = 1e-3);
            assert!(out.value > -1e-5);
        }
    }

    #[test]
    // Purpose
    // -------
    // When the unconstrained optimum lies outside the box, the estimate
    // stays inside and is pushed toward the active face.
    fn maximize_respects_box_when_optimum_is_outside() {
        let f = Peak { centre: array![20.0] };
        let bounds = Bounds::new(array![-10.0], array![10.0]).unwrap();
        let out = maximize(&f, array![0.0], &bounds, &(), &MLEOptions::default()).unwrap();
        assert!(out.theta_hat[0] <= 10.0);
        assert!(out.theta_hat[0] > 9.0);
    }

    #[test]
    fn maximize_rejects_start_of_wrong_length() {
        let f = Peak { centre: array![0.0] };
        let bounds = Bounds::new(array![-1.0], array![1.0]).unwrap();
        let res = maximize(&f, array![0.0, 0.0], &bounds, &(), &MLEOptions::default());
        assert_eq!(res, Err(OptError::BoundsDimMismatch { expected: 1, found: 2 }));
    }

    #[test]
    fn start_on_the_face_is_clamped_inside() {
        let bounds = Bounds::new(array![0.0, -1.0], array![1.0, 1.0]).unwrap();
        let t = clamp_inside(array![0.0, 3.0], &bounds);
        assert!(t[0] > 0.0 && t[1] < 1.0);
    }
}
