//! loglik_optimizer::finite_diff — finite-difference gradients with error capture.
//!
//! Purpose
//! -------
//! Approximate gradients of fallible scalar objectives so that the rest of
//! the optimizer (and gradient checks in model code) can request derivatives
//! without depending directly on the `finitediff` API.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`] takes central differences first and falls back to
//!   forward differences when an evaluation fails or the central result is
//!   not finite.
//! - [`loglik_gradient`] differentiates a [`LogLikelihood`] directly in its
//!   own parameter space, which is what analytic-gradient checks compare
//!   against.
//!
//! Invariants & assumptions
//! ------------------------
//! - `finitediff` closures must return `f64`, so the first error raised by
//!   the objective is parked in a `RefCell` and the closure returns `NaN`.
//!   A parked error always wins over the numeric result.
//! - Every gradient returned passes [`validate_grad`].
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, LogLikelihood, Theta, validation::validate_grad},
};
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Central-difference gradient of `func` at `theta`, forward differences as fallback.
///
/// # Errors
/// - The first error raised by `func` on the forward-difference path.
/// - [`OptError::InvalidGradient`] if the fallback is still non-finite.
pub fn fd_gradient<G>(theta: &Theta, func: G) -> OptResult<Grad>
where
    G: Fn(&Theta) -> OptResult<f64>,
{
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let wrapped = |x: &Theta| -> f64 {
        match func(x) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };

    let central = theta.central_diff(&wrapped);
    if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }

    closure_err.replace(None);
    let forward = theta.forward_diff(&wrapped);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&forward, theta.len())?;
    Ok(forward)
}

/// Finite-difference `∇ℓ(θ)` of a log-likelihood in its own parameter space.
///
/// # Errors
/// Propagates errors from `f.value` and from [`fd_gradient`].
pub fn loglik_gradient<F: LogLikelihood>(f: &F, theta: &Theta, data: &F::Data) -> OptResult<Grad> {
    fd_gradient(theta, |x| f.value(x, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // The central path reproduces the gradient of a smooth quadratic.
    //
    // Given
    // -----
    // - f(θ) = θ₀² + 3θ₁ at θ = (1.5, -2).
    //
    // Expect
    // ------
    // - ∇f ≈ (3, 3).
    fn fd_gradient_matches_quadratic() {
        let g = fd_gradient(&array![1.5, -2.0], |x| Ok(x[0] * x[0] + 3.0 * x[1])).unwrap();
        assert_relative_eq!(g[0], 3.0, max_relative = 1e-6);
        assert_relative_eq!(g[1], 3.0, max_relative = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // A failure that only the central stencil hits (x < 0) is absorbed by
    // the forward fallback.
    fn fd_gradient_falls_back_to_forward_differences() {
        let g = fd_gradient(&array![0.0], |x| {
            if x[0] < 0.0 { Err(OptError::NonFiniteCost { value: f64::NAN }) } else { Ok(2.0 * x[0]) }
        })
        .unwrap();
        assert_relative_eq!(g[0], 2.0, max_relative = 1e-6);
    }

    #[test]
    fn fd_gradient_propagates_persistent_errors() {
        let res = fd_gradient(&array![1.0, 2.0], |_| Err(OptError::MissingThetaHat));
        assert_eq!(res, Err(OptError::MissingThetaHat));
    }
}
