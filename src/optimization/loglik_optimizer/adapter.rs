//! Adapter that exposes a user `LogLikelihood` as an unconstrained `argmin` problem.
//!
//! We convert a *maximization* of a log-likelihood `ℓ(θ)` over a box into a
//! *minimization* over ℝⁿ:
//!
//! - every coordinate is reparameterized as `θᵢ = loᵢ + (hiᵢ − loᵢ)·σ(uᵢ)`,
//! - the cost is `c(u) = -ℓ(θ(u))`,
//! - analytic gradients are chained through `dθᵢ/duᵢ` and negated.
//!
//! If a gradient is not provided, we finite-difference the **cost** closure
//! in `u`-space, so neither the sign flip nor the chain rule is needed in
//! that branch.
//!
//! Every finite evaluation is offered to a shared [`BestIterate`] so the
//! runner can fall back to the best point seen if the backend aborts.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        traits::{Bounds, LogLikelihood},
        types::{Cost, Grad, Theta},
        finite_diff::fd_gradient,
        validation::validate_grad,
    },
    numerical_stability::transformations::{bounded_jacobian, to_bounded, to_unconstrained},
};
use argmin::core::{CostFunction, Error, Gradient};

/// Best objective value and its point (in the bounded space) seen so far.
#[derive(Debug, Clone, PartialEq)]
pub struct BestIterate {
    pub theta: Option<Theta>,
    pub value: f64,
}

impl BestIterate {
    pub fn new() -> Self {
        Self { theta: None, value: f64::NEG_INFINITY }
    }

    /// Keep `(theta, value)` if it improves on the current best.
    pub fn offer(&mut self, theta: &Theta, value: f64) {
        if value.is_finite() && (self.theta.is_none() || value > self.value) {
            self.theta = Some(theta.clone());
            self.value = value;
        }
    }
}

impl Default for BestIterate {
    fn default() -> Self {
        Self::new()
    }
}

/// Bridges a user `LogLikelihood` to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost` returns `-ℓ(θ(u))`.
/// - `Gradient::gradient` returns:
///   - `-(∇ℓ(θ) ⊙ dθ/du)` if the user provides an analytic gradient, or
///   - a finite-difference gradient of the cost in `u` (no sign flip needed).
#[derive(Debug)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
    pub bounds: &'a Bounds,
    pub best: &'a RefCell<BestIterate>,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a user `LogLikelihood`, its data, and a box.
    pub fn new(
        f: &'a F, data: &'a F::Data, bounds: &'a Bounds, best: &'a RefCell<BestIterate>,
    ) -> Self {
        Self { f, data, bounds, best }
    }

    /// Map an unconstrained point `u` into the box.
    pub fn to_theta(&self, u: &Theta) -> Theta {
        bounded_theta(u, self.bounds)
    }

    /// Map a point in the box (clamped onto it first) to unconstrained `u`.
    pub fn to_unconstrained(&self, theta: &Theta) -> Theta {
        unconstrained_theta(theta, self.bounds)
    }

    fn jacobian(&self, u: &Theta) -> Theta {
        let lower = self.bounds.lower();
        let upper = self.bounds.upper();
        Theta::from_iter(
            u.iter().enumerate().map(|(i, &ui)| bounded_jacobian(ui, lower[i], upper[i])),
        )
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the cost `c(u) = -ℓ(θ(u))`.
    ///
    /// # Errors
    /// - Propagates any `OptError` from the user's `value` via `?`.
    /// - Returns `NonFiniteCost` if the value is not finite.
    fn cost(&self, u: &Self::Param) -> Result<Self::Output, Error> {
        let theta = self.to_theta(u);
        let output = self.f.value(&theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        self.best.borrow_mut().offer(&theta, output);
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the gradient of the cost at `u`.
    ///
    /// Behavior:
    /// - If the user implements `grad(θ, data)`, we validate it, chain it
    ///   through the box transform and negate it.
    /// - Otherwise, we finite-difference the **cost** in `u` through
    ///   [`fd_gradient`] (central first, forward as fallback).
    ///
    /// # Errors
    /// - Propagates user errors from `grad` (non-`GradientNotImplemented`).
    /// - Propagates any error raised by cost evaluations performed during FD.
    /// - Returns validation errors if the gradient has wrong dimension or
    ///   non-finite entries.
    fn gradient(&self, u: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = u.len();
        let theta = self.to_theta(u);
        match self.f.grad(&theta, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                let chained = g * self.jacobian(u);
                validate_grad(&chained, dim)?;
                Ok(-chained)
            }
            Err(OptError::GradientNotImplemented) => {
                Ok(fd_gradient(u, |v| self.cost(v).map_err(OptError::from))?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Coordinate-wise `θᵢ = loᵢ + (hiᵢ − loᵢ)·σ(uᵢ)`.
pub fn bounded_theta(u: &Theta, bounds: &Bounds) -> Theta {
    let (lower, upper) = (bounds.lower(), bounds.upper());
    Theta::from_iter(u.iter().enumerate().map(|(i, &ui)| to_bounded(ui, lower[i], upper[i])))
}

/// Coordinate-wise inverse of [`bounded_theta`].
pub fn unconstrained_theta(theta: &Theta, bounds: &Bounds) -> Theta {
    let (lower, upper) = (bounds.lower(), bounds.upper());
    Theta::from_iter(
        theta.iter().enumerate().map(|(i, &xi)| to_unconstrained(xi, lower[i], upper[i])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use approx::assert_relative_eq;
    use ndarray::array;

    // ℓ(θ) = -Σ (θᵢ − 1)², optionally with an analytic gradient.
    struct Quadratic {
        analytic: bool,
    }

    impl LogLikelihood for Quadratic {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            Ok(-theta.iter().map(|t| (t - 1.0).powi(2)).sum::<f64>())
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            if self.analytic {
                Ok(theta.mapv(|t| -2.0 * (t - 1.0)))
            } else {
                Err(OptError::GradientNotImplemented)
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The chained analytic gradient in u-space agrees with the
    // finite-difference gradient of the cost.
    fn analytic_and_fd_gradients_agree_in_unconstrained_space() {
        let bounds = Bounds::new(array![-2.0, 0.0], array![3.0, 5.0]).unwrap();
        let best = RefCell::new(BestIterate::new());
        let (an, fd) = (Quadratic { analytic: true }, Quadratic { analytic: false });
        let a = ArgMinAdapter::new(&an, &(), &bounds, &best);
        let b = ArgMinAdapter::new(&fd, &(), &bounds, &best);

        let u = a.to_unconstrained(&array![0.3, 2.2]);
        let ga = a.gradient(&u).unwrap();
        let gb = b.gradient(&u).unwrap();
        for i in 0..2 {
            assert_relative_eq!(ga[i], gb[i], max_relative = 1e-5);
        }
    }

    #[test]
    fn cost_tracks_best_iterate_in_bounded_space() {
        let bounds = Bounds::new(array![-2.0], array![3.0]).unwrap();
        let best = RefCell::new(BestIterate::new());
        let f = Quadratic { analytic: true };
        let adapter = ArgMinAdapter::new(&f, &(), &bounds, &best);

        let c_far = adapter.cost(&adapter.to_unconstrained(&array![-1.5])).unwrap();
        let c_near = adapter.cost(&adapter.to_unconstrained(&array![0.9])).unwrap();
        assert!(c_near < c_far);

        let best = best.borrow();
        assert_relative_eq!(best.theta.as_ref().unwrap()[0], 0.9, max_relative = 1e-9);
        assert_relative_eq!(best.value, -c_near, max_relative = 1e-12);
    }
}
