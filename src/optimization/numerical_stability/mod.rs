//! numerical_stability — guarded scalar transforms for the optimizer layer.
//!
//! Purpose
//! -------
//! Collect numerically stable scalar transforms used when turning a
//! box-constrained maximization into an unconstrained one, plus the
//! log-sum-exp reduction the preference likelihood is built on.
//!
//! Key behaviors
//! -------------
//! - `safe_logistic` / `safe_logit` map between ℝ and `(0, 1)` without
//!   overflow.
//! - `to_bounded`, `to_unconstrained`, and `bounded_jacobian` implement the
//!   smooth box transform `x = lo + (hi − lo)·σ(u)` used by the argmin
//!   adapter.
//! - `log_sum_exp` evaluates `ln Σ exp(xᵢ)` with a max shift.
//!
//! Conventions
//! -----------
//! - All routines are pure `f64` helpers: no allocation, no I/O, no logging.
//! - Validation of bounds (finite, `lo < hi`) happens in
//!   `loglik_optimizer::validation`, not here.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] cover agreement with naïve formulas,
//!   saturation in the tails, round-tripping of the box transform, and the
//!   Jacobian against a central difference.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    BOUNDARY_EPS, bounded_jacobian, log_sum_exp, safe_logistic, safe_logit, to_bounded,
    to_unconstrained,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use preference_regression::optimization::numerical_stability::prelude::*;
//
// to import the main numerical-stability surface in a single line.

pub mod prelude {
    pub use super::transformations::{
        bounded_jacobian, log_sum_exp, safe_logistic, safe_logit, to_bounded, to_unconstrained,
    };
}
