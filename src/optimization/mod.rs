//! optimization — bounded MLE/MAP stack, numerical helpers, and error surface.
//!
//! Purpose
//! -------
//! Provide the optimizer the preference model delegates to: an argmin-backed
//! L-BFGS maximizer over box constraints, the guarded scalar transforms it is
//! built on, and a single error/result surface.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: maximize a log-likelihood or log-posterior `ℓ(θ)`
//!   subject to `lower ≤ θ ≤ upper` within an iteration budget.
//! - `numerical_stability`: logistic/logit, log-sum-exp and the smooth box
//!   transform.
//! - `errors`: [`OptError`](errors::OptError) / [`OptResult`](errors::OptResult),
//!   including conversions from argmin and from the preference domain.
//!
//! Conventions
//! -----------
//! - Solvers maximize `ℓ` by minimizing `-ℓ`; all user-facing outcomes are in
//!   terms of `ℓ` and in the bounded space.
//! - Solver-level logging goes through the `log` facade at `debug`/`info`,
//!   with a `warn` when a failed run is recovered from its best iterate.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use preference_regression::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
