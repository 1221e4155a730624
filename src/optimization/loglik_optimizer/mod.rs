//! loglik_optimizer — argmin-powered, box-constrained log-likelihood maximizer.
//!
//! Purpose
//! -------
//! Provide the bounded optimizer the preference model relies on. Callers
//! implement a single trait, [`LogLikelihood`], and invoke [`maximize`] with
//! an initial point, a [`Bounds`] box and an iteration budget carried in
//! [`MLEOptions`].
//!
//! Key behaviors
//! -------------
//! - Reparameterize every coordinate through a smooth logistic map so that
//!   argmin's unconstrained L-BFGS never evaluates outside the box
//!   ([`adapter::ArgMinAdapter`]).
//! - Convert the maximization of `ℓ(θ)` into minimization of
//!   `c(u) = -ℓ(θ(u))`, chaining analytic gradients through `dθ/du`.
//! - Fall back to finite differences ([`finite_diff`]) when no analytic
//!   gradient is available.
//! - Track the best finite iterate so that a backend abort still yields an
//!   answer ([`run::run_lbfgs`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer **always maximizes**; user code implements `ℓ(θ)` and
//!   `∇ℓ(θ)`, never the cost.
//! - [`LogLikelihood::value`] and [`LogLikelihood::grad`] report invalid
//!   inputs as [`OptError`](crate::optimization::errors::OptError) values, not
//!   panics.
//! - [`Bounds`] and [`Tolerances`] are validated on construction and trusted
//!   afterwards.
//!
//! Conventions
//! -----------
//! - Every user-facing quantity ([`OptimOutcome::theta_hat`],
//!   [`OptimOutcome::value`]) lives in the bounded space and is expressed in
//!   terms of `ℓ`; `u` never leaves this module.
//! - Stopping by the iteration budget is a normal termination, not an error.
//!
//! Testing notes
//! -------------
//! - Unit tests cover sign and chain-rule handling in [`adapter`], solver
//!   construction in [`builders`], FD fallbacks in [`finite_diff`], option
//!   and outcome invariants in [`traits`], and end-to-end box-constrained
//!   solves in [`api`].

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{Bounds, LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use preference_regression::optimization::loglik_optimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{Bounds, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
