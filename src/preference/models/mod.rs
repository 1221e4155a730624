//! models — MAP estimator and posterior predictor for preference data.
//!
//! Purpose
//! -------
//! Wire the kernel, BTL and prior math from `preference::core` to the
//! bounded L-BFGS maximizer and expose the fitted GP posterior.
//!
//! Key behaviors
//! -------------
//! - [`MapObjective`] implements [`LogLikelihood`](crate::optimization::loglik_optimizer::LogLikelihood)
//!   over an explicit [`MapContext`] snapshot, with an analytic gradient for
//!   utilities and hyperparameters.
//! - [`PreferenceRegressor::fit`] runs the MAP fit, optionally warm-started
//!   from a previous [`FittedState`].
//! - [`FittedState`] answers posterior mean / std queries and reports the
//!   best sampled point.
//!
//! Invariants & assumptions
//! ------------------------
//! - A fit never mutates the store or the warm-start state it reads.
//! - Optimizer non-convergence is accepted; only a non-factorable covariance
//!   or invalid configuration is an error.
//!
//! Testing notes
//! -------------
//! - Unit tests cover gradient agreement with finite differences in every
//!   estimation mode, recovery of a total order, degenerate stores, warm-start
//!   dimension checks, and predictor behavior near and far from data.

pub mod fitted;
pub mod objective;
pub mod regressor;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::fitted::FittedState;
pub use self::objective::{HyperPriors, MapContext, MapObjective};
pub use self::regressor::PreferenceRegressor;
