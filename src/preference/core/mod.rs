//! core — observation store, kernel and BTL math, priors, and θ-layout.
//!
//! Purpose
//! -------
//! Collect the building blocks of GP preference regression: the preference
//! and observation-store data model, the ARD squared-exponential kernel with
//! its closed-form derivatives, the BTL ordering likelihood, log-normal
//! hyperparameter priors, the layout of the optimizer vector, Cholesky
//! helpers, diagnostics export, and validation. The MAP estimator in
//! `preference::models` is assembled from these pieces.
//!
//! Key behaviors
//! -------------
//! - Hold sample points and preferences with their invariants enforced on
//!   every mutation ([`PreferenceData`], [`Preference`]), including
//!   near-duplicate merging through a single old→new relabeling.
//! - Compute `C = K + b·I`, the cross-covariance `k(x)`, and `∂C/∂a`,
//!   `∂C/∂b`, `∂C/∂r_d` ([`kernel`]).
//! - Score a preference as a total order under BTL in log space, with a
//!   closed-form gradient ([`btl`]).
//! - Factor `C` once per evaluation and expose `C⁻¹` and `log |C|`
//!   ([`CovarianceFactor`]).
//! - Split and assemble `θ = (y | a | b | r)` according to the estimation
//!   mode ([`ParamLayout`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Sample points are columns of a `D × M` matrix; every preference index is
//!   a valid column and appears at most once per preference.
//! - Hyperparameters are strictly positive wherever the kernel or a prior is
//!   evaluated; this is enforced by the optimizer box, not by clamping.
//! - A failed Cholesky factorization is a fatal numeric fault.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; a preference lists its most preferred index first.
//! - Everything except [`export`] and the merge `debug` log is pure and free
//!   of I/O.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover store bookkeeping and merging, kernel
//!   symmetry and FD-checked derivatives, BTL monotonicity and gradients,
//!   prior densities, θ-layout per mode, Cholesky helpers, and CSV output.

pub mod btl;
pub mod data;
pub mod export;
pub mod hyper;
pub mod kernel;
pub mod linalg;
pub mod options;
pub mod preference;
pub mod priors;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::btl::{
    accumulate_preference_grad, btl_log_likelihood, btl_log_likelihood_grad,
    preference_log_likelihood,
};
pub use self::data::PreferenceData;
pub use self::export::{dump_data, export_points_csv, export_preferences_csv};
pub use self::hyper::{Hyperparameters, ParamLayout};
pub use self::kernel::{
    ard_squared_exp, covariance_matrix, cross_covariance, d_covariance_d_a, d_covariance_d_b,
    d_covariance_d_r, prior_variance,
};
pub use self::linalg::CovarianceFactor;
pub use self::options::{NOISELESS_B, RegressorOptions};
pub use self::preference::Preference;
pub use self::priors::LogNormalPrior;
