//! Regressor options — configuration for MAP fitting.
//!
//! Purpose
//! -------
//! Bundle every knob of the MAP estimator in one typed value: which
//! parameters are free, the kernel defaults that seed the search and center
//! the priors, the BTL sharpness, the box constraints, and the optimizer
//! options. Replaces compile-time toggles with runtime flags.
//!
//! Key behaviors
//! -------------
//! - [`RegressorOptions::default`] reproduces the reference configuration
//!   (`a = 0.5`, `b = 0.005`, `r = 0.5`, prior variance `0.1`, BTL scale
//!   `0.01`, utilities in `[-10, 10]`, hyperparameters in `[1e-5, 10]`,
//!   L-BFGS with a 500-iteration budget).
//! - [`RegressorOptions::new`] and the `with_*` builders validate every value
//!   they touch; [`RegressorOptions::validate`] re-checks a struct whose
//!   public fields were edited directly.
//! - `noiseless` pins `b` at [`NOISELESS_B`] and removes it from the search.
//!
//! Invariants & assumptions
//! ------------------------
//! - Defaults lie strictly inside `[hyper_lower, hyper_upper]`.
//! - `hyper_lower > 0`, which keeps the kernel and the log-normal priors
//!   well-defined everywhere in the box.
use crate::{
    optimization::loglik_optimizer::MLEOptions,
    preference::{
        core::validation::{
            validate_btl_scale, validate_hyperparameter, validate_prior_variance,
            validate_utility_bound,
        },
        errors::{PreferenceError, PreferenceResult},
    },
};

/// Fixed noise level used when `noiseless` is set.
pub const NOISELESS_B: f64 = 1e-6;

/// Configuration for [`PreferenceRegressor`](crate::preference::models::PreferenceRegressor).
#[derive(Debug, Clone, PartialEq)]
pub struct RegressorOptions {
    /// Estimate `a`, `b`, `r` jointly with the utilities (MAP) instead of
    /// holding them at their defaults.
    pub use_map_hyperparameters: bool,
    /// Pin `b` at [`NOISELESS_B`].
    pub noiseless: bool,
    /// Signal variance `a`: start value and prior center.
    pub default_a: f64,
    /// Noise variance `b`: start value and prior center.
    pub default_b: f64,
    /// Length-scale `r` for every dimension: start value and prior center.
    pub default_r: f64,
    /// Variance of the log-normal hyperparameter priors (in log space).
    pub prior_variance: f64,
    /// BTL sharpness `s`; utilities enter the likelihood as `y / (s·w)`.
    pub btl_scale: f64,
    /// Utilities are boxed into `[-utility_bound, utility_bound]`.
    pub utility_bound: f64,
    /// Lower box limit for each free hyperparameter.
    pub hyper_lower: f64,
    /// Upper box limit for each free hyperparameter.
    pub hyper_upper: f64,
    /// Optimizer settings (line search, tolerances, iteration budget).
    pub mle_opts: MLEOptions,
    /// Log the initial objective and attach the argmin observer (with `obs_slog`).
    pub verbose: bool,
}

impl Default for RegressorOptions {
    fn default() -> Self {
        Self {
            use_map_hyperparameters: true,
            noiseless: false,
            default_a: 0.5,
            default_b: 0.005,
            default_r: 0.5,
            prior_variance: 0.1,
            btl_scale: 0.01,
            utility_bound: 10.0,
            hyper_lower: 1e-5,
            hyper_upper: 10.0,
            mle_opts: MLEOptions::default(),
            verbose: false,
        }
    }
}

impl RegressorOptions {
    /// Options with the given estimation mode, kernel defaults, priors and
    /// optimizer settings; the box limits keep their default values.
    ///
    /// # Errors
    /// - [`PreferenceError::InvalidHyperparameter`] for a non-positive or
    ///   out-of-box default.
    /// - [`PreferenceError::InvalidPriorVariance`] / [`PreferenceError::InvalidBtlScale`].
    pub fn new(
        use_map_hyperparameters: bool, default_a: f64, default_b: f64, default_r: f64,
        prior_variance: f64, btl_scale: f64, mle_opts: MLEOptions,
    ) -> PreferenceResult<Self> {
        let opts = Self {
            use_map_hyperparameters,
            default_a,
            default_b,
            default_r,
            prior_variance,
            btl_scale,
            mle_opts,
            ..Self::default()
        };
        opts.validate()?;
        Ok(opts)
    }

    pub fn with_noiseless(mut self, noiseless: bool) -> Self {
        self.noiseless = noiseless;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self.mle_opts.verbose = verbose;
        self
    }

    /// # Errors
    /// - [`PreferenceError::InvalidUtilityBound`] unless finite and > 0.
    pub fn with_utility_bound(mut self, bound: f64) -> PreferenceResult<Self> {
        validate_utility_bound(bound)?;
        self.utility_bound = bound;
        Ok(self)
    }

    /// # Errors
    /// - [`PreferenceError::InvalidHyperparameter`] if `lower` is not > 0,
    ///   `upper <= lower`, or a default falls outside `[lower, upper]`.
    pub fn with_hyperparameter_bounds(mut self, lower: f64, upper: f64) -> PreferenceResult<Self> {
        self.hyper_lower = lower;
        self.hyper_upper = upper;
        self.validate()?;
        Ok(self)
    }

    /// Noise level actually used: [`NOISELESS_B`] in noiseless mode, else `default_b`.
    pub fn effective_default_b(&self) -> f64 {
        if self.noiseless { NOISELESS_B } else { self.default_b }
    }

    /// Check every field; used at fit time since fields are public.
    ///
    /// # Errors
    /// See [`RegressorOptions::new`], [`RegressorOptions::with_utility_bound`]
    /// and [`RegressorOptions::with_hyperparameter_bounds`].
    pub fn validate(&self) -> PreferenceResult<()> {
        validate_hyperparameter("hyper_lower", self.hyper_lower)?;
        validate_hyperparameter("hyper_upper", self.hyper_upper)?;
        if self.hyper_upper <= self.hyper_lower {
            return Err(PreferenceError::InvalidHyperparameter {
                name: "hyper_upper",
                value: self.hyper_upper,
            });
        }
        for (name, value) in [("a", self.default_a), ("b", self.default_b), ("r", self.default_r)] {
            validate_hyperparameter(name, value)?;
            if value < self.hyper_lower || value > self.hyper_upper {
                return Err(PreferenceError::InvalidHyperparameter { name, value });
            }
        }
        validate_prior_variance(self.prior_variance)?;
        validate_btl_scale(self.btl_scale)?;
        validate_utility_bound(self.utility_bound)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_configuration() {
        let opts = RegressorOptions::default();
        assert!(opts.use_map_hyperparameters);
        assert_eq!((opts.default_a, opts.default_b, opts.default_r), (0.5, 0.005, 0.5));
        assert_eq!(opts.mle_opts.tols.max_iter, Some(500));
        assert!(opts.validate().is_ok());
        assert_eq!(opts.clone().with_noiseless(true).effective_default_b(), NOISELESS_B);
    }

    #[test]
    // Purpose
    // -------
    // Builders reject values that would leave the kernel or priors undefined.
    fn builders_validate_inputs() {
        let mle = MLEOptions::default();
        assert!(matches!(
            RegressorOptions::new(true, 0.0, 0.005, 0.5, 0.1, 0.01, mle.clone()),
            Err(PreferenceError::InvalidHyperparameter { name: "a", .. })
        ));
        assert!(matches!(
            RegressorOptions::new(true, 0.5, 0.005, 0.5, -1.0, 0.01, mle.clone()),
            Err(PreferenceError::InvalidPriorVariance { .. })
        ));
        assert!(matches!(
            RegressorOptions::new(false, 0.5, 0.005, 0.5, 0.1, 0.0, mle),
            Err(PreferenceError::InvalidBtlScale { .. })
        ));
        assert!(RegressorOptions::default().with_utility_bound(-1.0).is_err());
        assert!(RegressorOptions::default().with_hyperparameter_bounds(0.01, 10.0).is_err());
        assert!(RegressorOptions::default().with_hyperparameter_bounds(1e-6, 2.0).is_ok());
    }
}
