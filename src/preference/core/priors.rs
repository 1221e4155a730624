//! Log-normal hyperparameter priors.
//!
//! Each free hyperparameter `x` gets `ln x ~ N(ln m, v)` where `m` is its
//! default value and `v` the configured prior variance. The density comes
//! from `statrs`; its derivative is closed form:
//!
//! ```text
//! d/dx ln p(x) = (ln m − v − ln x) / (v · x)
//! ```
use crate::preference::{
    core::validation::{validate_hyperparameter, validate_prior_variance},
    errors::{PreferenceError, PreferenceResult},
};
use statrs::distribution::{Continuous, LogNormal, LogNormalError};

/// Log-normal prior centered (in log space) on a default hyperparameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogNormalPrior {
    location: f64,
    variance: f64,
    dist: LogNormal,
}

impl LogNormalPrior {
    /// # Errors
    /// - [`PreferenceError::InvalidHyperparameter`] if `mean` is not finite and > 0.
    /// - [`PreferenceError::InvalidPriorVariance`] if `variance` is not finite and > 0.
    pub fn new(name: &'static str, mean: f64, variance: f64) -> PreferenceResult<Self> {
        validate_hyperparameter(name, mean)?;
        validate_prior_variance(variance)?;
        let location = mean.ln();
        let dist = LogNormal::new(location, variance.sqrt()).map_err(|err| match err {
            LogNormalError::LocationInvalid => {
                PreferenceError::InvalidHyperparameter { name, value: mean }
            }
            _ => PreferenceError::InvalidPriorVariance { value: variance },
        })?;
        Ok(Self { location, variance, dist })
    }

    /// `ln p(x)`; `-∞` for `x <= 0`.
    pub fn ln_pdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return f64::NEG_INFINITY;
        }
        self.dist.ln_pdf(x)
    }

    /// `d/dx ln p(x)` for `x > 0`.
    pub fn d_ln_pdf(&self, x: f64) -> f64 {
        (self.location - self.variance - x.ln()) / (self.variance * x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // The density matches the textbook log-normal and its derivative
    // matches a central difference.
    fn log_density_and_derivative_are_consistent() {
        let prior = LogNormalPrior::new("a", 0.5, 0.1).unwrap();
        for &x in &[0.05_f64, 0.3, 0.5, 1.7, 6.0] {
            let z = x.ln() - 0.5_f64.ln();
            let textbook =
                -x.ln() - 0.5 * (2.0 * std::f64::consts::PI * 0.1).ln() - z * z / (2.0 * 0.1);
            assert_relative_eq!(prior.ln_pdf(x), textbook, max_relative = 1e-10);

            let h = 1e-6 * x;
            let fd = (prior.ln_pdf(x + h) - prior.ln_pdf(x - h)) / (2.0 * h);
            assert_relative_eq!(prior.d_ln_pdf(x), fd, max_relative = 1e-5);
        }
    }

    #[test]
    fn mode_sits_below_the_default() {
        // mode = exp(μ − σ²)
        let prior = LogNormalPrior::new("r", 0.5, 0.1).unwrap();
        let mode = (0.5_f64.ln() - 0.1).exp();
        assert!(prior.d_ln_pdf(mode).abs() < 1e-12);
        assert!(prior.d_ln_pdf(0.5) < 0.0);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(matches!(
            LogNormalPrior::new("b", 0.0, 0.1),
            Err(PreferenceError::InvalidHyperparameter { name: "b", .. })
        ));
        assert!(matches!(
            LogNormalPrior::new("b", 0.1, 0.0),
            Err(PreferenceError::InvalidPriorVariance { .. })
        ));
        assert_eq!(LogNormalPrior::new("a", 1.0, 1.0).unwrap().ln_pdf(-1.0), f64::NEG_INFINITY);
    }
}
