//! Fitted state and the GP posterior predictor.
//!
//! A [`FittedState`] is produced by
//! [`PreferenceRegressor::fit`](crate::preference::models::PreferenceRegressor::fit)
//! and is immutable afterwards: later fits only read it (warm start). It
//! answers
//!
//! ```text
//! mean(x) = k(x)ᵀ C⁻¹ y
//! std(x)  = sqrt(max(0, a + b − k(x)ᵀ C⁻¹ k(x)))
//! ```
//!
//! An untrained state (empty store or no preferences) keeps the
//! dimensionality and default hyperparameters but answers every query with
//! [`PreferenceError::NotFitted`].
use crate::{
    optimization::loglik_optimizer::OptimOutcome,
    preference::{
        core::{
            hyper::Hyperparameters,
            kernel::{cross_covariance, prior_variance},
            linalg::CovarianceFactor,
        },
        errors::{PreferenceError, PreferenceResult},
    },
};
use ndarray::{Array1, Array2, ArrayView1};

#[derive(Debug, Clone, PartialEq)]
pub struct FittedState {
    points: Array2<f64>,
    utilities: Array1<f64>,
    hyperparameters: Hyperparameters,
    covariance: Array2<f64>,
    factor: CovarianceFactor,
    /// `C⁻¹y`
    weights: Array1<f64>,
    log_posterior: f64,
    outcome: Option<OptimOutcome>,
}

impl FittedState {
    pub(crate) fn trained(
        points: Array2<f64>, utilities: Array1<f64>, hyperparameters: Hyperparameters,
        covariance: Array2<f64>, factor: CovarianceFactor, outcome: OptimOutcome,
    ) -> Self {
        let weights = factor.solve(utilities.view());
        Self {
            points,
            utilities,
            hyperparameters,
            covariance,
            factor,
            weights,
            log_posterior: outcome.value,
            outcome: Some(outcome),
        }
    }

    pub(crate) fn untrained(dim: usize, hyperparameters: Hyperparameters) -> Self {
        Self {
            points: Array2::zeros((dim, 0)),
            utilities: Array1::zeros(0),
            hyperparameters,
            covariance: Array2::zeros((0, 0)),
            factor: CovarianceFactor::empty(),
            weights: Array1::zeros(0),
            log_posterior: f64::NEG_INFINITY,
            outcome: None,
        }
    }

    /// `true` once the state holds at least one fitted utility.
    pub fn is_trained(&self) -> bool {
        !self.utilities.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.points.nrows()
    }

    pub fn n_points(&self) -> usize {
        self.points.ncols()
    }

    /// Sample matrix the state was fitted on (`D × M`).
    pub fn points(&self) -> &Array2<f64> {
        &self.points
    }

    /// Latent utility `y` per sampled point.
    pub fn utilities(&self) -> &Array1<f64> {
        &self.utilities
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    pub fn inverse_covariance(&self) -> &Array2<f64> {
        self.factor.inverse()
    }

    /// Objective value at the solution; `-∞` when untrained.
    pub fn log_posterior(&self) -> f64 {
        self.log_posterior
    }

    /// Optimizer report of the fit, if one ran.
    pub fn outcome(&self) -> Option<&OptimOutcome> {
        self.outcome.as_ref()
    }

    /// Posterior mean `k(x)ᵀ C⁻¹ y`.
    ///
    /// # Errors
    /// - [`PreferenceError::NotFitted`] for an untrained state.
    /// - [`PreferenceError::DimensionMismatch`] if `x` has the wrong length.
    pub fn estimate_mean(&self, x: ArrayView1<f64>) -> PreferenceResult<f64> {
        let k = self.query(x)?;
        Ok(k.dot(&self.weights))
    }

    /// Posterior standard deviation; the variance is clamped at zero.
    ///
    /// # Errors
    /// Same as [`FittedState::estimate_mean`].
    pub fn estimate_std(&self, x: ArrayView1<f64>) -> PreferenceResult<f64> {
        let k = self.query(x)?;
        let var = prior_variance(&self.hyperparameters) - self.factor.quad_form(k.view());
        Ok(var.max(0.0).sqrt())
    }

    /// Index of the maximal fitted utility; ties go to the lowest index.
    ///
    /// # Errors
    /// - [`PreferenceError::NotFitted`] for an untrained state.
    pub fn best_sampled_index(&self) -> PreferenceResult<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &y) in self.utilities.iter().enumerate() {
            match best {
                Some((_, top)) if y <= top => {}
                _ => best = Some((i, y)),
            }
        }
        best.map(|(i, _)| i).ok_or(PreferenceError::NotFitted)
    }

    /// Coordinates of [`FittedState::best_sampled_index`].
    ///
    /// # Errors
    /// - [`PreferenceError::NotFitted`] for an untrained state.
    pub fn best_sampled_point(&self) -> PreferenceResult<ArrayView1<'_, f64>> {
        Ok(self.points.column(self.best_sampled_index()?))
    }

    fn query(&self, x: ArrayView1<f64>) -> PreferenceResult<Array1<f64>> {
        if !self.is_trained() {
            return Err(PreferenceError::NotFitted);
        }
        if x.len() != self.dim() {
            return Err(PreferenceError::DimensionMismatch { expected: self.dim(), found: x.len() });
        }
        Ok(cross_covariance(x, self.points.view(), &self.hyperparameters))
    }
}
