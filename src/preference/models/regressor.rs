//! GP preference regressor: MAP fit with optional warm start, then prediction.
//!
//! [`PreferenceRegressor::fit`] snapshots the observation store into a
//! [`MapContext`], builds the start θ (zeros and defaults, or the previous
//! posterior evaluated at the current points), and hands [`MapObjective`] to
//! the bounded L-BFGS maximizer. The optimizer returns a local optimum; no
//! global-optimality guarantee is made, and a run that hits the iteration
//! budget or is recovered from a solver abort is still accepted.
use crate::{
    optimization::loglik_optimizer::{OptimOutcome, Theta, maximize},
    preference::{
        core::{data::PreferenceData, hyper::Hyperparameters, options::RegressorOptions},
        errors::{PreferenceError, PreferenceResult},
        models::{
            fitted::FittedState,
            objective::{MapContext, MapObjective, solve_at},
        },
    },
};
use ndarray::{Array1, ArrayView1};
use std::time::Instant;

/// MAP estimator and posterior predictor for preference data.
///
/// The fitted state is not kept in sync with the store: after appending
/// observations, call [`fit`](Self::fit) again, optionally warm-started from
/// a clone of the previous [`FittedState`].
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceRegressor {
    /// Estimation settings.
    pub options: RegressorOptions,
    /// State of the last fit (`None` before the first call to `fit`).
    pub fitted: Option<FittedState>,
}

impl PreferenceRegressor {
    /// # Errors
    /// Propagates [`RegressorOptions::validate`].
    pub fn new(options: RegressorOptions) -> PreferenceResult<Self> {
        options.validate()?;
        Ok(Self { options, fitted: None })
    }

    /// Fit utilities (and, if enabled, hyperparameters) to `data`.
    ///
    /// ## Steps
    /// 1. Validate options. An empty store or one without preferences yields
    ///    an untrained state without running the optimizer.
    /// 2. Start from zero utilities and default hyperparameters, or, with a
    ///    trained `previous`, from its posterior mean at every current point
    ///    and its hyperparameters.
    /// 3. Maximize the MAP objective inside the utility and hyperparameter
    ///    boxes within the configured iteration budget.
    /// 4. Recompute `C` and `C⁻¹` at the solution and store the result.
    ///
    /// # Errors
    /// - [`PreferenceError::WarmStartDimensionMismatch`] if `previous` was
    ///   fitted in another dimensionality.
    /// - [`PreferenceError::CovarianceNotPositiveDefinite`] if the covariance
    ///   cannot be factored (fatal).
    /// - [`PreferenceError::OptimizationFailed`] for optimizer configuration
    ///   errors.
    pub fn fit(
        &mut self, data: &PreferenceData, previous: Option<&FittedState>,
    ) -> PreferenceResult<&FittedState> {
        self.options.validate()?;
        let dim = data.dim().unwrap_or(0);
        if data.is_empty() || data.n_preferences() == 0 {
            log::debug!("no preferences recorded; model left untrained");
            let state = FittedState::untrained(dim, Hyperparameters::defaults(&self.options, dim));
            return Ok(&*self.fitted.insert(state));
        }

        let timer = Instant::now();
        let ctx = MapContext::new(data, &self.options)?;
        let warm = previous.filter(|p| p.is_trained());
        log::debug!(
            "fitting preference model: {} points, {} preferences, dim {}, {} start",
            data.n_points(),
            data.n_preferences(),
            dim,
            if warm.is_some() { "warm" } else { "cold" }
        );

        let theta0 = self.initial_theta(data, &ctx, warm)?;
        let bounds = ctx.layout.bounds(&self.options)?;
        let mut mle_opts = self.options.mle_opts.clone();
        mle_opts.verbose |= self.options.verbose;
        let outcome: OptimOutcome = maximize(&MapObjective, theta0, &bounds, &ctx, &mle_opts)?;

        let (utilities, hyper, covariance, factor) = solve_at(&ctx, &outcome.theta_hat)?;
        log::debug!(
            "fit finished in {:.3?}: status {}, log posterior {:.6}, a = {:.4}, b = {:.4e}, r = {}",
            timer.elapsed(),
            outcome.status,
            outcome.value,
            hyper.a,
            hyper.b,
            hyper.r
        );
        let state = FittedState::trained(ctx.points, utilities, hyper, covariance, factor, outcome);
        Ok(&*self.fitted.insert(state))
    }

    fn initial_theta(
        &self, data: &PreferenceData, ctx: &MapContext, previous: Option<&FittedState>,
    ) -> PreferenceResult<Theta> {
        let dim = ctx.layout.dim;
        let Some(prev) = previous else {
            let y = Array1::zeros(data.n_points());
            return ctx.layout.assemble(y.view(), &Hyperparameters::defaults(&self.options, dim));
        };
        if prev.dim() != dim {
            return Err(PreferenceError::WarmStartDimensionMismatch { expected: dim, found: prev.dim() });
        }
        let y = data
            .points()
            .columns()
            .into_iter()
            .map(|x| prev.estimate_mean(x))
            .collect::<PreferenceResult<Array1<f64>>>()?;
        ctx.layout.assemble(y.view(), prev.hyperparameters())
    }

    /// State of the last fit.
    ///
    /// # Errors
    /// - [`PreferenceError::NotFitted`] before the first fit.
    pub fn fitted(&self) -> PreferenceResult<&FittedState> {
        self.fitted.as_ref().ok_or(PreferenceError::NotFitted)
    }

    pub fn is_trained(&self) -> bool {
        self.fitted.as_ref().is_some_and(FittedState::is_trained)
    }

    /// See [`FittedState::estimate_mean`].
    ///
    /// # Errors
    /// - [`PreferenceError::NotFitted`] before a trained fit.
    pub fn estimate_mean(&self, x: ArrayView1<f64>) -> PreferenceResult<f64> {
        self.fitted()?.estimate_mean(x)
    }

    /// See [`FittedState::estimate_std`].
    ///
    /// # Errors
    /// - [`PreferenceError::NotFitted`] before a trained fit.
    pub fn estimate_std(&self, x: ArrayView1<f64>) -> PreferenceResult<f64> {
        self.fitted()?.estimate_std(x)
    }

    /// See [`FittedState::best_sampled_index`].
    ///
    /// # Errors
    /// - [`PreferenceError::NotFitted`] before a trained fit.
    pub fn best_sampled_index(&self) -> PreferenceResult<usize> {
        self.fitted()?.best_sampled_index()
    }

    /// See [`FittedState::best_sampled_point`].
    ///
    /// # Errors
    /// - [`PreferenceError::NotFitted`] before a trained fit.
    pub fn best_sampled_point(&self) -> PreferenceResult<ArrayView1<'_, f64>> {
        self.fitted()?.best_sampled_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preference::core::preference::Preference;
    use ndarray::{Array2, array};

    fn fixed_options() -> RegressorOptions {
        RegressorOptions { use_map_hyperparameters: false, btl_scale: 1.0, ..Default::default() }
    }

    #[test]
    // Purpose
    // -------
    // A single 3-way preference is reproduced by the fitted utilities.
    //
    // Given
    // -----
    // - 3 two-dimensional points and the preference 0 ≻ 1 ≻ 2.
    // - Fixed hyperparameters, BTL scale 1.
    //
    // Expect
    // ------
    // - y₀ > y₁ > y₂ and the best sampled point is point 0.
    fn total_order_is_recovered() {
        let points = array![[0.1, 0.5, 0.9], [0.2, 0.4, 0.8]];
        let prefs = vec![Preference::new(vec![0, 1, 2]).unwrap()];
        let data = PreferenceData::from_parts(points, prefs, None).unwrap();

        let mut model = PreferenceRegressor::new(fixed_options()).unwrap();
        let y = model.fit(&data, None).unwrap().utilities().clone();
        assert!(y[0] > y[1] && y[1] > y[2], "utilities {y}");
        assert_eq!(model.best_sampled_index().unwrap(), 0);
        assert_eq!(model.best_sampled_point().unwrap(), array![0.1, 0.2].view());
    }

    #[test]
    // Purpose
    // -------
    // Stores without preferences produce an untrained state instead of an
    // optimizer run, and predictions then report `NotFitted`.
    fn degenerate_stores_leave_model_untrained() {
        let mut model = PreferenceRegressor::new(RegressorOptions::default()).unwrap();
        assert_eq!(model.estimate_mean(array![0.0].view()), Err(PreferenceError::NotFitted));

        let state = model.fit(&PreferenceData::new(), None).unwrap();
        assert!(!state.is_trained());
        assert!(state.outcome().is_none());

        let no_prefs = PreferenceData::from_parts(Array2::zeros((2, 3)), vec![], None).unwrap();
        assert_eq!(model.fit(&no_prefs, None).unwrap().dim(), 2);
        assert!(!model.is_trained());
        assert_eq!(model.estimate_std(array![0.0, 0.0].view()), Err(PreferenceError::NotFitted));
    }

    #[test]
    fn warm_start_checks_dimensionality() {
        let one_d = PreferenceData::from_parts(
            array![[0.0, 1.0]],
            vec![Preference::new(vec![1, 0]).unwrap()],
            None,
        )
        .unwrap();
        let mut first = PreferenceRegressor::new(fixed_options()).unwrap();
        let previous = first.fit(&one_d, None).unwrap().clone();

        let two_d = PreferenceData::from_parts(
            array![[0.0, 1.0], [0.5, 0.5]],
            vec![Preference::new(vec![1, 0]).unwrap()],
            None,
        )
        .unwrap();
        let mut second = PreferenceRegressor::new(fixed_options()).unwrap();
        assert_eq!(
            second.fit(&two_d, Some(&previous)).unwrap_err(),
            PreferenceError::WarmStartDimensionMismatch { expected: 2, found: 1 }
        );
    }
}
