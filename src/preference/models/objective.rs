//! MAP objective: log posterior of latent utilities and kernel hyperparameters.
//!
//! For θ laid out by [`ParamLayout`] the objective is
//!
//! ```text
//! ℓ(θ) = Σ_p log P_BTL(p | y, s·w_p)
//!      − ½ yᵀC⁻¹y − ½ log|C| − ½ M log 2π
//!      + Σ_h log LogNormal(h | default_h, prior_variance)   (free hyperparameters only)
//! ```
//!
//! and its gradient is
//!
//! ```text
//! ∂ℓ/∂y  = Σ_p ∇_y log P_BTL − C⁻¹y
//! ∂ℓ/∂h  = ½ αᵀ(∂C/∂h)α − ½ tr(C⁻¹ ∂C/∂h) + d/dh log prior(h),   α = C⁻¹y
//! ```
//!
//! Everything the callback reads lives in an explicit [`MapContext`]: a
//! snapshot of the observation store, the θ-layout, the options, and the
//! priors. [`MapObjective`] itself carries no state.
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, Grad, LogLikelihood, Theta},
    },
    preference::{
        core::{
            btl::{accumulate_preference_grad, preference_log_likelihood},
            data::PreferenceData,
            hyper::{Hyperparameters, ParamLayout},
            kernel::{covariance_matrix, d_covariance_d_a, d_covariance_d_r},
            linalg::CovarianceFactor,
            options::RegressorOptions,
            preference::Preference,
            priors::LogNormalPrior,
        },
        errors::{PreferenceError, PreferenceResult},
    },
};
use ndarray::{Array1, Array2, s};
use std::f64::consts::PI;

/// Log-normal priors on the free hyperparameters, centered on their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperPriors {
    pub a: LogNormalPrior,
    /// Absent in noiseless mode.
    pub b: Option<LogNormalPrior>,
    /// Shared by every length-scale component.
    pub r: LogNormalPrior,
}

impl HyperPriors {
    /// # Errors
    /// Propagates [`LogNormalPrior::new`] validation.
    pub fn from_options(opts: &RegressorOptions) -> PreferenceResult<Self> {
        let b = if opts.noiseless {
            None
        } else {
            Some(LogNormalPrior::new("b", opts.default_b, opts.prior_variance)?)
        };
        Ok(Self {
            a: LogNormalPrior::new("a", opts.default_a, opts.prior_variance)?,
            b,
            r: LogNormalPrior::new("r", opts.default_r, opts.prior_variance)?,
        })
    }

    pub fn ln_pdf(&self, hyper: &Hyperparameters) -> f64 {
        let b = self.b.as_ref().map_or(0.0, |p| p.ln_pdf(hyper.b));
        self.a.ln_pdf(hyper.a) + b + hyper.r.iter().map(|&r| self.r.ln_pdf(r)).sum::<f64>()
    }
}

/// Read-only snapshot handed to every objective evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct MapContext {
    pub points: Array2<f64>,
    pub preferences: Vec<Preference>,
    pub weights: Vec<f64>,
    pub layout: ParamLayout,
    pub options: RegressorOptions,
    /// `Some` exactly when hyperparameters are estimated.
    pub priors: Option<HyperPriors>,
}

impl MapContext {
    /// Snapshot `data` for one fit.
    ///
    /// # Errors
    /// - [`PreferenceError::NotFitted`] if the store has no dimensionality yet.
    /// - Propagates prior construction errors.
    pub fn new(data: &PreferenceData, options: &RegressorOptions) -> PreferenceResult<Self> {
        let dim = data.dim().ok_or(PreferenceError::NotFitted)?;
        let layout = ParamLayout::new(data.n_points(), dim, options);
        let priors = if options.use_map_hyperparameters {
            Some(HyperPriors::from_options(options)?)
        } else {
            None
        };
        Ok(Self {
            points: data.points().clone(),
            preferences: data.preferences().to_vec(),
            weights: data.weights().to_vec(),
            layout,
            options: options.clone(),
            priors,
        })
    }

    /// Hyperparameters encoded in θ (or the fixed defaults), checked for positivity.
    ///
    /// # Errors
    /// - [`PreferenceError::InvalidHyperparameter`] for a non-positive value.
    pub fn hyperparameters(&self, theta: &Theta) -> PreferenceResult<Hyperparameters> {
        let h = self.layout.hyperparameters(theta, &self.options);
        Hyperparameters::new(h.a, h.b, h.r)
    }

    fn factor(&self, hyper: &Hyperparameters) -> PreferenceResult<CovarianceFactor> {
        CovarianceFactor::new(&covariance_matrix(self.points.view(), hyper))
    }
}

/// Stateless MAP log-posterior over θ; all inputs come from [`MapContext`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapObjective;

impl LogLikelihood for MapObjective {
    type Data = MapContext;

    fn value(&self, theta: &Theta, ctx: &MapContext) -> OptResult<Cost> {
        let hyper = ctx.hyperparameters(theta)?;
        let factor = ctx.factor(&hyper)?;
        let y = ctx.layout.utilities(theta);
        let m = ctx.layout.n_points as f64;

        let btl: f64 = ctx
            .preferences
            .iter()
            .zip(ctx.weights.iter())
            .map(|(p, &w)| preference_log_likelihood(p, y, ctx.options.btl_scale * w))
            .sum();
        let gp = -0.5 * factor.quad_form(y) - 0.5 * factor.log_det() - 0.5 * m * (2.0 * PI).ln();
        let prior = ctx.priors.as_ref().map_or(0.0, |p| p.ln_pdf(&hyper));
        Ok(btl + gp + prior)
    }

    fn check(&self, theta: &Theta, ctx: &MapContext) -> OptResult<()> {
        if theta.len() != ctx.layout.len() {
            return Err(OptError::GradientDimMismatch {
                expected: ctx.layout.len(),
                found: theta.len(),
            });
        }
        ctx.hyperparameters(theta)?;
        Ok(())
    }

    fn grad(&self, theta: &Theta, ctx: &MapContext) -> OptResult<Grad> {
        let hyper = ctx.hyperparameters(theta)?;
        let factor = ctx.factor(&hyper)?;
        let layout = &ctx.layout;
        let y = layout.utilities(theta);
        let mut grad = Grad::zeros(layout.len());

        {
            let mut grad_y = grad.slice_mut(s![..layout.n_points]);
            for (p, &w) in ctx.preferences.iter().zip(ctx.weights.iter()) {
                accumulate_preference_grad(p, y, ctx.options.btl_scale * w, grad_y.view_mut());
            }
        }
        let alpha = factor.solve(y);
        grad.slice_mut(s![..layout.n_points]).scaled_add(-1.0, &alpha);

        let (Some(priors), Some(ia), Some(ir)) = (ctx.priors.as_ref(), layout.a_index(), layout.r_start())
        else {
            return Ok(grad);
        };
        let c_inv = factor.inverse();
        let sensitivity = |dc: &Array2<f64>| -> f64 {
            0.5 * alpha.dot(&dc.dot(&alpha)) - 0.5 * (c_inv * dc).sum()
        };

        let points = ctx.points.view();
        grad[ia] = sensitivity(&d_covariance_d_a(points, &hyper)) + priors.a.d_ln_pdf(hyper.a);
        if let (Some(ib), Some(prior_b)) = (layout.b_index(), priors.b.as_ref()) {
            // ∂C/∂b = I
            grad[ib] = 0.5 * alpha.dot(&alpha) - 0.5 * c_inv.diag().sum() + prior_b.d_ln_pdf(hyper.b);
        }
        for d in 0..layout.dim {
            grad[ir + d] = sensitivity(&d_covariance_d_r(points, &hyper, d))
                + priors.r.d_ln_pdf(hyper.r[d]);
        }
        Ok(grad)
    }
}

/// Posterior-mean weights `α = C⁻¹y` at a solved θ, with the factor reused for prediction.
pub(crate) fn solve_at(
    ctx: &MapContext, theta: &Theta,
) -> PreferenceResult<(Array1<f64>, Hyperparameters, Array2<f64>, CovarianceFactor)> {
    let hyper = ctx.hyperparameters(theta)?;
    let covariance = covariance_matrix(ctx.points.view(), &hyper);
    let factor = CovarianceFactor::new(&covariance)?;
    Ok((ctx.layout.utilities(theta).to_owned(), hyper, covariance, factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::finite_diff::loglik_gradient;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn store() -> PreferenceData {
        let points = array![[0.1, 0.6, 0.9, 0.35], [0.2, 0.7, 0.3, 0.8]];
        let prefs = vec![
            Preference::new(vec![1, 0, 2]).unwrap(),
            Preference::new(vec![3, 1]).unwrap(),
            Preference::new(vec![2, 0]).unwrap(),
        ];
        PreferenceData::from_parts(points, prefs, Some(vec![1.0, 2.0, 0.5])).unwrap()
    }

    fn options(free: bool, noiseless: bool) -> RegressorOptions {
        RegressorOptions { use_map_hyperparameters: free, btl_scale: 0.5, ..Default::default() }
            .with_noiseless(noiseless)
    }

    fn random_interior_theta(rng: &mut StdRng, layout: &ParamLayout) -> Theta {
        let mut theta = Theta::zeros(layout.len());
        for (i, t) in theta.iter_mut().enumerate() {
            *t = if i < layout.n_points { rng.gen_range(-1.5..1.5) } else { rng.gen_range(0.2..1.5) };
        }
        theta
    }

    #[test]
    // Purpose
    // -------
    // The analytic MAP gradient agrees with central finite differences at
    // random interior points, in every estimation mode.
    //
    // Given
    // -----
    // - 4 points in 2 dimensions, 3 weighted preferences, BTL scale 0.5.
    // - Modes: fixed hyperparameters, free, free + noiseless.
    // - 5 θ draws per mode from a seeded StdRng.
    //
    // Expect
    // ------
    // - Every component matches to 1e-4 relative (1e-5 absolute).
    fn analytic_gradient_matches_finite_differences() {
        let data = store();
        let mut rng = StdRng::seed_from_u64(7);
        for (free, noiseless) in [(false, false), (true, false), (true, true)] {
            let ctx = MapContext::new(&data, &options(free, noiseless)).unwrap();
            for _ in 0..5 {
                let theta = random_interior_theta(&mut rng, &ctx.layout);
                let analytic = MapObjective.grad(&theta, &ctx).unwrap();
                let numeric = loglik_gradient(&MapObjective, &theta, &ctx).unwrap();
                for (a, n) in analytic.iter().zip(numeric.iter()) {
                    assert_relative_eq!(*a, *n, epsilon = 1e-5, max_relative = 1e-4);
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // With fixed hyperparameters and no preferences pulling, the value is
    // exactly the zero-mean Gaussian log density plus the BTL terms.
    fn value_decomposes_into_btl_and_gaussian_terms() {
        let points = array![[0.0, 1.0]];
        let prefs = vec![Preference::new(vec![0, 1]).unwrap()];
        let data = PreferenceData::from_parts(points.clone(), prefs, None).unwrap();
        let opts = options(false, false);
        let ctx = MapContext::new(&data, &opts).unwrap();
        let theta = array![0.4, -0.2];

        let hyper = Hyperparameters::defaults(&opts, 1);
        let c = covariance_matrix(points.view(), &hyper);
        let det = c[[0, 0]] * c[[1, 1]] - c[[0, 1]] * c[[1, 0]];
        let quad = (c[[1, 1]] * 0.16 - 2.0 * c[[0, 1]] * 0.4 * -0.2 + c[[0, 0]] * 0.04) / det;
        let gauss = -0.5 * quad - 0.5 * det.ln() - (2.0 * PI).ln();
        let btl = -(1.0 + (-(0.6_f64) / 0.5).exp()).ln();

        assert_relative_eq!(MapObjective.value(&theta, &ctx).unwrap(), gauss + btl, max_relative = 1e-10);
    }

    #[test]
    fn check_rejects_wrong_length_and_non_positive_hyperparameters() {
        let ctx = MapContext::new(&store(), &options(true, false)).unwrap();
        assert!(matches!(
            MapObjective.check(&Theta::zeros(3), &ctx),
            Err(OptError::GradientDimMismatch { expected: 8, found: 3 })
        ));
        let mut theta = Theta::from_elem(ctx.layout.len(), 0.5);
        theta[ctx.layout.a_index().unwrap()] = 0.0;
        assert!(matches!(
            MapObjective.check(&theta, &ctx),
            Err(OptError::InvalidHyperparameter { name: "a", .. })
        ));
    }
}
