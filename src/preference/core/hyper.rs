//! Kernel hyperparameters and the layout of the optimizer vector θ.
//!
//! θ is laid out as
//!
//! ```text
//! θ = ( y₀ … y_{M-1} | a | b | r₀ … r_{D-1} )
//! ```
//!
//! where the hyperparameter block is present only when they are estimated,
//! and `b` is dropped from it in noiseless mode. Fixed hyperparameters are
//! taken from [`RegressorOptions`].
use crate::{
    optimization::{
        errors::OptResult,
        loglik_optimizer::{Bounds, Theta},
    },
    preference::{
        core::{options::RegressorOptions, validation::validate_hyperparameter},
        errors::{PreferenceError, PreferenceResult},
    },
};
use ndarray::{Array1, ArrayView1, s};

/// ARD kernel hyperparameters: signal variance `a`, noise `b`, length-scales `r`.
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperparameters {
    pub a: f64,
    pub b: f64,
    pub r: Array1<f64>,
}

impl Hyperparameters {
    /// # Errors
    /// - [`PreferenceError::InvalidHyperparameter`] for any non-positive or
    ///   non-finite value.
    pub fn new(a: f64, b: f64, r: Array1<f64>) -> PreferenceResult<Self> {
        validate_hyperparameter("a", a)?;
        validate_hyperparameter("b", b)?;
        for &ri in r.iter() {
            validate_hyperparameter("r", ri)?;
        }
        Ok(Self { a, b, r })
    }

    /// Defaults from `opts` with `default_r` broadcast over `dim` dimensions.
    pub fn defaults(opts: &RegressorOptions, dim: usize) -> Self {
        Self {
            a: opts.default_a,
            b: opts.effective_default_b(),
            r: Array1::from_elem(dim, opts.default_r),
        }
    }

    pub fn dim(&self) -> usize {
        self.r.len()
    }
}

/// Position of every block inside θ for a given problem size and mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamLayout {
    pub n_points: usize,
    pub dim: usize,
    pub free_hyperparameters: bool,
    pub noiseless: bool,
}

impl ParamLayout {
    pub fn new(n_points: usize, dim: usize, opts: &RegressorOptions) -> Self {
        Self {
            n_points,
            dim,
            free_hyperparameters: opts.use_map_hyperparameters,
            noiseless: opts.noiseless,
        }
    }

    pub fn len(&self) -> usize {
        if self.free_hyperparameters {
            self.n_points + 1 + usize::from(!self.noiseless) + self.dim
        } else {
            self.n_points
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// θ-index of `a`, when free.
    pub fn a_index(&self) -> Option<usize> {
        self.free_hyperparameters.then_some(self.n_points)
    }

    /// θ-index of `b`, when free.
    pub fn b_index(&self) -> Option<usize> {
        (self.free_hyperparameters && !self.noiseless).then_some(self.n_points + 1)
    }

    /// θ-index of `r₀`, when free.
    pub fn r_start(&self) -> Option<usize> {
        self.free_hyperparameters.then(|| self.n_points + 1 + usize::from(!self.noiseless))
    }

    pub fn utilities<'a>(&self, theta: &'a Theta) -> ArrayView1<'a, f64> {
        theta.slice(s![..self.n_points])
    }

    /// Hyperparameters encoded in θ, or the fixed defaults when not free.
    pub fn hyperparameters(&self, theta: &Theta, opts: &RegressorOptions) -> Hyperparameters {
        let defaults = Hyperparameters::defaults(opts, self.dim);
        match (self.a_index(), self.r_start()) {
            (Some(ia), Some(ir)) => Hyperparameters {
                a: theta[ia],
                b: self.b_index().map_or(defaults.b, |ib| theta[ib]),
                r: theta.slice(s![ir..ir + self.dim]).to_owned(),
            },
            _ => defaults,
        }
    }

    /// Assemble θ from utilities and hyperparameters (the latter ignored when fixed).
    ///
    /// # Errors
    /// - [`PreferenceError::DimensionMismatch`] if `y` or `hyper.r` have the
    ///   wrong length.
    pub fn assemble(&self, y: ArrayView1<f64>, hyper: &Hyperparameters) -> PreferenceResult<Theta> {
        if y.len() != self.n_points {
            return Err(PreferenceError::DimensionMismatch {
                expected: self.n_points,
                found: y.len(),
            });
        }
        if hyper.r.len() != self.dim {
            return Err(PreferenceError::DimensionMismatch {
                expected: self.dim,
                found: hyper.r.len(),
            });
        }
        let mut theta = Theta::zeros(self.len());
        theta.slice_mut(s![..self.n_points]).assign(&y);
        if let (Some(ia), Some(ir)) = (self.a_index(), self.r_start()) {
            theta[ia] = hyper.a;
            if let Some(ib) = self.b_index() {
                theta[ib] = hyper.b;
            }
            theta.slice_mut(s![ir..ir + self.dim]).assign(&hyper.r);
        }
        Ok(theta)
    }

    /// Box constraints: utilities in `[-utility_bound, utility_bound]`,
    /// hyperparameters in `[hyper_lower, hyper_upper]`.
    ///
    /// # Errors
    /// Propagates [`Bounds::new`] validation.
    pub fn bounds(&self, opts: &RegressorOptions) -> OptResult<Bounds> {
        let mut lower = Theta::from_elem(self.len(), opts.hyper_lower);
        let mut upper = Theta::from_elem(self.len(), opts.hyper_upper);
        lower.slice_mut(s![..self.n_points]).fill(-opts.utility_bound);
        upper.slice_mut(s![..self.n_points]).fill(opts.utility_bound);
        Bounds::new(lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // θ layout in the three modes: fixed, free, free + noiseless.
    //
    // Given
    // -----
    // - M = 3 points in D = 2 dimensions.
    //
    // Expect
    // ------
    // - Lengths 3, 7, 6, with b absent from θ in noiseless mode.
    fn layout_lengths_and_indices_per_mode() {
        let mut opts = RegressorOptions { use_map_hyperparameters: false, ..Default::default() };
        assert_eq!(ParamLayout::new(3, 2, &opts).len(), 3);
        assert_eq!(ParamLayout::new(3, 2, &opts).a_index(), None);

        opts.use_map_hyperparameters = true;
        let free = ParamLayout::new(3, 2, &opts);
        assert_eq!((free.len(), free.a_index(), free.b_index(), free.r_start()), (7, Some(3), Some(4), Some(5)));

        opts.noiseless = true;
        let nl = ParamLayout::new(3, 2, &opts);
        assert_eq!((nl.len(), nl.b_index(), nl.r_start()), (6, None, Some(4)));
    }

    #[test]
    fn assemble_and_split_agree() {
        let opts = RegressorOptions::default();
        let layout = ParamLayout::new(2, 2, &opts);
        let hyper = Hyperparameters::new(0.7, 0.01, array![0.3, 0.9]).unwrap();
        let theta = layout.assemble(array![1.0, -1.0].view(), &hyper).unwrap();
        assert_eq!(theta, array![1.0, -1.0, 0.7, 0.01, 0.3, 0.9]);
        assert_eq!(layout.hyperparameters(&theta, &opts), hyper);
        assert_eq!(layout.utilities(&theta), array![1.0, -1.0].view());

        let fixed = ParamLayout::new(2, 2, &RegressorOptions { use_map_hyperparameters: false, ..opts.clone() });
        let theta = fixed.assemble(array![0.5, 0.2].view(), &hyper).unwrap();
        assert_eq!(theta.len(), 2);
        assert_eq!(fixed.hyperparameters(&theta, &opts), Hyperparameters::defaults(&opts, 2));
    }

    #[test]
    fn bounds_split_utilities_from_hyperparameters() {
        let opts = RegressorOptions::default();
        let b = ParamLayout::new(2, 1, &opts).bounds(&opts).unwrap();
        assert_eq!(b.lower(), &array![-10.0, -10.0, 1e-5, 1e-5, 1e-5]);
        assert_eq!(b.upper(), &array![10.0, 10.0, 10.0, 10.0, 10.0]);
        assert!(Hyperparameters::new(0.5, 0.0, array![1.0]).is_err());
    }
}
