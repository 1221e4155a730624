//! Cholesky-based helpers for the GP covariance.
//!
//! `ndarray` is the crate's working representation; the factorization itself
//! runs in `nalgebra`. [`CovarianceFactor`] owns `C⁻¹` and `log |C|` for one
//! covariance matrix, which is everything the objective, its gradient and
//! the posterior predictor need.
use crate::preference::errors::{PreferenceError, PreferenceResult};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView1};

/// `C⁻¹` and `log |C|` of a symmetric positive-definite covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceFactor {
    inverse: Array2<f64>,
    log_det: f64,
}

impl CovarianceFactor {
    /// Factor `c` by Cholesky decomposition.
    ///
    /// # Errors
    /// - [`PreferenceError::CovarianceNotPositiveDefinite`] if the
    ///   decomposition fails or produces a non-finite determinant. This is a
    ///   fatal numeric fault.
    pub fn new(c: &Array2<f64>) -> PreferenceResult<Self> {
        let size = c.nrows();
        let chol = to_dmatrix(c)
            .cholesky()
            .ok_or(PreferenceError::CovarianceNotPositiveDefinite { size })?;
        let log_det = 2.0 * chol.l().diagonal().iter().map(|d| d.ln()).sum::<f64>();
        if !log_det.is_finite() {
            return Err(PreferenceError::CovarianceNotPositiveDefinite { size });
        }
        let inverse = from_dmatrix(&chol.inverse());
        Ok(Self { inverse, log_det })
    }

    /// Factor of the `0 × 0` covariance of an untrained model.
    pub(crate) fn empty() -> Self {
        Self { inverse: Array2::zeros((0, 0)), log_det: 0.0 }
    }

    pub fn inverse(&self) -> &Array2<f64> {
        &self.inverse
    }

    pub fn log_det(&self) -> f64 {
        self.log_det
    }

    /// `C⁻¹ v`.
    pub fn solve(&self, v: ArrayView1<f64>) -> Array1<f64> {
        self.inverse.dot(&v)
    }

    /// `vᵀ C⁻¹ v`.
    pub fn quad_form(&self, v: ArrayView1<f64>) -> f64 {
        v.dot(&self.solve(v))
    }
}

/// Copy a square `ndarray` matrix into a column-major `DMatrix`.
fn to_dmatrix(m: &Array2<f64>) -> DMatrix<f64> {
    let mut out = DMatrix::<f64>::zeros(m.nrows(), m.ncols());
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            out[(i, j)] = m[[i, j]];
        }
    }
    out
}

fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}
