//! Conversion helpers for the PyO3 bindings.
//!
//! Python callers pass points as array-likes with **one row per point**; the
//! Rust core stores them as columns. Everything here is compiled only with
//! the `python-bindings` feature.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTypeError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::loglik_optimizer::traits::{LineSearcher, MLEOptions, Tolerances},
    preference::{core::options::RegressorOptions, errors::PreferenceError},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
    PyReadonlyArray2,
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// One point as an owned vector.
#[cfg(feature = "python-bindings")]
pub fn extract_point<'py>(py: Python<'py>, raw: &Bound<'py, PyAny>) -> PyResult<Array1<f64>> {
    Ok(extract_f64_array(py, raw)?.as_array().to_owned())
}

/// `(n_points, dim)` array-like → `dim × n_points` sample matrix.
#[cfg(feature = "python-bindings")]
pub fn extract_points_matrix<'py>(raw: &Bound<'py, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr.as_array().t().to_owned());
    }
    let rows: Vec<Vec<f64>> = raw.extract().map_err(|_| {
        PyTypeError::new_err("expected a 2-D numpy.ndarray or nested sequence of float64")
    })?;
    let dim = rows.first().map_or(0, Vec::len);
    let mut out = Array2::zeros((dim, rows.len()));
    for (j, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(PreferenceError::DimensionMismatch { expected: dim, found: row.len() }.into());
        }
        for (i, &v) in row.iter().enumerate() {
            out[[i, j]] = v;
        }
    }
    Ok(out)
}

#[cfg(feature = "python-bindings")]
pub fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>, verbose: bool,
) -> PyResult<MLEOptions> {
    use std::str::FromStr;

    let defaults = MLEOptions::default();
    let tols = if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
        defaults.tols
    } else {
        Tolerances::new(tol_grad, tol_cost, max_iter).map_err(PreferenceError::from)?
    };
    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name).map_err(PreferenceError::from)?,
        None => LineSearcher::MoreThuente,
    };
    let opts = MLEOptions::new(tols, ls, verbose, lbfgs_mem).map_err(PreferenceError::from)?;
    Ok(opts)
}

/// Keyword arguments of the Python `PreferenceRegressor` constructor.
#[cfg(feature = "python-bindings")]
pub struct RegressorArgs<'a> {
    pub use_map_hyperparameters: bool,
    pub noiseless: bool,
    pub default_a: Option<f64>,
    pub default_b: Option<f64>,
    pub default_r: Option<f64>,
    pub prior_variance: Option<f64>,
    pub btl_scale: Option<f64>,
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
    pub line_searcher: Option<&'a str>,
    pub lbfgs_mem: Option<usize>,
    pub verbose: bool,
}

#[cfg(feature = "python-bindings")]
pub fn build_regressor_options(args: RegressorArgs<'_>) -> PyResult<RegressorOptions> {
    let base = RegressorOptions::default();
    let mle_opts = extract_mle_opts(
        args.tol_grad,
        args.tol_cost,
        args.max_iter,
        args.line_searcher,
        args.lbfgs_mem,
        args.verbose,
    )?;
    let opts = RegressorOptions::new(
        args.use_map_hyperparameters,
        args.default_a.unwrap_or(base.default_a),
        args.default_b.unwrap_or(base.default_b),
        args.default_r.unwrap_or(base.default_r),
        args.prior_variance.unwrap_or(base.prior_variance),
        args.btl_scale.unwrap_or(base.btl_scale),
        mle_opts,
    )?
    .with_noiseless(args.noiseless)
    .with_verbose(args.verbose);
    Ok(opts)
}
