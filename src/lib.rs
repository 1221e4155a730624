//! preference_regression — Gaussian-process preference regression with a BTL
//! likelihood, plus optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the observation store and the MAP regressor to Python via the
//! `_preference_regression` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules: `preference` (data model, kernel and
//!   likelihood math, MAP fit, posterior predictor) and `optimization` (the
//!   argmin-backed bounded maximizer it delegates to).
//! - With `python-bindings`, define the `PreferenceData` and
//!   `PreferenceRegressor` Python classes and register them under the
//!   `preference_regression.preference` submodule.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion, and error mapping.
//! - Python passes points with one row per point; the core stores columns.
//!
//! Conventions
//! -----------
//! - Errors from the core are propagated as [`PreferenceError`] /
//!   [`OptError`](optimization::errors::OptError) and converted to
//!   `ValueError` at the PyO3 boundary.
//! - Logging goes through the `log` facade; install any logger to see fit
//!   diagnostics.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   end-to-end pipeline test under `tests/`.

pub mod optimization;
pub mod preference;
pub mod utils;

pub use crate::preference::errors::PreferenceError;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyArray2, ToPyArray};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use std::path::PathBuf;

#[cfg(feature = "python-bindings")]
use crate::{
    preference::{
        core::{data::PreferenceData, export::dump_data, preference::Preference},
        models::regressor::PreferenceRegressor,
    },
    utils::{RegressorArgs, build_regressor_options, extract_point, extract_points_matrix},
};

/// PreferenceData — Python-facing wrapper for the observation store.
///
/// Constructed from Python via `PreferenceData()`; points and preferences are
/// added with `append_observation`. Coordinates are returned with one row
/// per point.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "PreferenceData", module = "preference_regression.preference")]
#[derive(Clone)]
pub struct PyPreferenceData {
    pub inner: PreferenceData,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyPreferenceData {
    #[new]
    pub fn new() -> Self {
        PyPreferenceData { inner: PreferenceData::new() }
    }

    /// Build a store from `(n_points, dim)` points and index lists.
    #[staticmethod]
    #[pyo3(signature = (points, preferences, weights = None))]
    pub fn from_points<'py>(
        points: &Bound<'py, PyAny>, preferences: Vec<Vec<usize>>, weights: Option<Vec<f64>>,
    ) -> PyResult<Self> {
        let points = extract_points_matrix(points)?;
        let preferences =
            preferences.into_iter().map(Preference::new).collect::<Result<Vec<_>, _>>()?;
        Ok(PyPreferenceData { inner: PreferenceData::from_parts(points, preferences, weights)? })
    }

    /// Record `preferable ≻ others[0] ≻ others[1] ≻ …`.
    #[pyo3(
        signature = (preferable, others, merge_close_points = true, merge_epsilon = 1e-4, weight = 1.0),
        text_signature = "(preferable, others, /, merge_close_points=True, merge_epsilon=1e-4, weight=1.0)"
    )]
    pub fn append_observation<'py>(
        &mut self, py: Python<'py>, preferable: &Bound<'py, PyAny>, others: Vec<Bound<'py, PyAny>>,
        merge_close_points: bool, merge_epsilon: f64, weight: f64,
    ) -> PyResult<()> {
        let preferable = extract_point(py, preferable)?;
        let others = others.iter().map(|o| extract_point(py, o)).collect::<PyResult<Vec<_>>>()?;
        self.inner.append_weighted_observation(
            preferable.view(),
            &others,
            weight,
            merge_close_points,
            merge_epsilon,
        )?;
        Ok(())
    }

    /// Merge points closer than `epsilon`; returns the number removed.
    #[pyo3(signature = (epsilon = 1e-4))]
    pub fn merge_close_points(&mut self, epsilon: f64) -> PyResult<usize> {
        Ok(self.inner.merge_close_points(epsilon)?)
    }

    /// Write `X.csv` and `D.csv` into `directory`.
    pub fn dump(&self, directory: PathBuf) -> PyResult<()> {
        Ok(dump_data(&self.inner, &directory)?)
    }

    #[getter]
    pub fn n_points(&self) -> usize {
        self.inner.n_points()
    }

    #[getter]
    pub fn n_preferences(&self) -> usize {
        self.inner.n_preferences()
    }

    /// Sample points, shape `(n_points, dim)`.
    #[getter]
    pub fn points<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.points().t().to_pyarray(py)
    }

    /// Preference index lists, most preferred first.
    #[getter]
    pub fn preferences(&self) -> Vec<Vec<usize>> {
        self.inner.preferences().iter().map(|p| p.indices().to_vec()).collect()
    }

    #[getter]
    pub fn weights(&self) -> Vec<f64> {
        self.inner.weights().to_vec()
    }
}

/// PreferenceRegressor — Python-facing wrapper for the MAP estimator.
///
/// `fit(data, warm_start=True)` seeds the optimizer from the wrapper's own
/// previous fit when one exists.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "PreferenceRegressor", module = "preference_regression.preference")]
pub struct PyPreferenceRegressor {
    pub inner: PreferenceRegressor,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyPreferenceRegressor {
    #[new]
    #[pyo3(
        signature = (
            use_map_hyperparameters = true,
            noiseless = false,
            default_a = None,
            default_b = None,
            default_r = None,
            prior_variance = None,
            btl_scale = None,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            lbfgs_mem = None,
            verbose = false,
        ),
        text_signature = "(use_map_hyperparameters=True, noiseless=False, default_a=None, \
                          default_b=None, default_r=None, prior_variance=None, btl_scale=None, \
                          tol_grad=None, tol_cost=None, max_iter=None, line_searcher=None, \
                          lbfgs_mem=None, verbose=False)"
    )]
    pub fn new(
        use_map_hyperparameters: bool, noiseless: bool, default_a: Option<f64>,
        default_b: Option<f64>, default_r: Option<f64>, prior_variance: Option<f64>,
        btl_scale: Option<f64>, tol_grad: Option<f64>, tol_cost: Option<f64>,
        max_iter: Option<usize>, line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
        verbose: bool,
    ) -> PyResult<Self> {
        let options = build_regressor_options(RegressorArgs {
            use_map_hyperparameters,
            noiseless,
            default_a,
            default_b,
            default_r,
            prior_variance,
            btl_scale,
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            lbfgs_mem,
            verbose,
        })?;
        Ok(PyPreferenceRegressor { inner: PreferenceRegressor::new(options)? })
    }

    #[pyo3(signature = (data, warm_start = true))]
    pub fn fit(&mut self, data: &PyPreferenceData, warm_start: bool) -> PyResult<()> {
        let previous = if warm_start { self.inner.fitted.clone() } else { None };
        self.inner.fit(&data.inner, previous.as_ref())?;
        Ok(())
    }

    pub fn estimate_mean<'py>(&self, py: Python<'py>, x: &Bound<'py, PyAny>) -> PyResult<f64> {
        Ok(self.inner.estimate_mean(extract_point(py, x)?.view())?)
    }

    pub fn estimate_std<'py>(&self, py: Python<'py>, x: &Bound<'py, PyAny>) -> PyResult<f64> {
        Ok(self.inner.estimate_std(extract_point(py, x)?.view())?)
    }

    pub fn best_sampled_index(&self) -> PyResult<usize> {
        Ok(self.inner.best_sampled_index()?)
    }

    pub fn best_sampled_point<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.inner.best_sampled_point()?.to_pyarray(py))
    }

    #[getter]
    pub fn is_trained(&self) -> bool {
        self.inner.is_trained()
    }

    /// Latent utilities of the last fit.
    #[getter]
    pub fn utilities<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.inner.fitted()?.utilities().clone().into_pyarray(py))
    }

    /// `(a, b, r)` of the last fit.
    #[getter]
    pub fn hyperparameters<'py>(
        &self, py: Python<'py>,
    ) -> PyResult<(f64, f64, Bound<'py, PyArray1<f64>>)> {
        let h = self.inner.fitted()?.hyperparameters();
        Ok((h.a, h.b, h.r.to_pyarray(py)))
    }

    #[getter]
    pub fn log_posterior(&self) -> PyResult<f64> {
        Ok(self.inner.fitted()?.log_posterior())
    }

    /// Optimizer status string of the last fit, if the optimizer ran.
    #[getter]
    pub fn status(&self) -> PyResult<Option<String>> {
        Ok(self.inner.fitted()?.outcome().map(|o| o.status.clone()))
    }
}

#[cfg(feature = "python-bindings")]
#[pymodule]
fn _preference_regression<'py>(py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let preference_mod = PyModule::new(py, "preference")?;
    preference_models(py, m, &preference_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    py.import("sys")?
        .getattr("modules")?
        .set_item("preference_regression.preference", preference_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn preference_models<'py>(
    _py: Python, root: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyPreferenceData>()?;
    m.add_class::<PyPreferenceRegressor>()?;
    root.add_submodule(m)?;
    Ok(())
}
