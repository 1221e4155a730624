//! Preference validation helpers — reusable checks for points, preferences,
//! weights, and option values.
//!
//! Purpose
//! -------
//! Centralize the small checks the observation store, the options builder
//! and the regressor run before touching any numerics, so that constructors
//! fail fast with structured [`PreferenceError`] values.
//!
//! Conventions
//! -----------
//! - Indices are 0-based columns of the sample matrix.
//! - Functions return [`PreferenceResult`] and never panic on invalid inputs.
//! - No I/O and no logging.
use crate::preference::{
    core::preference::Preference,
    errors::{PreferenceError, PreferenceResult},
};
use ndarray::{ArrayView1, ArrayView2};

/// Check a point against the expected dimensionality and for finite coordinates.
///
/// # Errors
/// - [`PreferenceError::DimensionMismatch`] if `point.len() != dim`.
/// - [`PreferenceError::NonFinitePoint`] for the first NaN/±inf coordinate.
pub fn validate_point(point: ArrayView1<f64>, dim: usize) -> PreferenceResult<()> {
    if point.len() != dim {
        return Err(PreferenceError::DimensionMismatch { expected: dim, found: point.len() });
    }
    for (index, &value) in point.iter().enumerate() {
        if !value.is_finite() {
            return Err(PreferenceError::NonFinitePoint { index, value });
        }
    }
    Ok(())
}

/// Check every column of a `D × M` sample matrix.
///
/// # Errors
/// - [`PreferenceError::NonFinitePoint`] for the first non-finite entry; the
///   reported `index` is the column.
pub fn validate_points(points: ArrayView2<f64>) -> PreferenceResult<()> {
    for (col, column) in points.columns().into_iter().enumerate() {
        if let Some(&value) = column.iter().find(|v| !v.is_finite()) {
            return Err(PreferenceError::NonFinitePoint { index: col, value });
        }
    }
    Ok(())
}

/// Check that every index of `preference` addresses one of `n_points` columns.
///
/// # Errors
/// - [`PreferenceError::IndexOutOfRange`] for the first offending index.
pub fn validate_preference_indices(
    preference: &Preference, n_points: usize,
) -> PreferenceResult<()> {
    match preference.indices().iter().find(|&&idx| idx >= n_points) {
        Some(&index) => Err(PreferenceError::IndexOutOfRange { index, len: n_points }),
        None => Ok(()),
    }
}

/// Preference weights must be finite and strictly positive.
///
/// # Errors
/// - [`PreferenceError::InvalidWeight`] otherwise.
pub fn validate_weight(index: usize, value: f64) -> PreferenceResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PreferenceError::InvalidWeight { index, value });
    }
    Ok(())
}

/// Merge thresholds must be finite and non-negative (`0` disables merging).
///
/// # Errors
/// - [`PreferenceError::InvalidMergeEpsilon`] otherwise.
pub fn validate_merge_epsilon(value: f64) -> PreferenceResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PreferenceError::InvalidMergeEpsilon { value });
    }
    Ok(())
}

/// Kernel hyperparameters must be finite and strictly positive.
///
/// # Errors
/// - [`PreferenceError::InvalidHyperparameter`] naming the offending parameter.
pub fn validate_hyperparameter(name: &'static str, value: f64) -> PreferenceResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PreferenceError::InvalidHyperparameter { name, value });
    }
    Ok(())
}

/// # Errors
/// - [`PreferenceError::InvalidPriorVariance`] unless finite and > 0.
pub fn validate_prior_variance(value: f64) -> PreferenceResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PreferenceError::InvalidPriorVariance { value });
    }
    Ok(())
}

/// # Errors
/// - [`PreferenceError::InvalidBtlScale`] unless finite and > 0.
pub fn validate_btl_scale(value: f64) -> PreferenceResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PreferenceError::InvalidBtlScale { value });
    }
    Ok(())
}

/// # Errors
/// - [`PreferenceError::InvalidUtilityBound`] unless finite and > 0.
pub fn validate_utility_bound(value: f64) -> PreferenceResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PreferenceError::InvalidUtilityBound { value });
    }
    Ok(())
}
