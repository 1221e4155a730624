//! Errors for the preference-regression stack (observation store, kernel and
//! likelihood math, MAP fitting, and posterior prediction).
//!
//! This module defines [`PreferenceError`] and the [`PreferenceResult`] alias.
//! The type implements `Display`/`Error` and, with the `python-bindings`
//! feature, converts to `PyErr` for PyO3.
//!
//! ## Conventions
//! - **Indices are 0-based** and refer to columns of the sample matrix.
//! - Caller-side faults (`DimensionMismatch`, `EmptyOtherSet`,
//!   `InconsistentPreference`, `NotFitted`, and the validation variants) are
//!   recoverable and leave the store untouched.
//! - [`PreferenceError::CovarianceNotPositiveDefinite`] is a fatal numeric
//!   fault: the estimate cannot be salvaged and no recovery is attempted.
use crate::optimization::errors::OptError;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

/// Result alias for preference operations that may produce [`PreferenceError`].
pub type PreferenceResult<T> = Result<T, PreferenceError>;

/// Unified error type for preference regression.
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceError {
    // ---- Observation store ----
    /// A point's dimensionality differs from the store's.
    DimensionMismatch { expected: usize, found: usize },

    /// `append_observation` was called without any "other" points.
    EmptyOtherSet,

    /// A merge would collapse two indices of the same preference.
    InconsistentPreference { preference: usize, index_a: usize, index_b: usize },

    /// A point coordinate is NaN/±inf.
    NonFinitePoint { index: usize, value: f64 },

    /// A preference references a column that does not exist.
    IndexOutOfRange { index: usize, len: usize },

    /// A preference lists the same column twice.
    DuplicateIndex { index: usize },

    /// A preference needs at least two indices.
    PreferenceTooShort { len: usize },

    /// Preference weights must be finite and > 0.
    InvalidWeight { index: usize, value: f64 },

    /// Merge distance threshold must be finite and >= 0.
    InvalidMergeEpsilon { value: f64 },

    // ---- Options / hyperparameters ----
    /// Kernel hyperparameters must be finite and > 0.
    InvalidHyperparameter { name: &'static str, value: f64 },

    /// Log-normal prior variance must be finite and > 0.
    InvalidPriorVariance { value: f64 },

    /// BTL scale must be finite and > 0.
    InvalidBtlScale { value: f64 },

    /// Utility box half-width must be finite and > 0.
    InvalidUtilityBound { value: f64 },

    /// Warm-start state was fitted on points of another dimensionality.
    WarmStartDimensionMismatch { expected: usize, found: usize },

    // ---- Numerics / estimation ----
    /// Cholesky factorization of the covariance failed.
    CovarianceNotPositiveDefinite { size: usize },

    /// Optimizer failed; include a human-readable status/reason.
    OptimizationFailed { status: String },

    /// Prediction requested before any successful fit.
    NotFitted,

    // ---- Diagnostics export ----
    /// Writing a CSV dump failed.
    ExportFailed { path: String, reason: String },

    /// ---- Fallback ----
    UnknownError,
}

impl std::error::Error for PreferenceError {}

impl std::fmt::Display for PreferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Observation store ----
            PreferenceError::DimensionMismatch { expected, found } => {
                write!(f, "Point dimension mismatch: expected {expected}, got {found}")
            }
            PreferenceError::EmptyOtherSet => {
                write!(f, "At least one point must be compared against the preferred point.")
            }
            PreferenceError::InconsistentPreference { preference, index_a, index_b } => {
                write!(
                    f,
                    "Merging would collapse indices {index_a} and {index_b} of preference {preference}"
                )
            }
            PreferenceError::NonFinitePoint { index, value } => {
                write!(f, "Point coordinate at index {index} is non-finite: {value}")
            }
            PreferenceError::IndexOutOfRange { index, len } => {
                write!(f, "Preference index {index} is out of range for {len} points")
            }
            PreferenceError::DuplicateIndex { index } => {
                write!(f, "Preference lists index {index} more than once")
            }
            PreferenceError::PreferenceTooShort { len } => {
                write!(f, "A preference needs at least two indices; got {len}")
            }
            PreferenceError::InvalidWeight { index, value } => {
                write!(f, "Weight of preference {index} must be finite and > 0; got {value}")
            }
            PreferenceError::InvalidMergeEpsilon { value } => {
                write!(f, "Merge epsilon must be finite and >= 0; got {value}")
            }
            // ---- Options / hyperparameters ----
            PreferenceError::InvalidHyperparameter { name, value } => {
                write!(f, "Hyperparameter '{name}' must be finite and > 0; got {value}")
            }
            PreferenceError::InvalidPriorVariance { value } => {
                write!(f, "Prior variance must be finite and > 0; got {value}")
            }
            PreferenceError::InvalidBtlScale { value } => {
                write!(f, "BTL scale must be finite and > 0; got {value}")
            }
            PreferenceError::InvalidUtilityBound { value } => {
                write!(f, "Utility bound must be finite and > 0; got {value}")
            }
            PreferenceError::WarmStartDimensionMismatch { expected, found } => {
                write!(
                    f,
                    "Warm-start state has dimension {found}, but the store has dimension {expected}"
                )
            }
            // ---- Numerics / estimation ----
            PreferenceError::CovarianceNotPositiveDefinite { size } => {
                write!(f, "Covariance matrix ({size}x{size}) is not positive definite")
            }
            PreferenceError::OptimizationFailed { status } => {
                write!(f, "Optimizer failed with status: {status}")
            }
            PreferenceError::NotFitted => {
                write!(f, "Model hasn't been fitted yet.")
            }
            // ---- Diagnostics export ----
            PreferenceError::ExportFailed { path, reason } => {
                write!(f, "Failed to export '{path}': {reason}")
            }
            PreferenceError::UnknownError => {
                write!(f, "An unknown error occurred in preference regression.")
            }
        }
    }
}

/// Convert a [`PreferenceError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl std::convert::From<PreferenceError> for PyErr {
    fn from(err: PreferenceError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<OptError> for PreferenceError {
    fn from(err: OptError) -> PreferenceError {
        match err {
            OptError::NotPositiveDefinite { size } => {
                PreferenceError::CovarianceNotPositiveDefinite { size }
            }
            OptError::InvalidHyperparameter { name, value } => {
                PreferenceError::InvalidHyperparameter { name, value }
            }
            other => PreferenceError::OptimizationFailed { status: other.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Numeric faults raised inside the objective come back out of the
    // optimizer layer with their original meaning.
    //
    // Given
    // -----
    // - `OptError::NotPositiveDefinite`, `OptError::InvalidHyperparameter`,
    //   and an unrelated backend error.
    //
    // Expect
    // ------
    // - The first two map to their domain twins, the last to
    //   `OptimizationFailed` carrying the message.
    fn opt_errors_map_back_to_domain_variants() {
        let err: PreferenceError = OptError::NotPositiveDefinite { size: 4 }.into();
        assert_eq!(err, PreferenceError::CovarianceNotPositiveDefinite { size: 4 });

        let err: PreferenceError = OptError::InvalidHyperparameter { name: "b", value: 0.0 }.into();
        assert_eq!(err, PreferenceError::InvalidHyperparameter { name: "b", value: 0.0 });

        let err: PreferenceError = OptError::BackendError { text: "boom".into() }.into();
        match err {
            PreferenceError::OptimizationFailed { status } => assert!(status.contains("boom")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn display_mentions_offending_values() {
        let msg = PreferenceError::InconsistentPreference { preference: 2, index_a: 0, index_b: 5 }
            .to_string();
        assert!(msg.contains('2') && msg.contains('0') && msg.contains('5'));
        assert_eq!(PreferenceError::NotFitted.to_string(), "Model hasn't been fitted yet.");
    }
}
