//! preference — GP preference regression with a BTL likelihood.
//!
//! Purpose
//! -------
//! Learn a latent utility over a continuous design space from ordinal
//! judgments: "this point is preferred over those". Points and judgments are
//! collected in a [`PreferenceData`] store, a Gaussian-process prior with an
//! ARD squared-exponential kernel ties utilities of nearby points together,
//! and [`PreferenceRegressor`] finds the MAP utilities (and, optionally,
//! kernel hyperparameters).
//!
//! Key behaviors
//! -------------
//! - `core`: data model, merge, kernel, BTL, priors, θ-layout, export.
//! - `models`: MAP objective, fit with warm start, posterior predictor.
//! - `errors`: [`PreferenceError`] / [`PreferenceResult`].
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use ndarray::array;
//! use preference_regression::preference::prelude::*;
//!
//! let mut data = PreferenceData::new();
//! data.append_observation(
//!     array![0.2, 0.8].view(),
//!     &[array![0.6, 0.1], array![0.9, 0.9]],
//!     true,
//!     PreferenceData::DEFAULT_MERGE_EPSILON,
//! )?;
//! let mut model = PreferenceRegressor::new(RegressorOptions::default())?;
//! model.fit(&data, None)?;
//! let best = model.best_sampled_point()?;
//! let std = model.estimate_std(array![0.5, 0.5].view())?;
//! # let _ = (best, std);
//! # Ok::<(), PreferenceError>(())
//! ```

pub mod core;
pub mod errors;
pub mod models;

pub use self::core::{Preference, PreferenceData, RegressorOptions};
pub use self::errors::{PreferenceError, PreferenceResult};
pub use self::models::{FittedState, PreferenceRegressor};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use preference_regression::preference::prelude::*;
//
// to import the main preference-regression surface in a single line.

pub mod prelude {
    pub use super::core::{Hyperparameters, Preference, PreferenceData, RegressorOptions};
    pub use super::errors::{PreferenceError, PreferenceResult};
    pub use super::models::{FittedState, PreferenceRegressor};
}
