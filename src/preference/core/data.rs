//! Observation store — sample matrix, preferences, and near-duplicate merging.
//!
//! Purpose
//! -------
//! Own everything the MAP estimator reads: the `D × M` sample matrix (one
//! column per sampled point), the list of [`Preference`]s over those columns,
//! and one weight per preference.
//!
//! Key behaviors
//! -------------
//! - [`PreferenceData::append_observation`] appends a preferred point and its
//!   competitors as new columns, records one new preference over them, and
//!   optionally merges near-duplicate columns.
//! - [`PreferenceData::merge_close_points`] collapses every group of columns
//!   connected by Euclidean distance `< epsilon` into its lowest index,
//!   relabels all preferences through one old→new mapping, and compacts the
//!   matrix.
//! - [`PreferenceData::from_parts`] builds a store from existing data with
//!   full invariant validation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every index referenced by a preference is a valid column.
//! - No preference references the same column twice.
//! - `weights.len() == preferences.len()` and every weight is finite and > 0.
//! - All points share one dimensionality and are finite.
//!
//! Conventions
//! -----------
//! - Failed operations leave the store exactly as it was; appends are rolled
//!   back when the follow-up merge is rejected.
//! - A merge keeps the coordinates of the lowest-indexed column of a group.
//! - Merging logs the number of removed columns at `debug`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover append bookkeeping, validation failures, merge
//!   relabeling and compaction, transitive merging, rejection of collapsing
//!   merges with rollback, and merge idempotence.
use crate::preference::{
    core::{
        preference::Preference,
        validation::{
            validate_merge_epsilon, validate_point, validate_points, validate_preference_indices,
            validate_weight,
        },
    },
    errors::{PreferenceError, PreferenceResult},
};
use ndarray::{Array1, Array2, ArrayView1, Axis, s};

/// Observation store for preference regression.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceData {
    points: Array2<f64>,
    preferences: Vec<Preference>,
    weights: Vec<f64>,
}

impl Default for PreferenceData {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceData {
    /// Distance below which `append_observation` callers usually merge points.
    pub const DEFAULT_MERGE_EPSILON: f64 = 1e-4;

    /// Empty store with no established dimensionality.
    pub fn new() -> Self {
        Self { points: Array2::zeros((0, 0)), preferences: Vec::new(), weights: Vec::new() }
    }

    /// Build a store from a `D × M` sample matrix and preferences over its columns.
    ///
    /// `weights` defaults to `1.0` for every preference.
    ///
    /// # Errors
    /// - [`PreferenceError::NonFinitePoint`] for non-finite coordinates.
    /// - [`PreferenceError::IndexOutOfRange`] if a preference references a
    ///   missing column.
    /// - [`PreferenceError::DimensionMismatch`] if `weights` has the wrong
    ///   length (`expected` is the number of preferences).
    /// - [`PreferenceError::InvalidWeight`] for non-positive weights.
    pub fn from_parts(
        points: Array2<f64>, preferences: Vec<Preference>, weights: Option<Vec<f64>>,
    ) -> PreferenceResult<Self> {
        validate_points(points.view())?;
        for preference in &preferences {
            validate_preference_indices(preference, points.ncols())?;
        }
        let weights = match weights {
            Some(w) => {
                if w.len() != preferences.len() {
                    return Err(PreferenceError::DimensionMismatch {
                        expected: preferences.len(),
                        found: w.len(),
                    });
                }
                for (index, &value) in w.iter().enumerate() {
                    validate_weight(index, value)?;
                }
                w
            }
            None => vec![1.0; preferences.len()],
        };
        Ok(Self { points, preferences, weights })
    }

    /// The `D × M` sample matrix; column `i` is sample point `i`.
    pub fn points(&self) -> &Array2<f64> {
        &self.points
    }

    pub fn point(&self, index: usize) -> PreferenceResult<ArrayView1<'_, f64>> {
        if index >= self.n_points() {
            return Err(PreferenceError::IndexOutOfRange { index, len: self.n_points() });
        }
        Ok(self.points.column(index))
    }

    pub fn preferences(&self) -> &[Preference] {
        &self.preferences
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn n_points(&self) -> usize {
        self.points.ncols()
    }

    pub fn n_preferences(&self) -> usize {
        self.preferences.len()
    }

    /// Dimensionality of the stored points, or `None` while the store is empty.
    pub fn dim(&self) -> Option<usize> {
        if self.points.ncols() == 0 { None } else { Some(self.points.nrows()) }
    }

    pub fn is_empty(&self) -> bool {
        self.points.ncols() == 0
    }

    /// Append `preferable ≻ others[0] ≻ others[1] ≻ …` with weight `1.0`.
    ///
    /// See [`PreferenceData::append_weighted_observation`].
    pub fn append_observation(
        &mut self, preferable: ArrayView1<f64>, others: &[Array1<f64>], merge_close_points: bool,
        merge_epsilon: f64,
    ) -> PreferenceResult<()> {
        self.append_weighted_observation(preferable, others, 1.0, merge_close_points, merge_epsilon)
    }

    /// Append a preferred point and its competitors as new columns, then record
    /// one preference over the new indices in the given order.
    ///
    /// With `merge_close_points`, a merge pass with `merge_epsilon` follows.
    /// If that pass is rejected the append is rolled back.
    ///
    /// # Errors
    /// - [`PreferenceError::EmptyOtherSet`] if `others` is empty.
    /// - [`PreferenceError::DimensionMismatch`] / [`PreferenceError::NonFinitePoint`]
    ///   for a malformed point.
    /// - [`PreferenceError::InvalidWeight`] / [`PreferenceError::InvalidMergeEpsilon`].
    /// - [`PreferenceError::InconsistentPreference`] from the merge pass.
    pub fn append_weighted_observation(
        &mut self, preferable: ArrayView1<f64>, others: &[Array1<f64>], weight: f64,
        merge_close_points: bool, merge_epsilon: f64,
    ) -> PreferenceResult<()> {
        if others.is_empty() {
            return Err(PreferenceError::EmptyOtherSet);
        }
        let dim = self.dim().unwrap_or(preferable.len());
        validate_point(preferable, dim)?;
        for other in others {
            validate_point(other.view(), dim)?;
        }
        validate_weight(self.preferences.len(), weight)?;
        if merge_close_points {
            validate_merge_epsilon(merge_epsilon)?;
        }

        let old_len = self.n_points();
        if old_len == 0 {
            self.points = Array2::zeros((dim, 0));
        }
        self.push_point(preferable)?;
        for other in others {
            self.push_point(other.view())?;
        }
        let preference = Preference::new((old_len..old_len + 1 + others.len()).collect())?;
        self.preferences.push(preference);
        self.weights.push(weight);

        if merge_close_points {
            if let Err(err) = self.merge_close_points(merge_epsilon) {
                self.preferences.pop();
                self.weights.pop();
                self.points = self.points.slice(s![.., ..old_len]).to_owned();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Collapse near-duplicate columns and compact the store.
    ///
    /// Columns closer than `epsilon` (Euclidean) are grouped transitively; each
    /// group survives as its lowest index, with that column's coordinates.
    /// Surviving columns are renumbered contiguously in their original order
    /// and every preference is relabeled through the same mapping.
    ///
    /// Returns the number of removed columns. A second call with the same
    /// `epsilon` removes nothing.
    ///
    /// # Errors
    /// - [`PreferenceError::InvalidMergeEpsilon`] for a negative/non-finite `epsilon`.
    /// - [`PreferenceError::InconsistentPreference`] if two indices of one
    ///   preference would collapse; the store is left untouched.
    pub fn merge_close_points(&mut self, epsilon: f64) -> PreferenceResult<usize> {
        validate_merge_epsilon(epsilon)?;
        let m = self.n_points();
        let mut parent: Vec<usize> = (0..m).collect();
        for i in 0..m {
            for j in (i + 1)..m {
                let dist = (&self.points.column(i) - &self.points.column(j))
                    .mapv(|d| d * d)
                    .sum()
                    .sqrt();
                if dist < epsilon {
                    union(&mut parent, i, j);
                }
            }
        }

        let roots: Vec<usize> = (0..m).map(|i| find(&mut parent, i)).collect();
        let survivors: Vec<usize> = (0..m).filter(|&i| roots[i] == i).collect();
        if survivors.len() == m {
            return Ok(0);
        }
        let mut new_index = vec![0usize; m];
        for (rank, &col) in survivors.iter().enumerate() {
            new_index[col] = rank;
        }
        let mapping: Vec<usize> = roots.iter().map(|&root| new_index[root]).collect();

        for (p_idx, preference) in self.preferences.iter().enumerate() {
            let idx = preference.indices();
            for a in 0..idx.len() {
                for b in (a + 1)..idx.len() {
                    if mapping[idx[a]] == mapping[idx[b]] {
                        return Err(PreferenceError::InconsistentPreference {
                            preference: p_idx,
                            index_a: idx[a],
                            index_b: idx[b],
                        });
                    }
                }
            }
        }

        self.points = self.points.select(Axis(1), &survivors);
        for preference in self.preferences.iter_mut() {
            preference.relabel(&mapping);
        }
        let removed = m - survivors.len();
        log::debug!("merged {removed} near-duplicate point(s); {} remain", survivors.len());
        Ok(removed)
    }

    fn push_point(&mut self, point: ArrayView1<f64>) -> PreferenceResult<()> {
        let expected = self.points.nrows();
        self.points
            .push_column(point)
            .map_err(|_| PreferenceError::DimensionMismatch { expected, found: point.len() })
    }
}

// ---- Union-find with the smallest index as representative ----

fn find(parent: &mut [usize], i: usize) -> usize {
    let mut root = i;
    while parent[root] != root {
        root = parent[root];
    }
    let mut cur = i;
    while parent[cur] != root {
        let next = parent[cur];
        parent[cur] = root;
        cur = next;
    }
    root
}

fn union(parent: &mut [usize], i: usize, j: usize) {
    let (ri, rj) = (find(parent, i), find(parent, j));
    if ri != rj {
        let (lo, hi) = if ri < rj { (ri, rj) } else { (rj, ri) };
        parent[hi] = lo;
    }
}
