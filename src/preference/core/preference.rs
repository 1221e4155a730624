//! Preference — an ordered tuple of sample indices.
//!
//! `indices[0]` is the most preferred point; the remaining indices are read
//! as a total order (`indices[0] ≻ indices[1] ≻ … ≻ indices[k-1]`), which is
//! exactly what the Plackett–Luce/BTL likelihood in [`super::btl`] scores.
//!
//! A `Preference` is immutable from the outside. Only the observation store
//! may rewrite its indices, and only through a merge relabeling that keeps
//! both the length and the order.
use crate::preference::errors::{PreferenceError, PreferenceResult};

/// Ordered, duplicate-free list of at least two sample indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Preference {
    indices: Vec<usize>,
}

impl Preference {
    /// Build a preference from indices ordered best-first.
    ///
    /// Bounds against a sample matrix are checked by the store, not here.
    ///
    /// # Errors
    /// - [`PreferenceError::PreferenceTooShort`] if fewer than two indices.
    /// - [`PreferenceError::DuplicateIndex`] if an index repeats.
    pub fn new(indices: Vec<usize>) -> PreferenceResult<Self> {
        if indices.len() < 2 {
            return Err(PreferenceError::PreferenceTooShort { len: indices.len() });
        }
        for (pos, &idx) in indices.iter().enumerate() {
            if indices[..pos].contains(&idx) {
                return Err(PreferenceError::DuplicateIndex { index: idx });
            }
        }
        Ok(Self { indices })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Index of the most preferred point.
    pub fn preferred(&self) -> usize {
        self.indices[0]
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Always `false`; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Relabel every index through `mapping` (old index → new index).
    ///
    /// The caller guarantees that `mapping` keeps the indices of this
    /// preference distinct.
    pub(crate) fn relabel(&mut self, mapping: &[usize]) {
        for idx in self.indices.iter_mut() {
            *idx = mapping[*idx];
        }
    }
}

impl TryFrom<Vec<usize>> for Preference {
    type Error = PreferenceError;

    fn try_from(indices: Vec<usize>) -> PreferenceResult<Self> {
        Preference::new(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_short_and_duplicated_lists() {
        assert_eq!(Preference::new(vec![3]), Err(PreferenceError::PreferenceTooShort { len: 1 }));
        assert_eq!(
            Preference::new(vec![0, 2, 0]),
            Err(PreferenceError::DuplicateIndex { index: 0 })
        );
        let p = Preference::try_from(vec![4, 1, 2]).unwrap();
        assert_eq!(p.preferred(), 4);
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn relabel_keeps_length_and_order() {
        let mut p = Preference::new(vec![2, 0, 3]).unwrap();
        p.relabel(&[0, 0, 1, 2]);
        assert_eq!(p.indices(), &[1, 0, 2]);
    }
}
