// Copyright 2024 Felix Engl
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};

/// A vector with a fixed logical length where only the stored
/// entries can be non-zero.
///
/// The entries are sorted by index and every index is smaller than the dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector<T> {
    dimension: usize,
    entries: Vec<(usize, T)>,
}

/// Hash bucket counts of one document.
pub type FeatureVector = SparseVector<u32>;

/// Bucket counts multiplied with the idf weights.
pub type ScoredVector = SparseVector<f64>;

impl<T> SparseVector<T> {
    /// Creates the vector from entries sorted by index.
    ///
    /// # Panics
    /// In debug builds if the entries are unsorted or out of bounds.
    pub(crate) fn from_sorted_entries(dimension: usize, entries: Vec<(usize, T)>) -> Self {
        debug_assert!(entries.windows(2).all(|pair| pair[0].0 < pair[1].0));
        debug_assert!(entries.last().map_or(true, |(idx, _)| *idx < dimension));
        Self { dimension, entries }
    }

    pub fn empty(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    /// The logical length, always the configured dimension.
    #[inline]
    pub fn len(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dimension == 0
    }

    /// Number of stored entries.
    #[inline]
    pub fn stored(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.entries.iter().map(|(idx, value)| (*idx, value))
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(idx, _)| *idx)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl<T: Copy + Default> SparseVector<T> {
    /// The value at `idx`, zero for indices that are not stored.
    pub fn get(&self, idx: usize) -> T {
        self.entries
            .binary_search_by_key(&idx, |(i, _)| *i)
            .map_or_else(|_| T::default(), |pos| self.entries[pos].1)
    }

    pub fn to_dense(&self) -> Vec<T> {
        let mut dense = vec![T::default(); self.dimension];
        for (idx, value) in &self.entries {
            dense[*idx] = *value;
        }
        dense
    }
}
