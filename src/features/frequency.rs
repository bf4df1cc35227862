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

use crate::features::vector::{FeatureVector, ScoredVector};
use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum FrequencyError {
    #[error("Expected a vector with dimension {expected} but got {found}.")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Document frequencies and idf weights of one corpus state.
///
/// The weight of bucket `d` is `ln((N + 1) / (df[d] + 1))`, or `0.0`
/// when fewer than `min_doc_count` documents hit the bucket.
#[derive(Debug, Clone)]
pub struct FrequencyModel {
    document_count: u64,
    min_doc_count: u64,
    document_frequency: Vec<u64>,
    weights: Vec<f64>,
}

impl FrequencyModel {
    /// Fits a new model over `vectors`. Nothing from an earlier fit is reused.
    pub fn fit(
        vectors: &[FeatureVector],
        dimension: usize,
        min_doc_count: u64,
    ) -> Result<Self, FrequencyError> {
        let document_frequency = vectors
            .par_iter()
            .try_fold(
                || vec![0u64; dimension],
                |mut partial, vector| -> Result<Vec<u64>, FrequencyError> {
                    check_dimension(dimension, vector.len())?;
                    for idx in vector.indices() {
                        partial[idx] += 1;
                    }
                    Ok(partial)
                },
            )
            .try_reduce(
                || vec![0u64; dimension],
                |mut left, right| {
                    for (l, r) in left.iter_mut().zip(right) {
                        *l += r;
                    }
                    Ok(left)
                },
            )?;

        let document_count = vectors.len() as u64;
        let numerator = (document_count + 1) as f64;
        let weights = document_frequency
            .iter()
            .map(|df| {
                if *df < min_doc_count {
                    0.0
                } else {
                    (numerator / (*df + 1) as f64).ln()
                }
            })
            .collect();

        Ok(Self {
            document_count,
            min_doc_count,
            document_frequency,
            weights,
        })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    /// `N`, the number of vectors seen by [FrequencyModel::fit].
    #[inline]
    pub fn document_count(&self) -> u64 {
        self.document_count
    }

    #[inline]
    pub fn min_doc_count(&self) -> u64 {
        self.min_doc_count
    }

    pub fn document_frequency(&self, bucket: usize) -> Option<u64> {
        self.document_frequency.get(bucket).copied()
    }

    pub fn weight(&self, bucket: usize) -> Option<f64> {
        self.weights.get(bucket).copied()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of buckets with a weight above zero.
    pub fn weighted_buckets(&self) -> usize {
        self.weights.iter().filter(|w| **w > 0.0).count()
    }

    /// Multiplies the counts with the weights. Zero weighted buckets stay
    /// in the layout with a score of `0.0`.
    pub fn transform(&self, vector: &FeatureVector) -> Result<ScoredVector, FrequencyError> {
        check_dimension(self.dimension(), vector.len())?;
        let entries = vector
            .iter()
            .map(|(idx, count)| (idx, *count as f64 * self.weights[idx]))
            .collect();
        Ok(ScoredVector::from_sorted_entries(vector.len(), entries))
    }

    pub fn transform_all(&self, vectors: &[FeatureVector]) -> Result<Vec<ScoredVector>, FrequencyError> {
        vectors
            .par_iter()
            .map(|vector| self.transform(vector))
            .collect()
    }
}

fn check_dimension(expected: usize, found: usize) -> Result<(), FrequencyError> {
    if expected == found {
        Ok(())
    } else {
        Err(FrequencyError::DimensionMismatch { expected, found })
    }
}
