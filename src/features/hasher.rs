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

use crate::features::vector::FeatureVector;
use crate::ingest::CleanedDocument;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::hash::Hasher;
use std::num::NonZeroUsize;
use twox_hash::XxHash64;

/// 2^18 buckets.
pub const DEFAULT_DIMENSION: NonZeroUsize = match NonZeroUsize::new(1 << 18) {
    Some(value) => value,
    None => panic!("The default dimension is not zero."),
};
pub const DEFAULT_HASH_SEED: u64 = 42;

/// The hashing trick: tokens are counted in a fixed number of buckets.
/// Two tokens in the same bucket are indistinguishable afterwards.
#[derive(Debug, Copy, Clone)]
pub struct FeatureHasher {
    dimension: NonZeroUsize,
    seed: u64,
}

impl Default for FeatureHasher {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION, DEFAULT_HASH_SEED)
    }
}

impl FeatureHasher {
    pub const fn new(dimension: NonZeroUsize, seed: u64) -> Self {
        Self { dimension, seed }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension.get()
    }

    /// The bucket of a single token.
    pub fn bucket_of(&self, token: &str) -> usize {
        let mut hasher = XxHash64::with_seed(self.seed);
        hasher.write(token.as_bytes());
        (hasher.finish() % self.dimension.get() as u64) as usize
    }

    pub fn hash<S: AsRef<str>>(&self, tokens: &[S]) -> FeatureVector {
        let mut buckets = BTreeMap::new();
        for token in tokens {
            buckets
                .entry(self.bucket_of(token.as_ref()))
                .and_modify(|count: &mut u32| *count = count.saturating_add(1))
                .or_insert(1);
        }
        FeatureVector::from_sorted_entries(self.dimension(), buckets.into_iter().collect())
    }

    /// Hashes all documents, the result has the order of `documents`.
    pub fn hash_all(&self, documents: &[CleanedDocument]) -> Vec<FeatureVector> {
        documents
            .par_iter()
            .map(|document| self.hash(&document.tokens))
            .collect()
    }
}
