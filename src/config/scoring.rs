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

use crate::corpus::AccumulationMode;
use crate::features::{DEFAULT_DIMENSION, DEFAULT_HASH_SEED};
use serde::{Deserialize, Serialize};

/// Everything that changes the numbers in the snapshot.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(rename(serialize = "Scoring"))]
pub struct ScoringConfig {
    /// Buckets hit by fewer documents get a weight of zero. (default: 2)
    #[serde(default = "_default_min_doc_count")]
    pub min_doc_count: u64,

    /// The number of hash buckets. Has to be at least 1. (default: 2^18)
    #[serde(default = "_default_dimension")]
    pub dimension: usize,

    #[serde(default = "_default_hash_seed")]
    pub hash_seed: u64,

    /// How re-scanned documents are accumulated.
    #[serde(default)]
    pub accumulation: AccumulationMode,

    /// Number of terms logged after each cycle, 0 disables the report. (default: 10)
    #[serde(default = "_default_report_top_terms")]
    pub report_top_terms: usize,
}

const fn _default_min_doc_count() -> u64 {
    2
}
const fn _default_dimension() -> usize {
    DEFAULT_DIMENSION.get()
}
const fn _default_hash_seed() -> u64 {
    DEFAULT_HASH_SEED
}
const fn _default_report_top_terms() -> usize {
    10
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_doc_count: _default_min_doc_count(),
            dimension: _default_dimension(),
            hash_seed: _default_hash_seed(),
            accumulation: AccumulationMode::default(),
            report_top_terms: _default_report_top_terms(),
        }
    }
}
