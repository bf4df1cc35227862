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

use crate::features::{FeatureHasher, FrequencyModel};
use crate::ingest::CleanedDocument;
use itertools::Itertools;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// A term together with its corpus wide tf-idf score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermScore {
    pub term: String,
    pub score: f64,
    pub document_frequency: u64,
}

impl Display for TermScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.4}, df={})", self.term, self.score, self.document_frequency)
    }
}

/// The `limit` best terms of the corpus.
///
/// A term scores its number of occurrences in the whole corpus times the
/// weight of its bucket. Terms sharing a bucket share the weight.
/// Empty tokens and terms without weight are left out.
pub fn top_terms(
    documents: &[CleanedDocument],
    hasher: &FeatureHasher,
    model: &FrequencyModel,
    limit: usize,
) -> Vec<TermScore> {
    if limit == 0 {
        return Vec::new();
    }
    let mut occurrences: HashMap<&str, u64> = HashMap::new();
    for token in documents.iter().flat_map(|doc| doc.tokens.iter()) {
        if !token.is_empty() {
            *occurrences.entry(token.as_str()).or_default() += 1;
        }
    }
    occurrences
        .into_iter()
        .filter_map(|(term, count)| {
            let bucket = hasher.bucket_of(term);
            let weight = model.weight(bucket)?;
            let score = count as f64 * weight;
            (score > 0.0).then(|| TermScore {
                term: term.to_string(),
                score,
                document_frequency: model.document_frequency(bucket).unwrap_or_default(),
            })
        })
        .sorted_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.term.cmp(&b.term))
        })
        .take(limit)
        .collect()
}
