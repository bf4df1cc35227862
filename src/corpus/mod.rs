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

use crate::ingest::CleanedDocument;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use strum::EnumString;

/// How the store reacts to a document it already holds.
///
/// Documents are recognized by [CleanedDocument::document_key], the id of
/// the toot, never by the account id.
#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, EnumString, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccumulationMode {
    /// Every append is stored. Rescanning a static root `k` times
    /// with `n` files leaves `k * n` documents in the store.
    #[default]
    Replay,
    /// The first document per key wins, later ones are dropped.
    /// Documents without a key are always stored.
    Deduplicate,
}

/// The accumulated corpus, kept for the lifetime of the scheduler.
///
/// Append only: nothing is ever removed or merged.
#[derive(Debug, Default)]
pub struct CorpusStore {
    mode: AccumulationMode,
    documents: Vec<CleanedDocument>,
    /// document key -> position of the first document with that key
    first_seen: HashMap<String, usize>,
}

impl CorpusStore {
    pub fn new(mode: AccumulationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> AccumulationMode {
        self.mode
    }

    /// Returns `true` if the document was stored.
    pub fn append(&mut self, document: CleanedDocument) -> bool {
        let position = self.documents.len();
        if let Some(key) = document.document_key() {
            match self.first_seen.entry(key.to_string()) {
                Entry::Occupied(_) if self.mode == AccumulationMode::Deduplicate => {
                    return false;
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(entry) => {
                    entry.insert(position);
                }
            }
        }
        self.documents.push(document);
        true
    }

    pub fn extend<I: IntoIterator<Item = CleanedDocument>>(&mut self, documents: I) -> usize {
        documents
            .into_iter()
            .map(|document| self.append(document))
            .filter(|stored| *stored)
            .count()
    }

    pub fn all_documents(&self) -> &[CleanedDocument] {
        &self.documents
    }

    /// Whether a document with this key was ever appended.
    pub fn contains_id(&self, document_key: &str) -> bool {
        self.first_seen.contains_key(document_key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of different document keys in the store.
    #[inline]
    pub fn distinct_documents(&self) -> usize {
        self.first_seen.len()
    }
}

impl Display for CorpusStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} documents ({} distinct, {} mode)",
            self.len(),
            self.distinct_documents(),
            self.mode
        )
    }
}
