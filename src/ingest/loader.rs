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

use crate::ingest::document::{CleanedDocument, RawDocument};
use crate::io::{ErrorWithPath, ToErrorWithPath};
use crate::text::{tokenize, LeadingTagCleaner, TextCleaner};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::BufReader;
use thiserror::Error;

/// Only toots tagged with this language are scored.
pub const ACCEPTED_LANGUAGE: &str = "en";

/// A file below the ingestion root that can not be turned into a document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] ErrorWithPath),
    #[error("The document '{path}' is malformed: {source}")]
    Malformed {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("The entry '{path}' can not be read: {source}")]
    Unreadable {
        path: Utf8PathBuf,
        #[source]
        source: walkdir::Error,
    },
    /// Holds a lossy conversion of the path.
    #[error("The path '{path}' is not valid UTF-8.")]
    NonUtf8Path { path: Utf8PathBuf },
}

impl LoadError {
    pub fn path(&self) -> &Utf8Path {
        match self {
            LoadError::Io(err) => err.path(),
            LoadError::Malformed { path, .. }
            | LoadError::Unreadable { path, .. }
            | LoadError::NonUtf8Path { path } => path,
        }
    }
}

/// Filters raw documents and cleans the survivors.
#[derive(Debug, Clone)]
pub struct DocumentLoader<C = LeadingTagCleaner> {
    cleaner: C,
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new(LeadingTagCleaner)
    }
}

impl<C: TextCleaner> DocumentLoader<C> {
    pub fn new(cleaner: C) -> Self {
        Self { cleaner }
    }

    /// Returns `None` for toots that are not english or have no content.
    pub fn load(&self, raw: RawDocument) -> Option<CleanedDocument> {
        if raw.language.as_deref() != Some(ACCEPTED_LANGUAGE) {
            return None;
        }
        let content = raw.content.filter(|value| !value.is_empty())?;
        let cleaned = self.cleaner.clean(&content);
        Some(CleanedDocument {
            id: raw.id,
            username: raw.username,
            toot_id: raw.toot_id,
            tokens: tokenize(&cleaned),
        })
    }

    /// Reads and parses a single collector file, then applies [Self::load].
    /// Toots without an id of their own are identified by their path.
    pub fn load_file(&self, path: &Utf8Path) -> Result<Option<CleanedDocument>, LoadError> {
        let file = File::open(path).to_error_with_path(path)?;
        let mut raw: RawDocument =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        if raw.toot_id.is_none() {
            raw.toot_id = Some(path.to_string());
        }
        Ok(self.load(raw))
    }
}
