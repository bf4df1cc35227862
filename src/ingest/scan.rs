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

use crate::ingest::loader::LoadError;
use camino::{Utf8Path, Utf8PathBuf};
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("The ingestion root '{0}' does not exist or is not a directory.")]
    RootMissing(Utf8PathBuf),
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

/// A file found below the ingestion root, or the entry that could not be visited.
pub type ScanEntry = Result<Utf8PathBuf, LoadError>;

/// Lists every file below `root`, at any depth, sorted by path.
///
/// Only an unreadable root fails the scan. Entries below it that can not be
/// visited, like dangling symlinks, are returned as errors next to the files.
///
/// The collector partitions by creation time (`yyyy/mm/dd/hh/mm/ss/<name>.json`)
/// but nothing here relies on that layout.
pub fn scan_ingestion_root(root: &Utf8Path) -> Result<Vec<ScanEntry>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootMissing(root.to_path_buf()));
    }
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(source) => {
                let path = source.path().map_or_else(|| root.to_path_buf(), lossy);
                entries.push(Err(LoadError::Unreadable { path, source }));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        entries.push(
            Utf8PathBuf::from_path_buf(entry.into_path())
                .map_err(|path| LoadError::NonUtf8Path { path: lossy(&path) }),
        );
    }
    log::trace!("Found {} entries below {root}.", entries.len());
    Ok(entries)
}

fn lossy(path: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from(path.to_string_lossy().into_owned())
}
