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

use crate::features::FrequencyError;
use crate::ingest::{LoadError, ScanError};
use crate::snapshot::SnapshotError;
use thiserror::Error;

/// Everything that can abort a cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    MalformedDocument(#[from] LoadError),
    #[error(transparent)]
    Frequency(#[from] FrequencyError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
