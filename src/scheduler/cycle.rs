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

use crate::report::TermScore;
use crate::snapshot::SnapshotSummary;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// The counters of a single cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Starts at 1.
    pub cycle: u64,
    pub started_at: OffsetDateTime,
    pub files_scanned: usize,
    /// Files that became a document.
    pub loaded: usize,
    /// Loaded documents that made it into the corpus.
    pub appended: usize,
    /// Files that were fine but not english or empty.
    pub skipped: usize,
    /// Files that could not be read or parsed.
    pub malformed: usize,
    pub corpus_size: usize,
    pub snapshot: SnapshotSummary,
    pub duration: Duration,
    pub top_terms: Vec<TermScore>,
}

impl Display for CycleReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let started_at = self
            .started_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.started_at.to_string());
        write!(
            f,
            "Cycle {} (started {started_at}): scanned {} files, loaded {}, appended {}, skipped {}, malformed {}, corpus size {}, wrote {} rows to {} in {:.3}s",
            self.cycle,
            self.files_scanned,
            self.loaded,
            self.appended,
            self.skipped,
            self.malformed,
            self.corpus_size,
            self.snapshot.rows,
            self.snapshot.path,
            self.duration.as_secs_f64()
        )?;
        if !self.top_terms.is_empty() {
            write!(f, "; top terms: {}", self.top_terms.iter().join(", "))?;
        }
        Ok(())
    }
}
