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

mod cycle;
mod errors;

pub use cycle::CycleReport;
pub use errors::CycleError;

use crate::config::{ConfigValidationError, Configs, MalformedPolicy};
use crate::corpus::CorpusStore;
use crate::features::{FeatureHasher, FrequencyModel};
use crate::ingest::{scan_ingestion_root, CleanedDocument, DocumentLoader, LoadError};
use crate::report::top_terms;
use crate::runtime::ShutdownReceiverWithWait;
use crate::snapshot::SnapshotWriter;
use crate::text::{LeadingTagCleaner, TextCleaner};
use itertools::Itertools;
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::time::Instant;
use time::OffsetDateTime;

/// Drives the scan, score and write cycle. Owns the corpus.
#[derive(Debug)]
pub struct Scheduler<C = LeadingTagCleaner> {
    configs: Configs,
    loader: DocumentLoader<C>,
    hasher: FeatureHasher,
    writer: SnapshotWriter,
    corpus: CorpusStore,
    cycle: u64,
}

impl Scheduler {
    pub fn new(configs: Configs) -> Result<Self, ConfigValidationError> {
        Self::with_cleaner(configs, LeadingTagCleaner)
    }
}

impl<C: TextCleaner> Scheduler<C> {
    pub fn with_cleaner(configs: Configs, cleaner: C) -> Result<Self, ConfigValidationError> {
        configs.validate()?;
        let dimension =
            NonZeroUsize::new(configs.scoring.dimension).ok_or(ConfigValidationError::ZeroDimension)?;
        Ok(Self {
            loader: DocumentLoader::new(cleaner),
            hasher: FeatureHasher::new(dimension, configs.scoring.hash_seed),
            writer: SnapshotWriter::new(configs.output.on_conflict),
            corpus: CorpusStore::new(configs.scoring.accumulation),
            cycle: 0,
            configs,
        })
    }

    pub fn configs(&self) -> &Configs {
        &self.configs
    }

    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    /// Number of finished cycles.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Runs exactly one cycle.
    pub fn run_once(&mut self) -> Result<CycleReport, CycleError> {
        let started = Instant::now();
        let started_at = OffsetDateTime::now_utc();
        let cycle = self.cycle + 1;
        log::debug!("Start cycle {cycle}.");

        let entries = scan_ingestion_root(&self.configs.paths.ingestion_root)?;
        let files_scanned = entries.len();

        let results: Vec<Result<Option<CleanedDocument>, LoadError>> = entries
            .into_par_iter()
            .map(|entry| entry.and_then(|path| self.loader.load_file(&path)))
            .collect();
        let (documents, errors): (Vec<_>, Vec<_>) = results.into_iter().partition_result();

        let malformed = errors.len();
        match self.configs.ingest.on_malformed {
            MalformedPolicy::Fail => {
                if let Some(err) = errors.into_iter().next() {
                    log::error!("Abort cycle {cycle}: {err}");
                    return Err(err.into());
                }
            }
            MalformedPolicy::Skip => {
                for err in errors {
                    log::warn!("Skipping {}: {err}", err.path());
                }
            }
        }

        let skipped = documents.iter().filter(|document| document.is_none()).count();
        let documents: Vec<CleanedDocument> = documents.into_iter().flatten().collect();
        let loaded = documents.len();
        let appended = self.corpus.extend(documents);

        let all_documents = self.corpus.all_documents();
        let features = self.hasher.hash_all(all_documents);
        let model = FrequencyModel::fit(
            &features,
            self.hasher.dimension(),
            self.configs.scoring.min_doc_count,
        )?;
        let scored = model.transform_all(&features)?;
        let snapshot = self
            .writer
            .write(all_documents, &features, &scored, &self.configs.paths.output)?;

        let top_terms = top_terms(
            all_documents,
            &self.hasher,
            &model,
            self.configs.scoring.report_top_terms,
        );

        self.cycle = cycle;
        let report = CycleReport {
            cycle,
            started_at,
            files_scanned,
            loaded,
            appended,
            skipped,
            malformed,
            corpus_size: self.corpus.len(),
            snapshot,
            duration: started.elapsed(),
            top_terms,
        };
        log::info!("{report}");
        Ok(report)
    }

    /// Runs cycles until `shutdown` is received. A running cycle is always
    /// finished, the shutdown only interrupts the sleep between two cycles.
    ///
    /// Needs a multi thread runtime.
    pub async fn run<S: ShutdownReceiverWithWait>(&mut self, shutdown: S) -> Result<u64, CycleError> {
        let interval = self.configs.schedule.interval();
        while !shutdown.is_shutdown() {
            tokio::task::block_in_place(|| self.run_once())?;
            tokio::select! {
                _ = shutdown.wait() => {}
                _ = tokio::time::sleep(interval) => {}
            }
        }
        log::info!("Stopped after {} cycles, the corpus holds {}.", self.cycle, self.corpus);
        Ok(self.cycle)
    }
}

#[cfg(test)]
mod test {
    use super::{CycleError, Scheduler};
    use crate::config::{Configs, MalformedPolicy, PathsConfig, ScoringConfig};
    use crate::corpus::AccumulationMode;
    use crate::runtime::{Shutdown, ShutdownPhantom};
    use crate::snapshot::ConflictPolicy;
    use crate::test_impls::TootFixtures;
    use camino::Utf8PathBuf;
    use camino_tempfile::Utf8TempDir;
    use std::time::Duration;

    struct Setup {
        fixtures: TootFixtures,
        out: Utf8TempDir,
    }

    impl Setup {
        fn new() -> Self {
            Self {
                fixtures: TootFixtures::new(),
                out: Utf8TempDir::new().unwrap(),
            }
        }

        fn output(&self) -> Utf8PathBuf {
            self.out.path().join("warehouse/TFIDF.parquet")
        }

        fn configs(&self, accumulation: AccumulationMode) -> Configs {
            Configs::new(
                PathsConfig::new(self.fixtures.root(), self.output()),
                ScoringConfig {
                    accumulation,
                    dimension: 1 << 20,
                    ..ScoringConfig::default()
                },
            )
        }
    }

    fn three_toots(fixtures: &mut TootFixtures) {
        fixtures.toot("1", "alice", "<p>the cat sat</p>", "en");
        fixtures.toot("2", "bob", "<p>the dog sat</p>", "en");
        fixtures.toot("3", "carl", "<p>the bird flew</p>", "en");
    }

    #[test]
    fn replay_grows_by_the_number_of_files() {
        let mut setup = Setup::new();
        three_toots(&mut setup.fixtures);
        let mut scheduler = Scheduler::new(setup.configs(AccumulationMode::Replay)).unwrap();
        for k in 1..=3 {
            let report = scheduler.run_once().unwrap();
            assert_eq!(k, report.cycle);
            assert_eq!(3, report.files_scanned);
            assert_eq!(3, report.appended);
            assert_eq!(3 * k as usize, report.corpus_size);
            assert_eq!(3 * k as usize, report.snapshot.rows);
        }
        assert_eq!(9, scheduler.corpus().len());
    }

    #[test]
    fn deduplicate_keeps_one_document_per_toot() {
        let mut setup = Setup::new();
        three_toots(&mut setup.fixtures);
        let mut scheduler = Scheduler::new(setup.configs(AccumulationMode::Deduplicate)).unwrap();
        scheduler.run_once().unwrap();
        let report = scheduler.run_once().unwrap();
        assert_eq!(3, report.loaded);
        assert_eq!(0, report.appended);
        assert_eq!(3, report.corpus_size);
        assert_eq!(2, scheduler.cycles());
    }

    #[test]
    fn deduplicate_keeps_every_toot_of_one_account() {
        let mut setup = Setup::new();
        setup.fixtures.toot("1", "alice", "<p>the cat sat</p>", "en");
        setup.fixtures.toot("1", "alice", "<p>the dog sat</p>", "en");
        let mut scheduler = Scheduler::new(setup.configs(AccumulationMode::Deduplicate)).unwrap();
        let report = scheduler.run_once().unwrap();
        assert_eq!(2, report.files_scanned);
        assert_eq!(2, report.loaded);
        assert_eq!(2, report.corpus_size);
        let report = scheduler.run_once().unwrap();
        assert_eq!(0, report.appended);
        assert_eq!(2, report.corpus_size);
    }

    #[test]
    fn files_appearing_later_are_picked_up() {
        let mut setup = Setup::new();
        setup.fixtures.toot("1", "alice", "<p>first</p>", "en");
        let mut scheduler = Scheduler::new(setup.configs(AccumulationMode::Deduplicate)).unwrap();
        assert_eq!(1, scheduler.run_once().unwrap().corpus_size);
        setup.fixtures.toot("2", "bob", "<p>second</p>", "en");
        let report = scheduler.run_once().unwrap();
        assert_eq!(2, report.files_scanned);
        assert_eq!(2, report.corpus_size);
    }

    #[test]
    fn non_english_and_empty_toots_are_skipped() {
        let mut setup = Setup::new();
        three_toots(&mut setup.fixtures);
        setup.fixtures.toot("4", "dora", "<p>die katze</p>", "de");
        setup.fixtures.toot("5", "emil", "", "en");
        let mut scheduler = Scheduler::new(setup.configs(AccumulationMode::Replay)).unwrap();
        let report = scheduler.run_once().unwrap();
        assert_eq!(5, report.files_scanned);
        assert_eq!(3, report.loaded);
        assert_eq!(2, report.skipped);
        assert_eq!(0, report.malformed);
    }

    #[test]
    fn malformed_documents_are_counted_when_skipped() {
        let mut setup = Setup::new();
        three_toots(&mut setup.fixtures);
        setup.fixtures.raw("{ not json");
        setup.fixtures.raw(r#"{"content": "<p>no account</p>", "language": "en"}"#);
        let mut scheduler = Scheduler::new(setup.configs(AccumulationMode::Replay)).unwrap();
        let report = scheduler.run_once().unwrap();
        assert_eq!(2, report.malformed);
        assert_eq!(3, report.corpus_size);
        assert!(setup.output().is_file());
    }

    #[test]
    fn malformed_documents_abort_when_failing() {
        let mut setup = Setup::new();
        three_toots(&mut setup.fixtures);
        let broken = setup.fixtures.raw("{ not json");
        let mut configs = setup.configs(AccumulationMode::Replay);
        configs.ingest.on_malformed = MalformedPolicy::Fail;
        let mut scheduler = Scheduler::new(configs).unwrap();
        match scheduler.run_once() {
            Err(CycleError::MalformedDocument(err)) => assert_eq!(broken.as_path(), err.path()),
            other => panic!("Expected a malformed document but got {other:?}"),
        }
        assert!(scheduler.corpus().is_empty());
        assert_eq!(0, scheduler.cycles());
        assert!(!setup.output().exists());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlinks_are_malformed_when_skipped() {
        let mut setup = Setup::new();
        three_toots(&mut setup.fixtures);
        let link = setup.fixtures.root().join("dangling.json");
        std::os::unix::fs::symlink(setup.fixtures.root().join("gone.json"), &link).unwrap();
        let mut scheduler = Scheduler::new(setup.configs(AccumulationMode::Replay)).unwrap();
        let report = scheduler.run_once().unwrap();
        assert_eq!(4, report.files_scanned);
        assert_eq!(1, report.malformed);
        assert_eq!(3, report.corpus_size);
        assert!(setup.output().is_file());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlinks_abort_when_failing() {
        let mut setup = Setup::new();
        three_toots(&mut setup.fixtures);
        let link = setup.fixtures.root().join("dangling.json");
        std::os::unix::fs::symlink(setup.fixtures.root().join("gone.json"), &link).unwrap();
        let mut configs = setup.configs(AccumulationMode::Replay);
        configs.ingest.on_malformed = MalformedPolicy::Fail;
        let mut scheduler = Scheduler::new(configs).unwrap();
        match scheduler.run_once() {
            Err(CycleError::MalformedDocument(err)) => assert_eq!(link.as_path(), err.path()),
            other => panic!("Expected a malformed document but got {other:?}"),
        }
        assert!(scheduler.corpus().is_empty());
    }

    #[test]
    fn missing_root_is_a_scan_error() {
        let setup = Setup::new();
        let mut configs = setup.configs(AccumulationMode::Replay);
        configs.paths.ingestion_root = setup.out.path().join("does/not/exist");
        let mut scheduler = Scheduler::new(configs).unwrap();
        assert!(matches!(scheduler.run_once(), Err(CycleError::Scan(_))));
    }

    #[test]
    fn conflict_error_stops_the_second_write() {
        let mut setup = Setup::new();
        three_toots(&mut setup.fixtures);
        let mut configs = setup.configs(AccumulationMode::Replay);
        configs.output.on_conflict = ConflictPolicy::Error;
        let mut scheduler = Scheduler::new(configs).unwrap();
        scheduler.run_once().unwrap();
        assert!(matches!(scheduler.run_once(), Err(CycleError::Snapshot(_))));
    }

    #[test]
    fn shared_terms_are_reported() {
        let mut setup = Setup::new();
        three_toots(&mut setup.fixtures);
        let mut scheduler = Scheduler::new(setup.configs(AccumulationMode::Replay)).unwrap();
        let report = scheduler.run_once().unwrap();
        let terms: Vec<_> = report.top_terms.iter().map(|value| value.term.as_str()).collect();
        assert_eq!(vec!["sat"], terms);
        assert!(report.to_string().contains("corpus size 3"));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let setup = Setup::new();
        let mut configs = setup.configs(AccumulationMode::Replay);
        configs.scoring.dimension = 0;
        assert!(Scheduler::new(configs).is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_stops_on_shutdown() {
        let mut setup = Setup::new();
        three_toots(&mut setup.fixtures);
        let mut scheduler = Scheduler::new(setup.configs(AccumulationMode::Replay)).unwrap();
        let shutdown = Shutdown::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.shutdown();
        });
        let cycles = tokio::time::timeout(Duration::from_secs(20), scheduler.run(shutdown))
            .await
            .unwrap()
            .unwrap();
        assert!(cycles >= 1);
        assert_eq!(3 * cycles as usize, scheduler.corpus().len());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_does_nothing_after_shutdown() {
        let setup = Setup::new();
        let mut scheduler = Scheduler::new(setup.configs(AccumulationMode::Replay)).unwrap();
        let shutdown = Shutdown::new();
        shutdown.shutdown();
        assert_eq!(0, scheduler.run(shutdown).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_propagates_cycle_errors() {
        let setup = Setup::new();
        let mut configs = setup.configs(AccumulationMode::Replay);
        configs.paths.ingestion_root = setup.out.path().join("missing");
        let mut scheduler = Scheduler::new(configs).unwrap();
        assert!(scheduler.run(ShutdownPhantom).await.is_err());
    }
}
