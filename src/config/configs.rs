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

use crate::config::paths::PathsConfig;
use crate::config::pipeline::{IngestConfig, OutputConfig, ScheduleConfig};
use crate::config::scoring::ScoringConfig;
use crate::config::SystemConfig;
use camino::Utf8Path;
use config::Config;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of the environment variables, e.g. `MSTDN_TFIDF.SCORING.MIN_DOC_COUNT`.
pub const ENV_PREFIX: &str = "MSTDN_TFIDF";

/// A collection of all config used by the scheduler.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename(serialize = "Config"), default)]
pub struct Configs {
    pub system: SystemConfig,
    pub paths: PathsConfig,
    pub scoring: ScoringConfig,
    pub schedule: ScheduleConfig,
    pub ingest: IngestConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum ConfigValidationError {
    #[error("scoring.dimension has to be at least 1.")]
    ZeroDimension,
    #[error("scoring.dimension {0} is bigger than {max}.", max = u32::MAX)]
    DimensionTooLarge(usize),
    #[error("schedule.interval_secs has to be at least 1.")]
    ZeroInterval,
}

impl Configs {
    #[cfg(test)]
    pub fn new(paths: PathsConfig, scoring: ScoringConfig) -> Self {
        Self {
            paths,
            scoring,
            ..Self::default()
        }
    }

    pub fn load_from<P: AsRef<Utf8Path>>(folder: P) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(config::File::with_name("./mstdn_tfidf").required(false))
            .add_source(config::File::with_name(
                folder.as_ref().join("config").as_str(),
            ))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("."))
            .build()?
            .try_deserialize()
    }

    pub fn discover_or_default() -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(config::File::with_name("./mstdn_tfidf").required(false))
            .add_source(config::File::with_name("./mstdn_tfidf_data/config").required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("."))
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        match self.scoring.dimension {
            0 => return Err(ConfigValidationError::ZeroDimension),
            value if u32::try_from(value).is_err() => {
                return Err(ConfigValidationError::DimensionTooLarge(value))
            }
            _ => {}
        }
        if self.schedule.interval_secs == 0 {
            return Err(ConfigValidationError::ZeroInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{ConfigValidationError, Configs};
    use crate::config::pipeline::MalformedPolicy;
    use crate::corpus::AccumulationMode;
    use crate::snapshot::ConflictPolicy;
    use camino_tempfile::Utf8TempDir;

    #[test]
    fn defaults_are_as_documented() {
        let config = Configs::default();
        assert_eq!("/opt/data", config.paths.ingestion_root.as_str());
        assert_eq!("/opt/warehouse/TFIDF.parquet", config.paths.output.as_str());
        assert_eq!(2, config.scoring.min_doc_count);
        assert_eq!(262144, config.scoring.dimension);
        assert_eq!(42, config.scoring.hash_seed);
        assert_eq!(AccumulationMode::Replay, config.scoring.accumulation);
        assert_eq!(10, config.scoring.report_top_terms);
        assert_eq!(30, config.schedule.interval_secs);
        assert_eq!(MalformedPolicy::Skip, config.ingest.on_malformed);
        assert_eq!(ConflictPolicy::Overwrite, config.output.on_conflict);
        assert_eq!(log::LevelFilter::Info, config.system.log_level);
        assert!(!config.system.log_to_file);
        assert_eq!(Ok(()), config.validate());
    }

    #[test]
    fn partial_files_keep_the_other_defaults() {
        let dir = Utf8TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"scoring": {"dimension": 1024, "accumulation": "deduplicate"}, "paths": {"output": "out.parquet"}}"#,
        )
        .unwrap();
        let config = Configs::load_from(dir.path()).unwrap();
        assert_eq!(1024, config.scoring.dimension);
        assert_eq!(AccumulationMode::Deduplicate, config.scoring.accumulation);
        assert_eq!("out.parquet", config.paths.output.as_str());
        assert_eq!("/opt/data", config.paths.ingestion_root.as_str());
        assert_eq!(30, config.schedule.interval_secs);
    }

    #[test]
    fn environment_overrides_files() {
        let dir = Utf8TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"scoring": {"min_doc_count": 3}}"#,
        )
        .unwrap();
        std::env::set_var("MSTDN_TFIDF.SCORING.MIN_DOC_COUNT", "5");
        std::env::set_var("MSTDN_TFIDF.INGEST.ON_MALFORMED", "fail");
        let config = Configs::load_from(dir.path());
        std::env::remove_var("MSTDN_TFIDF.SCORING.MIN_DOC_COUNT");
        std::env::remove_var("MSTDN_TFIDF.INGEST.ON_MALFORMED");
        let config = config.unwrap();
        assert_eq!(5, config.scoring.min_doc_count);
        assert_eq!(MalformedPolicy::Fail, config.ingest.on_malformed);
    }

    #[test]
    fn missing_folder_config_is_an_error() {
        let dir = Utf8TempDir::new().unwrap();
        assert!(Configs::load_from(dir.path().join("nothing")).is_err());
    }

    #[test]
    fn validation_rejects_zeros() {
        let mut config = Configs::default();
        config.scoring.dimension = 0;
        assert_eq!(Err(ConfigValidationError::ZeroDimension), config.validate());
        config.scoring.dimension = 1;
        config.schedule.interval_secs = 0;
        assert_eq!(Err(ConfigValidationError::ZeroInterval), config.validate());
    }

    #[test]
    fn round_trips_through_json() {
        let config = Configs::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"on_conflict\": \"overwrite\""));
        let back: Configs = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
