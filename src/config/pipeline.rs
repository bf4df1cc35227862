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

use crate::snapshot::ConflictPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::EnumString;

#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(rename(serialize = "Schedule"))]
pub struct ScheduleConfig {
    /// Seconds between the end of a cycle and the start of the next. (default: 30)
    #[serde(default = "_default_interval_secs")]
    pub interval_secs: u64,
}

const fn _default_interval_secs() -> u64 {
    30
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: _default_interval_secs(),
        }
    }
}

/// What happens with a document file that can not be read or parsed.
#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, EnumString, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MalformedPolicy {
    /// Log a warning and go on with the next file.
    #[default]
    Skip,
    /// Abort the cycle.
    Fail,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(rename(serialize = "Ingest"))]
pub struct IngestConfig {
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(rename(serialize = "Output"))]
pub struct OutputConfig {
    #[serde(default)]
    pub on_conflict: ConflictPolicy,
}
