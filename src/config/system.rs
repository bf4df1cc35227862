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

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Config of the system, basically logging.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename(serialize = "System"))]
pub struct SystemConfig {
    /// The log level of the application
    #[serde(default = "_default_log_level")]
    pub log_level: log::LevelFilter,

    /// Log to a file?
    #[serde(default)]
    pub log_to_file: bool,

    /// The file used when logging to a file
    #[serde(default = "_default_log_file")]
    pub log_file: Utf8PathBuf,
}

const fn _default_log_level() -> log::LevelFilter {
    log::LevelFilter::Info
}

fn _default_log_file() -> Utf8PathBuf {
    Utf8PathBuf::from("mstdn-tfidf.log")
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: _default_log_level(),
            log_to_file: false,
            log_file: _default_log_file(),
        }
    }
}
