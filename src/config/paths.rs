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

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Where the documents come from and where the snapshot goes.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(rename(serialize = "Paths"))]
pub struct PathsConfig {
    /// The directory the collector writes the toots to
    #[serde(default = "_default_ingestion_root")]
    pub ingestion_root: Utf8PathBuf,
    /// The parquet file holding the scored corpus
    #[serde(default = "_default_output")]
    pub output: Utf8PathBuf,
}

fn _default_ingestion_root() -> Utf8PathBuf {
    Utf8PathBuf::from("/opt/data")
}
fn _default_output() -> Utf8PathBuf {
    Utf8PathBuf::from("/opt/warehouse/TFIDF.parquet")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ingestion_root: _default_ingestion_root(),
            output: _default_output(),
        }
    }
}

impl PathsConfig {
    pub fn new(ingestion_root: impl AsRef<Utf8Path>, output: impl AsRef<Utf8Path>) -> Self {
        Self {
            ingestion_root: ingestion_root.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
        }
    }
}
