// Copyright 2024. Felix Engl
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
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
/// Scores the collected toots with TF-IDF and writes the result as parquet.
pub struct MstdnArgs {
    /// The mode of the application
    #[command(subcommand)]
    pub mode: Option<RunMode>,
}

#[derive(Subcommand, Debug)]
pub enum RunMode {
    /// Runs a cycle every few seconds until Ctrl-C is pressed.
    RUN {
        #[command(flatten)]
        options: RunOptions,
    },
    /// Runs a single cycle and exits.
    ONCE {
        #[command(flatten)]
        options: RunOptions,
    },
    /// Creates the default config file in ./mstdn_tfidf_data.
    INIT,
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunOptions {
    /// The folder containing the config file, if not set the config is discovered.
    #[arg(short, long)]
    pub config: Option<Utf8PathBuf>,
    /// Overrides the log level from the config.
    #[arg(long)]
    pub log_level: Option<log::LevelFilter>,
    /// Log to file
    #[arg(long)]
    pub log_to_file: bool,
    /// Overrides the directory the toots are read from.
    #[arg(long)]
    pub ingestion_root: Option<Utf8PathBuf>,
    /// Overrides the parquet file the scores are written to.
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,
}
