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

use crate::app::args::{RunMode, RunOptions};
use crate::app::MstdnArgs;
use crate::config::{ConfigValidationError, Configs};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::BufWriter;
use thiserror::Error;

/// The folder `init` writes the default config to.
pub const DEFAULT_CONFIG_FOLDER: &str = "./mstdn_tfidf_data";

/// The kind of instruction provided by the args.
#[derive(Debug)]
pub enum Instruction {
    RunInstruction(RunInstruction),
    Nothing,
}

/// The instruction to run the scheduler.
#[derive(Debug)]
pub struct RunInstruction {
    pub configs: Configs,
    /// Stop after the first cycle.
    pub once: bool,
}

#[derive(Debug, Error)]
pub enum InstructionError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Validation(#[from] ConfigValidationError),
    #[error("Failed to create the default config: {0:#}")]
    Init(#[source] anyhow::Error),
}

/// Consumes the args and returns everything necessary to execute the application
pub(crate) fn prepare_instruction(args: MstdnArgs) -> Result<Instruction, InstructionError> {
    match args.mode {
        Some(RunMode::RUN { options }) => Ok(Instruction::RunInstruction(RunInstruction {
            configs: configs_for(options)?,
            once: false,
        })),
        Some(RunMode::ONCE { options }) => Ok(Instruction::RunInstruction(RunInstruction {
            configs: configs_for(options)?,
            once: true,
        })),
        Some(RunMode::INIT) => {
            println!("Start creating the default config.");
            match write_default_config(DEFAULT_CONFIG_FOLDER).map_err(InstructionError::Init)? {
                Some(path) => println!("Created the default config at {path}."),
                None => println!(
                    "The default config already exists in {DEFAULT_CONFIG_FOLDER}.\nDelete it before regenerating."
                ),
            }
            Ok(Instruction::Nothing)
        }
        None => Ok(Instruction::Nothing),
    }
}

fn configs_for(options: RunOptions) -> Result<Configs, InstructionError> {
    let mut configs = match options.config {
        None => Configs::discover_or_default(),
        Some(folder) => Configs::load_from(folder),
    }?;
    if let Some(log_level) = options.log_level {
        configs.system.log_level = log_level;
    }
    if options.log_to_file {
        configs.system.log_to_file = true;
    }
    if let Some(root) = options.ingestion_root {
        configs.paths.ingestion_root = root;
    }
    if let Some(output) = options.output {
        configs.paths.output = output;
    }
    configs.validate()?;
    Ok(configs)
}

/// Writes the default `config.json` to `folder`.
/// Returns `None` if there is already one.
fn write_default_config(folder: impl AsRef<Utf8Path>) -> anyhow::Result<Option<Utf8PathBuf>> {
    let folder = folder.as_ref();
    std::fs::create_dir_all(folder).with_context(|| format!("Can not create {folder}"))?;
    let path = folder.join("config.json");
    let file = match File::options().create_new(true).write(true).open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("Can not open {path}")),
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &Configs::default())
        .with_context(|| format!("Can not write {path}"))?;
    Ok(Some(path))
}
