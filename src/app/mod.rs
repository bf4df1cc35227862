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

mod args;
mod exitcode_conversions;
mod instruction;
mod logging;

pub use args::{MstdnArgs, RunMode, RunOptions};

use crate::runtime::{build_runtime, Shutdown};
use crate::scheduler::Scheduler;
use exitcode_conversions::ExitStatus;
use instruction::{prepare_instruction, Instruction, RunInstruction};
use logging::configure_logging;
use std::process::ExitCode;

pub fn exec_args(args: MstdnArgs) -> ExitCode {
    match prepare_instruction(args) {
        Ok(Instruction::RunInstruction(instruction)) => execute(instruction),
        Ok(Instruction::Nothing) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Failed with: {err}");
            err.into()
        }
    }
}

/// Runs the scheduler, either once or until Ctrl-C.
fn execute(instruction: RunInstruction) -> ExitCode {
    if let Err(err) = configure_logging(&instruction.configs) {
        eprintln!("Failed to configure the logging: {err}");
        return err.into();
    }

    let mut scheduler = match Scheduler::new(instruction.configs) {
        Ok(scheduler) => scheduler,
        Err(err) => {
            log::error!("Invalid config: {err}");
            return err.into();
        }
    };
    log::info!(
        "Scoring {} into {}.",
        scheduler.configs().paths.ingestion_root,
        scheduler.configs().paths.output
    );

    if instruction.once {
        return match scheduler.run_once() {
            Ok(_) => ExitCode::SUCCESS,
            Err(err) => {
                log::error!("Cycle failed: {err}");
                err.into()
            }
        };
    }

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("Was not able to initialize the runtime: {err}");
            return ExitCode::from(err.exit_status());
        }
    };
    let shutdown = Shutdown::new();
    let result = runtime.block_on(async {
        shutdown.shutdown_on_ctrl_c();
        let result = scheduler.run(shutdown.clone()).await;
        shutdown.shutdown();
        result
    });
    match result {
        Ok(cycles) => {
            log::info!("Exit application after {cycles} cycles.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Cycle failed: {err}");
            err.into()
        }
    }
}
