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

use crate::app::instruction::InstructionError;
use crate::app::logging::LoggingError;
use crate::config::ConfigValidationError;
use crate::scheduler::CycleError;
use std::process::ExitCode;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_SCAN: u8 = 3;
pub const EXIT_MALFORMED_DOCUMENT: u8 = 4;
pub const EXIT_SNAPSHOT: u8 = 5;
pub const EXIT_INTERNAL: u8 = 6;

/// The status the process exits with for an error.
pub trait ExitStatus {
    fn exit_status(&self) -> u8;
}

impl ExitStatus for InstructionError {
    fn exit_status(&self) -> u8 {
        match self {
            InstructionError::Config(_) | InstructionError::Validation(_) => EXIT_CONFIG,
            InstructionError::Init(_) => EXIT_INTERNAL,
        }
    }
}

impl ExitStatus for ConfigValidationError {
    fn exit_status(&self) -> u8 {
        EXIT_CONFIG
    }
}

impl ExitStatus for CycleError {
    fn exit_status(&self) -> u8 {
        match self {
            CycleError::Scan(_) => EXIT_SCAN,
            CycleError::MalformedDocument(_) => EXIT_MALFORMED_DOCUMENT,
            CycleError::Snapshot(_) => EXIT_SNAPSHOT,
            CycleError::Frequency(_) => EXIT_INTERNAL,
        }
    }
}

impl ExitStatus for LoggingError {
    fn exit_status(&self) -> u8 {
        EXIT_INTERNAL
    }
}

impl ExitStatus for std::io::Error {
    fn exit_status(&self) -> u8 {
        EXIT_INTERNAL
    }
}

macro_rules! into_exit_code {
    ($($ty: ty),+) => {
        $(
            impl From<$ty> for ExitCode {
                fn from(value: $ty) -> Self {
                    ExitCode::from(value.exit_status())
                }
            }
        )+
    };
}

into_exit_code!(InstructionError, ConfigValidationError, CycleError, LoggingError);

#[cfg(test)]
mod test {
    use super::{ExitStatus, EXIT_MALFORMED_DOCUMENT, EXIT_SCAN, EXIT_SNAPSHOT};
    use crate::ingest::{LoadError, ScanError};
    use crate::scheduler::CycleError;
    use crate::snapshot::SnapshotError;

    #[test]
    fn cycle_errors_have_distinct_codes() {
        let scan = CycleError::Scan(ScanError::RootMissing("/nope".into()));
        assert_eq!(EXIT_SCAN, scan.exit_status());

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let malformed = CycleError::MalformedDocument(LoadError::Malformed {
            path: "a.json".into(),
            source: json,
        });
        assert_eq!(EXIT_MALFORMED_DOCUMENT, malformed.exit_status());

        let snapshot = CycleError::Snapshot(SnapshotError::WriteConflict("a.parquet".into()));
        assert_eq!(EXIT_SNAPSHOT, snapshot.exit_status());
    }
}
