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

use crate::features::{FeatureVector, ScoredVector};
use crate::ingest::CleanedDocument;
use crate::io::{ErrorWithPath, ToErrorWithPath};
use arrow_array::builder::{Float64Builder, ListBuilder, StringBuilder, UInt32Builder};
use arrow_array::{ArrayRef, RecordBatch, StringArray, UInt32Array};
use arrow_schema::{ArrowError, DataType, Field, Schema, SchemaRef};
use camino::{Utf8Path, Utf8PathBuf};
use camino_tempfile::NamedUtf8TempFile;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::sync::Arc;
use strum::EnumString;
use thiserror::Error;

/// What happens when the destination already exists.
#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, EnumString, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConflictPolicy {
    /// Atomically replace the old snapshot.
    #[default]
    Overwrite,
    /// Refuse to write and keep the old snapshot.
    Error,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("The snapshot {0} already exists.")]
    WriteConflict(Utf8PathBuf),
    #[error(transparent)]
    Io(#[from] ErrorWithPath),
    #[error(transparent)]
    Arrow(#[from] ArrowError),
    #[error(transparent)]
    Parquet(#[from] ParquetError),
    #[error("Got {documents} documents, {features} feature vectors and {scores} scored vectors.")]
    RowMismatch {
        documents: usize,
        features: usize,
        scores: usize,
    },
    #[error("The dimension {0} does not fit into the snapshot format.")]
    DimensionTooLarge(usize),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SnapshotSummary {
    pub path: Utf8PathBuf,
    pub rows: usize,
}

/// The columns of a snapshot.
pub fn snapshot_schema() -> SchemaRef {
    fn list_of(data_type: DataType) -> DataType {
        DataType::List(Arc::new(Field::new("item", data_type, true)))
    }
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("username", DataType::Utf8, false),
        Field::new("tokens", list_of(DataType::Utf8), false),
        Field::new("dimension", DataType::UInt32, false),
        Field::new("indices", list_of(DataType::UInt32), false),
        Field::new("term_counts", list_of(DataType::Float64), false),
        Field::new("scores", list_of(DataType::Float64), false),
    ]))
}

/// Writes the scored corpus as a single parquet file.
#[derive(Debug, Default, Copy, Clone)]
pub struct SnapshotWriter {
    on_conflict: ConflictPolicy,
}

impl SnapshotWriter {
    pub const fn new(on_conflict: ConflictPolicy) -> Self {
        Self { on_conflict }
    }

    pub fn on_conflict(&self) -> ConflictPolicy {
        self.on_conflict
    }

    /// The row `i` of the snapshot is made of `documents[i]`, `features[i]` and `scored[i]`.
    pub fn write(
        &self,
        documents: &[CleanedDocument],
        features: &[FeatureVector],
        scored: &[ScoredVector],
        destination: &Utf8Path,
    ) -> Result<SnapshotSummary, SnapshotError> {
        if documents.len() != features.len() || documents.len() != scored.len() {
            return Err(SnapshotError::RowMismatch {
                documents: documents.len(),
                features: features.len(),
                scores: scored.len(),
            });
        }
        if self.on_conflict == ConflictPolicy::Error && destination.exists() {
            return Err(SnapshotError::WriteConflict(destination.to_path_buf()));
        }

        let batch = build_batch(documents, features, scored)?;

        let parent = match destination.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        std::fs::create_dir_all(parent).to_error_with_path(parent)?;

        let mut temp = NamedUtf8TempFile::new_in(parent).to_error_with_path(parent)?;
        let properties = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(temp.as_file_mut(), batch.schema(), Some(properties))?;
        writer.write(&batch)?;
        writer.close()?;

        match self.on_conflict {
            ConflictPolicy::Overwrite => {
                temp.persist(destination)
                    .map_err(|err| err.error)
                    .to_error_with_path(destination)?;
            }
            ConflictPolicy::Error => match temp.persist_noclobber(destination) {
                Ok(_) => {}
                Err(err) if err.error.kind() == ErrorKind::AlreadyExists => {
                    return Err(SnapshotError::WriteConflict(destination.to_path_buf()));
                }
                Err(err) => {
                    return Err(ErrorWithPath::new(destination.to_path_buf(), err.error).into());
                }
            },
        }

        log::debug!("Wrote {} rows to {destination}.", documents.len());
        Ok(SnapshotSummary {
            path: destination.to_path_buf(),
            rows: documents.len(),
        })
    }
}

fn build_batch(
    documents: &[CleanedDocument],
    features: &[FeatureVector],
    scored: &[ScoredVector],
) -> Result<RecordBatch, SnapshotError> {
    let mut tokens = ListBuilder::new(StringBuilder::new());
    let mut dimensions = Vec::with_capacity(documents.len());
    let mut indices = ListBuilder::new(UInt32Builder::new());
    let mut term_counts = ListBuilder::new(Float64Builder::new());
    let mut scores = ListBuilder::new(Float64Builder::new());

    for ((document, counts), weighted) in documents.iter().zip(features).zip(scored) {
        for token in &document.tokens {
            tokens.values().append_value(token);
        }
        tokens.append(true);

        dimensions.push(to_u32(counts.len())?);
        for idx in counts.indices() {
            indices.values().append_value(to_u32(idx)?);
        }
        indices.append(true);

        for count in counts.values() {
            term_counts.values().append_value(*count as f64);
        }
        term_counts.append(true);

        for score in weighted.values() {
            scores.values().append_value(*score);
        }
        scores.append(true);
    }

    let ids = StringArray::from_iter_values(documents.iter().map(|doc| doc.id.as_str()));
    let usernames = StringArray::from_iter_values(documents.iter().map(|doc| doc.username.as_str()));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(ids),
        Arc::new(usernames),
        Arc::new(tokens.finish()),
        Arc::new(UInt32Array::from(dimensions)),
        Arc::new(indices.finish()),
        Arc::new(term_counts.finish()),
        Arc::new(scores.finish()),
    ];
    Ok(RecordBatch::try_new(snapshot_schema(), columns)?)
}

fn to_u32(value: usize) -> Result<u32, SnapshotError> {
    u32::try_from(value).map_err(|_| SnapshotError::DimensionTooLarge(value))
}
