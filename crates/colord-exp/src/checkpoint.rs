use std::fs;
use std::path::{Path, PathBuf};

use colord_core::errors::{ErrorInfo, SweepError};
use colord_core::provenance::SchemaVersion;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::Cursor;
use crate::persist::{atomic_write, remove_if_exists, temp_path};
use crate::row::ResultRow;

/// Schema written into every checkpoint.
pub const CHECKPOINT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Serializable payload persisted after every completed unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointPayload {
    pub schema_version: SchemaVersion,
    /// Fingerprint of the grid that produced the rows.
    #[serde(default)]
    pub grid_hash: Option<String>,
    pub train_idx: usize,
    pub rep_idx: usize,
    pub rows: Vec<ResultRow>,
}

impl CheckpointPayload {
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.train_idx, self.rep_idx)
    }

    /// Structural checks that need no knowledge of the grid.
    fn validate(&self, path: &Path) -> Result<(), SweepError> {
        if !self.schema_version.is_compatible_with(&CHECKPOINT_SCHEMA) {
            return Err(SweepError::CorruptCheckpoint(
                corrupt_info(
                    "checkpoint-schema",
                    "unsupported checkpoint schema version",
                    path,
                )
                .with_context(
                    "schema",
                    format!(
                        "{}.{}.{}",
                        self.schema_version.major,
                        self.schema_version.minor,
                        self.schema_version.patch
                    ),
                ),
            ));
        }
        let empty_cursor = self.cursor() == Cursor::default();
        if self.rows.is_empty() != empty_cursor || (!self.rows.is_empty() && self.rep_idx == 0) {
            return Err(SweepError::CorruptCheckpoint(
                corrupt_info(
                    "checkpoint-cursor",
                    "cursor is inconsistent with the number of stored rows",
                    path,
                )
                .with_context("rows", self.rows.len().to_string())
                .with_context("train_idx", self.train_idx.to_string())
                .with_context("rep_idx", self.rep_idx.to_string()),
            ));
        }
        Ok(())
    }
}

/// Borrowed twin of [`CheckpointPayload`] used for writing.
#[derive(Serialize)]
struct PayloadRef<'a> {
    schema_version: SchemaVersion,
    grid_hash: Option<&'a str>,
    train_idx: usize,
    rep_idx: usize,
    rows: &'a [ResultRow],
}

/// State reconstructed by [`CheckpointStore::load`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadedCheckpoint {
    pub rows: Vec<ResultRow>,
    pub cursor: Cursor,
    pub grid_hash: Option<String>,
}

impl LoadedCheckpoint {
    pub fn completed_count(&self) -> usize {
        self.rows.len()
    }
}

/// Sole reader and writer of the checkpoint file for one output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointStore {
    path: PathBuf,
    grid_hash: Option<String>,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            grid_hash: None,
        }
    }

    /// Stamps every saved payload with `grid_hash`.
    pub fn with_grid_hash(mut self, grid_hash: impl Into<String>) -> Self {
        self.grid_hash = Some(grid_hash.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads persisted state; a missing file yields no rows and cursor `(0, 0)`.
    pub fn load(&self) -> Result<LoadedCheckpoint, SweepError> {
        if !self.exists() {
            return Ok(LoadedCheckpoint::default());
        }
        let contents = fs::read(&self.path).map_err(|err| {
            SweepError::CorruptCheckpoint(corrupt_info(
                "checkpoint-read",
                err.to_string(),
                &self.path,
            ))
        })?;
        let payload: CheckpointPayload = serde_json::from_slice(&contents).map_err(|err| {
            SweepError::CorruptCheckpoint(
                corrupt_info("checkpoint-parse", err.to_string(), &self.path)
                    .with_hint("delete the checkpoint or rerun with --no-resume"),
            )
        })?;
        payload.validate(&self.path)?;
        Ok(LoadedCheckpoint {
            cursor: payload.cursor(),
            grid_hash: payload.grid_hash,
            rows: payload.rows,
        })
    }

    /// Persists the full row list and cursor, replacing the previous file atomically.
    pub fn save(&self, rows: &[ResultRow], cursor: Cursor) -> Result<(), SweepError> {
        let payload = PayloadRef {
            schema_version: CHECKPOINT_SCHEMA,
            grid_hash: self.grid_hash.as_deref(),
            train_idx: cursor.train_idx,
            rep_idx: cursor.rep_idx,
            rows,
        };
        let json = serde_json::to_vec_pretty(&payload).map_err(|err| {
            SweepError::Serde(
                ErrorInfo::new("checkpoint-serialize", err.to_string())
                    .with_context("path", self.path.display().to_string()),
            )
        })?;
        atomic_write(&self.path, &json)?;
        debug!(
            path = %self.path.display(),
            rows = rows.len(),
            train_idx = cursor.train_idx,
            rep_idx = cursor.rep_idx,
            "checkpoint saved"
        );
        Ok(())
    }

    /// Deletes the checkpoint and any interrupted temporary write.
    pub fn cleanup(&self) -> Result<(), SweepError> {
        remove_if_exists(&temp_path(&self.path))?;
        remove_if_exists(&self.path)
    }
}

fn corrupt_info(code: &str, message: impl Into<String>, path: &Path) -> ErrorInfo {
    ErrorInfo::new(code, message).with_context("path", path.display().to_string())
}
