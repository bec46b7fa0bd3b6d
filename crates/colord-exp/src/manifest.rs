use std::fs;
use std::path::{Path, PathBuf};

use colord_core::errors::{ErrorInfo, SweepError};
use colord_core::provenance::{RunProvenance, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::persist::atomic_write;
use crate::row::ResultRow;

/// Schema written into every manifest.
pub const MANIFEST_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Completion record written once a sweep finishes.
///
/// A later run over the same grid reuses `rows` instead of executing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepManifest {
    pub schema_version: SchemaVersion,
    pub provenance: RunProvenance,
    pub total_units: usize,
    /// Final table, relative to the output directory.
    pub results_file: PathBuf,
    pub rows: Vec<ResultRow>,
}

impl SweepManifest {
    /// True when the manifest holds every row of the grid identified by `grid_hash`.
    pub fn covers(&self, grid_hash: &str, total_units: usize) -> bool {
        self.provenance.grid_hash == grid_hash
            && self.total_units == total_units
            && self.rows.len() == total_units
    }

    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), SweepError> {
        let json = serde_json::to_vec_pretty(self).map_err(|err| {
            SweepError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        atomic_write(path, &json)
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, SweepError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SweepError::CorruptCheckpoint(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let manifest: Self = serde_json::from_str(&contents).map_err(|err| {
            SweepError::CorruptCheckpoint(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        if !manifest.schema_version.is_compatible_with(&MANIFEST_SCHEMA) {
            return Err(SweepError::CorruptCheckpoint(
                ErrorInfo::new("manifest-schema", "unsupported manifest schema version")
                    .with_context("path", path.display().to_string()),
            ));
        }
        Ok(manifest)
    }
}
