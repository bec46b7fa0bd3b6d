//! Resumable, deterministic grid execution for column-ordering sweeps.
//!
//! A sweep enumerates `train_size × repetition × ordering_strategy` in a fixed
//! canonical order, hands each unit to a [`UnitExecutor`], checkpoints after
//! every unit and checks that regenerated inputs stay bit-identical.

/// Cooperative cancellation shared with signal handlers.
pub mod cancel;
/// Checkpoint payloads and the store that persists them.
pub mod checkpoint;
/// Grid and output configuration with serde defaults.
pub mod config;
/// The sweep state machine and its terminal outcomes.
pub mod controller;
/// Seam between the engine and the per-unit workload.
pub mod executor;
/// Canonical enumeration of work units.
pub mod grid;
/// Content and payload hashing helpers.
pub mod hash;
/// Completion manifest written once a sweep finishes.
pub mod manifest;
mod persist;
/// Result rows and metric flattening.
pub mod row;
/// Canonical JSON helpers.
pub mod serde;
/// Per-strategy ranking of metric columns.
pub mod summary;
/// CSV result tables.
pub mod table;
/// In-run reproducibility verifier.
pub mod verify;

pub use cancel::CancelToken;
pub use checkpoint::{CheckpointStore, LoadedCheckpoint};
pub use config::{GridSpec, OutputConfig, SweepConfig};
pub use controller::{
    FailureKind, SweepController, SweepFailure, SweepOutcome, SweepReport, SweepState,
};
pub use executor::{UnitExecutor, UnitOutput};
pub use grid::{Cursor, Grid, GridIter, WorkUnit};
pub use manifest::SweepManifest;
pub use row::{flatten_metrics, MetricValue, ResultRow, PREFERRED_COLUMNS};
pub use summary::{summarize, MetricSummary, StrategyMean};
pub use table::{read_table, write_table, Table};
pub use verify::{HashKey, ReproducibilityVerifier, ReproducibilityViolation};
