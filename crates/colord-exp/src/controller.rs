use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::PathBuf;

use colord_core::errors::{ErrorInfo, SweepError};
use colord_core::provenance::RunProvenance;
use colord_core::rng::unit_seed;
use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::checkpoint::CheckpointStore;
use crate::config::SweepConfig;
use crate::executor::UnitExecutor;
use crate::grid::{Cursor, Grid, WorkUnit};
use crate::manifest::{SweepManifest, MANIFEST_SCHEMA};
use crate::row::ResultRow;
use crate::table::write_table;
use crate::verify::{HashKey, ReproducibilityVerifier};

/// Lifecycle of a sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    Init,
    Running,
    Completed,
    Interrupted,
    Failed,
}

/// Why a run ended in [`SweepState::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    CorruptCheckpoint,
    ReproducibilityViolation,
    ExecutorFailure,
    /// Writing the checkpoint, a table or the manifest failed.
    Persistence,
}

/// Rows and bookkeeping of a run that completed or was interrupted.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub rows: Vec<ResultRow>,
    pub total_units: usize,
    /// Units executed by this process.
    pub executed_units: usize,
    /// Units already present when the run started.
    pub resumed_from: usize,
    pub checkpoint_path: PathBuf,
    /// Final table, set once the sweep completed.
    pub results_path: Option<PathBuf>,
}

/// A fatal condition together with everything needed to report it.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepFailure {
    pub kind: FailureKind,
    pub error: SweepError,
    /// Unit being processed when the failure happened.
    pub unit: Option<WorkUnit>,
    /// Rows durably checkpointed before the failure.
    pub rows: Vec<ResultRow>,
    /// Location of the last good checkpoint.
    pub checkpoint_path: PathBuf,
}

impl Display for SweepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sweep failed ({:?})", self.kind)?;
        if let Some(unit) = &self.unit {
            write!(
                f,
                " at unit train_size={}, repetition={}, strategy={}",
                unit.train_size, unit.repetition, unit.ordering_strategy
            )?;
        }
        write!(
            f,
            ": {} | last good checkpoint: {} ({} rows)",
            self.error,
            self.checkpoint_path.display(),
            self.rows.len()
        )
    }
}

impl std::error::Error for SweepFailure {}

/// Terminal outcome of [`SweepController::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum SweepOutcome {
    Completed(SweepReport),
    Interrupted(SweepReport),
    Failed(SweepFailure),
}

impl SweepOutcome {
    pub fn state(&self) -> SweepState {
        match self {
            SweepOutcome::Completed(_) => SweepState::Completed,
            SweepOutcome::Interrupted(_) => SweepState::Interrupted,
            SweepOutcome::Failed(_) => SweepState::Failed,
        }
    }

    pub fn rows(&self) -> &[ResultRow] {
        match self {
            SweepOutcome::Completed(report) | SweepOutcome::Interrupted(report) => &report.rows,
            SweepOutcome::Failed(failure) => &failure.rows,
        }
    }
}

/// Where `Init` decided the run starts.
enum Start {
    /// Resume after the given checkpointed rows (possibly none).
    Resume(Vec<ResultRow>),
    /// A manifest already records every row of this grid.
    Finished(Vec<ResultRow>),
}

/// Drives one sweep: strictly sequential, checkpointing after every unit.
#[derive(Debug)]
pub struct SweepController {
    config: SweepConfig,
    grid: Grid,
    grid_hash: String,
    store: CheckpointStore,
    cancel: CancelToken,
    state: SweepState,
}

impl SweepController {
    pub fn new(config: SweepConfig, cancel: CancelToken) -> Result<Self, SweepError> {
        let grid = Grid::from_spec(&config.grid);
        let grid_hash = grid.fingerprint(config.grid.seed_base)?;
        let store = CheckpointStore::new(config.checkpoint_path()).with_grid_hash(&grid_hash);
        Ok(Self {
            config,
            grid,
            grid_hash,
            store,
            cancel,
            state: SweepState::Init,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_hash(&self) -> &str {
        &self.grid_hash
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }

    /// Runs every remaining unit of the grid through `executor`.
    pub fn run<E: UnitExecutor>(&mut self, executor: &mut E, fixture: &E::Fixture) -> SweepOutcome {
        self.state = SweepState::Init;
        let total = self.grid.len();
        let rows = match self.init() {
            Ok(Start::Resume(rows)) => rows,
            Ok(Start::Finished(rows)) => {
                info!(rows = rows.len(), "sweep already complete, reusing manifest");
                return self.complete(rows, 0, total);
            }
            Err(error) => {
                return self.fail(FailureKind::CorruptCheckpoint, error, None, Vec::new());
            }
        };
        let resumed_from = rows.len();
        info!(
            total,
            completed = resumed_from,
            checkpoint = %self.store.path().display(),
            "starting sweep"
        );
        self.execute(executor, fixture, rows, resumed_from)
    }

    fn init(&self) -> Result<Start, SweepError> {
        if !self.config.resume {
            return Ok(Start::Resume(Vec::new()));
        }
        let total = self.grid.len();
        if self.store.exists() {
            let loaded = self.store.load()?;
            if let Some(stored) = loaded.grid_hash.as_deref() {
                if stored != self.grid_hash {
                    return Err(self.corrupt(
                        ErrorInfo::new(
                            "checkpoint-grid-mismatch",
                            "checkpoint was written for a different grid",
                        )
                        .with_context("stored_grid_hash", stored)
                        .with_context("grid_hash", self.grid_hash.clone())
                        .with_hint("rerun with --no-resume to start over"),
                    ));
                }
            }
            let completed = loaded.completed_count();
            if completed > total {
                return Err(self.corrupt(
                    ErrorInfo::new(
                        "checkpoint-overflow",
                        "checkpoint holds more rows than the grid has units",
                    )
                    .with_context("completed", completed.to_string())
                    .with_context("total", total.to_string()),
                ));
            }
            if self.grid.cursor_after(completed) != Some(loaded.cursor) {
                return Err(self.corrupt(
                    ErrorInfo::new(
                        "checkpoint-cursor-mismatch",
                        "cursor does not match the completed count under canonical order",
                    )
                    .with_context("completed", completed.to_string())
                    .with_context("train_idx", loaded.cursor.train_idx.to_string())
                    .with_context("rep_idx", loaded.cursor.rep_idx.to_string()),
                ));
            }
            return Ok(Start::Resume(loaded.rows));
        }
        let manifest_path = self.config.manifest_path();
        if manifest_path.exists() {
            let manifest = SweepManifest::load(&manifest_path)?;
            if manifest.covers(&self.grid_hash, total) {
                return Ok(Start::Finished(manifest.rows));
            }
            warn!(
                manifest = %manifest_path.display(),
                "ignoring manifest written for a different grid"
            );
        }
        Ok(Start::Resume(Vec::new()))
    }

    fn execute<E: UnitExecutor>(
        &mut self,
        executor: &mut E,
        fixture: &E::Fixture,
        mut rows: Vec<ResultRow>,
        resumed_from: usize,
    ) -> SweepOutcome {
        self.state = SweepState::Running;
        let total = self.grid.len();
        let raw_path = self.config.raw_results_path();
        let mut verifier = ReproducibilityVerifier::new();
        let mut executed = 0usize;
        let mut next = resumed_from;

        while let Some(unit) = self.grid.unit_at(next) {
            if self.cancel.is_cancelled() {
                self.state = SweepState::Interrupted;
                info!(
                    completed = rows.len(),
                    total,
                    checkpoint = %self.store.path().display(),
                    "sweep interrupted, progress saved"
                );
                return SweepOutcome::Interrupted(self.report(rows, executed, resumed_from, None));
            }

            let seed = unit_seed(self.config.grid.seed_base, unit.repetition);
            info!(
                train_size = unit.train_size,
                repetition = unit.repetition,
                strategy = %unit.ordering_strategy,
                seed,
                "running unit"
            );
            let output = match executor.run(&unit, seed, fixture) {
                Ok(output) => output,
                Err(error) => return self.fail(FailureKind::ExecutorFailure, error, Some(unit), rows),
            };
            if let Err(violation) =
                verifier.check(HashKey::from(&unit), &output.train_hash, &output.test_hash)
            {
                return self.fail(
                    FailureKind::ReproducibilityViolation,
                    violation.into(),
                    Some(unit),
                    rows,
                );
            }

            rows.push(output.row);
            if let Err(error) = self.store.save(&rows, Cursor::after(&unit)) {
                rows.pop();
                return self.fail(FailureKind::Persistence, error, Some(unit), rows);
            }
            if let Err(error) = write_table(&raw_path, &rows) {
                return self.fail(FailureKind::Persistence, error, Some(unit), rows);
            }
            executed += 1;
            next += 1;

            let completed = rows.len();
            let percent = (1000.0 * completed as f64 / total as f64).round() / 10.0;
            info!(completed, total, percent, "progress");
        }

        self.complete(rows, executed, resumed_from)
    }

    fn complete(&mut self, rows: Vec<ResultRow>, executed: usize, resumed_from: usize) -> SweepOutcome {
        let results_path = self.config.results_path();
        if let Err(error) = write_table(&results_path, &rows) {
            return self.fail(FailureKind::Persistence, error, None, rows);
        }
        let manifest = SweepManifest {
            schema_version: MANIFEST_SCHEMA,
            provenance: RunProvenance {
                grid_hash: self.grid_hash.clone(),
                seed_base: self.config.grid.seed_base,
                tool_versions: BTreeMap::from([(
                    env!("CARGO_PKG_NAME").to_string(),
                    env!("CARGO_PKG_VERSION").to_string(),
                )]),
            },
            total_units: self.grid.len(),
            results_file: self.config.output.results_file.clone(),
            rows,
        };
        if let Err(error) = manifest.write(&self.config.manifest_path()) {
            return self.fail(FailureKind::Persistence, error, None, manifest.rows);
        }
        if let Err(error) = self.store.cleanup() {
            return self.fail(FailureKind::Persistence, error, None, manifest.rows);
        }
        self.state = SweepState::Completed;
        info!(
            rows = manifest.rows.len(),
            executed,
            results = %results_path.display(),
            "sweep completed"
        );
        SweepOutcome::Completed(self.report(manifest.rows, executed, resumed_from, Some(results_path)))
    }

    fn fail(
        &mut self,
        kind: FailureKind,
        error: SweepError,
        unit: Option<WorkUnit>,
        rows: Vec<ResultRow>,
    ) -> SweepOutcome {
        self.state = SweepState::Failed;
        let failure = SweepFailure {
            kind,
            error,
            unit,
            rows,
            checkpoint_path: self.checkpoint_path(),
        };
        tracing::error!(%failure, "sweep halted");
        SweepOutcome::Failed(failure)
    }

    fn report(
        &self,
        rows: Vec<ResultRow>,
        executed: usize,
        resumed_from: usize,
        results_path: Option<PathBuf>,
    ) -> SweepReport {
        SweepReport {
            rows,
            total_units: self.grid.len(),
            executed_units: executed,
            resumed_from,
            checkpoint_path: self.checkpoint_path(),
            results_path,
        }
    }

    fn corrupt(&self, info: ErrorInfo) -> SweepError {
        SweepError::CorruptCheckpoint(
            info.with_context("path", self.store.path().display().to_string()),
        )
    }
}
