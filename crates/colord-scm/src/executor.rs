use std::path::PathBuf;

use colord_core::errors::{ErrorInfo, SweepError};
use colord_core::rng::RngHandle;
use colord_exp::executor::{UnitExecutor, UnitOutput};
use colord_exp::grid::WorkUnit;
use colord_exp::hash::hash_f64_slice;
use colord_exp::row::{flatten_metrics, ResultRow};
use indexmap::IndexMap;
use nalgebra::DMatrix;
use tracing::debug;

use crate::config::ScmConfig;
use crate::dag::Dag;
use crate::data::{categorical_columns, generate_scm_data, reorder_columns, reorder_indices};
use crate::metrics::evaluate;
use crate::samples::write_data_samples;
use crate::synth::{AutoregressiveSynth, ALGORITHM};

/// Substream of the unit seed that drives synthetic sampling.
const SYNTH_STREAM: u64 = 1;

/// Runs fit, generate and evaluate for one unit on freshly generated SCM data.
#[derive(Debug, Clone)]
pub struct ScmExecutor {
    config: ScmConfig,
    dag: Dag,
    orders: IndexMap<String, Vec<usize>>,
    samples_dir: Option<PathBuf>,
}

impl ScmExecutor {
    /// Validates `config` and pre-calculates the order of every strategy.
    pub fn new(config: ScmConfig, strategies: &[String]) -> Result<Self, SweepError> {
        config.validate()?;
        let dag = Dag::scm();
        let orders = dag.resolve_orders(strategies)?;
        Ok(Self {
            config,
            dag,
            orders,
            samples_dir: None,
        })
    }

    /// Writes data samples of every unit below `dir`.
    pub fn with_samples_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.samples_dir = Some(dir.into());
        self
    }

    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    pub fn orders(&self) -> &IndexMap<String, Vec<usize>> {
        &self.orders
    }

    /// Shared test set, generated once per sweep.
    pub fn test_fixture(&self) -> DMatrix<f64> {
        generate_scm_data(
            self.config.test_size,
            self.config.test_seed,
            self.config.include_categorical,
        )
    }
}

impl UnitExecutor for ScmExecutor {
    type Fixture = DMatrix<f64>;

    fn run(
        &mut self,
        unit: &WorkUnit,
        seed: u64,
        fixture: &Self::Fixture,
    ) -> Result<UnitOutput, SweepError> {
        let order = self.orders.get(&unit.ordering_strategy).ok_or_else(|| {
            SweepError::Config(
                ErrorInfo::new(
                    "unknown-ordering-strategy",
                    format!("unknown ordering strategy: {}", unit.ordering_strategy),
                )
                .with_context(
                    "available",
                    self.orders.keys().cloned().collect::<Vec<_>>().join(", "),
                ),
            )
        })?;
        let categorical = self.config.include_categorical;
        let train = generate_scm_data(unit.train_size, seed, categorical);
        let train_hash = hash_f64_slice(train.as_slice());
        let test_hash = hash_f64_slice(fixture.as_slice());

        let train_ordered = reorder_columns(&train, order);
        let test_ordered = reorder_columns(fixture, order);
        let categorical_ordered = reorder_indices(&categorical_columns(categorical), order);

        let model =
            AutoregressiveSynth::fit(&train_ordered, &categorical_ordered, self.config.ridge)
                .map_err(|err| with_unit(err, unit))?;
        let mut rng = RngHandle::substream(seed, SYNTH_STREAM);
        let synth = model.sample(self.config.test_size, &mut rng);

        let metrics = evaluate(&test_ordered, &synth, &self.config);
        let row = ResultRow::new(ALGORITHM, unit, seed, categorical, order)
            .with_metrics(flatten_metrics(&metrics, &self.config.metrics));

        if let Some(dir) = &self.samples_dir {
            let header: Vec<String> = order
                .iter()
                .map(|idx| self.dag.names()[*idx].clone())
                .collect();
            let written = write_data_samples(
                dir,
                unit,
                &header,
                [
                    ("train", &train_ordered),
                    ("test", &test_ordered),
                    ("synth", &synth),
                ],
            )?;
            debug!(files = written.len(), dir = %dir.display(), "data samples written");
        }

        Ok(UnitOutput {
            row,
            train_hash,
            test_hash,
        })
    }
}

fn with_unit(err: SweepError, unit: &WorkUnit) -> SweepError {
    match err {
        SweepError::Executor(info) => SweepError::Executor(
            info.with_context("train_size", unit.train_size.to_string())
                .with_context("repetition", unit.repetition.to_string())
                .with_context("strategy", unit.ordering_strategy.clone()),
        ),
        other => other,
    }
}
