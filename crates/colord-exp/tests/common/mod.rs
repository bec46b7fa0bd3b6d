#![allow(dead_code)]

use colord_core::errors::{ErrorInfo, SweepError};
use colord_exp::hash::hash_f64_slice;
use colord_exp::{CancelToken, GridSpec, ResultRow, UnitExecutor, UnitOutput, WorkUnit};

/// Executor whose inputs are a pure function of `(train_size, seed)`.
#[derive(Debug, Default)]
pub struct FakeExecutor {
    pub calls: Vec<WorkUnit>,
    /// Cancel this token once `calls.len()` reaches the given count.
    pub cancel_after: Option<(usize, CancelToken)>,
    /// Return an error on the call with this zero-based index.
    pub fail_on_call: Option<usize>,
    /// Perturb the training data of this strategy.
    pub drifting_strategy: Option<String>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_after(count: usize, token: CancelToken) -> Self {
        Self {
            cancel_after: Some((count, token)),
            ..Self::default()
        }
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }
}

impl UnitExecutor for FakeExecutor {
    type Fixture = Vec<f64>;

    fn run(
        &mut self,
        unit: &WorkUnit,
        seed: u64,
        fixture: &Self::Fixture,
    ) -> Result<UnitOutput, SweepError> {
        if self.fail_on_call == Some(self.calls.len()) {
            return Err(SweepError::Executor(
                ErrorInfo::new("fake-failure", "synthesizer exploded")
                    .with_context("train_size", unit.train_size.to_string()),
            ));
        }
        self.calls.push(unit.clone());

        let mut train: Vec<f64> = (0..unit.train_size)
            .map(|i| (seed as f64) * 0.5 + i as f64)
            .collect();
        if self.drifting_strategy.as_deref() == Some(unit.ordering_strategy.as_str()) {
            train[0] += 1.0;
        }
        let mut row = ResultRow::new("autoregressive", unit, seed, false, &[0, 1, 2, 3]);
        row.insert_metric("mean_corr_difference", Some(train.iter().sum::<f64>() / 1e4));
        row.insert_metric("k_marginal_tvd", Some(0.1 + unit.repetition as f64 / 3.0));

        if let Some((count, token)) = &self.cancel_after {
            if self.calls.len() >= *count {
                token.cancel();
            }
        }
        Ok(UnitOutput {
            row,
            train_hash: hash_f64_slice(&train),
            test_hash: hash_f64_slice(fixture),
        })
    }
}

pub fn fixture() -> Vec<f64> {
    vec![0.25, -1.5, 3.0, 7.125]
}

pub fn grid(train_sizes: &[usize], repetitions: usize, strategies: &[&str]) -> GridSpec {
    GridSpec {
        train_sizes: train_sizes.to_vec(),
        repetitions,
        ordering_strategies: strategies.iter().map(|s| s.to_string()).collect(),
        seed_base: 42,
    }
}

pub fn coordinates(rows: &[ResultRow]) -> Vec<(usize, usize, String)> {
    rows.iter()
        .map(|row| {
            (
                row.train_size,
                row.repetition,
                row.column_order_strategy.clone(),
            )
        })
        .collect()
}
