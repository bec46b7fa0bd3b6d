use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::grid::WorkUnit;

/// Fixed column prefix of every result table, in output order.
pub const PREFERRED_COLUMNS: [&str; 7] = [
    "algorithm",
    "train_size",
    "repetition",
    "seed",
    "categorical",
    "column_order_strategy",
    "column_order",
];

/// A metric as reported by an evaluator, before flattening.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Scalar(f64),
    Nested(IndexMap<String, f64>),
}

/// One completed unit: the fixed fields followed by metric columns.
///
/// Metric columns keep insertion order. Missing or non-finite values are
/// stored as `None` and rendered as empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub algorithm: String,
    pub train_size: usize,
    pub repetition: usize,
    pub seed: u64,
    pub categorical: bool,
    pub column_order_strategy: String,
    pub column_order: String,
    #[serde(default)]
    pub metrics: IndexMap<String, Option<f64>>,
}

impl ResultRow {
    /// Starts a row for `unit` with no metric columns.
    pub fn new(
        algorithm: impl Into<String>,
        unit: &WorkUnit,
        seed: u64,
        categorical: bool,
        column_order: &[usize],
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            train_size: unit.train_size,
            repetition: unit.repetition,
            seed,
            categorical,
            column_order_strategy: unit.ordering_strategy.clone(),
            column_order: format!("{column_order:?}"),
            metrics: IndexMap::new(),
        }
    }

    pub fn insert_metric(&mut self, name: impl Into<String>, value: Option<f64>) {
        self.metrics
            .insert(name.into(), value.filter(|value| value.is_finite()));
    }

    pub fn with_metrics(mut self, metrics: IndexMap<String, Option<f64>>) -> Self {
        for (name, value) in metrics {
            self.insert_metric(name, value);
        }
        self
    }

    /// Values of the fixed columns in [`PREFERRED_COLUMNS`] order.
    pub fn fixed_cells(&self) -> [String; 7] {
        [
            self.algorithm.clone(),
            self.train_size.to_string(),
            self.repetition.to_string(),
            self.seed.to_string(),
            self.categorical.to_string(),
            self.column_order_strategy.clone(),
            self.column_order.clone(),
        ]
    }

    /// Rendered metric cell; empty when the column is absent or missing.
    pub fn metric_cell(&self, column: &str) -> String {
        match self.metrics.get(column) {
            Some(Some(value)) => value.to_string(),
            _ => String::new(),
        }
    }
}

/// Flattens the selected metrics into `{metric}_{submetric}` columns.
///
/// Columns follow the order of `selected`; a selected metric the evaluator did
/// not produce becomes a single missing column.
pub fn flatten_metrics(
    metrics: &IndexMap<String, MetricValue>,
    selected: &[String],
) -> IndexMap<String, Option<f64>> {
    let mut flat = IndexMap::new();
    for name in selected {
        match metrics.get(name) {
            Some(MetricValue::Scalar(value)) => {
                flat.insert(name.clone(), finite(*value));
            }
            Some(MetricValue::Nested(parts)) => {
                for (sub, value) in parts {
                    flat.insert(format!("{name}_{sub}"), finite(*value));
                }
            }
            None => {
                flat.insert(name.clone(), None);
            }
        }
    }
    flat
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
