use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::row::PREFERRED_COLUMNS;
use crate::table::Table;

const STRATEGY_COLUMN: &str = "column_order_strategy";

/// Mean of one metric over all rows of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyMean {
    pub strategy: String,
    pub mean: f64,
    pub samples: usize,
}

/// Best (lowest mean) and worst (highest mean) strategy for a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub metric: String,
    pub best: StrategyMean,
    pub worst: StrategyMean,
    pub difference: f64,
    /// Per-strategy means in first-seen strategy order.
    pub means: Vec<StrategyMean>,
}

/// Ranks ordering strategies for every metric column of `table`.
///
/// Empty or unparsable cells are skipped; metrics without any value are left
/// out of the result.
pub fn summarize(table: &Table) -> Vec<MetricSummary> {
    let Some(strategy_idx) = table.column_index(STRATEGY_COLUMN) else {
        return Vec::new();
    };
    let mut summaries = Vec::new();
    for (column_idx, metric) in table.columns.iter().enumerate() {
        if PREFERRED_COLUMNS.contains(&metric.as_str()) {
            continue;
        }
        let mut sums: IndexMap<&str, (f64, usize)> = IndexMap::new();
        for row in &table.rows {
            let (Some(strategy), Some(cell)) = (row.get(strategy_idx), row.get(column_idx)) else {
                continue;
            };
            let Ok(value) = cell.trim().parse::<f64>() else {
                continue;
            };
            if !value.is_finite() {
                continue;
            }
            let entry = sums.entry(strategy.as_str()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
        let means: Vec<StrategyMean> = sums
            .into_iter()
            .map(|(strategy, (sum, samples))| StrategyMean {
                strategy: strategy.to_string(),
                mean: sum / samples as f64,
                samples,
            })
            .collect();
        let Some(first) = means.first() else {
            continue;
        };
        let mut best = first;
        let mut worst = first;
        for candidate in &means[1..] {
            if candidate.mean < best.mean {
                best = candidate;
            }
            if candidate.mean > worst.mean {
                worst = candidate;
            }
        }
        let (best, worst) = (best.clone(), worst.clone());
        summaries.push(MetricSummary {
            metric: metric.clone(),
            difference: worst.mean - best.mean,
            best,
            worst,
            means,
        });
    }
    summaries
}
