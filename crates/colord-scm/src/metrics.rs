//! Fidelity metrics comparing real and synthetic samples.

use std::collections::BTreeMap;

use colord_exp::row::MetricValue;
use indexmap::IndexMap;
use itertools::Itertools;
use nalgebra::{DMatrix, DVector};

use crate::config::ScmConfig;

const PROPENSITY_LEARNING_RATE: f64 = 0.1;

/// Pearson correlation matrix of the columns of `data`.
///
/// Constant columns get zero correlation with every other column.
pub fn correlation_matrix(data: &DMatrix<f64>) -> DMatrix<f64> {
    let cols = data.ncols();
    let rows = data.nrows() as f64;
    let centered: Vec<DVector<f64>> = (0..cols)
        .map(|col| {
            let column = data.column(col);
            let mean = column.mean();
            column.map(|v| v - mean)
        })
        .collect();
    let norms: Vec<f64> = centered.iter().map(|c| (c.norm_squared() / rows).sqrt()).collect();
    DMatrix::from_fn(cols, cols, |i, j| {
        if i == j {
            1.0
        } else if norms[i] == 0.0 || norms[j] == 0.0 {
            0.0
        } else {
            centered[i].dot(&centered[j]) / rows / (norms[i] * norms[j])
        }
    })
}

/// Mean and max absolute correlation difference over the upper triangle.
pub fn correlation_difference(real: &DMatrix<f64>, synth: &DMatrix<f64>) -> (f64, f64) {
    let real_corr = correlation_matrix(real);
    let synth_corr = correlation_matrix(synth);
    let diffs: Vec<f64> = (0..real.ncols())
        .tuple_combinations()
        .map(|(i, j)| (real_corr[(i, j)] - synth_corr[(i, j)]).abs())
        .collect();
    if diffs.is_empty() {
        return (0.0, 0.0);
    }
    let mean = diffs.iter().sum::<f64>() / diffs.len() as f64;
    let max = diffs.iter().copied().fold(0.0, f64::max);
    (mean, max)
}

/// pMSE and accuracy of a logistic regression telling real from synthetic rows.
pub fn propensity(real: &DMatrix<f64>, synth: &DMatrix<f64>, iterations: usize) -> (f64, f64) {
    let n_real = real.nrows();
    let n = n_real + synth.nrows();
    let cols = real.ncols();
    let mut features = DMatrix::<f64>::zeros(n, cols + 1);
    let mut labels = DVector::<f64>::zeros(n);
    for row in 0..n {
        features[(row, 0)] = 1.0;
        let (source, idx) = if row < n_real {
            (real, row)
        } else {
            labels[row] = 1.0;
            (synth, row - n_real)
        };
        for col in 0..cols {
            features[(row, col + 1)] = source[(idx, col)];
        }
    }
    for col in 1..=cols {
        let mean = features.column(col).mean();
        let std = features.column(col).variance().sqrt();
        let scale = if std > 0.0 { std } else { 1.0 };
        features.column_mut(col).apply(|v| *v = (*v - mean) / scale);
    }

    let mut weights = DVector::<f64>::zeros(cols + 1);
    for _ in 0..iterations {
        let predictions = (&features * &weights).map(sigmoid);
        let gradient = features.transpose() * (predictions - &labels) / n as f64;
        weights -= gradient * PROPENSITY_LEARNING_RATE;
    }

    let share = synth.nrows() as f64 / n as f64;
    let predictions = (&features * &weights).map(sigmoid);
    let pmse = predictions.iter().map(|p| (p - share).powi(2)).sum::<f64>() / n as f64;
    let correct = predictions
        .iter()
        .zip(labels.iter())
        .filter(|(p, label)| (**p >= 0.5) == (**label == 1.0))
        .count();
    (pmse, correct as f64 / n as f64)
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Mean total variation distance over every `k`-column marginal.
///
/// Each column is cut at quantiles of the real data into `bins` bins.
/// Returns `None` when `k` exceeds the column count.
pub fn k_marginal_tvd(real: &DMatrix<f64>, synth: &DMatrix<f64>, k: usize, bins: usize) -> Option<f64> {
    let cols = real.ncols();
    if k == 0 || k > cols {
        return None;
    }
    let cuts: Vec<Vec<f64>> = (0..cols)
        .map(|col| quantile_cuts(real.column(col).iter().copied().collect(), bins))
        .collect();
    let real_bins = bin_matrix(real, &cuts);
    let synth_bins = bin_matrix(synth, &cuts);

    let mut total = 0.0;
    let mut count = 0usize;
    for subset in (0..cols).combinations(k) {
        let p = joint_frequencies(&real_bins, &subset);
        let q = joint_frequencies(&synth_bins, &subset);
        let mut keys: Vec<&Vec<usize>> = p.keys().chain(q.keys()).collect();
        keys.sort();
        keys.dedup();
        let tvd: f64 = keys
            .into_iter()
            .map(|key| (p.get(key).unwrap_or(&0.0) - q.get(key).unwrap_or(&0.0)).abs())
            .sum::<f64>()
            / 2.0;
        total += tvd;
        count += 1;
    }
    Some(total / count as f64)
}

fn quantile_cuts(mut values: Vec<f64>, bins: usize) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    let mut cuts: Vec<f64> = (1..bins)
        .filter_map(|i| {
            let position = (i * values.len()) / bins;
            values.get(position).copied()
        })
        .collect();
    cuts.dedup();
    cuts
}

fn bin_matrix(data: &DMatrix<f64>, cuts: &[Vec<f64>]) -> Vec<Vec<usize>> {
    (0..data.nrows())
        .map(|row| {
            cuts.iter()
                .enumerate()
                .map(|(col, col_cuts)| col_cuts.partition_point(|cut| *cut <= data[(row, col)]))
                .collect()
        })
        .collect()
}

fn joint_frequencies(binned: &[Vec<usize>], subset: &[usize]) -> BTreeMap<Vec<usize>, f64> {
    let mut counts = BTreeMap::new();
    for row in binned {
        let key: Vec<usize> = subset.iter().map(|col| row[*col]).collect();
        *counts.entry(key).or_insert(0.0) += 1.0;
    }
    let total = binned.len().max(1) as f64;
    counts.values_mut().for_each(|count| *count /= total);
    counts
}

/// Computes the metrics selected in `config`, in selection order.
pub fn evaluate(
    real: &DMatrix<f64>,
    synth: &DMatrix<f64>,
    config: &ScmConfig,
) -> IndexMap<String, MetricValue> {
    let mut metrics = IndexMap::new();
    let correlation = || correlation_difference(real, synth);
    for name in &config.metrics {
        let value = match name.as_str() {
            "mean_corr_difference" => MetricValue::Scalar(correlation().0),
            "max_corr_difference" => MetricValue::Scalar(correlation().1),
            "propensity_metrics" => {
                let (pmse, accuracy) = propensity(real, synth, config.propensity_iterations);
                let mut nested = IndexMap::new();
                nested.insert("pmse".to_string(), pmse);
                nested.insert("accuracy".to_string(), accuracy);
                MetricValue::Nested(nested)
            }
            "k_marginal_tvd" => {
                match k_marginal_tvd(real, synth, config.k_for_kmarginal, config.marginal_bins) {
                    Some(tvd) => MetricValue::Scalar(tvd),
                    None => MetricValue::Scalar(f64::NAN),
                }
            }
            _ => continue,
        };
        metrics.insert(name.clone(), value);
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_scm_data;
    use colord_core::rng::RngHandle;

    #[test]
    fn identical_samples_score_perfectly() {
        let data = generate_scm_data(300, 1, false);
        let (mean, max) = correlation_difference(&data, &data);
        assert_eq!((mean, max), (0.0, 0.0));
        assert_eq!(k_marginal_tvd(&data, &data, 2, 5), Some(0.0));
        let (pmse, accuracy) = propensity(&data, &data, 100);
        assert!(pmse < 1e-6);
        assert!(accuracy <= 0.6);
    }

    #[test]
    fn independent_noise_loses_correlation() {
        let real = generate_scm_data(500, 2, false);
        let mut rng = RngHandle::from_seed(99);
        let noise = DMatrix::from_fn(500, 4, |_, _| rng.next_gaussian());
        let (mean, max) = correlation_difference(&real, &noise);
        assert!(mean > 0.2);
        assert!(max >= mean);
        let tvd = k_marginal_tvd(&real, &noise, 2, 5).unwrap();
        assert!(tvd > 0.1 && tvd <= 1.0);
    }

    #[test]
    fn shifted_sample_is_detected_by_discriminator() {
        let real = generate_scm_data(400, 3, false);
        let shifted = real.map(|v| v + 3.0);
        let (_, accuracy) = propensity(&real, &shifted, 200);
        assert!(accuracy > 0.9);
    }

    #[test]
    fn oversized_k_is_missing() {
        let data = generate_scm_data(20, 1, false);
        assert_eq!(k_marginal_tvd(&data, &data, 5, 5), None);
    }

    #[test]
    fn evaluation_follows_selected_order() {
        let data = generate_scm_data(100, 4, false);
        let config = ScmConfig {
            metrics: vec!["k_marginal_tvd".into(), "propensity_metrics".into()],
            ..ScmConfig::default()
        };
        let metrics = evaluate(&data, &data, &config);
        assert_eq!(
            metrics.keys().cloned().collect::<Vec<_>>(),
            vec!["k_marginal_tvd", "propensity_metrics"]
        );
        assert!(matches!(metrics["propensity_metrics"], MetricValue::Nested(_)));
    }
}
