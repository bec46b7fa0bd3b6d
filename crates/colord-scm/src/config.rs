use std::path::PathBuf;

use colord_core::errors::{ErrorInfo, SweepError};
use serde::{Deserialize, Serialize};

/// Metrics the evaluator knows how to compute.
pub const KNOWN_METRICS: [&str; 4] = [
    "mean_corr_difference",
    "max_corr_difference",
    "propensity_metrics",
    "k_marginal_tvd",
];

/// Model section of the experiment file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScmConfig {
    /// Rows in the shared test set and in every synthetic sample.
    #[serde(default = "default_test_size")]
    pub test_size: usize,
    #[serde(default = "default_test_seed")]
    pub test_seed: u64,
    /// Discretise `B` into three levels.
    #[serde(default)]
    pub include_categorical: bool,
    /// Metrics written into every row, in column order.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,
    #[serde(default = "default_k_for_kmarginal")]
    pub k_for_kmarginal: usize,
    #[serde(default = "default_marginal_bins")]
    pub marginal_bins: usize,
    /// Ridge penalty of the per-column regressions.
    #[serde(default = "default_ridge")]
    pub ridge: f64,
    /// Gradient steps of the propensity discriminator.
    #[serde(default = "default_propensity_iterations")]
    pub propensity_iterations: usize,
    #[serde(default)]
    pub save_data_samples: bool,
    #[serde(default = "default_data_samples_dir")]
    pub data_samples_dir: PathBuf,
}

fn default_test_size() -> usize {
    2000
}

fn default_test_seed() -> u64 {
    123
}

fn default_metrics() -> Vec<String> {
    KNOWN_METRICS.iter().map(|name| name.to_string()).collect()
}

fn default_k_for_kmarginal() -> usize {
    2
}

fn default_marginal_bins() -> usize {
    5
}

fn default_ridge() -> f64 {
    1e-6
}

fn default_propensity_iterations() -> usize {
    200
}

fn default_data_samples_dir() -> PathBuf {
    PathBuf::from("data_samples")
}

impl Default for ScmConfig {
    fn default() -> Self {
        Self {
            test_size: default_test_size(),
            test_seed: default_test_seed(),
            include_categorical: false,
            metrics: default_metrics(),
            k_for_kmarginal: default_k_for_kmarginal(),
            marginal_bins: default_marginal_bins(),
            ridge: default_ridge(),
            propensity_iterations: default_propensity_iterations(),
            save_data_samples: false,
            data_samples_dir: default_data_samples_dir(),
        }
    }
}

impl ScmConfig {
    /// Rejects settings the executor cannot run with.
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.test_size < 2 {
            return Err(invalid("test_size", "test_size must be at least 2"));
        }
        if self.marginal_bins == 0 {
            return Err(invalid("marginal_bins", "marginal_bins must be positive"));
        }
        if self.k_for_kmarginal == 0 {
            return Err(invalid("k_for_kmarginal", "k_for_kmarginal must be positive"));
        }
        if !(self.ridge.is_finite() && self.ridge >= 0.0) {
            return Err(invalid("ridge", "ridge must be a non-negative number"));
        }
        if let Some(unknown) = self
            .metrics
            .iter()
            .find(|name| !KNOWN_METRICS.contains(&name.as_str()))
        {
            return Err(SweepError::Config(
                ErrorInfo::new("unknown-metric", format!("unknown metric: {unknown}"))
                    .with_context("available", KNOWN_METRICS.join(", ")),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> SweepError {
    SweepError::Config(ErrorInfo::new("invalid-model-config", message).with_context("field", field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let config: ScmConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ScmConfig::default());
        assert_eq!(config.test_size, 2000);
        assert_eq!(config.test_seed, 123);
        assert_eq!(config.metrics.len(), 4);
        config.validate().unwrap();
    }

    #[test]
    fn unknown_metric_is_a_config_error() {
        let config = ScmConfig {
            metrics: vec!["mean_corr_difference".into(), "wasserstein".into()],
            ..ScmConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SweepError::Config(_)));
        assert!(err.info().message.contains("wasserstein"));
    }
}
