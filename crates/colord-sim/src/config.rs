use std::fs;
use std::path::Path;

use colord_core::errors::{ErrorInfo, SweepError};
use colord_exp::config::{GridSpec, OutputConfig};
use colord_scm::ScmConfig;
use serde::{Deserialize, Serialize};

/// Experiment file: every section and field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExperimentFile {
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub model: ScmConfig,
}

impl ExperimentFile {
    /// Reads `path`, or returns the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, SweepError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|err| {
            SweepError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml(&text).map_err(|err| match err {
            SweepError::Config(info) => {
                SweepError::Config(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, SweepError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
            .map_err(|err| SweepError::Config(ErrorInfo::new("config-parse", err.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let file = ExperimentFile::from_yaml(
            "grid:\n  train_sizes: [20, 50]\n  repetitions: 1\nmodel:\n  test_size: 300\n",
        )
        .unwrap();
        assert_eq!(file.grid.train_sizes, vec![20, 50]);
        assert_eq!(file.grid.ordering_strategies.len(), 4);
        assert_eq!(file.grid.seed_base, 42);
        assert_eq!(file.model.test_size, 300);
        assert_eq!(file.model.test_seed, 123);
        assert_eq!(file.output, OutputConfig::default());
    }

    #[test]
    fn empty_text_means_defaults() {
        assert_eq!(ExperimentFile::from_yaml("").unwrap(), ExperimentFile::default());
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let err = ExperimentFile::from_yaml("grid: [unclosed").unwrap_err();
        assert!(matches!(err, SweepError::Config(_)));
    }
}
