use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Grid definition: which units the sweep contains and how they are seeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Training-set sizes, outermost loop.
    #[serde(default = "default_train_sizes")]
    pub train_sizes: Vec<usize>,
    /// Repetitions per training-set size.
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,
    /// Column-ordering strategies, innermost loop.
    #[serde(default = "default_strategies")]
    pub ordering_strategies: Vec<String>,
    /// Base seed; each unit uses `seed_base + repetition`.
    #[serde(default = "default_seed_base")]
    pub seed_base: u64,
}

fn default_train_sizes() -> Vec<usize> {
    vec![20, 50, 100, 200, 500]
}

fn default_repetitions() -> usize {
    10
}

fn default_strategies() -> Vec<String> {
    ["original", "topological", "worst", "random"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_seed_base() -> u64 {
    42
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            train_sizes: default_train_sizes(),
            repetitions: default_repetitions(),
            ordering_strategies: default_strategies(),
            seed_base: default_seed_base(),
        }
    }
}

/// File names of sweep artefacts, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_checkpoint_file")]
    pub checkpoint_file: PathBuf,
    /// Table rewritten after every completed unit.
    #[serde(default = "default_raw_results_file")]
    pub raw_results_file: PathBuf,
    /// Table written once the sweep completes.
    #[serde(default = "default_results_file")]
    pub results_file: PathBuf,
    #[serde(default = "default_manifest_file")]
    pub manifest_file: PathBuf,
}

fn default_checkpoint_file() -> PathBuf {
    PathBuf::from("checkpoint.json")
}

fn default_raw_results_file() -> PathBuf {
    PathBuf::from("raw_results.csv")
}

fn default_results_file() -> PathBuf {
    PathBuf::from("results.csv")
}

fn default_manifest_file() -> PathBuf {
    PathBuf::from("manifest.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            checkpoint_file: default_checkpoint_file(),
            raw_results_file: default_raw_results_file(),
            results_file: default_results_file(),
            manifest_file: default_manifest_file(),
        }
    }
}

/// Everything the sweep controller needs, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub grid: GridSpec,
    pub output: OutputConfig,
    pub output_dir: PathBuf,
    /// When false any existing checkpoint or manifest is ignored.
    pub resume: bool,
}

impl SweepConfig {
    pub fn new(grid: GridSpec, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            grid,
            output: OutputConfig::default(),
            output_dir: output_dir.into(),
            resume: true,
        }
    }

    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.resolve(&self.output.checkpoint_file)
    }

    pub fn raw_results_path(&self) -> PathBuf {
        self.resolve(&self.output.raw_results_file)
    }

    pub fn results_path(&self) -> PathBuf {
        self.resolve(&self.output.results_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.output.manifest_file)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        self.output_dir.join(file)
    }
}
