//! Reference collaborators for colord sweeps: a seeded structural causal
//! model, column-ordering strategies, an autoregressive synthesizer and the
//! fidelity metrics reported for every unit.

pub mod config;
pub mod dag;
pub mod data;
pub mod executor;
pub mod metrics;
pub mod samples;
pub mod synth;

pub use config::ScmConfig;
pub use dag::{Dag, STRATEGY_NAMES};
pub use data::{generate_scm_data, COLUMN_NAMES};
pub use executor::ScmExecutor;
pub use synth::AutoregressiveSynth;
