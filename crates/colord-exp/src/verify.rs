use std::collections::BTreeMap;

use colord_core::errors::{ErrorInfo, SweepError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::WorkUnit;

/// Units sharing a key regenerate identical inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HashKey {
    pub train_size: usize,
    pub repetition: usize,
}

impl From<&WorkUnit> for HashKey {
    fn from(unit: &WorkUnit) -> Self {
        Self {
            train_size: unit.train_size,
            repetition: unit.repetition,
        }
    }
}

/// Content fingerprints of the train and test inputs of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashPair {
    pub train_hash: String,
    pub test_hash: String,
}

/// Inputs for an already seen key changed within the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "input hash mismatch for train_size={}, repetition={}: recorded train={} test={}, observed train={} test={}",
    .key.train_size,
    .key.repetition,
    .recorded.train_hash,
    .recorded.test_hash,
    .observed.train_hash,
    .observed.test_hash
)]
pub struct ReproducibilityViolation {
    pub key: HashKey,
    pub recorded: HashPair,
    pub observed: HashPair,
}

impl From<ReproducibilityViolation> for SweepError {
    fn from(violation: ReproducibilityViolation) -> Self {
        SweepError::Reproducibility(
            ErrorInfo::new(
                "input-hash-mismatch",
                "regenerated inputs differ from the first run of this key",
            )
            .with_context("train_size", violation.key.train_size.to_string())
            .with_context("repetition", violation.key.repetition.to_string())
            .with_context("recorded_train_hash", violation.recorded.train_hash)
            .with_context("recorded_test_hash", violation.recorded.test_hash)
            .with_context("observed_train_hash", violation.observed.train_hash)
            .with_context("observed_test_hash", violation.observed.test_hash)
            .with_hint("the seed no longer controls input generation"),
        )
    }
}

/// Records the first input hashes per key and compares every later sighting.
///
/// Lives for one sweep run only; nothing here is persisted.
#[derive(Debug, Default)]
pub struct ReproducibilityVerifier {
    records: BTreeMap<HashKey, HashPair>,
}

impl ReproducibilityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(
        &mut self,
        key: HashKey,
        train_hash: &str,
        test_hash: &str,
    ) -> Result<(), ReproducibilityViolation> {
        match self.records.get(&key) {
            Some(recorded)
                if recorded.train_hash == train_hash && recorded.test_hash == test_hash =>
            {
                Ok(())
            }
            Some(recorded) => Err(ReproducibilityViolation {
                key,
                recorded: recorded.clone(),
                observed: HashPair {
                    train_hash: train_hash.to_string(),
                    test_hash: test_hash.to_string(),
                },
            }),
            None => {
                self.records.insert(
                    key,
                    HashPair {
                        train_hash: train_hash.to_string(),
                        test_hash: test_hash.to_string(),
                    },
                );
                Ok(())
            }
        }
    }

    pub fn recorded(&self, key: &HashKey) -> Option<&HashPair> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
