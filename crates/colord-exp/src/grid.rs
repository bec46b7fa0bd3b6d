use std::iter::FusedIterator;

use colord_core::errors::SweepError;
use serde::{Deserialize, Serialize};

use crate::config::GridSpec;
use crate::hash::stable_hash_string;

/// One configuration of the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkUnit {
    /// Position of `train_size` in the configured list.
    pub train_idx: usize,
    pub train_size: usize,
    pub repetition: usize,
    pub ordering_strategy: String,
}

/// Resume position persisted alongside checkpointed rows.
///
/// After the unit at `(train_idx = t, repetition = r)` completes the cursor
/// reads `(t, r + 1)`, even when later strategies of repetition `r` are still
/// pending. The completed-row count remains the authoritative skip count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    pub train_idx: usize,
    pub rep_idx: usize,
}

impl Cursor {
    pub const fn new(train_idx: usize, rep_idx: usize) -> Self {
        Self { train_idx, rep_idx }
    }

    /// Cursor recorded right after `unit` has been checkpointed.
    pub fn after(unit: &WorkUnit) -> Self {
        Self::new(unit.train_idx, unit.repetition + 1)
    }
}

/// The full sweep in canonical order: train size, then repetition, then strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    train_sizes: Vec<usize>,
    repetitions: usize,
    strategies: Vec<String>,
}

impl Grid {
    pub fn new(train_sizes: Vec<usize>, repetitions: usize, strategies: Vec<String>) -> Self {
        Self {
            train_sizes,
            repetitions,
            strategies,
        }
    }

    pub fn from_spec(spec: &GridSpec) -> Self {
        Self::new(
            spec.train_sizes.clone(),
            spec.repetitions,
            spec.ordering_strategies.clone(),
        )
    }

    pub fn train_sizes(&self) -> &[usize] {
        &self.train_sizes
    }

    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    pub fn strategies(&self) -> &[String] {
        &self.strategies
    }

    /// Total number of units.
    pub fn len(&self) -> usize {
        self.units_per_size() * self.train_sizes.len()
    }

    /// True when any axis is empty; such a sweep completes without work.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn units_per_size(&self) -> usize {
        self.repetitions * self.strategies.len()
    }

    /// Unit at global `index`, computed directly from the index.
    pub fn unit_at(&self, index: usize) -> Option<WorkUnit> {
        if index >= self.len() {
            return None;
        }
        let per_size = self.units_per_size();
        let train_idx = index / per_size;
        let within = index % per_size;
        let repetition = within / self.strategies.len();
        let strategy_idx = within % self.strategies.len();
        Some(WorkUnit {
            train_idx,
            train_size: self.train_sizes[train_idx],
            repetition,
            ordering_strategy: self.strategies[strategy_idx].clone(),
        })
    }

    pub fn iter(&self) -> GridIter<'_> {
        self.iter_from(0)
    }

    /// Enumeration that starts at `start`, the count of already completed units.
    pub fn iter_from(&self, start: usize) -> GridIter<'_> {
        let end = self.len();
        GridIter {
            grid: self,
            next: start.min(end),
            end,
        }
    }

    /// Cursor implied by `completed` units, or `None` when it exceeds the grid.
    pub fn cursor_after(&self, completed: usize) -> Option<Cursor> {
        match completed {
            0 => Some(Cursor::default()),
            n => self.unit_at(n - 1).map(|unit| Cursor::after(&unit)),
        }
    }

    /// Fingerprint of the grid and the seed policy applied to it.
    pub fn fingerprint(&self, seed_base: u64) -> Result<String, SweepError> {
        stable_hash_string(&(
            &self.train_sizes,
            self.repetitions,
            &self.strategies,
            seed_base,
        ))
    }
}

/// Lazy iterator over a [`Grid`].
#[derive(Debug, Clone)]
pub struct GridIter<'a> {
    grid: &'a Grid,
    next: usize,
    end: usize,
}

impl GridIter<'_> {
    /// Global index of the unit the next call to `next` yields.
    pub fn position(&self) -> usize {
        self.next
    }
}

impl Iterator for GridIter<'_> {
    type Item = WorkUnit;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let unit = self.grid.unit_at(self.next);
        self.next += 1;
        unit
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.next = self.next.saturating_add(n).min(self.end);
        self.next()
    }
}

impl ExactSizeIterator for GridIter<'_> {}

impl FusedIterator for GridIter<'_> {}
