use colord_core::errors::SweepError;

use crate::grid::WorkUnit;
use crate::row::ResultRow;

/// What an executor hands back for one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOutput {
    pub row: ResultRow,
    /// Content hash of the training data generated for the unit.
    pub train_hash: String,
    /// Content hash of the shared test data as seen by the unit.
    pub test_hash: String,
}

/// Performs the fit/generate/evaluate work for a single unit.
///
/// Implementations must behave as a pure function of `(unit, seed, fixture)`;
/// the sweep checks the returned hashes to catch violations. Any error is
/// treated as fatal for the run and is never retried.
pub trait UnitExecutor {
    /// Data shared by every unit of a sweep, typically the held-out test set.
    type Fixture;

    fn run(
        &mut self,
        unit: &WorkUnit,
        seed: u64,
        fixture: &Self::Fixture,
    ) -> Result<UnitOutput, SweepError>;
}

impl<E: UnitExecutor + ?Sized> UnitExecutor for &mut E {
    type Fixture = E::Fixture;

    fn run(
        &mut self,
        unit: &WorkUnit,
        seed: u64,
        fixture: &Self::Fixture,
    ) -> Result<UnitOutput, SweepError> {
        (**self).run(unit, seed, fixture)
    }
}
