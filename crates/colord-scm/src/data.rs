//! Seeded four-variable structural causal model.

use colord_core::rng::RngHandle;
use nalgebra::DMatrix;

/// Column names in declared order.
pub const COLUMN_NAMES: [&str; 4] = ["A", "B", "C", "D"];

/// Index of the column that becomes categorical.
pub const CATEGORICAL_COLUMN: usize = 1;

const NOISE_A: f64 = 0.5;
const NOISE_B: f64 = 0.5;
const NOISE_D: f64 = 0.3;

/// Level boundaries used when `B` is discretised.
const B_THRESHOLDS: [f64; 2] = [-0.5, 0.5];

/// Draws `n` rows from the SCM `C -> A`, `C -> B`, `A -> D`, `B -> D`.
///
/// The result is a pure function of the arguments. With `categorical` set,
/// `B` is replaced by its level index in `{0, 1, 2}` before `D` is computed.
pub fn generate_scm_data(n: usize, seed: u64, categorical: bool) -> DMatrix<f64> {
    let mut rng = RngHandle::from_seed(seed);
    let mut data = DMatrix::<f64>::zeros(n, COLUMN_NAMES.len());
    for row in 0..n {
        let c = rng.next_gaussian();
        let a = 0.8 * c + NOISE_A * rng.next_gaussian();
        let mut b = -0.6 * c + NOISE_B * rng.next_gaussian();
        if categorical {
            b = level_of(b);
        }
        let d = 0.7 * a + 0.5 * b + NOISE_D * rng.next_gaussian();
        data[(row, 0)] = a;
        data[(row, 1)] = b;
        data[(row, 2)] = c;
        data[(row, 3)] = d;
    }
    data
}

fn level_of(value: f64) -> f64 {
    B_THRESHOLDS.iter().filter(|threshold| value >= **threshold).count() as f64
}

/// Declared indices of categorical columns.
pub fn categorical_columns(categorical: bool) -> Vec<usize> {
    if categorical {
        vec![CATEGORICAL_COLUMN]
    } else {
        Vec::new()
    }
}

/// Copies the columns of `data` in `order`.
pub fn reorder_columns(data: &DMatrix<f64>, order: &[usize]) -> DMatrix<f64> {
    data.select_columns(order)
}

/// Positions of `columns` after reordering by `order`.
pub fn reorder_indices(columns: &[usize], order: &[usize]) -> Vec<usize> {
    order
        .iter()
        .enumerate()
        .filter(|(_, original)| columns.contains(original))
        .map(|(position, _)| position)
        .collect()
}
