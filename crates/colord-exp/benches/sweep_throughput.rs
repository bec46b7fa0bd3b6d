use colord_core::errors::SweepError;
use colord_exp::hash::hash_f64_slice;
use colord_exp::{
    CancelToken, GridSpec, ResultRow, SweepConfig, SweepController, UnitExecutor, UnitOutput,
    WorkUnit,
};
use criterion::{criterion_group, criterion_main, Criterion};
use tempfile::tempdir;

struct ConstantExecutor;

impl UnitExecutor for ConstantExecutor {
    type Fixture = Vec<f64>;

    fn run(
        &mut self,
        unit: &WorkUnit,
        seed: u64,
        fixture: &Self::Fixture,
    ) -> Result<UnitOutput, SweepError> {
        let train: Vec<f64> = (0..unit.train_size).map(|i| (seed + i as u64) as f64).collect();
        let mut row = ResultRow::new("autoregressive", unit, seed, false, &[0, 1, 2, 3]);
        row.insert_metric("mean_corr_difference", Some(0.05));
        Ok(UnitOutput {
            row,
            train_hash: hash_f64_slice(&train),
            test_hash: hash_f64_slice(fixture),
        })
    }
}

fn bench_sweep(c: &mut Criterion) {
    let spec = GridSpec {
        train_sizes: vec![20, 50, 100],
        repetitions: 4,
        ordering_strategies: vec!["original".into(), "worst".into(), "random".into()],
        seed_base: 42,
    };
    let fixture: Vec<f64> = (0..2000).map(|i| i as f64 * 0.5).collect();

    c.bench_function("checkpointed_sweep_36_units", |b| {
        b.iter(|| {
            let dir = tempdir().unwrap();
            let config = SweepConfig::new(spec.clone(), dir.path()).with_resume(false);
            let mut sweep = SweepController::new(config, CancelToken::new()).unwrap();
            let outcome = sweep.run(&mut ConstantExecutor, &fixture);
            assert_eq!(outcome.rows().len(), 36);
        })
    });
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);
