use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use colord_exp::checkpoint::CheckpointStore;
use colord_exp::grid::Grid;
use colord_exp::manifest::SweepManifest;
use colord_exp::SweepConfig;

use crate::config::ExperimentFile;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// YAML experiment file used for the run.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output directory of the run.
    #[arg(long, default_value = "colord_results")]
    pub output: PathBuf,
}

pub fn run(args: &StatusArgs) -> Result<(), Box<dyn Error>> {
    let file = ExperimentFile::load(args.config.as_deref())?;
    let config = SweepConfig::new(file.grid, &args.output).with_output(file.output);
    let grid = Grid::from_spec(&config.grid);
    let grid_hash = grid.fingerprint(config.grid.seed_base)?;
    let total = grid.len();

    let store = CheckpointStore::new(config.checkpoint_path());
    if store.exists() {
        let loaded = store.load()?;
        let completed = loaded.completed_count();
        let percent = if total == 0 {
            100.0
        } else {
            100.0 * completed as f64 / total as f64
        };
        println!("checkpoint: {}", store.path().display());
        println!("completed units: {completed}/{total} ({percent:.1}%)");
        println!(
            "cursor: train_idx={}, rep_idx={}",
            loaded.cursor.train_idx, loaded.cursor.rep_idx
        );
        if loaded.grid_hash.as_deref().is_some_and(|hash| hash != grid_hash) {
            println!("warning: checkpoint was written for a different grid");
        }
        if let Some(unit) = grid.unit_at(completed) {
            println!(
                "next unit: train_size={}, repetition={}, strategy={}",
                unit.train_size, unit.repetition, unit.ordering_strategy
            );
        }
        return Ok(());
    }

    let manifest_path = config.manifest_path();
    if manifest_path.exists() {
        let manifest = SweepManifest::load(&manifest_path)?;
        if manifest.covers(&grid_hash, total) {
            println!(
                "sweep complete: {} rows in {}",
                manifest.rows.len(),
                config.output_dir.join(&manifest.results_file).display()
            );
            return Ok(());
        }
        println!("manifest found for a different grid; next run starts fresh");
        return Ok(());
    }

    println!("no checkpoint found; sweep not started ({total} units)");
    Ok(())
}
