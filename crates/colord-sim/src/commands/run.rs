use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use colord_core::errors::{ErrorInfo, SweepError};
use colord_exp::summary::summarize;
use colord_exp::table::Table;
use colord_exp::{CancelToken, SweepConfig, SweepController, SweepOutcome};
use colord_scm::ScmExecutor;
use tracing::{info, warn};

use crate::commands::print_summary;
use crate::config::ExperimentFile;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML experiment file; defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory receiving the checkpoint, tables and manifest.
    #[arg(long, default_value = "colord_results")]
    pub output: PathBuf,
    /// Ignore any checkpoint or manifest and start from the first unit.
    #[arg(long)]
    pub no_resume: bool,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let file = ExperimentFile::load(args.config.as_deref())?;
    let mut executor = ScmExecutor::new(file.model.clone(), &file.grid.ordering_strategies)?;
    if file.model.save_data_samples {
        executor = executor.with_samples_dir(args.output.join(&file.model.data_samples_dir));
    }
    for (strategy, order) in executor.orders() {
        info!(strategy = %strategy, order = ?order, "pre-calculated column order");
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel()).map_err(|err| {
        SweepError::Config(ErrorInfo::new("signal-handler", err.to_string()))
    })?;

    let config = SweepConfig::new(file.grid, &args.output)
        .with_output(file.output)
        .with_resume(!args.no_resume);
    let mut sweep = SweepController::new(config, cancel)?;
    info!(
        units = sweep.grid().len(),
        output = %args.output.display(),
        "sweep configured"
    );
    let fixture = executor.test_fixture();

    match sweep.run(&mut executor, &fixture) {
        SweepOutcome::Completed(report) => {
            println!(
                "sweep complete: {} rows ({} executed) -> {}",
                report.rows.len(),
                report.executed_units,
                report
                    .results_path
                    .as_deref()
                    .unwrap_or(&args.output)
                    .display()
            );
            if !report.rows.is_empty() {
                print_summary(&summarize(&Table::from_rows(&report.rows)));
            }
            Ok(())
        }
        SweepOutcome::Interrupted(report) => {
            warn!(
                completed = report.rows.len(),
                total = report.total_units,
                "sweep interrupted; rerun to resume"
            );
            println!(
                "sweep interrupted after {}/{} units; checkpoint at {}",
                report.rows.len(),
                report.total_units,
                report.checkpoint_path.display()
            );
            if !report.rows.is_empty() {
                print_summary(&summarize(&Table::from_rows(&report.rows)));
            }
            Ok(())
        }
        SweepOutcome::Failed(failure) => Err(Box::new(failure)),
    }
}
