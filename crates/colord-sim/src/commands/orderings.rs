use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use colord_scm::ScmExecutor;

use crate::config::ExperimentFile;

#[derive(Args, Debug)]
pub struct OrderingsArgs {
    /// YAML experiment file naming the strategies.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &OrderingsArgs) -> Result<(), Box<dyn Error>> {
    let file = ExperimentFile::load(args.config.as_deref())?;
    let executor = ScmExecutor::new(file.model, &file.grid.ordering_strategies)?;
    let dag = executor.dag();
    println!("causal graph:");
    print!("{dag}");
    println!("column orders:");
    for (strategy, order) in executor.orders() {
        let names: Vec<&str> = order.iter().map(|idx| dag.names()[*idx].as_str()).collect();
        println!("  {strategy:<12} {order:?} ({})", names.join(", "));
    }
    Ok(())
}
