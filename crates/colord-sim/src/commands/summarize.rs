use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use colord_exp::summary::summarize;
use colord_exp::table::read_table;

use crate::commands::print_summary;

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Results table written by `colord-sim run`.
    #[arg(long)]
    pub input: PathBuf,
}

pub fn run(args: &SummarizeArgs) -> Result<(), Box<dyn Error>> {
    let table = read_table(&args.input)?;
    println!("{} rows in {}", table.rows.len(), args.input.display());
    print_summary(&summarize(&table));
    Ok(())
}
