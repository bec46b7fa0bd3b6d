use std::error::Error;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use commands::{
    orderings::{self, OrderingsArgs},
    run::{self, RunArgs},
    status::{self, StatusArgs},
    summarize::{self, SummarizeArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(name = "colord-sim", about = "Resumable column-ordering sweep driver")]
struct Cli {
    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the sweep, resuming from the checkpoint when one exists.
    Run(RunArgs),
    /// Report checkpoint progress for an output directory.
    Status(StatusArgs),
    /// Print the causal graph and the column order of every strategy.
    Orderings(OrderingsArgs),
    /// Rank strategies per metric from an existing results table.
    Summarize(SummarizeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Run(args) => run::run(&args),
        Command::Status(args) => status::run(&args),
        Command::Orderings(args) => orderings::run(&args),
        Command::Summarize(args) => summarize::run(&args),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
