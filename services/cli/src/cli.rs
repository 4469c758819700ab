use crate::report::{run_report, RunArgs};
use clap::{Parser, Subcommand};
use compliance_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "compliance-cli",
    about = "Reconcile registered buildings against issued EPCs and score compliance risk",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline over two CSV snapshots
    Run(RunArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run_report(args),
    }
}
