use clap::{Parser, Subcommand};
use std::process;
use tracing::error;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about = "Preference-weighted timetable optimizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Optimize a problem file and print the resulting schedule.
    Solve(cmd::solve::SolveArgs),
    /// Produce a synthetic problem file for benchmarks and manual testing.
    Generate(cmd::generate::GenerateArgs),
    /// Check a schedule file against its problem's hard constraints.
    Validate(cmd::validate::ValidateArgs),
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve(args) => cmd::solve::run(args),
        Commands::Generate(args) => cmd::generate::run(args),
        Commands::Validate(args) => cmd::validate::run(args),
    };

    if let Err(e) = result {
        error!("❌ {}", e);
        process::exit(1);
    }
}
