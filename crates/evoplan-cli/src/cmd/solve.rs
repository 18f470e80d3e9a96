use crate::reports;
use clap::Args;
use evoplan_core::config::SearchParams;
use evoplan_core::optimizer::{decode, OptimizationOptions, Optimizer, ProgressCallback};
use evoplan_core::scorer::Scorer;
use evoplan_core::{EvoResult, Problem};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    /// Problem file (JSON).
    #[arg(long, short)]
    pub input: PathBuf,

    /// Where to write the resulting schedule (JSON meetings).
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Fixed seed for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub search: SearchParams,
}

struct LogProgress;

impl ProgressCallback for LogProgress {
    fn on_generation(&self, generation: usize, best_fitness: f32, elapsed: Duration) -> bool {
        if generation % 25 == 0 {
            info!(
                generation,
                best_fitness,
                elapsed_ms = elapsed.as_millis() as u64,
                "searching"
            );
        }
        true
    }
}

pub fn run(args: SolveArgs) -> EvoResult<()> {
    info!("📂 Loading problem: {}", args.input.display());
    let problem = Problem::from_file(&args.input)?;
    info!(
        instances = problem.instances.len(),
        rooms = problem.rooms.len(),
        users = problem.users.len(),
        "problem compiled"
    );

    let scorer = Arc::new(Scorer::new(Arc::new(problem.clone())));
    let options = OptimizationOptions::from(&args.search);
    let result = Optimizer::new(scorer, options).run(args.seed, &LogProgress)?;

    let meetings = decode(&problem, &result.best);
    println!("{}", reports::schedule_table(&problem, &meetings));
    println!(
        "Best fitness: {:.3} ({} generations)",
        result.best_fitness, result.generations_run
    );

    if let Some(path) = args.output {
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &meetings)?;
        info!("💾 Schedule written to {}", path.display());
    }
    Ok(())
}
