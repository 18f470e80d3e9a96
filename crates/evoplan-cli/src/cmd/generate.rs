use clap::Args;
use evoplan_core::generator::{generate, GeneratorConfig};
use evoplan_core::EvoResult;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Where to write the generated problem (JSON).
    #[arg(long, short)]
    pub output: PathBuf,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    #[arg(long, default_value_t = 40)]
    pub users: usize,

    #[arg(long, default_value_t = 6)]
    pub groups: usize,

    #[arg(long, default_value_t = 5)]
    pub rooms: usize,

    #[arg(long, default_value_t = 8)]
    pub subjects: usize,

    #[arg(long, default_value_t = 32)]
    pub slots_per_day: usize,
}

pub fn run(args: GenerateArgs) -> EvoResult<()> {
    let cfg = GeneratorConfig {
        users: args.users,
        groups: args.groups,
        rooms: args.rooms,
        subjects: args.subjects,
        slots_per_day: args.slots_per_day,
        ..Default::default()
    };
    let problem = generate(&cfg, args.seed)?;
    info!(
        instances = problem.instances.len(),
        seed = args.seed,
        "🎲 problem generated"
    );

    let file = File::create(&args.output)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &problem)?;
    info!("💾 Problem written to {}", args.output.display());
    Ok(())
}
