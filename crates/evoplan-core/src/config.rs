use clap::Args;
use serde::{Deserialize, Serialize};

/// Genetic search knobs. Flattened into CLI subcommands and the service
/// binary; also serde-loadable so deployments can ship a JSON profile.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[arg(long, default_value_t = 64)]
    pub population_size: usize,

    /// Generation cap per round.
    #[arg(long, default_value_t = 500)]
    pub generations: usize,

    #[arg(long, default_value_t = 4)]
    pub tournament_size: usize,

    #[arg(long, default_value_t = 0.8)]
    pub crossover_rate: f32,

    #[arg(long, default_value_t = 0.3)]
    pub mutation_rate: f32,

    /// Generations without improvement before the round stops early.
    #[arg(long, default_value_t = 60)]
    pub patience: usize,

    /// Minimum fitness gain that counts as an improvement.
    #[arg(long, default_value_t = 0.001)]
    pub patience_threshold: f32,

    /// Construction attempts before the problem is declared infeasible.
    #[arg(long, default_value_t = 200)]
    pub init_attempts: usize,

    /// Wall-clock budget per round, seconds. 0 disables the budget.
    #[arg(long, default_value_t = 0)]
    pub max_round_seconds: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            population_size: 64,
            generations: 500,
            tournament_size: 4,
            crossover_rate: 0.8,
            mutation_rate: 0.3,
            patience: 60,
            patience_threshold: 0.001,
            init_attempts: 200,
            max_round_seconds: 0,
        }
    }
}
