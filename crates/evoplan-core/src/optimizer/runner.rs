use crate::config::SearchParams;
use crate::error::EvoResult;
use crate::feasibility::validate_schedule;
use crate::optimizer::crossover::crossover_uniform;
use crate::optimizer::{initialization, mutation, Genome};
use crate::scorer::Scorer;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct OptimizationOptions {
    pub population_size: usize,
    pub generations: usize,
    pub tournament_size: usize,
    pub crossover_rate: f32,
    pub mutation_rate: f32,
    pub patience: usize,
    pub patience_threshold: f32,
    pub init_attempts: usize,
    /// Wall-clock budget for this round; checked at generation boundaries.
    pub max_time: Option<Duration>,
    /// Survivors of the previous round; feasible ones are reused verbatim so
    /// repeated rounds resume instead of restarting.
    pub initial_population: Vec<Genome>,
}

impl From<&SearchParams> for OptimizationOptions {
    fn from(params: &SearchParams) -> Self {
        Self {
            population_size: params.population_size.max(2),
            generations: params.generations,
            tournament_size: params.tournament_size.max(1),
            crossover_rate: params.crossover_rate,
            mutation_rate: params.mutation_rate,
            patience: params.patience,
            patience_threshold: params.patience_threshold,
            init_attempts: params.init_attempts,
            max_time: (params.max_round_seconds > 0)
                .then(|| Duration::from_secs(params.max_round_seconds)),
            initial_population: Vec::new(),
        }
    }
}

pub struct OptimizationResult {
    pub best_fitness: f32,
    pub best: Genome,
    /// Final population, for the next round's `initial_population`.
    pub population: Vec<Genome>,
    pub generations_run: usize,
    /// True when the progress callback asked to stop.
    pub cancelled: bool,
}

/// Per-generation hook. Returning false stops the run at the current
/// generation boundary.
pub trait ProgressCallback: Send + Sync {
    fn on_generation(&self, generation: usize, best_fitness: f32, elapsed: Duration) -> bool;
}

/// No-op callback for offline runs.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn on_generation(&self, _generation: usize, _best_fitness: f32, _elapsed: Duration) -> bool {
        true
    }
}

pub struct Optimizer {
    scorer: Arc<Scorer>,
    options: OptimizationOptions,
}

impl Optimizer {
    pub fn new(scorer: Arc<Scorer>, options: OptimizationOptions) -> Self {
        Self { scorer, options }
    }

    /// Runs one bounded round. A fixed seed reproduces the final best score
    /// exactly; fitness evaluation is parallel but pure.
    pub fn run<CB: ProgressCallback>(
        &self,
        seed: Option<u64>,
        callback: &CB,
    ) -> EvoResult<OptimizationResult> {
        let opts = &self.options;
        let problem = self.scorer.problem();
        let mut rng = match seed {
            Some(s) => fastrand::Rng::with_seed(s),
            None => fastrand::Rng::new(),
        };
        let start = Instant::now();

        // Carried-over individuals are trusted only after re-validation; the
        // problem may have changed between rounds (preference edits do not
        // affect feasibility, but entity edits would).
        let mut population: Vec<Genome> = opts
            .initial_population
            .iter()
            .filter(|g| {
                g.len() == problem.instances.len() && validate_schedule(problem, g).is_empty()
            })
            .take(opts.population_size)
            .cloned()
            .collect();
        if population.len() < opts.population_size {
            let missing = opts.population_size - population.len();
            population.extend(initialization::seed_population(
                problem,
                missing,
                opts.init_attempts,
                &mut rng,
            )?);
        }

        let mut fitness = self.evaluate(&population);
        let (mut best_idx, mut best_fitness) = argmax(&fitness);
        let mut best = population[best_idx].clone();
        info!(
            instances = problem.instances.len(),
            population = population.len(),
            initial_best = best_fitness,
            "round started"
        );

        let mut patience_counter = 0usize;
        let mut generations_run = 0usize;
        let mut cancelled = false;

        for generation in 0..opts.generations {
            if let Some(limit) = opts.max_time {
                if start.elapsed() >= limit {
                    debug!(generation, "round budget exhausted");
                    break;
                }
            }

            let mut next = Vec::with_capacity(opts.population_size);
            // Elitism: the incumbent survives unchanged.
            next.push(best.clone());
            while next.len() < opts.population_size {
                let p1 = self.tournament(&population, &fitness, &mut rng);
                let p2 = self.tournament(&population, &fitness, &mut rng);
                let mut child = if rng.f32() < opts.crossover_rate {
                    crossover_uniform(problem, &population[p1], &population[p2], &mut rng)
                        .unwrap_or_else(|| population[p1].clone())
                } else {
                    population[p1].clone()
                };
                if rng.f32() < opts.mutation_rate {
                    mutation::mutate(problem, &mut child, &mut rng);
                }
                next.push(child);
            }
            population = next;
            fitness = self.evaluate(&population);
            generations_run = generation + 1;

            let (gen_best_idx, gen_best) = argmax(&fitness);
            if gen_best > best_fitness + opts.patience_threshold {
                patience_counter = 0;
            } else {
                patience_counter += 1;
            }
            if gen_best > best_fitness {
                best_fitness = gen_best;
                best_idx = gen_best_idx;
                best = population[best_idx].clone();
                debug!(generation, best_fitness, "new incumbent");
            }

            if !callback.on_generation(generation, best_fitness, start.elapsed()) {
                cancelled = true;
                break;
            }
            if patience_counter >= opts.patience {
                debug!(generation, "fitness plateau, stopping early");
                break;
            }
        }

        info!(
            best_fitness,
            generations_run,
            cancelled,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "round finished"
        );
        Ok(OptimizationResult { best_fitness, best, population, generations_run, cancelled })
    }

    fn evaluate(&self, population: &[Genome]) -> Vec<f32> {
        population
            .par_iter()
            .map(|g| self.scorer.score(g))
            .collect()
    }

    fn tournament(&self, population: &[Genome], fitness: &[f32], rng: &mut fastrand::Rng) -> usize {
        let mut winner = rng.usize(0..population.len());
        for _ in 1..self.options.tournament_size {
            let challenger = rng.usize(0..population.len());
            if fitness[challenger] > fitness[winner] {
                winner = challenger;
            }
        }
        winner
    }
}

fn argmax(fitness: &[f32]) -> (usize, f32) {
    let mut idx = 0;
    let mut best = f32::NEG_INFINITY;
    for (i, &f) in fitness.iter().enumerate() {
        if f > best {
            best = f;
            idx = i;
        }
    }
    (idx, best)
}
