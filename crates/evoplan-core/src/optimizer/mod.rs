pub mod crossover;
pub mod initialization;
pub mod mutation;
pub mod runner;

pub use runner::{OptimizationOptions, OptimizationResult, Optimizer, ProgressCallback};

use crate::model::{Assignment, Meeting};
use crate::problem::Problem;

/// One individual: a complete vector of assignments, index-aligned with
/// `Problem::instances`.
pub type Genome = Vec<Assignment>;

/// Expands a genome into presentable meetings.
pub fn decode(problem: &Problem, genome: &Genome) -> Vec<Meeting> {
    genome
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let inst = problem.instances[i];
            let dur = problem.subjects[inst.subject].duration_blocks as usize;
            Meeting {
                instance: i,
                subject: inst.subject,
                group: inst.group,
                room: a.room,
                host: a.host,
                day: a.day,
                start_slot: a.start_slot,
                end_slot: a.start_slot + dur,
            }
        })
        .collect()
}
