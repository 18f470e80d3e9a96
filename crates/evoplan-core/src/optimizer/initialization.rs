use crate::error::{EvoError, EvoResult};
use crate::feasibility::Occupancy;
use crate::model::{Assignment, WORK_DAYS};
use crate::optimizer::Genome;
use crate::problem::Problem;

/// How many random samples to try per instance before falling back to an
/// exhaustive scan of its placement domain.
const RANDOM_PROBES: usize = 64;

/// Instances ordered hardest-to-place first (smallest static placement
/// domain), index as tiebreak so the order is stable.
pub fn placement_order(problem: &Problem) -> Vec<usize> {
    let mut order: Vec<usize> = (0..problem.instances.len()).collect();
    order.sort_by_key(|&i| (problem.placement_domain_size(i), i));
    order
}

/// Picks a feasible assignment for one instance against the current
/// occupancy, or None if its domain is exhausted. Random probing first,
/// full scan as a last resort so near-full grids still resolve.
pub fn random_feasible(
    problem: &Problem,
    occ: &Occupancy,
    instance: usize,
    rng: &mut fastrand::Rng,
) -> Option<Assignment> {
    let inst = problem.instances[instance];
    let subject = &problem.subjects[inst.subject];
    let rooms = problem.rooms_for(inst.subject);
    if rooms.is_empty() {
        return None;
    }
    let dur = subject.duration_blocks as usize;
    let max_start = problem.grid.slots_per_day.checked_sub(dur)?;

    for _ in 0..RANDOM_PROBES {
        let a = Assignment {
            day: rng.usize(0..WORK_DAYS),
            start_slot: rng.usize(0..=max_start),
            room: rooms[rng.usize(0..rooms.len())],
            host: subject.hosts[rng.usize(0..subject.hosts.len())],
        };
        if occ.can_place(problem, instance, &a) {
            return Some(a);
        }
    }

    let mut candidates = Vec::new();
    for &room in &rooms {
        for &host in &subject.hosts {
            for day in 0..WORK_DAYS {
                for start_slot in 0..=max_start {
                    let a = Assignment { day, start_slot, room, host };
                    if occ.can_place(problem, instance, &a) {
                        candidates.push(a);
                    }
                }
            }
        }
    }
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.usize(0..candidates.len())])
    }
}

/// Builds one feasible individual constructively, hardest instances first.
pub fn seed_individual(problem: &Problem, rng: &mut fastrand::Rng) -> Option<Genome> {
    let mut occ = Occupancy::new(problem);
    let mut genome = vec![
        Assignment { day: 0, start_slot: 0, room: 0, host: 0 };
        problem.instances.len()
    ];
    for &i in &placement_order(problem) {
        let a = random_feasible(problem, &occ, i, rng)?;
        occ.place(problem, i, &a);
        genome[i] = a;
    }
    Some(genome)
}

/// Builds a feasible starting population. Fails with `Infeasible` when not
/// even one individual could be constructed within the attempt budget; the
/// caller must surface that as a failed job, never a partial schedule.
pub fn seed_population(
    problem: &Problem,
    size: usize,
    max_attempts: usize,
    rng: &mut fastrand::Rng,
) -> EvoResult<Vec<Genome>> {
    let mut population = Vec::with_capacity(size);
    let mut attempts = 0usize;
    while population.len() < size && attempts < max_attempts {
        attempts += 1;
        if let Some(genome) = seed_individual(problem, rng) {
            population.push(genome);
        }
    }
    if population.is_empty() {
        return Err(EvoError::Infeasible(format!(
            "no feasible schedule found in {max_attempts} construction attempts"
        )));
    }
    // Short population is fine; duplicates of the survivors fill the gap.
    let mut i = 0;
    while population.len() < size {
        population.push(population[i % population.len()].clone());
        i += 1;
    }
    Ok(population)
}
