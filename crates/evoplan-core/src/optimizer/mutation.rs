use crate::feasibility::Occupancy;
use crate::optimizer::initialization::random_feasible;
use crate::optimizer::Genome;
use crate::problem::Problem;

/// Mutates one individual in place: removes a random instance and reinserts
/// it at a random feasible placement. Re-validated against the rest of the
/// genome, so a feasible input stays feasible. Returns whether the genome
/// changed.
pub fn mutate(problem: &Problem, genome: &mut Genome, rng: &mut fastrand::Rng) -> bool {
    if genome.is_empty() {
        return false;
    }
    let target = rng.usize(0..genome.len());

    let mut occ = Occupancy::new(problem);
    for (i, a) in genome.iter().enumerate() {
        occ.place(problem, i, a);
    }
    occ.remove(problem, target, &genome[target]);
    match random_feasible(problem, &occ, target, rng) {
        Some(a) if a != genome[target] => {
            genome[target] = a;
            true
        }
        _ => false,
    }
}
