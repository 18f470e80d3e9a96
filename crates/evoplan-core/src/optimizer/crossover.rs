use crate::feasibility::Occupancy;
use crate::optimizer::initialization::{placement_order, random_feasible};
use crate::optimizer::Genome;
use crate::problem::Problem;

/// Uniform crossover with a repair pass. Each gene is drawn from either
/// parent; genes are then committed hardest-first against a fresh occupancy,
/// falling back to the other parent's gene and finally to a random feasible
/// reassignment. Returns None when repair fails, in which case the caller
/// discards the child.
pub fn crossover_uniform(
    problem: &Problem,
    p1: &Genome,
    p2: &Genome,
    rng: &mut fastrand::Rng,
) -> Option<Genome> {
    debug_assert_eq!(p1.len(), p2.len());
    let mut child = p1.clone();
    let mut occ = Occupancy::new(problem);

    for &i in &placement_order(problem) {
        let (primary, secondary) = if rng.bool() { (p1[i], p2[i]) } else { (p2[i], p1[i]) };
        let a = if occ.can_place(problem, i, &primary) {
            primary
        } else if occ.can_place(problem, i, &secondary) {
            secondary
        } else {
            random_feasible(problem, &occ, i, rng)?
        };
        occ.place(problem, i, &a);
        child[i] = a;
    }
    Some(child)
}
