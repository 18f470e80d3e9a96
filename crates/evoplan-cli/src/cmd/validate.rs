use crate::reports;
use clap::Args;
use evoplan_core::feasibility::validate_schedule;
use evoplan_core::model::{Assignment, Meeting};
use evoplan_core::scorer::Scorer;
use evoplan_core::{EvoError, EvoResult, Problem};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Problem file (JSON).
    #[arg(long, short)]
    pub input: PathBuf,

    /// Schedule file (JSON meetings, as written by `solve`).
    #[arg(long, short)]
    pub schedule: PathBuf,
}

/// Reassembles the assignment vector from a meetings file. Every instance
/// must appear exactly once.
fn assignments_from_meetings(problem: &Problem, meetings: &[Meeting]) -> EvoResult<Vec<Assignment>> {
    let mut assignments: Vec<Option<Assignment>> = vec![None; problem.instances.len()];
    for m in meetings {
        let slot = assignments.get_mut(m.instance).ok_or_else(|| {
            EvoError::Validation(format!("meeting references unknown instance {}", m.instance))
        })?;
        if slot.is_some() {
            return Err(EvoError::Validation(format!(
                "instance {} appears more than once",
                m.instance
            )));
        }
        *slot = Some(Assignment {
            day: m.day,
            start_slot: m.start_slot,
            room: m.room,
            host: m.host,
        });
    }
    assignments
        .into_iter()
        .enumerate()
        .map(|(i, a)| {
            a.ok_or_else(|| EvoError::Validation(format!("instance {i} has no meeting")))
        })
        .collect()
}

pub fn run(args: ValidateArgs) -> EvoResult<()> {
    let problem = Problem::from_file(&args.input)?;
    let meetings: Vec<Meeting> = serde_json::from_str(&fs::read_to_string(&args.schedule)?)?;
    let assignments = assignments_from_meetings(&problem, &meetings)?;

    let violations = validate_schedule(&problem, &assignments);
    if !violations.is_empty() {
        println!("{}", reports::violations_table(&violations));
        return Err(EvoError::Validation(format!(
            "schedule has {} hard-constraint violations",
            violations.len()
        )));
    }

    let score = Scorer::new(Arc::new(problem.clone())).score(&assignments);
    println!("{}", reports::schedule_table(&problem, &meetings));
    println!("Schedule is feasible. Fitness: {score:.3}");
    info!(meetings = meetings.len(), score, "✅ schedule valid");
    Ok(())
}
