mod common;

use evoplan_core::config::SearchParams;
use evoplan_core::error::EvoError;
use evoplan_core::feasibility::validate_schedule;
use evoplan_core::optimizer::runner::NullProgress;
use evoplan_core::optimizer::{OptimizationOptions, Optimizer};
use evoplan_core::scorer::Scorer;
use std::sync::Arc;

fn options() -> OptimizationOptions {
    let mut params = SearchParams::default();
    params.population_size = 32;
    params.generations = 120;
    params.patience = 40;
    OptimizationOptions::from(&params)
}

#[test]
fn unique_optimum_gets_placed() {
    let mut p = common::single_meeting_problem();
    // The student loves Monday 09:00-09:30 (slots 4 and 5) and dislikes
    // everything else, so exactly one placement is optimal.
    let mut weights = vec![-1.0f32; p.grid.total_slots()];
    weights[4] = 5.0;
    weights[5] = 5.0;
    p.preferences[1].slot_weights = weights;

    let scorer = Arc::new(Scorer::new(Arc::new(p.clone())));
    let result = Optimizer::new(scorer, options())
        .run(Some(11), &NullProgress)
        .unwrap();

    assert!(validate_schedule(&p, &result.best).is_empty());
    let a = result.best[0];
    assert_eq!((a.day, a.start_slot), (0, 4));
    assert_eq!(result.best_fitness, 10.0);
}

#[test]
fn shared_room_schedules_never_overlap() {
    let mut p = common::shared_room_problem();
    // Everyone wants the very first slot; feasibility must win over the tie.
    for pref in p.preferences.iter_mut() {
        let mut weights = vec![0.0f32; 40];
        weights[0] = 5.0;
        weights[1] = 5.0;
        pref.slot_weights = weights;
    }

    let scorer = Arc::new(Scorer::new(Arc::new(p.clone())));
    let result = Optimizer::new(scorer, options())
        .run(Some(3), &NullProgress)
        .unwrap();

    assert!(validate_schedule(&p, &result.best).is_empty());
    assert_eq!(result.best.len(), 2);
}

#[test]
fn fixed_seed_reproduces_the_best_fitness() {
    let mut p = common::single_meeting_problem();
    p.preferences[1].slot_weights =
        (0..40).map(|i| if i % 3 == 0 { 2.0 } else { -1.0 }).collect();
    let problem = Arc::new(p);

    let run = |seed| {
        let scorer = Arc::new(Scorer::new(problem.clone()));
        Optimizer::new(scorer, options())
            .run(Some(seed), &NullProgress)
            .unwrap()
    };
    let a = run(99);
    let b = run(99);
    assert_eq!(a.best_fitness, b.best_fitness);
    assert_eq!(a.best, b.best);
    assert_eq!(a.generations_run, b.generations_run);
}

#[test]
fn round_resumes_from_previous_population() {
    let p = common::single_meeting_problem();
    let problem = Arc::new(p);
    let scorer = Arc::new(Scorer::new(problem.clone()));

    let first = Optimizer::new(scorer.clone(), options())
        .run(Some(1), &NullProgress)
        .unwrap();

    let mut opts = options();
    opts.initial_population = first.population.clone();
    let second = Optimizer::new(scorer, opts)
        .run(Some(2), &NullProgress)
        .unwrap();

    assert!(second.best_fitness >= first.best_fitness - 1e-6);
}

#[test]
fn unsatisfiable_tags_fail_at_compile() {
    let mut p = common::single_meeting_problem();
    p.tags = vec!["lab".into()];
    p.subjects[0].required_tags = vec![0];
    let err = p.compile().unwrap_err();
    assert!(matches!(err, EvoError::Infeasible(_)), "got {err:?}");
}

#[test]
fn progress_callback_can_cancel_at_a_generation_boundary() {
    struct StopAfter(usize);
    impl evoplan_core::optimizer::ProgressCallback for StopAfter {
        fn on_generation(&self, generation: usize, _: f32, _: std::time::Duration) -> bool {
            generation < self.0
        }
    }

    let p = common::single_meeting_problem();
    let scorer = Arc::new(Scorer::new(Arc::new(p)));
    let result = Optimizer::new(scorer, options())
        .run(Some(5), &StopAfter(3))
        .unwrap();
    assert!(result.cancelled);
    assert_eq!(result.generations_run, 4);
}
