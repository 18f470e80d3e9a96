pub mod shape;

use crate::model::Assignment;
use crate::problem::Problem;
use shape::WeekShape;
use std::sync::Arc;

/// Pure fitness function over candidate schedules. Precomputes per-user
/// membership so the per-candidate cost is one pass over the assignments
/// plus one pass over the users.
pub struct Scorer {
    problem: Arc<Problem>,
    /// Group members per instance, flattened once. Host attendance depends
    /// on the candidate and is resolved at scoring time.
    attendees: Vec<Vec<usize>>,
    /// Meeting length per instance, in slots.
    durations: Vec<usize>,
}

impl Scorer {
    pub fn new(problem: Arc<Problem>) -> Self {
        let attendees = problem
            .instances
            .iter()
            .map(|inst| problem.groups[inst.group].members.clone())
            .collect();
        let durations = problem
            .instances
            .iter()
            .map(|inst| problem.subjects[inst.subject].duration_blocks as usize)
            .collect();
        Self { problem, attendees, durations }
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Total weighted utility of a candidate. Identical inputs always yield
    /// the identical score; no hidden state.
    pub fn score(&self, assignments: &[Assignment]) -> f32 {
        self.user_scores(assignments).iter().sum()
    }

    /// Per-user weighted utility, same indexing as `problem.users`.
    pub fn user_scores(&self, assignments: &[Assignment]) -> Vec<f32> {
        let shapes = self.attendance_shapes(assignments);
        self.problem
            .users
            .iter()
            .enumerate()
            .map(|(u, user)| user.weight * self.raw_user_score(u, &shapes[u]))
            .collect()
    }

    fn attendance_shapes(&self, assignments: &[Assignment]) -> Vec<WeekShape> {
        let spd = self.problem.grid.slots_per_day;
        let mut shapes = vec![WeekShape::new(spd); self.problem.users.len()];
        for (i, a) in assignments.iter().enumerate() {
            for slot in a.start_slot..a.start_slot + self.durations[i] {
                shapes[a.host].mark(a.day, slot);
                for &m in &self.attendees[i] {
                    shapes[m].mark(a.day, slot);
                }
            }
        }
        shapes
    }

    fn raw_user_score(&self, user: usize, week: &WeekShape) -> f32 {
        let pref = &self.problem.preferences[user];
        let spd = self.problem.grid.slots_per_day;

        let mut total = 0.0f32;
        for day in 0..crate::model::WORK_DAYS {
            let mut mask = week.masks[day];
            while mask != 0 {
                let slot = mask.trailing_zeros() as usize;
                total += pref.slot_weight(day * spd + slot);
                mask &= mask - 1;
            }
        }

        if pref.free_days != 0.0 {
            total += pref.free_days * shape::free_days(week);
        }
        if pref.short_days != 0.0 {
            total += pref.short_days * shape::short_days(week);
        }
        if pref.uniform_days != 0.0 {
            total += pref.uniform_days * shape::uniform_days(week);
        }
        if pref.concentrated_days != 0.0 {
            total += pref.concentrated_days * shape::concentrated_days(week);
        }
        if pref.min_gap.active() {
            total += pref.min_gap.weight * shape::min_gap_length(week, pref.min_gap.value);
        }
        if pref.max_gap.active() {
            total += pref.max_gap.weight * shape::max_gap_length(week, pref.max_gap.value);
        }
        if pref.min_day_length.active() {
            total +=
                pref.min_day_length.weight * shape::min_day_length(week, pref.min_day_length.value);
        }
        if pref.max_day_length.active() {
            total +=
                pref.max_day_length.weight * shape::max_day_length(week, pref.max_day_length.value);
        }
        if pref.day_start.active() {
            total += pref.day_start.weight * shape::day_start(week, pref.day_start.value);
        }
        if pref.day_end.active() {
            total += pref.day_end.weight * shape::day_end(week, pref.day_end.value);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, Room, Subject, TimeGrid, User};
    use crate::preferences::PreferenceRecord;

    fn problem() -> Problem {
        let mut p = Problem {
            name: "score".into(),
            grid: TimeGrid::new(8),
            cycle: Default::default(),
            tags: vec![],
            users: vec![
                User { name: "host".into(), weight: 1.0, unavailable: vec![] },
                User { name: "student".into(), weight: 2.0, unavailable: vec![] },
            ],
            groups: vec![Group { name: "g".into(), members: vec![1] }],
            rooms: vec![Room {
                building_name: "B".into(),
                room_number: "1".into(),
                capacity: 10,
                tags: vec![],
                unavailable: vec![],
            }],
            subjects: vec![Subject {
                name: "s".into(),
                capacity: 5,
                min_students: 0,
                duration_blocks: 2,
                break_before: 0,
                break_after: 0,
                required_tags: vec![],
                hosts: vec![0],
                groups: vec![0],
            }],
            instances: vec![],
            preferences: vec![],
        };
        p.compile().unwrap();
        p
    }

    fn monday_morning() -> Vec<Assignment> {
        vec![Assignment { day: 0, start_slot: 0, room: 0, host: 0 }]
    }

    #[test]
    fn default_preferences_score_zero() {
        let scorer = Scorer::new(Arc::new(problem()));
        assert_eq!(scorer.score(&monday_morning()), 0.0);
    }

    #[test]
    fn slot_weights_accumulate_over_covered_slots_and_attendees() {
        let mut p = problem();
        let mut pref = PreferenceRecord::default();
        pref.slot_weights = vec![0.0; 40];
        pref.slot_weights[0] = 3.0;
        pref.slot_weights[1] = 1.0;
        p.preferences[1] = pref; // student, admin weight 2
        let scorer = Scorer::new(Arc::new(p));
        // (3 + 1) * weight 2, host contributes nothing.
        assert_eq!(scorer.score(&monday_morning()), 8.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let mut p = problem();
        p.preferences[0].free_days = 4.0;
        p.preferences[1].slot_weights = vec![1.5; 40];
        let scorer = Scorer::new(Arc::new(p));
        let a = scorer.score(&monday_morning());
        let b = scorer.score(&monday_morning());
        assert_eq!(a, b);
    }

    #[test]
    fn raising_a_covered_slot_weight_never_lowers_the_score() {
        let mut p = problem();
        p.preferences[1].slot_weights = vec![0.0; 40];
        let base = Scorer::new(Arc::new(p.clone())).score(&monday_morning());
        p.preferences[1].slot_weights[1] = 2.0;
        let raised = Scorer::new(Arc::new(p)).score(&monday_morning());
        assert!(raised >= base);
    }

    #[test]
    fn negative_shape_weight_penalizes_satisfaction() {
        let mut p = problem();
        // Four free days out of five; dislike of free days should go negative.
        p.preferences[0].free_days = -5.0;
        let scorer = Scorer::new(Arc::new(p));
        assert!(scorer.score(&monday_morning()) < 0.0);
    }

    #[test]
    fn host_attendance_counts_toward_host_preferences() {
        let mut p = problem();
        let mut pref = PreferenceRecord::default();
        pref.slot_weights = vec![0.0; 40];
        pref.slot_weights[0] = -5.0;
        p.preferences[0] = pref;
        let scorer = Scorer::new(Arc::new(p));
        assert_eq!(scorer.score(&monday_morning()), -5.0);
    }
}
