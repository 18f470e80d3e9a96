use crate::model::{Assignment, WORK_DAYS};
use crate::problem::Problem;
use itertools::Itertools;
use thiserror::Error;

/// A hard-constraint breach found while validating a full schedule. These are
/// diagnostics for operators; the search itself never emits violating
/// schedules, it rejects candidates through [`Occupancy::can_place`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("instance {instance}: placement outside the grid")]
    OutOfGrid { instance: usize },

    #[error("instance {instance}: room not eligible (capacity or tags)")]
    RoomIneligible { instance: usize },

    #[error("instance {instance}: host not eligible for the subject")]
    HostIneligible { instance: usize },

    #[error("instances {first} and {second}: room conflict (incl. break buffers)")]
    RoomConflict { first: usize, second: usize },

    #[error("instances {first} and {second}: host conflict (incl. break buffers)")]
    HostConflict { first: usize, second: usize },

    #[error("instances {first} and {second}: group double-booked")]
    GroupConflict { first: usize, second: usize },

    #[error("instance {instance}: placed on an unavailable slot")]
    Unavailable { instance: usize },
}

/// Mutable occupancy state over the weekly grid, pre-seeded with declared
/// room and user unavailability. Break buffers extend room and host
/// occupancy; group occupancy covers only the meeting slots themselves.
#[derive(Clone, Debug)]
pub struct Occupancy {
    rooms: Vec<Vec<bool>>,
    users: Vec<Vec<bool>>,
    groups: Vec<Vec<bool>>,
}

impl Occupancy {
    pub fn new(problem: &Problem) -> Self {
        let n = problem.grid.total_slots();
        let mut rooms = vec![vec![false; n]; problem.rooms.len()];
        let mut users = vec![vec![false; n]; problem.users.len()];
        let mut groups = vec![vec![false; n]; problem.groups.len()];

        for (ri, room) in problem.rooms.iter().enumerate() {
            for &s in &room.unavailable {
                rooms[ri][s] = true;
            }
        }
        for (ui, user) in problem.users.iter().enumerate() {
            for &s in &user.unavailable {
                users[ui][s] = true;
            }
        }
        // A group cannot meet while any member is away.
        for (gi, group) in problem.groups.iter().enumerate() {
            for &m in &group.members {
                for &s in &problem.users[m].unavailable {
                    groups[gi][s] = true;
                }
            }
        }
        Self { rooms, users, groups }
    }

    fn ranges(
        problem: &Problem,
        instance: usize,
        a: &Assignment,
    ) -> Option<(std::ops::Range<usize>, std::ops::Range<usize>)> {
        let inst = problem.instances[instance];
        let subject = &problem.subjects[inst.subject];
        let dur = subject.duration_blocks as usize;
        let spd = problem.grid.slots_per_day;
        if a.day >= WORK_DAYS || a.start_slot + dur > spd {
            return None;
        }
        let base = a.day * spd;
        let meeting = base + a.start_slot..base + a.start_slot + dur;
        let (from, to) = problem.occupied_range(inst.subject, a.start_slot);
        Some((meeting, base + from..base + to))
    }

    /// Whether this placement is legal against the current partial state.
    /// Checks eligibility and every double-booking rule in one pass.
    pub fn can_place(&self, problem: &Problem, instance: usize, a: &Assignment) -> bool {
        let inst = problem.instances[instance];
        let subject = &problem.subjects[inst.subject];
        let Some((meeting, buffered)) = Self::ranges(problem, instance, a) else {
            return false;
        };
        if !subject.hosts.contains(&a.host) {
            return false;
        }
        let room = match problem.rooms.get(a.room) {
            Some(r) => r,
            None => return false,
        };
        if room.capacity < subject.capacity
            || !subject.required_tags.iter().all(|t| room.tags.contains(t))
        {
            return false;
        }
        for s in buffered {
            if self.rooms[a.room][s] || self.users[a.host][s] {
                return false;
            }
        }
        for s in meeting {
            if self.groups[inst.group][s] {
                return false;
            }
        }
        true
    }

    /// Marks a placement. Caller guarantees `can_place` held.
    pub fn place(&mut self, problem: &Problem, instance: usize, a: &Assignment) {
        let inst = problem.instances[instance];
        let Some((meeting, buffered)) = Self::ranges(problem, instance, a) else {
            debug_assert!(false, "place called with out-of-grid assignment");
            return;
        };
        for s in buffered {
            self.rooms[a.room][s] = true;
            self.users[a.host][s] = true;
        }
        for s in meeting {
            self.groups[inst.group][s] = true;
        }
    }

    pub fn remove(&mut self, problem: &Problem, instance: usize, a: &Assignment) {
        let inst = problem.instances[instance];
        let Some((meeting, buffered)) = Self::ranges(problem, instance, a) else {
            return;
        };
        for s in buffered {
            self.rooms[a.room][s] = false;
            self.users[a.host][s] = false;
        }
        for s in meeting {
            self.groups[inst.group][s] = false;
        }
        // Re-mark the static unavailability the removal may have cleared.
        for &s in &problem.rooms[a.room].unavailable {
            self.rooms[a.room][s] = true;
        }
        for &s in &problem.users[a.host].unavailable {
            self.users[a.host][s] = true;
        }
        for &m in &problem.groups[inst.group].members {
            for &s in &problem.users[m].unavailable {
                self.groups[inst.group][s] = true;
            }
        }
    }
}

/// Validates a complete schedule (one assignment per instance) and reports
/// every breach. An empty result means the schedule is feasible.
pub fn validate_schedule(problem: &Problem, assignments: &[Assignment]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let spd = problem.grid.slots_per_day;

    for (i, a) in assignments.iter().enumerate() {
        let inst = problem.instances[i];
        let subject = &problem.subjects[inst.subject];
        let dur = subject.duration_blocks as usize;
        if a.day >= WORK_DAYS || a.start_slot + dur > spd {
            violations.push(Violation::OutOfGrid { instance: i });
            continue;
        }
        if !subject.hosts.contains(&a.host) {
            violations.push(Violation::HostIneligible { instance: i });
        }
        match problem.rooms.get(a.room) {
            Some(room)
                if room.capacity >= subject.capacity
                    && subject.required_tags.iter().all(|t| room.tags.contains(t)) => {}
            _ => violations.push(Violation::RoomIneligible { instance: i }),
        }

        let base = a.day * spd;
        let (from, to) = problem.occupied_range(inst.subject, a.start_slot);
        let blocked = |slots: &[usize], lo: usize, hi: usize| {
            slots.iter().any(|&s| s >= base + lo && s < base + hi)
        };
        if problem
            .rooms
            .get(a.room)
            .is_some_and(|r| blocked(&r.unavailable, from, to))
            || problem
                .users
                .get(a.host)
                .is_some_and(|u| blocked(&u.unavailable, from, to))
            || problem.groups[inst.group].members.iter().any(|&m| {
                blocked(&problem.users[m].unavailable, a.start_slot, a.start_slot + dur)
            })
        {
            violations.push(Violation::Unavailable { instance: i });
        }
    }

    for (i, j) in (0..assignments.len()).tuple_combinations() {
        let (a, b) = (&assignments[i], &assignments[j]);
        let (ia, ib) = (problem.instances[i], problem.instances[j]);
        let (sa, sb) = (&problem.subjects[ia.subject], &problem.subjects[ib.subject]);
        if a.day != b.day {
            continue;
        }
        let da = sa.duration_blocks as usize;
        let db = sb.duration_blocks as usize;
        if a.start_slot + da > spd || b.start_slot + db > spd {
            continue; // already reported as OutOfGrid
        }
        let (ba_from, ba_to) = problem.occupied_range(ia.subject, a.start_slot);
        let (bb_from, bb_to) = problem.occupied_range(ib.subject, b.start_slot);
        let buffered_overlap = ba_from < bb_to && bb_from < ba_to;
        let meeting_overlap = a.start_slot < b.start_slot + db && b.start_slot < a.start_slot + da;

        if a.room == b.room && buffered_overlap {
            violations.push(Violation::RoomConflict { first: i, second: j });
        }
        if a.host == b.host && buffered_overlap {
            violations.push(Violation::HostConflict { first: i, second: j });
        }
        if ia.group == ib.group && meeting_overlap {
            violations.push(Violation::GroupConflict { first: i, second: j });
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, Room, Subject, TimeGrid, User};
    use rstest::rstest;

    fn two_instance_problem() -> Problem {
        let mut p = Problem {
            name: "t".into(),
            grid: TimeGrid::new(8),
            cycle: Default::default(),
            tags: vec![],
            users: vec![
                User { name: "h1".into(), weight: 1.0, unavailable: vec![] },
                User { name: "h2".into(), weight: 1.0, unavailable: vec![] },
                User { name: "s".into(), weight: 1.0, unavailable: vec![] },
            ],
            groups: vec![
                Group { name: "g1".into(), members: vec![2] },
                Group { name: "g2".into(), members: vec![2] },
            ],
            rooms: vec![
                Room {
                    building_name: "B".into(),
                    room_number: "1".into(),
                    capacity: 10,
                    tags: vec![],
                    unavailable: vec![],
                },
                Room {
                    building_name: "B".into(),
                    room_number: "2".into(),
                    capacity: 10,
                    tags: vec![],
                    unavailable: vec![],
                },
            ],
            subjects: vec![Subject {
                name: "s".into(),
                capacity: 5,
                min_students: 0,
                duration_blocks: 2,
                break_before: 0,
                break_after: 0,
                required_tags: vec![],
                hosts: vec![0, 1],
                groups: vec![0, 1],
            }],
            instances: vec![],
            preferences: vec![],
        };
        p.compile().unwrap();
        assert_eq!(p.instances.len(), 2);
        p
    }

    fn a(day: usize, start_slot: usize, room: usize, host: usize) -> Assignment {
        Assignment { day, start_slot, room, host }
    }

    #[test]
    fn disjoint_placements_are_clean() {
        let p = two_instance_problem();
        let schedule = [a(0, 0, 0, 0), a(0, 4, 1, 1)];
        assert!(validate_schedule(&p, &schedule).is_empty());
    }

    #[rstest]
    #[case(a(0, 0, 0, 0), a(0, 1, 0, 1), Violation::RoomConflict { first: 0, second: 1 })]
    #[case(a(0, 0, 0, 0), a(0, 1, 1, 0), Violation::HostConflict { first: 0, second: 1 })]
    fn overlapping_resources_conflict(
        #[case] first: Assignment,
        #[case] second: Assignment,
        #[case] expected: Violation,
    ) {
        let p = two_instance_problem();
        let v = validate_schedule(&p, &[first, second]);
        assert!(v.contains(&expected), "got {v:?}");
    }

    #[test]
    fn same_group_cannot_overlap() {
        let mut p = two_instance_problem();
        // Make both instances target group 0.
        p.instances[1].group = 0;
        let v = validate_schedule(&p, &[a(0, 0, 0, 0), a(0, 1, 1, 1)]);
        assert!(v.contains(&Violation::GroupConflict { first: 0, second: 1 }));
    }

    #[test]
    fn break_buffer_blocks_adjacent_booking() {
        let mut p = two_instance_problem();
        p.subjects[0].break_after = 1;
        // First meeting occupies slots 0..2, buffer extends to 3 (exclusive).
        let v = validate_schedule(&p, &[a(0, 0, 0, 0), a(0, 2, 0, 1)]);
        assert!(v.contains(&Violation::RoomConflict { first: 0, second: 1 }));

        // One slot further clears the buffer.
        let v = validate_schedule(&p, &[a(0, 0, 0, 0), a(0, 3, 0, 1)]);
        assert!(v.is_empty(), "got {v:?}");
    }

    #[test]
    fn placements_must_fit_the_day() {
        let p = two_instance_problem();
        let v = validate_schedule(&p, &[a(0, 7, 0, 0), a(5, 0, 1, 1)]);
        assert!(v.contains(&Violation::OutOfGrid { instance: 0 }));
        assert!(v.contains(&Violation::OutOfGrid { instance: 1 }));
    }

    #[test]
    fn unavailability_acts_as_prebooked() {
        let mut p = two_instance_problem();
        p.users[0].unavailable = vec![1]; // Monday slot 1
        let v = validate_schedule(&p, &[a(0, 0, 0, 0), a(0, 4, 1, 1)]);
        assert!(v.contains(&Violation::Unavailable { instance: 0 }));

        let occ = Occupancy::new(&p);
        assert!(!occ.can_place(&p, 0, &a(0, 0, 0, 0)));
        assert!(occ.can_place(&p, 0, &a(0, 2, 0, 0)));
    }

    #[test]
    fn place_and_remove_round_trip() {
        let p = two_instance_problem();
        let mut occ = Occupancy::new(&p);
        let first = a(0, 0, 0, 0);
        assert!(occ.can_place(&p, 0, &first));
        occ.place(&p, 0, &first);
        assert!(!occ.can_place(&p, 1, &a(0, 1, 0, 1)));
        occ.remove(&p, 0, &first);
        assert!(occ.can_place(&p, 1, &a(0, 1, 0, 1)));
    }

    #[test]
    fn removal_keeps_static_unavailability() {
        let mut p = two_instance_problem();
        p.rooms[0].unavailable = vec![0];
        let mut occ = Occupancy::new(&p);
        let placed = a(0, 2, 0, 0);
        occ.place(&p, 0, &placed);
        occ.remove(&p, 0, &placed);
        assert!(!occ.can_place(&p, 0, &a(0, 0, 0, 0)));
    }
}
