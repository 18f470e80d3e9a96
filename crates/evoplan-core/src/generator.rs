//! Synthetic problem generator for benchmarks and manual testing.

use crate::error::EvoResult;
use crate::model::{CycleType, Group, Room, Subject, TimeGrid, User};
use crate::preferences::PreferenceRecord;
use crate::problem::Problem;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct GeneratorConfig {
    pub users: usize,
    pub groups: usize,
    pub rooms: usize,
    pub subjects: usize,
    pub slots_per_day: usize,
    pub tag_pool: usize,
    /// Fraction of users that get a randomized preference record.
    pub preference_fill: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            users: 40,
            groups: 6,
            rooms: 5,
            subjects: 8,
            slots_per_day: 32,
            tag_pool: 4,
            preference_fill: 0.7,
        }
    }
}

/// Builds a random compiled problem. Every room can hold every subject and
/// every subject requires at most one tag that some room carries, so the
/// output is feasible for reasonable sizes (it is still `compile`-checked).
pub fn generate(cfg: &GeneratorConfig, seed: u64) -> EvoResult<Problem> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let grid = TimeGrid::new(cfg.slots_per_day.max(4));

    let tags: Vec<String> = (0..cfg.tag_pool).map(|i| format!("tag-{i}")).collect();

    let users: Vec<User> = (0..cfg.users.max(2))
        .map(|i| User {
            name: format!("user-{i}"),
            weight: 1.0 + rng.f32() * 4.0,
            unavailable: vec![],
        })
        .collect();

    let groups: Vec<Group> = (0..cfg.groups.max(1))
        .map(|i| {
            let size = rng.usize(3..=8).min(users.len());
            let mut members: Vec<usize> = (0..users.len()).collect();
            rng.shuffle(&mut members);
            members.truncate(size);
            members.sort_unstable();
            Group { name: format!("group-{i}"), members }
        })
        .collect();

    let rooms: Vec<Room> = (0..cfg.rooms.max(1))
        .map(|i| Room {
            building_name: "Main".into(),
            room_number: format!("{}", 100 + i),
            capacity: 30,
            tags: (0..tags.len()).collect(),
            unavailable: vec![],
        })
        .collect();

    let subjects: Vec<Subject> = (0..cfg.subjects.max(1))
        .map(|i| {
            let host = rng.usize(0..users.len());
            Subject {
                name: format!("subject-{i}"),
                capacity: rng.u32(8..=20),
                min_students: 1,
                duration_blocks: rng.u32(1..=4),
                break_before: 0,
                break_after: if rng.bool() { 1 } else { 0 },
                required_tags: if tags.is_empty() { vec![] } else { vec![rng.usize(0..tags.len())] },
                hosts: vec![host],
                groups: vec![rng.usize(0..groups.len())],
            }
        })
        .collect();

    let preferences: Vec<PreferenceRecord> = (0..users.len())
        .map(|_| {
            if rng.f32() >= cfg.preference_fill {
                return PreferenceRecord::default();
            }
            let mut rec = PreferenceRecord::default();
            rec.slot_weights = (0..grid.total_slots())
                .map(|_| (rng.i32(-5..=5)) as f32)
                .collect();
            rec.free_days = rng.i32(-5..=5) as f32;
            rec.concentrated_days = rng.i32(0..=5) as f32;
            rec
        })
        .collect();

    let mut problem = Problem {
        name: format!("generated-{seed}"),
        grid,
        cycle: CycleType::Weekly,
        tags,
        users,
        groups,
        rooms,
        subjects,
        instances: vec![],
        preferences,
    };
    problem.compile()?;
    Ok(problem)
}
