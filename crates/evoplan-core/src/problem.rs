use crate::error::{EvoError, EvoResult};
use crate::model::{
    CycleType, Group, Room, Subject, SubjectInstance, TimeGrid, User, RoomIdx, SubjectIdx,
};
use crate::preferences::{clamp_user_weight, PreferenceRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A fully validated optimization problem: one recruitment's entities plus
/// the preference snapshot taken at round start. Built through
/// [`Problem::compile`]; the optimizer assumes all indices are in range.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Problem {
    pub name: String,
    pub grid: TimeGrid,
    #[serde(default)]
    pub cycle: CycleType,
    pub tags: Vec<String>,
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub rooms: Vec<Room>,
    pub subjects: Vec<Subject>,

    /// Schedulable units, one per (subject, eligible group) pair that meets
    /// `min_students`. Filled by `compile`; empty in a raw deserialized file.
    #[serde(default)]
    pub instances: Vec<SubjectInstance>,

    /// One record per user, same indexing as `users`. Users who never
    /// submitted get a default (empty) record.
    #[serde(default)]
    pub preferences: Vec<PreferenceRecord>,
}

impl Problem {
    pub fn from_file<P: AsRef<Path>>(path: P) -> EvoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut problem: Problem = serde_json::from_str(&content)?;
        problem.compile()?;
        Ok(problem)
    }

    /// Validates cross-references, clamps user weights, pads the preference
    /// table and instantiates (subject, group) units. Must run before any
    /// scoring or search.
    pub fn compile(&mut self) -> EvoResult<()> {
        let spd = self.grid.slots_per_day;
        if spd == 0 {
            return Err(EvoError::Validation("grid has zero slots per day".into()));
        }

        for user in &mut self.users {
            user.weight = clamp_user_weight(user.weight);
            if let Some(&s) = user.unavailable.iter().find(|&&s| s >= self.grid.total_slots()) {
                return Err(EvoError::Validation(format!(
                    "user '{}' unavailability slot {s} out of range",
                    user.name
                )));
            }
        }
        for group in &self.groups {
            if let Some(&m) = group.members.iter().find(|&&m| m >= self.users.len()) {
                return Err(EvoError::Validation(format!(
                    "group '{}' references unknown user {m}",
                    group.name
                )));
            }
        }
        for room in &self.rooms {
            if let Some(&t) = room.tags.iter().find(|&&t| t >= self.tags.len()) {
                return Err(EvoError::Validation(format!(
                    "room '{}' references unknown tag {t}",
                    room.label()
                )));
            }
            if let Some(&s) = room.unavailable.iter().find(|&&s| s >= self.grid.total_slots()) {
                return Err(EvoError::Validation(format!(
                    "room '{}' unavailability slot {s} out of range",
                    room.label()
                )));
            }
        }

        self.instances.clear();
        for (si, subject) in self.subjects.iter().enumerate() {
            if subject.duration_blocks == 0 {
                return Err(EvoError::Validation(format!(
                    "subject '{}' has zero duration",
                    subject.name
                )));
            }
            if subject.duration_blocks as usize > spd {
                return Err(EvoError::Validation(format!(
                    "subject '{}' is {} blocks long but a day only has {spd} slots",
                    subject.name, subject.duration_blocks
                )));
            }
            if let Some(&t) = subject.required_tags.iter().find(|&&t| t >= self.tags.len()) {
                return Err(EvoError::Validation(format!(
                    "subject '{}' requires unknown tag {t}",
                    subject.name
                )));
            }
            if subject.hosts.is_empty() {
                return Err(EvoError::Validation(format!(
                    "subject '{}' has no eligible hosts",
                    subject.name
                )));
            }
            if let Some(&h) = subject.hosts.iter().find(|&&h| h >= self.users.len()) {
                return Err(EvoError::Validation(format!(
                    "subject '{}' references unknown host {h}",
                    subject.name
                )));
            }
            if let Some(&g) = subject.groups.iter().find(|&&g| g >= self.groups.len()) {
                return Err(EvoError::Validation(format!(
                    "subject '{}' references unknown group {g}",
                    subject.name
                )));
            }

            let mut any = false;
            for &gi in &subject.groups {
                let enrolled = self.groups[gi].members.len() as u32;
                if enrolled < subject.min_students {
                    continue;
                }
                self.instances.push(SubjectInstance { subject: si, group: gi });
                any = true;
            }
            if !any {
                return Err(EvoError::Infeasible(format!(
                    "subject '{}' has no group meeting min_students = {}",
                    subject.name, subject.min_students
                )));
            }

            if self.rooms_for(si).is_empty() {
                return Err(EvoError::Infeasible(format!(
                    "no room satisfies capacity and tags for subject '{}'",
                    subject.name
                )));
            }
        }

        match self.preferences.len() {
            0 => self.preferences = vec![PreferenceRecord::default(); self.users.len()],
            n if n == self.users.len() => {}
            n => {
                return Err(EvoError::Validation(format!(
                    "preference table has {n} records for {} users",
                    self.users.len()
                )))
            }
        }
        Ok(())
    }

    /// Rooms whose capacity and tag set admit this subject.
    pub fn rooms_for(&self, subject: SubjectIdx) -> Vec<RoomIdx> {
        let s = &self.subjects[subject];
        self.rooms
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.capacity >= s.capacity && s.required_tags.iter().all(|t| r.tags.contains(t))
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Upper bound on distinct legal placements for one instance, used to
    /// order construction hardest-first. Ignores occupancy, so it is a pure
    /// function of the static problem.
    pub fn placement_domain_size(&self, instance: usize) -> usize {
        let inst = self.instances[instance];
        let subject = &self.subjects[inst.subject];
        let dur = subject.duration_blocks as usize;
        let starts_per_day = self.grid.slots_per_day.saturating_sub(dur) + 1;
        self.rooms_for(inst.subject).len()
            * subject.hosts.len()
            * crate::model::WORK_DAYS
            * starts_per_day
    }

    /// The occupancy range an assignment of this subject blocks, with the
    /// exclusive break buffers folded in and clipped to the day.
    pub fn occupied_range(&self, subject: SubjectIdx, start_slot: usize) -> (usize, usize) {
        let s = &self.subjects[subject];
        let from = start_slot.saturating_sub(s.break_before as usize);
        let to = (start_slot + (s.duration_blocks + s.break_after) as usize)
            .min(self.grid.slots_per_day);
        (from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, Room, Subject, User};

    fn user(name: &str) -> User {
        User { name: name.into(), weight: 1.0, unavailable: vec![] }
    }

    fn base_problem() -> Problem {
        Problem {
            name: "test".into(),
            grid: TimeGrid::new(8),
            cycle: CycleType::Weekly,
            tags: vec!["projector".into()],
            users: vec![user("host"), user("a"), user("b")],
            groups: vec![Group { name: "g1".into(), members: vec![1, 2] }],
            rooms: vec![Room {
                building_name: "B1".into(),
                room_number: "101".into(),
                capacity: 10,
                tags: vec![0],
                unavailable: vec![],
            }],
            subjects: vec![Subject {
                name: "intro".into(),
                capacity: 5,
                min_students: 2,
                duration_blocks: 2,
                break_before: 0,
                break_after: 0,
                required_tags: vec![0],
                hosts: vec![0],
                groups: vec![0],
            }],
            instances: vec![],
            preferences: vec![],
        }
    }

    #[test]
    fn compile_builds_instances_and_pads_preferences() {
        let mut p = base_problem();
        p.compile().unwrap();
        assert_eq!(p.instances, vec![SubjectInstance { subject: 0, group: 0 }]);
        assert_eq!(p.preferences.len(), 3);
    }

    #[test]
    fn min_students_gates_instantiation() {
        let mut p = base_problem();
        p.subjects[0].min_students = 5;
        let err = p.compile().unwrap_err();
        assert!(matches!(err, EvoError::Infeasible(_)), "got {err:?}");
    }

    #[test]
    fn missing_tag_makes_subject_roomless() {
        let mut p = base_problem();
        p.rooms[0].tags.clear();
        let err = p.compile().unwrap_err();
        assert!(matches!(err, EvoError::Infeasible(_)));
    }

    #[test]
    fn undersized_room_is_filtered() {
        let mut p = base_problem();
        p.rooms[0].capacity = 3;
        assert!(matches!(p.compile().unwrap_err(), EvoError::Infeasible(_)));
    }

    #[test]
    fn dangling_group_member_rejected() {
        let mut p = base_problem();
        p.groups[0].members.push(99);
        assert!(matches!(p.compile().unwrap_err(), EvoError::Validation(_)));
    }

    #[test]
    fn user_weight_is_clamped_at_compile() {
        let mut p = base_problem();
        p.users[1].weight = 500.0;
        p.compile().unwrap();
        assert_eq!(p.users[1].weight, 10.0);
    }

    #[test]
    fn occupied_range_folds_breaks_and_clips() {
        let mut p = base_problem();
        p.subjects[0].break_before = 1;
        p.subjects[0].break_after = 2;
        p.compile().unwrap();
        assert_eq!(p.occupied_range(0, 3), (2, 7));
        assert_eq!(p.occupied_range(0, 0), (0, 4));
        assert_eq!(p.occupied_range(0, 6), (5, 8));
    }
}
