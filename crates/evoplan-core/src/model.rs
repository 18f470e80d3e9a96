use crate::error::{EvoError, EvoResult};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Scheduling always targets the five-weekday grid; cycle length only
/// affects how often the resulting plan repeats.
pub const WORK_DAYS: usize = 5;

/// Atomic time unit, in minutes.
pub const SLOT_MINUTES: u32 = 15;

pub const DAY_NAMES: [&str; WORK_DAYS] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CycleType {
    #[default]
    Weekly,
    Biweekly,
    Monthly,
}

impl CycleType {
    /// Cycle length in calendar days (7 / 14 / 28).
    pub fn days_in_cycle(self) -> u32 {
        match self {
            Self::Weekly => 7,
            Self::Biweekly => 14,
            Self::Monthly => 28,
        }
    }
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Draft,
    Optimizing,
    Active,
    Completed,
    Failed,
    Cancelled,
    Archived,
}

impl PlanStatus {
    /// Whether preference edits are accepted in this state. Edits submitted
    /// while `optimizing` take effect from the next round (the running round
    /// keeps its snapshot).
    pub fn accepts_preferences(self) -> bool {
        matches!(self, Self::Draft | Self::Active | Self::Optimizing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled | Self::Archived)
    }
}

/// The recruitment's working-time grid: `WORK_DAYS` days of `slots_per_day`
/// 15-minute slots each. Global slot indices run day-major.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeGrid {
    pub slots_per_day: usize,
    /// Wall-clock minute-of-day at which slot 0 begins (for display).
    pub day_start_minutes: u32,
}

impl TimeGrid {
    pub fn new(slots_per_day: usize) -> Self {
        Self {
            slots_per_day,
            day_start_minutes: 8 * 60,
        }
    }

    /// Builds a grid from the recruitment's wall-clock day bounds.
    pub fn from_day_bounds(start_minutes: u32, end_minutes: u32) -> EvoResult<Self> {
        if end_minutes <= start_minutes {
            return Err(EvoError::Validation(format!(
                "day_end_time ({end_minutes} min) must be after day_start_time ({start_minutes} min)"
            )));
        }
        let span = end_minutes - start_minutes;
        if span % SLOT_MINUTES != 0 {
            return Err(EvoError::Validation(format!(
                "working day span of {span} minutes is not a multiple of {SLOT_MINUTES}"
            )));
        }
        Ok(Self {
            slots_per_day: (span / SLOT_MINUTES) as usize,
            day_start_minutes: start_minutes,
        })
    }

    pub fn total_slots(&self) -> usize {
        self.slots_per_day * WORK_DAYS
    }

    #[inline(always)]
    pub fn global(&self, day: usize, slot: usize) -> usize {
        day * self.slots_per_day + slot
    }

    /// Wall-clock "HH:MM" for a day-local slot index.
    pub fn slot_label(&self, slot: usize) -> String {
        let m = self.day_start_minutes + slot as u32 * SLOT_MINUTES;
        format!("{:02}:{:02}", m / 60, m % 60)
    }
}

/// Capability descriptor shared by rooms (has) and subjects (requires).
/// Tags are interned as indices into `Problem::tags`.
pub type TagIdx = usize;
pub type UserIdx = usize;
pub type GroupIdx = usize;
pub type RoomIdx = usize;
pub type SubjectIdx = usize;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    pub name: String,
    /// Admin importance multiplier, clamped to [1, 10] at problem build.
    pub weight: f32,
    /// Global slot indices at which the user cannot attend anything.
    #[serde(default)]
    pub unavailable: Vec<usize>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Group {
    pub name: String,
    pub members: Vec<UserIdx>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Room {
    pub building_name: String,
    pub room_number: String,
    pub capacity: u32,
    pub tags: Vec<TagIdx>,
    /// Global slot indices at which the room is blocked.
    #[serde(default)]
    pub unavailable: Vec<usize>,
}

impl Room {
    pub fn label(&self) -> String {
        format!("{} {}", self.building_name, self.room_number)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Subject {
    pub name: String,
    /// Maximum participants per group instance.
    pub capacity: u32,
    /// Minimum enrolled participants for a group to be instantiated.
    pub min_students: u32,
    /// Meeting length in 15-minute blocks. Exact, never stretched.
    pub duration_blocks: u32,
    /// Exclusive buffer blocks before/after, binding the same room and the
    /// same host (no adjacent booking inside the buffer).
    #[serde(default)]
    pub break_before: u32,
    #[serde(default)]
    pub break_after: u32,
    pub required_tags: Vec<TagIdx>,
    /// Eligible teaching staff.
    pub hosts: Vec<UserIdx>,
    /// Eligible participant pools.
    pub groups: Vec<GroupIdx>,
}

/// One schedulable unit: a subject taught to one specific group. Built by
/// `Problem::compile` for every eligible group that meets `min_students`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubjectInstance {
    pub subject: SubjectIdx,
    pub group: GroupIdx,
}

/// A concrete placement of one subject-instance: the optimizer's gene.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub day: usize,
    pub start_slot: usize,
    pub room: RoomIdx,
    pub host: UserIdx,
}

/// Optimizer output unit: a scheduled occurrence of a subject-instance.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Meeting {
    pub instance: usize,
    pub subject: SubjectIdx,
    pub group: GroupIdx,
    pub room: RoomIdx,
    pub host: UserIdx,
    pub day: usize,
    pub start_slot: usize,
    /// Exclusive.
    pub end_slot: usize,
}
