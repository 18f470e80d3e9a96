use crate::error::{EvoError, EvoResult};
use crate::model::TimeGrid;
use evoplan_protocol::preferences::PreferencesData;
use serde::{Deserialize, Serialize};

pub const MIN_WEIGHT: f32 = -5.0;
pub const MAX_WEIGHT: f32 = 5.0;

/// Canonical range for the admin importance multiplier on a user.
pub const MIN_USER_WEIGHT: f32 = 1.0;
pub const MAX_USER_WEIGHT: f32 = 10.0;

/// A `[value, weight]` shape preference. `value` is a slot index or block
/// count; weight 0 makes the whole pair inert.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundPref {
    pub value: u32,
    pub weight: f32,
}

impl BoundPref {
    pub fn active(&self) -> bool {
        self.weight != 0.0
    }
}

/// A validated per-user preference record. Construction goes through
/// [`PreferenceRecord::from_wire`]; the optimizer may assume every accepted
/// record is well-formed and never re-validates at scoring time.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PreferenceRecord {
    /// One weight per slot over the full week (`grid.total_slots()` long),
    /// or empty when the user never submitted preferences.
    pub slot_weights: Vec<f32>,

    pub free_days: f32,
    pub short_days: f32,
    pub uniform_days: f32,
    pub concentrated_days: f32,

    pub min_gap: BoundPref,
    pub max_gap: BoundPref,
    pub min_day_length: BoundPref,
    pub max_day_length: BoundPref,
    pub day_start: BoundPref,
    pub day_end: BoundPref,
}

fn check_weight(name: &str, w: f32) -> EvoResult<()> {
    if !w.is_finite() || !(MIN_WEIGHT..=MAX_WEIGHT).contains(&w) {
        return Err(EvoError::Validation(format!(
            "{name} weight {w} outside [{MIN_WEIGHT}, {MAX_WEIGHT}]"
        )));
    }
    Ok(())
}

fn check_pair(name: &str, pair: [f32; 2], max_value: u32) -> EvoResult<BoundPref> {
    let [value, weight] = pair;
    check_weight(name, weight)?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(EvoError::Validation(format!(
            "{name} value {value} is not a non-negative integer"
        )));
    }
    let value = value as u32;
    // An inert pair may carry any stale value; only active pairs are range
    // checked, mirroring the client disabling the value input at weight 0.
    if weight != 0.0 && value > max_value {
        return Err(EvoError::Validation(format!(
            "{name} value {value} exceeds maximum {max_value}"
        )));
    }
    Ok(BoundPref { value, weight })
}

impl PreferenceRecord {
    /// Validates a wire payload against the recruitment grid. Rejection
    /// happens here, at ingestion; never at optimization time.
    pub fn from_wire(data: &PreferencesData, grid: &TimeGrid) -> EvoResult<Self> {
        let expected = grid.total_slots();
        if !data.preferred_timeslots.is_empty() && data.preferred_timeslots.len() != expected {
            return Err(EvoError::Validation(format!(
                "PreferredTimeslots has length {}, expected {expected} ({} slots x 5 days)",
                data.preferred_timeslots.len(),
                grid.slots_per_day
            )));
        }
        for (i, &w) in data.preferred_timeslots.iter().enumerate() {
            check_weight(&format!("PreferredTimeslots[{i}]"), w)?;
        }
        check_weight("FreeDays", data.free_days)?;
        check_weight("ShortDays", data.short_days)?;
        check_weight("UniformDays", data.uniform_days)?;
        check_weight("ConcentratedDays", data.concentrated_days)?;

        let spd = grid.slots_per_day as u32;
        Ok(Self {
            slot_weights: data.preferred_timeslots.clone(),
            free_days: data.free_days,
            short_days: data.short_days,
            uniform_days: data.uniform_days,
            concentrated_days: data.concentrated_days,
            min_gap: check_pair("MinGapsLength", data.min_gaps_length, spd)?,
            max_gap: check_pair("MaxGapsLength", data.max_gaps_length, spd)?,
            min_day_length: check_pair("MinDayLength", data.min_day_length, spd)?,
            max_day_length: check_pair("MaxDayLength", data.max_day_length, spd)?,
            day_start: check_pair("PreferredDayStartTimeslot", data.preferred_day_start_timeslot, spd.saturating_sub(1))?,
            day_end: check_pair("PreferredDayEndTimeslot", data.preferred_day_end_timeslot, spd.saturating_sub(1))?,
        })
    }

    pub fn to_wire(&self) -> PreferencesData {
        PreferencesData {
            preferred_timeslots: self.slot_weights.clone(),
            free_days: self.free_days,
            short_days: self.short_days,
            uniform_days: self.uniform_days,
            concentrated_days: self.concentrated_days,
            min_gaps_length: [self.min_gap.value as f32, self.min_gap.weight],
            max_gaps_length: [self.max_gap.value as f32, self.max_gap.weight],
            min_day_length: [self.min_day_length.value as f32, self.min_day_length.weight],
            max_day_length: [self.max_day_length.value as f32, self.max_day_length.weight],
            preferred_day_start_timeslot: [self.day_start.value as f32, self.day_start.weight],
            preferred_day_end_timeslot: [self.day_end.value as f32, self.day_end.weight],
            tag_order: None,
            preferred_groups: None,
        }
    }

    #[inline(always)]
    pub fn slot_weight(&self, global_slot: usize) -> f32 {
        self.slot_weights.get(global_slot).copied().unwrap_or(0.0)
    }
}

/// Per-slot sum of weights across all users: the heatmap payload.
pub fn aggregate_slot_weights<'a, I>(records: I, grid: &TimeGrid) -> Vec<f32>
where
    I: IntoIterator<Item = &'a PreferenceRecord>,
{
    let mut agg = vec![0.0f32; grid.total_slots()];
    for rec in records {
        for (i, &w) in rec.slot_weights.iter().enumerate() {
            agg[i] += w;
        }
    }
    agg
}

/// Clamp the admin importance multiplier to the canonical 1-10 scale.
#[inline(always)]
pub fn clamp_user_weight(w: f32) -> f32 {
    if !w.is_finite() {
        return MIN_USER_WEIGHT;
    }
    w.clamp(MIN_USER_WEIGHT, MAX_USER_WEIGHT)
}
