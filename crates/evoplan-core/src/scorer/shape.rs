//! Week-shape satisfaction terms. Each term maps a user's weekly busy
//! pattern to a satisfaction in [0, 1]; the caller multiplies by the user's
//! declared weight, so sign and magnitude live entirely in the preference.

use crate::model::WORK_DAYS;

/// A user's busy pattern over the week, one bitmask per day. Supports grids
/// up to 128 slots per day (a 32-hour day at 15-minute granularity).
#[derive(Clone, Copy, Debug, Default)]
pub struct WeekShape {
    pub masks: [u128; WORK_DAYS],
    pub slots_per_day: usize,
}

impl WeekShape {
    pub fn new(slots_per_day: usize) -> Self {
        debug_assert!(slots_per_day <= 128);
        Self { masks: [0; WORK_DAYS], slots_per_day }
    }

    #[inline(always)]
    pub fn mark(&mut self, day: usize, slot: usize) {
        self.masks[day] |= 1u128 << slot;
    }

    pub fn load(&self, day: usize) -> u32 {
        self.masks[day].count_ones()
    }

    pub fn is_active(&self, day: usize) -> bool {
        self.masks[day] != 0
    }

    pub fn active_days(&self) -> usize {
        self.masks.iter().filter(|&&m| m != 0).count()
    }

    /// First and last busy slot of a day, inclusive. None on a free day.
    pub fn day_bounds(&self, day: usize) -> Option<(u32, u32)> {
        let m = self.masks[day];
        if m == 0 {
            return None;
        }
        Some((m.trailing_zeros(), 127 - m.leading_zeros()))
    }

    /// Lengths of idle runs strictly between the first and last busy slot.
    pub fn gaps(&self, day: usize) -> Vec<u32> {
        let Some((first, last)) = self.day_bounds(day) else {
            return Vec::new();
        };
        let mut gaps = Vec::new();
        let mut run = 0u32;
        for slot in first..=last {
            if self.masks[day] & (1u128 << slot) == 0 {
                run += 1;
            } else if run > 0 {
                gaps.push(run);
                run = 0;
            }
        }
        gaps
    }
}

/// Fraction of the week's days with no meetings at all.
pub fn free_days(shape: &WeekShape) -> f32 {
    (WORK_DAYS - shape.active_days()) as f32 / WORK_DAYS as f32
}

/// 1 minus the mean busy fraction over active days; a week of barely-loaded
/// days scores near 1, packed days near 0. Fully free weeks score 1.
pub fn short_days(shape: &WeekShape) -> f32 {
    let active = shape.active_days();
    if active == 0 {
        return 1.0;
    }
    let total: u32 = (0..WORK_DAYS).map(|d| shape.load(d)).sum();
    let mean = total as f32 / active as f32 / shape.slots_per_day as f32;
    1.0 - mean.min(1.0)
}

/// 1 minus the normalized load spread across active days.
pub fn uniform_days(shape: &WeekShape) -> f32 {
    let loads: Vec<u32> = (0..WORK_DAYS)
        .filter(|&d| shape.is_active(d))
        .map(|d| shape.load(d))
        .collect();
    if loads.len() <= 1 {
        return 1.0;
    }
    let max = *loads.iter().max().unwrap_or(&0);
    let min = *loads.iter().min().unwrap_or(&0);
    1.0 - (max - min) as f32 / shape.slots_per_day as f32
}

/// Active days divided by the span they stretch over; back-to-back teaching
/// days score 1, a Monday-plus-Friday week scores 2/5.
pub fn concentrated_days(shape: &WeekShape) -> f32 {
    let first = (0..WORK_DAYS).find(|&d| shape.is_active(d));
    let last = (0..WORK_DAYS).rev().find(|&d| shape.is_active(d));
    match (first, last) {
        (Some(f), Some(l)) => shape.active_days() as f32 / (l - f + 1) as f32,
        _ => 1.0,
    }
}

/// Satisfaction of a lower bound on within-day gap lengths: each gap shorter
/// than `min` contributes its normalized shortfall. No gaps scores 1.
pub fn min_gap_length(shape: &WeekShape, min: u32) -> f32 {
    bound_satisfaction(shape, |gaps| {
        gaps.iter()
            .map(|&g| (min.saturating_sub(g)) as f32 / min.max(1) as f32)
            .collect()
    })
}

/// Satisfaction of an upper bound on within-day gap lengths.
pub fn max_gap_length(shape: &WeekShape, max: u32) -> f32 {
    let spd = shape.slots_per_day.max(1) as f32;
    bound_satisfaction(shape, |gaps| {
        gaps.iter()
            .map(|&g| (g.saturating_sub(max)) as f32 / spd)
            .collect()
    })
}

fn bound_satisfaction<F>(shape: &WeekShape, violations: F) -> f32
where
    F: Fn(&[u32]) -> Vec<f32>,
{
    let mut all = Vec::new();
    for day in 0..WORK_DAYS {
        all.extend(violations(&shape.gaps(day)));
    }
    if all.is_empty() {
        return 1.0;
    }
    let mean = all.iter().sum::<f32>() / all.len() as f32;
    (1.0 - mean).clamp(0.0, 1.0)
}

/// Busy span of a day (first..=last busy slot), in slots.
fn day_span(shape: &WeekShape, day: usize) -> Option<u32> {
    shape.day_bounds(day).map(|(f, l)| l - f + 1)
}

fn mean_over_active_days<F>(shape: &WeekShape, per_day: F) -> f32
where
    F: Fn(usize) -> f32,
{
    let active: Vec<usize> = (0..WORK_DAYS).filter(|&d| shape.is_active(d)).collect();
    if active.is_empty() {
        return 1.0;
    }
    let sum: f32 = active.iter().map(|&d| per_day(d)).sum();
    (sum / active.len() as f32).clamp(0.0, 1.0)
}

pub fn min_day_length(shape: &WeekShape, min: u32) -> f32 {
    mean_over_active_days(shape, |d| {
        let span = day_span(shape, d).unwrap_or(0);
        1.0 - (min.saturating_sub(span)) as f32 / min.max(1) as f32
    })
}

pub fn max_day_length(shape: &WeekShape, max: u32) -> f32 {
    let spd = shape.slots_per_day.max(1) as f32;
    mean_over_active_days(shape, |d| {
        let span = day_span(shape, d).unwrap_or(0);
        1.0 - (span.saturating_sub(max)) as f32 / spd
    })
}

/// 1 minus the mean normalized deviation of each active day's first busy
/// slot from the declared slot.
pub fn day_start(shape: &WeekShape, slot: u32) -> f32 {
    let spd = shape.slots_per_day.max(1) as f32;
    mean_over_active_days(shape, |d| {
        let (first, _) = shape.day_bounds(d).unwrap_or((0, 0));
        1.0 - (first.abs_diff(slot)) as f32 / spd
    })
}

pub fn day_end(shape: &WeekShape, slot: u32) -> f32 {
    let spd = shape.slots_per_day.max(1) as f32;
    mean_over_active_days(shape, |d| {
        let (_, last) = shape.day_bounds(d).unwrap_or((0, 0));
        1.0 - (last.abs_diff(slot)) as f32 / spd
    })
}
