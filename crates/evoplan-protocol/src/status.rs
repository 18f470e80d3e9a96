use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a timeline segment relative to live progress.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Past,
    Current,
    Future,
}

/// One optimization round rendered as a fraction of the estimated window.
/// `start` and `end` are fractions in [0, 1], half-open.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimelineSegment {
    pub start: f32,
    pub end: f32,
    #[serde(rename = "type")]
    pub kind: SegmentKind,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundCounts {
    /// Completed rounds.
    pub current: u32,
    /// Planned rounds for the whole recruitment.
    pub total: u32,
}

/// Remaining-time estimates in whole seconds. The client decrements these
/// locally once per second between polls, so they must never be negative
/// and must not jump upward without a re-estimation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemainingEstimates {
    pub total_remaining_seconds: u64,
    pub current_job_remaining_seconds: u64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct StatusMeta {
    /// Fraction of the estimated window already elapsed, in [0, 1].
    pub now_progress: f32,
    pub start_date: DateTime<Utc>,
    pub estimated_end_date: DateTime<Utc>,
}

/// Snapshot returned by `GET /optimizer/jobs/recruitment/{id}/status/`.
/// Polled by the client roughly every 15 seconds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct JobStatusResponse {
    pub counts: RoundCounts,
    pub estimates: RemainingEstimates,
    pub meta: StatusMeta,
    pub timeline: Vec<TimelineSegment>,
}
