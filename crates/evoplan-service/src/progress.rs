use crate::store::JobRecord;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use evoplan_protocol::job::JobStatus;
use evoplan_protocol::status::{
    JobStatusResponse, RemainingEstimates, RoundCounts, SegmentKind, StatusMeta, TimelineSegment,
};

/// Builds the polling payload from a job record. Estimates are derived from
/// wall-clock elapsed against the fixed per-round budget, so between polls
/// they only ever shrink (clamped at zero).
pub fn status_snapshot(job: &JobRecord, now: DateTime<Utc>) -> JobStatusResponse {
    let budget = job.round_budget_seconds as i64;
    let total = job.rounds_total.max(1);
    let done = job.rounds_done.min(total);

    let current_remaining = if job.status == JobStatus::Running {
        let elapsed = (now - job.round_started_at).num_seconds();
        (budget - elapsed).max(0)
    } else {
        0
    };
    // A queued job has not opened its next round yet, so that round still
    // counts in full; once running, the open round is tracked separately.
    let rounds_after_current = match job.status {
        JobStatus::Running => total.saturating_sub(done + 1) as i64,
        JobStatus::Queued => total.saturating_sub(done) as i64,
        _ => 0,
    };
    let total_remaining = current_remaining + rounds_after_current * budget;

    let round_progress = if job.status == JobStatus::Running {
        1.0 - current_remaining as f32 / budget.max(1) as f32
    } else {
        0.0
    };
    let now_progress = if job.status.is_terminal() {
        1.0
    } else {
        ((done as f32 + round_progress) / total as f32).clamp(0.0, 1.0)
    };

    let timeline = (0..total)
        .map(|i| {
            let kind = if i < done || job.status.is_terminal() {
                SegmentKind::Past
            } else if i == done && job.status == JobStatus::Running {
                SegmentKind::Current
            } else {
                SegmentKind::Future
            };
            TimelineSegment {
                start: i as f32 / total as f32,
                end: (i + 1) as f32 / total as f32,
                kind,
            }
        })
        .collect();

    JobStatusResponse {
        counts: RoundCounts { current: done as u32, total: total as u32 },
        estimates: RemainingEstimates {
            total_remaining_seconds: total_remaining as u64,
            current_job_remaining_seconds: current_remaining as u64,
        },
        meta: StatusMeta {
            now_progress,
            start_date: job.started_at,
            estimated_end_date: now + ChronoDuration::seconds(total_remaining),
        },
        timeline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn job(status: JobStatus, done: usize) -> JobRecord {
        let mut job = JobRecord::new(Uuid::new_v4(), 4, 10);
        job.status = status;
        job.rounds_done = done;
        job
    }

    #[test]
    fn queued_job_reports_full_estimate() {
        let j = job(JobStatus::Queued, 0);
        let s = status_snapshot(&j, j.started_at);
        assert_eq!(s.counts.total, 4);
        assert_eq!(s.estimates.current_job_remaining_seconds, 0);
        assert_eq!(s.estimates.total_remaining_seconds, 40);
        assert_eq!(s.meta.now_progress, 0.0);
    }

    #[test]
    fn queued_to_running_transition_never_raises_the_estimate() {
        let queued = job(JobStatus::Queued, 0);
        let before = status_snapshot(&queued, queued.started_at);

        let mut running = queued.clone();
        running.status = JobStatus::Running;
        running.round_started_at = running.started_at + ChronoDuration::seconds(1);
        let after = status_snapshot(&running, running.round_started_at);

        assert!(
            after.estimates.total_remaining_seconds <= before.estimates.total_remaining_seconds,
            "estimate rose across the queued-to-running flip: {} -> {}",
            before.estimates.total_remaining_seconds,
            after.estimates.total_remaining_seconds
        );
    }

    #[test]
    fn running_estimates_shrink_monotonically() {
        let mut j = job(JobStatus::Running, 1);
        j.round_started_at = j.started_at;
        let t1 = status_snapshot(&j, j.started_at + ChronoDuration::seconds(2));
        let t2 = status_snapshot(&j, j.started_at + ChronoDuration::seconds(7));
        assert!(t2.estimates.total_remaining_seconds <= t1.estimates.total_remaining_seconds);
        assert!(
            t2.estimates.current_job_remaining_seconds
                <= t1.estimates.current_job_remaining_seconds
        );
        assert!(t2.meta.now_progress >= t1.meta.now_progress);
    }

    #[test]
    fn overrun_round_clamps_at_zero() {
        let mut j = job(JobStatus::Running, 3);
        j.round_started_at = j.started_at;
        let s = status_snapshot(&j, j.started_at + ChronoDuration::seconds(60));
        assert_eq!(s.estimates.current_job_remaining_seconds, 0);
        assert_eq!(s.estimates.total_remaining_seconds, 0);
    }

    #[test]
    fn timeline_classifies_rounds() {
        let mut j = job(JobStatus::Running, 1);
        j.round_started_at = j.started_at;
        let s = status_snapshot(&j, j.started_at);
        let kinds: Vec<_> = s.timeline.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SegmentKind::Past,
                SegmentKind::Current,
                SegmentKind::Future,
                SegmentKind::Future
            ]
        );
        assert_eq!(s.timeline[0].start, 0.0);
        assert_eq!(s.timeline[3].end, 1.0);
    }

    #[test]
    fn terminal_job_is_fully_past() {
        let j = job(JobStatus::Completed, 4);
        let s = status_snapshot(&j, j.started_at);
        assert_eq!(s.meta.now_progress, 1.0);
        assert!(s.timeline.iter().all(|t| t.kind == SegmentKind::Past));
        assert_eq!(s.estimates.total_remaining_seconds, 0);
    }
}
