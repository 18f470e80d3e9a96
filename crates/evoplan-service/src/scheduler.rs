use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::JobRecord;
use chrono::Utc;
use evoplan_core::job::SnapshotId;
use evoplan_core::model::PlanStatus;
use evoplan_core::optimizer::{
    decode, Genome, OptimizationOptions, Optimizer, ProgressCallback,
};
use evoplan_core::scorer::Scorer;
use evoplan_protocol::job::JobStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Progress hook shared with the status endpoint: stops the round at the
/// next generation boundary once the job's cancel flag is raised.
struct CancelWatch {
    cancel: Arc<AtomicBool>,
}

impl ProgressCallback for CancelWatch {
    fn on_generation(&self, _generation: usize, _best_fitness: f32, _elapsed: Duration) -> bool {
        !self.cancel.load(Ordering::Relaxed)
    }
}

/// Registers a job for the recruitment and spawns its round loop. Refuses
/// while a previous job is still live; a terminal job may be superseded.
/// Registration is a single store critical section, so concurrent triggers
/// cannot double-start.
pub fn spawn_job(state: Arc<AppState>, recruitment_id: Uuid) -> AppResult<JobRecord> {
    let job = state.store.begin_job(recruitment_id)?;
    info!(
        %recruitment_id,
        job_id = %job.job_id,
        rounds = job.rounds_total,
        "⚙️ optimization job queued"
    );

    tokio::spawn(run_job(state, recruitment_id));
    Ok(job)
}

/// Background clock for the deadlines no request ever touches: starts
/// drafts whose preference deadline has passed and archives recruitments
/// whose plan window has ended.
pub async fn run_ticker(state: Arc<AppState>, period: Duration) {
    let mut tick = tokio::time::interval(period);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tick.tick().await;
        let outcome = state.store.sweep(Utc::now());
        if outcome.archived > 0 {
            info!(count = outcome.archived, "📦 archived expired recruitments");
        }
        for id in outcome.due {
            match spawn_job(state.clone(), id) {
                Ok(job) => {
                    info!(recruitment_id = %id, job_id = %job.job_id, "⏰ deadline passed, optimization started");
                }
                Err(e) => debug!(recruitment_id = %id, "deadline start skipped: {e}"),
            }
        }
    }
}

/// Raises the cancel flag on a live job. The running round observes it at
/// its next generation boundary; partial output is discarded.
pub fn cancel_job(state: &AppState, job_id: Uuid) -> AppResult<JobRecord> {
    let job = state.store.job_by_id(job_id).ok_or(AppError::NotFound)?;
    if job.status.is_terminal() {
        return Err(AppError::Conflict(format!("job is already {}", job.status)));
    }
    job.cancel.store(true, Ordering::Relaxed);
    info!(%job_id, "🛑 cancellation requested");
    Ok(job)
}

async fn run_job(state: Arc<AppState>, recruitment_id: Uuid) {
    let mut carried: Vec<Genome> = Vec::new();
    let mut best: Option<(f32, Genome)> = None;
    let mut last_snapshot: Option<SnapshotId> = None;

    let Some(total_rounds) = state
        .store
        .job_for_recruitment(recruitment_id)
        .map(|j| j.rounds_total)
    else {
        return;
    };

    for round in 0..total_rounds {
        // Snapshot at round start: preference edits made from here on are
        // only visible to the next round.
        let Some(problem) = state
            .store
            .with_recruitment(recruitment_id, |rec| rec.problem.clone())
        else {
            return;
        };
        match SnapshotId::of(&problem) {
            Ok(id) => {
                if last_snapshot.as_ref() != Some(&id) {
                    info!(%recruitment_id, round, snapshot = %id, "round snapshot taken");
                }
                last_snapshot = Some(id);
            }
            Err(e) => warn!(%recruitment_id, "snapshot hash failed: {e}"),
        }

        let Some(cancel) = state.store.update_job(recruitment_id, |job| {
            job.status = JobStatus::Running;
            job.round_started_at = Utc::now();
            job.cancel.clone()
        }) else {
            return;
        };

        let mut options = OptimizationOptions::from(&state.search);
        options.max_time = state
            .store
            .with_recruitment(recruitment_id, |rec| {
                Duration::from_secs(rec.settings.max_round_seconds)
            });
        options.initial_population = std::mem::take(&mut carried);

        let scorer = Arc::new(Scorer::new(Arc::new(problem.clone())));
        let callback = CancelWatch { cancel };
        let outcome = tokio::task::spawn_blocking(move || {
            Optimizer::new(scorer, options).run(None, &callback)
        })
        .await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                error!(%recruitment_id, round, "optimization failed: {e}");
                finish(&state, recruitment_id, JobStatus::Failed, PlanStatus::Failed, vec![]);
                return;
            }
            Err(e) => {
                error!(%recruitment_id, round, "round task panicked: {e}");
                finish(&state, recruitment_id, JobStatus::Failed, PlanStatus::Failed, vec![]);
                return;
            }
        };

        if result.cancelled {
            info!(%recruitment_id, round, "job cancelled, discarding partial result");
            finish(
                &state,
                recruitment_id,
                JobStatus::Cancelled,
                PlanStatus::Cancelled,
                vec![],
            );
            return;
        }

        let improved = match &best {
            Some((f, _)) => result.best_fitness > f + state.search.patience_threshold,
            None => true,
        };
        if best.as_ref().map_or(true, |(f, _)| result.best_fitness > *f) {
            best = Some((result.best_fitness, result.best.clone()));
        }
        carried = result.population;

        state.store.update_job(recruitment_id, |job| {
            job.rounds_done = round + 1;
        });
        info!(
            %recruitment_id,
            round,
            best_fitness = result.best_fitness,
            generations = result.generations_run,
            "round complete"
        );

        if round > 0 && !improved {
            info!(%recruitment_id, round, "score converged, stopping early");
            break;
        }
    }

    let meetings = match best {
        Some((_, genome)) => state
            .store
            .with_recruitment(recruitment_id, |rec| decode(&rec.problem, &genome))
            .unwrap_or_default(),
        None => vec![],
    };
    info!(%recruitment_id, meetings = meetings.len(), "✅ optimization complete");
    finish(
        &state,
        recruitment_id,
        JobStatus::Completed,
        PlanStatus::Active,
        meetings,
    );
}

fn finish(
    state: &AppState,
    recruitment_id: Uuid,
    job_status: JobStatus,
    plan_status: PlanStatus,
    meetings: Vec<evoplan_core::model::Meeting>,
) {
    state.store.update_job(recruitment_id, |job| {
        job.status = job_status;
        if job_status.is_terminal() {
            job.rounds_done = job.rounds_done.min(job.rounds_total);
        }
    });
    state.store.with_recruitment_mut(recruitment_id, |rec| {
        rec.status = plan_status;
        rec.meetings = meetings;
    });
}
