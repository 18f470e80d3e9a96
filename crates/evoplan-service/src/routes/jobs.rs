use axum::{
    extract::{Path, State},
    Json,
};
use evoplan_protocol::job::{CancelJobResponse, SubmitJobResponse};
use evoplan_protocol::status::JobStatusResponse;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::progress::status_snapshot;
use crate::scheduler;
use crate::state::AppState;

pub async fn start(
    State(state): State<Arc<AppState>>,
    Path(recruitment_id): Path<Uuid>,
) -> AppResult<Json<SubmitJobResponse>> {
    let job = scheduler::spawn_job(state, recruitment_id)?;
    Ok(Json(SubmitJobResponse { job_id: job.job_id, status: job.status }))
}

/// Polling endpoint. 404 until the recruitment has had a job.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(recruitment_id): Path<Uuid>,
) -> AppResult<Json<JobStatusResponse>> {
    let job = state
        .store
        .job_for_recruitment(recruitment_id)
        .ok_or(AppError::NotFound)?;
    Ok(Json(status_snapshot(&job, chrono::Utc::now())))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<CancelJobResponse>> {
    let job = scheduler::cancel_job(&state, job_id)?;
    Ok(Json(CancelJobResponse {
        message: "cancellation requested, takes effect at the next generation".to_string(),
        job_id: job.job_id,
        status: job.status,
    }))
}
