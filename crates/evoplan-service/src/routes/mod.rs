pub mod jobs;
pub mod preferences;
pub mod recruitments;
pub mod system;

use crate::state::AppState;
use axum::Router;
use std::sync::Arc;

pub fn system_routes() -> Router<Arc<AppState>> {
    Router::new().route("/optimizer/health/", axum::routing::get(system::health))
}

pub fn recruitment_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/recruitments/",
            axum::routing::post(recruitments::create),
        )
        .route(
            "/recruitments/{recruitment_id}/",
            axum::routing::get(recruitments::get),
        )
        .route(
            "/recruitments/{recruitment_id}/meetings/",
            axum::routing::get(recruitments::meetings),
        )
}

pub fn preference_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/preferences/user-preferences/{recruitment_id}/{user_id}/",
            axum::routing::get(preferences::get).put(preferences::put),
        )
        .route(
            "/preferences/aggregate-preferred-timeslots/{recruitment_id}",
            axum::routing::get(preferences::aggregate),
        )
}

pub fn job_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/optimizer/jobs/recruitment/{recruitment_id}/start/",
            axum::routing::post(jobs::start),
        )
        .route(
            "/optimizer/jobs/recruitment/{recruitment_id}/status/",
            axum::routing::get(jobs::status),
        )
        .route(
            "/optimizer/jobs/{job_id}/cancel/",
            axum::routing::post(jobs::cancel),
        )
}
