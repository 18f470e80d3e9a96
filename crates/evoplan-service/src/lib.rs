//! HTTP layer for the timetable engine: in-memory registry, preference
//! ingestion, job scheduling and the polling progress contract.

pub mod error;
pub mod progress;
pub mod routes;
pub mod scheduler;
pub mod state;
pub mod store;

use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn app(state: Arc<AppState>) -> Router {
    routes::system_routes()
        .merge(routes::recruitment_routes())
        .merge(routes::preference_routes())
        .merge(routes::job_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
