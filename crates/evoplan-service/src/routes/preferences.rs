use axum::{
    extract::{Path, State},
    Json,
};
use evoplan_protocol::preferences::UserPreferencesBody;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::error::AppResult;
use crate::scheduler;
use crate::state::AppState;

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path((recruitment_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<UserPreferencesBody>> {
    let preferences_data = state.store.get_preferences(recruitment_id, user_id)?;
    Ok(Json(UserPreferencesBody { preferences_data }))
}

/// Full overwrite, last write wins. Crossing the recruitment's submission
/// threshold auto-starts optimization.
pub async fn put(
    State(state): State<Arc<AppState>>,
    Path((recruitment_id, user_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UserPreferencesBody>,
) -> AppResult<Json<UserPreferencesBody>> {
    let crossed_threshold =
        state
            .store
            .put_preferences(recruitment_id, user_id, &body.preferences_data)?;

    if crossed_threshold {
        if let Err(e) = scheduler::spawn_job(state.clone(), recruitment_id) {
            // A live job already covers this recruitment; the edit still
            // landed and applies from the next round.
            warn!(%recruitment_id, "auto-start skipped: {e}");
        }
    }

    let preferences_data = state.store.get_preferences(recruitment_id, user_id)?;
    Ok(Json(UserPreferencesBody { preferences_data }))
}

pub async fn aggregate(
    State(state): State<Arc<AppState>>,
    Path(recruitment_id): Path<Uuid>,
) -> AppResult<Json<Vec<f32>>> {
    Ok(Json(state.store.heatmap(recruitment_id)?))
}
