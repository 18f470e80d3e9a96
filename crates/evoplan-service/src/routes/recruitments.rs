use axum::{
    extract::{Path, State},
    Json,
};
use evoplan_core::model::{CycleType, Group, Room, Subject, TimeGrid, User, DAY_NAMES};
use evoplan_core::problem::Problem;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::{Recruitment, RecruitmentSettings};
use chrono::{DateTime, Utc};

fn default_threshold() -> f32 {
    0.8
}
fn default_rounds() -> usize {
    4
}
fn default_round_seconds() -> u64 {
    300
}
fn default_token_count() -> u32 {
    10
}

/// Minimal registration payload: the entities the optimizer needs, plus the
/// scheduling knobs. Wall-clock bounds are minutes since midnight; calendar
/// dates fall back to a one-week preference window when omitted.
#[derive(Deserialize, Clone)]
pub struct CreateRecruitmentRequest {
    pub name: String,
    pub day_start_minutes: u32,
    pub day_end_minutes: u32,
    #[serde(default)]
    pub cycle_type: CycleType,
    #[serde(default)]
    pub tags: Vec<String>,
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub rooms: Vec<Room>,
    pub subjects: Vec<Subject>,
    #[serde(default = "default_threshold")]
    pub preference_threshold: f32,
    #[serde(default = "default_rounds")]
    pub rounds: usize,
    #[serde(default = "default_round_seconds")]
    pub max_round_seconds: u64,
    #[serde(default = "default_token_count")]
    pub default_token_count: u32,
    #[serde(default)]
    pub prefs_open: Option<DateTime<Utc>>,
    #[serde(default)]
    pub prefs_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub plan_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub plan_end: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct CreateRecruitmentResponse {
    pub id: Uuid,
    /// Index-aligned with the submitted users.
    pub user_ids: Vec<Uuid>,
    pub slots_per_day: usize,
}

#[derive(Serialize)]
pub struct RecruitmentSummary {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub users: usize,
    pub submitted: usize,
    pub meetings: usize,
    pub default_token_count: u32,
    pub prefs_deadline: DateTime<Utc>,
    pub plan_start: DateTime<Utc>,
    pub plan_end: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct MeetingView {
    pub subject: String,
    pub group: String,
    pub room: String,
    pub host: String,
    pub day: &'static str,
    pub starts_at: String,
    pub ends_at: String,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRecruitmentRequest>,
) -> AppResult<Json<CreateRecruitmentResponse>> {
    let grid = TimeGrid::from_day_bounds(payload.day_start_minutes, payload.day_end_minutes)?;
    let mut problem = Problem {
        name: payload.name.clone(),
        grid,
        cycle: payload.cycle_type,
        tags: payload.tags,
        users: payload.users,
        groups: payload.groups,
        rooms: payload.rooms,
        subjects: payload.subjects,
        instances: vec![],
        preferences: vec![],
    };
    problem.compile()?;

    let user_ids: Vec<Uuid> = problem.users.iter().map(|_| Uuid::new_v4()).collect();
    let slots_per_day = problem.grid.slots_per_day;
    let defaults = RecruitmentSettings::default();
    let settings = RecruitmentSettings {
        preference_threshold: payload.preference_threshold.clamp(0.0, 1.0),
        rounds: payload.rounds,
        max_round_seconds: payload.max_round_seconds,
        default_token_count: payload.default_token_count,
        prefs_open: payload.prefs_open.unwrap_or(defaults.prefs_open),
        prefs_deadline: payload.prefs_deadline.unwrap_or(defaults.prefs_deadline),
        plan_start: payload.plan_start.unwrap_or(defaults.plan_start),
        plan_end: payload.plan_end.unwrap_or(defaults.plan_end),
    };
    settings.validate()?;
    let recruitment = Recruitment::new(payload.name, problem, user_ids.clone(), settings);
    let id = state.store.insert_recruitment(recruitment);
    info!(%id, users = user_ids.len(), "🆕 recruitment registered");

    Ok(Json(CreateRecruitmentResponse { id, user_ids, slots_per_day }))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(recruitment_id): Path<Uuid>,
) -> AppResult<Json<RecruitmentSummary>> {
    state
        .store
        .with_recruitment(recruitment_id, |rec| {
            Json(RecruitmentSummary {
                id: rec.id,
                name: rec.name.clone(),
                status: rec.status.to_string(),
                users: rec.user_ids.len(),
                submitted: rec.submitted.len(),
                meetings: rec.meetings.len(),
                default_token_count: rec.settings.default_token_count,
                prefs_deadline: rec.settings.prefs_deadline,
                plan_start: rec.settings.plan_start,
                plan_end: rec.settings.plan_end,
            })
        })
        .ok_or(AppError::NotFound)
}

pub async fn meetings(
    State(state): State<Arc<AppState>>,
    Path(recruitment_id): Path<Uuid>,
) -> AppResult<Json<Vec<MeetingView>>> {
    state
        .store
        .with_recruitment(recruitment_id, |rec| {
            let views = rec
                .meetings
                .iter()
                .map(|m| MeetingView {
                    subject: rec.problem.subjects[m.subject].name.clone(),
                    group: rec.problem.groups[m.group].name.clone(),
                    room: rec.problem.rooms[m.room].label(),
                    host: rec.problem.users[m.host].name.clone(),
                    day: DAY_NAMES[m.day],
                    starts_at: rec.problem.grid.slot_label(m.start_slot),
                    ends_at: rec.problem.grid.slot_label(m.end_slot),
                })
                .collect();
            Json(views)
        })
        .ok_or(AppError::NotFound)
}
