use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use evoplan_core::model::{Meeting, PlanStatus};
use evoplan_core::preferences::{aggregate_slot_weights, PreferenceRecord};
use evoplan_core::problem::Problem;
use evoplan_protocol::job::JobStatus;
use evoplan_protocol::preferences::PreferencesData;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Campaign knobs and calendar window. Invariant: the preference deadline
/// is at or before the plan start, which is before the plan end.
#[derive(Clone, Debug)]
pub struct RecruitmentSettings {
    /// Fraction of users whose submission auto-starts optimization.
    pub preference_threshold: f32,
    pub rounds: usize,
    pub max_round_seconds: u64,
    /// Preference points each user may spend on positive slot weights.
    pub default_token_count: u32,
    pub prefs_open: DateTime<Utc>,
    pub prefs_deadline: DateTime<Utc>,
    pub plan_start: DateTime<Utc>,
    pub plan_end: DateTime<Utc>,
}

impl Default for RecruitmentSettings {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            preference_threshold: 0.8,
            rounds: 4,
            max_round_seconds: 300,
            default_token_count: 10,
            prefs_open: now,
            prefs_deadline: now + chrono::Duration::days(7),
            plan_start: now + chrono::Duration::days(7),
            plan_end: now + chrono::Duration::days(90),
        }
    }
}

impl RecruitmentSettings {
    pub fn validate(&self) -> AppResult<()> {
        if self.prefs_deadline > self.plan_start {
            return Err(AppError::Validation(
                "preference window must close at or before the plan starts".into(),
            ));
        }
        if self.plan_start >= self.plan_end {
            return Err(AppError::Validation(
                "plan start date must be before the plan end date".into(),
            ));
        }
        Ok(())
    }
}

/// One recruitment's live state. The compiled problem carries the current
/// preference table; running rounds work on a clone taken at round start, so
/// writes here only affect the next round.
pub struct Recruitment {
    pub id: Uuid,
    pub name: String,
    pub status: PlanStatus,
    pub settings: RecruitmentSettings,
    pub problem: Problem,
    /// External user ids, index-aligned with `problem.users`.
    pub user_ids: Vec<Uuid>,
    pub submitted: HashSet<Uuid>,
    heatmap: Option<Vec<f32>>,
    pub meetings: Vec<Meeting>,
}

impl Recruitment {
    pub fn new(
        name: String,
        problem: Problem,
        user_ids: Vec<Uuid>,
        mut settings: RecruitmentSettings,
    ) -> Self {
        settings.rounds = settings.rounds.max(1);
        settings.max_round_seconds = settings.max_round_seconds.max(1);
        Self {
            id: Uuid::new_v4(),
            name,
            status: PlanStatus::Draft,
            settings,
            problem,
            user_ids,
            submitted: HashSet::new(),
            heatmap: None,
            meetings: Vec::new(),
        }
    }

    fn user_index(&self, user_id: Uuid) -> Option<usize> {
        self.user_ids.iter().position(|&u| u == user_id)
    }

    pub fn submitted_fraction(&self) -> f32 {
        if self.user_ids.is_empty() {
            return 0.0;
        }
        self.submitted.len() as f32 / self.user_ids.len() as f32
    }

    /// Whether a draft recruitment should flip to optimizing: either its
    /// preference deadline has passed or enough users have submitted.
    pub fn should_auto_start(&self, now: DateTime<Utc>) -> bool {
        self.status == PlanStatus::Draft
            && (now >= self.settings.prefs_deadline
                || self.submitted_fraction() >= self.settings.preference_threshold)
    }
}

/// Per-recruitment job bookkeeping, read by the status endpoint and written
/// by the scheduler. The cancel flag is shared with the running round's
/// progress callback.
#[derive(Clone)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub recruitment_id: Uuid,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub rounds_total: usize,
    pub rounds_done: usize,
    pub round_started_at: DateTime<Utc>,
    pub round_budget_seconds: u64,
    pub cancel: Arc<AtomicBool>,
}

impl JobRecord {
    pub fn new(recruitment_id: Uuid, rounds_total: usize, round_budget_seconds: u64) -> Self {
        let now = Utc::now();
        Self {
            job_id: Uuid::new_v4(),
            recruitment_id,
            status: JobStatus::Queued,
            started_at: now,
            rounds_total: rounds_total.max(1),
            rounds_done: 0,
            round_started_at: now,
            round_budget_seconds: round_budget_seconds.max(1),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// What one background sweep did: recruitments to start and how many were
/// put away.
#[derive(Default, Debug)]
pub struct SweepOutcome {
    pub due: Vec<Uuid>,
    pub archived: usize,
}

/// In-memory registry. Locks are held only for the duration of a closure,
/// never across an await point.
#[derive(Default)]
pub struct Store {
    recruitments: RwLock<HashMap<Uuid, Recruitment>>,
    jobs: RwLock<HashMap<Uuid, JobRecord>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_recruitment(&self, recruitment: Recruitment) -> Uuid {
        let id = recruitment.id;
        self.recruitments.write().unwrap().insert(id, recruitment);
        id
    }

    pub fn with_recruitment<R>(&self, id: Uuid, f: impl FnOnce(&Recruitment) -> R) -> Option<R> {
        self.recruitments.read().unwrap().get(&id).map(f)
    }

    pub fn with_recruitment_mut<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Recruitment) -> R,
    ) -> Option<R> {
        self.recruitments.write().unwrap().get_mut(&id).map(f)
    }

    pub fn get_preferences(&self, recruitment: Uuid, user: Uuid) -> AppResult<PreferencesData> {
        self.with_recruitment(recruitment, |rec| {
            let idx = rec.user_index(user)?;
            if !rec.submitted.contains(&user) {
                return None;
            }
            Some(rec.problem.preferences[idx].to_wire())
        })
        .ok_or(AppError::NotFound)?
        .ok_or(AppError::NotFound)
    }

    /// Validates and overwrites one user's record (last write wins). Returns
    /// true when this write pushed the recruitment over its auto-start
    /// threshold.
    pub fn put_preferences(
        &self,
        recruitment: Uuid,
        user: Uuid,
        data: &PreferencesData,
    ) -> AppResult<bool> {
        let now = Utc::now();
        self.with_recruitment_mut(recruitment, |rec| {
            let idx = rec.user_index(user).ok_or(AppError::NotFound)?;
            if !rec.status.accepts_preferences() {
                return Err(AppError::Conflict(format!(
                    "recruitment is {}, preferences are closed",
                    rec.status
                )));
            }
            if now < rec.settings.prefs_open {
                return Err(AppError::Conflict(
                    "the preference window has not opened yet".into(),
                ));
            }
            let record = PreferenceRecord::from_wire(data, &rec.problem.grid)?;
            let spend: f32 = data.preferred_timeslots.iter().filter(|w| **w > 0.0).sum();
            if spend > rec.settings.default_token_count as f32 {
                return Err(AppError::Validation(format!(
                    "preference spend {spend} exceeds the token budget of {}",
                    rec.settings.default_token_count
                )));
            }
            rec.problem.preferences[idx] = record;
            rec.submitted.insert(user);
            rec.heatmap = None;

            Ok(rec.should_auto_start(now))
        })
        .ok_or(AppError::NotFound)?
    }

    /// Per-slot aggregate of all users' slot weights, cached until the next
    /// preference write.
    pub fn heatmap(&self, recruitment: Uuid) -> AppResult<Vec<f32>> {
        self.with_recruitment_mut(recruitment, |rec| {
            if let Some(cached) = &rec.heatmap {
                return cached.clone();
            }
            let agg = aggregate_slot_weights(rec.problem.preferences.iter(), &rec.problem.grid);
            rec.heatmap = Some(agg.clone());
            agg
        })
        .ok_or(AppError::NotFound)
    }

    /// One pass of the background clock: archives recruitments whose plan
    /// window has ended and reports drafts whose preference deadline has
    /// passed. The caller starts jobs for the returned ids.
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();
        let mut recruitments = self.recruitments.write().unwrap();
        for rec in recruitments.values_mut() {
            let expired = now >= rec.settings.plan_end;
            if expired
                && rec.status != PlanStatus::Archived
                && rec.status != PlanStatus::Optimizing
            {
                rec.status = PlanStatus::Archived;
                outcome.archived += 1;
                continue;
            }
            if rec.should_auto_start(now) {
                outcome.due.push(rec.id);
            }
        }
        outcome
    }

    /// Registers a job and flips the recruitment to optimizing in one
    /// critical section, so two racing triggers cannot both register. The
    /// second caller gets a conflict while the first job is live.
    pub fn begin_job(&self, recruitment: Uuid) -> AppResult<JobRecord> {
        let mut jobs = self.jobs.write().unwrap();
        let mut recruitments = self.recruitments.write().unwrap();
        let rec = recruitments.get_mut(&recruitment).ok_or(AppError::NotFound)?;

        if let Some(existing) = jobs.get(&recruitment) {
            if !existing.status.is_terminal() {
                return Err(AppError::Conflict(format!(
                    "job {} is already {}",
                    existing.job_id, existing.status
                )));
            }
        }

        rec.status = PlanStatus::Optimizing;
        let job = JobRecord::new(recruitment, rec.settings.rounds, rec.settings.max_round_seconds);
        jobs.insert(recruitment, job.clone());
        Ok(job)
    }

    pub fn job_for_recruitment(&self, recruitment: Uuid) -> Option<JobRecord> {
        self.jobs.read().unwrap().get(&recruitment).cloned()
    }

    pub fn job_by_id(&self, job_id: Uuid) -> Option<JobRecord> {
        self.jobs
            .read()
            .unwrap()
            .values()
            .find(|j| j.job_id == job_id)
            .cloned()
    }

    pub fn update_job<R>(
        &self,
        recruitment: Uuid,
        f: impl FnOnce(&mut JobRecord) -> R,
    ) -> Option<R> {
        self.jobs.write().unwrap().get_mut(&recruitment).map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evoplan_core::model::{Group, Room, Subject, TimeGrid, User};

    fn recruitment() -> Recruitment {
        let mut problem = Problem {
            name: "r".into(),
            grid: TimeGrid::new(8),
            cycle: Default::default(),
            tags: vec![],
            users: vec![
                User { name: "h".into(), weight: 1.0, unavailable: vec![] },
                User { name: "a".into(), weight: 1.0, unavailable: vec![] },
                User { name: "b".into(), weight: 1.0, unavailable: vec![] },
            ],
            groups: vec![Group { name: "g".into(), members: vec![1, 2] }],
            rooms: vec![Room {
                building_name: "B".into(),
                room_number: "1".into(),
                capacity: 10,
                tags: vec![],
                unavailable: vec![],
            }],
            subjects: vec![Subject {
                name: "s".into(),
                capacity: 5,
                min_students: 1,
                duration_blocks: 2,
                break_before: 0,
                break_after: 0,
                required_tags: vec![],
                hosts: vec![0],
                groups: vec![0],
            }],
            instances: vec![],
            preferences: vec![],
        };
        problem.compile().unwrap();
        let user_ids = (0..3).map(|_| Uuid::new_v4()).collect();
        let settings = RecruitmentSettings {
            preference_threshold: 0.5,
            rounds: 3,
            max_round_seconds: 10,
            default_token_count: 100,
            ..Default::default()
        };
        Recruitment::new("r".into(), problem, user_ids, settings)
    }

    fn valid_payload() -> PreferencesData {
        PreferencesData {
            preferred_timeslots: vec![1.0; 40],
            ..Default::default()
        }
    }

    #[test]
    fn get_before_any_put_is_not_found() {
        let store = Store::new();
        let rec = recruitment();
        let (id, user) = (rec.id, rec.user_ids[1]);
        store.insert_recruitment(rec);
        assert!(matches!(
            store.get_preferences(id, user),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = Store::new();
        let rec = recruitment();
        let (id, user) = (rec.id, rec.user_ids[1]);
        store.insert_recruitment(rec);

        store.put_preferences(id, user, &valid_payload()).unwrap();
        let back = store.get_preferences(id, user).unwrap();
        assert_eq!(back.preferred_timeslots, vec![1.0; 40]);
    }

    #[test]
    fn malformed_vector_is_rejected_and_stores_nothing() {
        let store = Store::new();
        let rec = recruitment();
        let (id, user) = (rec.id, rec.user_ids[1]);
        store.insert_recruitment(rec);

        let bad = PreferencesData {
            preferred_timeslots: vec![1.0; 39],
            ..Default::default()
        };
        assert!(matches!(
            store.put_preferences(id, user, &bad),
            Err(AppError::Validation(_))
        ));
        assert!(store.get_preferences(id, user).is_err());
    }

    #[test]
    fn threshold_crossing_is_reported_once_per_state() {
        let store = Store::new();
        let rec = recruitment();
        let (id, u1, u2) = (rec.id, rec.user_ids[0], rec.user_ids[1]);
        store.insert_recruitment(rec);

        // 1 of 3 users: below the 0.5 threshold.
        assert!(!store.put_preferences(id, u1, &valid_payload()).unwrap());
        // 2 of 3: crossed.
        assert!(store.put_preferences(id, u2, &valid_payload()).unwrap());
    }

    #[test]
    fn heatmap_is_invalidated_on_write() {
        let store = Store::new();
        let rec = recruitment();
        let (id, user) = (rec.id, rec.user_ids[1]);
        store.insert_recruitment(rec);

        assert_eq!(store.heatmap(id).unwrap(), vec![0.0; 40]);
        store.put_preferences(id, user, &valid_payload()).unwrap();
        assert_eq!(store.heatmap(id).unwrap(), vec![1.0; 40]);
    }

    #[test]
    fn spend_beyond_the_token_budget_is_rejected() {
        let store = Store::new();
        let mut rec = recruitment();
        rec.settings.default_token_count = 10;
        let (id, user) = (rec.id, rec.user_ids[1]);
        store.insert_recruitment(rec);

        let greedy = PreferencesData {
            preferred_timeslots: vec![5.0; 40],
            ..Default::default()
        };
        assert!(matches!(
            store.put_preferences(id, user, &greedy),
            Err(AppError::Validation(_))
        ));

        // Dislikes cost nothing; ten points of likes fit exactly.
        let mut slots = vec![-1.0; 40];
        slots[..2].fill(5.0);
        let frugal = PreferencesData { preferred_timeslots: slots, ..Default::default() };
        store.put_preferences(id, user, &frugal).unwrap();
    }

    #[test]
    fn sweep_archives_expired_plans_and_reports_due_drafts() {
        let store = Store::new();
        let now = Utc::now();

        let mut expired = recruitment();
        expired.status = PlanStatus::Active;
        expired.settings.plan_end = now - chrono::Duration::days(1);
        let expired_id = store.insert_recruitment(expired);

        let mut overdue = recruitment();
        overdue.settings.prefs_deadline = now - chrono::Duration::hours(1);
        let overdue_id = store.insert_recruitment(overdue);

        let fresh_id = store.insert_recruitment(recruitment());

        let outcome = store.sweep(now);
        assert_eq!(outcome.archived, 1);
        assert_eq!(outcome.due, vec![overdue_id]);
        let status = store.with_recruitment(expired_id, |r| r.status).unwrap();
        assert_eq!(status, PlanStatus::Archived);
        let status = store.with_recruitment(fresh_id, |r| r.status).unwrap();
        assert_eq!(status, PlanStatus::Draft);

        // Archiving is idempotent across ticks.
        assert_eq!(store.sweep(now).archived, 0);
    }

    #[test]
    fn begin_job_is_exclusive_while_live() {
        let store = Store::new();
        let rec = recruitment();
        let id = rec.id;
        store.insert_recruitment(rec);

        // Both writers saw the threshold crossed; only one may register.
        let first = store.begin_job(id).unwrap();
        assert!(matches!(store.begin_job(id), Err(AppError::Conflict(_))));
        let status = store.with_recruitment(id, |r| r.status).unwrap();
        assert_eq!(status, PlanStatus::Optimizing);

        // A terminal job may be superseded by a fresh one.
        store.update_job(id, |job| job.status = JobStatus::Completed);
        let second = store.begin_job(id).unwrap();
        assert_ne!(first.job_id, second.job_id);
    }

    #[test]
    fn closed_recruitment_rejects_edits() {
        let store = Store::new();
        let mut rec = recruitment();
        rec.status = PlanStatus::Completed;
        let (id, user) = (rec.id, rec.user_ids[1]);
        store.insert_recruitment(rec);

        assert!(matches!(
            store.put_preferences(id, user, &valid_payload()),
            Err(AppError::Conflict(_))
        ));
    }
}
