use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of one optimization job (a sequence of bounded rounds for a
/// single recruitment).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SubmitJobResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CancelJobResponse {
    pub message: String,
    pub job_id: Uuid,
    pub status: JobStatus,
}
