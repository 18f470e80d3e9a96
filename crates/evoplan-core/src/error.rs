use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvoError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    /// The constraint set admits no legal schedule (or none was found within
    /// the initialization budget). Carries a diagnosable reason; a job that
    /// hits this must report `failed`, never a partially-violating schedule.
    #[error("Infeasible Problem: {0}")]
    Infeasible(String),
}

pub type EvoResult<T> = Result<T, EvoError>;
