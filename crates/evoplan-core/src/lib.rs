//! Preference-weighted timetable engine: problem model, feasibility rules,
//! preference scoring and the genetic search loop. CPU-bound and sync; the
//! HTTP layer lives in `evoplan-service`.

pub mod config;
pub mod error;
pub mod feasibility;
pub mod generator;
pub mod job;
pub mod model;
pub mod optimizer;
pub mod preferences;
pub mod problem;
pub mod scorer;

pub use error::{EvoError, EvoResult};
pub use problem::Problem;

pub use evoplan_protocol as protocol;
