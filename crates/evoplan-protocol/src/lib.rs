//! Wire types shared between the optimization engine and the HTTP service.
//!
//! Field names here are the binding contract consumed by the web client:
//! the `preferences_data` payload, the job-status polling snapshot and the
//! job submission/cancellation envelopes. No engine logic lives in this
//! crate.

pub mod job;
pub mod preferences;
pub mod status;
