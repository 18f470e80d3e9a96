use crate::error::EvoResult;
use crate::problem::Problem;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content hash of a compiled problem, taken at round start. Two rounds
/// share a snapshot id iff they saw identical entities and preferences,
/// which is what makes "edits apply next round" observable.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotId(String);

impl SnapshotId {
    pub fn of(problem: &Problem) -> EvoResult<Self> {
        let bytes = serde_json::to_vec(problem)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());
        Ok(Self(digest[..16].to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
