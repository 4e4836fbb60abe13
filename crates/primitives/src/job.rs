//! Durable progress of a named job.

use serde::{Deserialize, Serialize};

use crate::types::EpochIndex;

/// The persisted progress of a job.
///
/// `next_index` is the first epoch that has not been mirrored yet. It never decreases unless an
/// operator forces it to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobState {
    /// The job this state belongs to.
    pub job_name: String,

    /// The next epoch to mirror.
    pub next_index: EpochIndex,
}

impl JobState {
    /// The state of a job that has never run.
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            next_index: 0,
        }
    }
}
