//! The Job State Store.

use async_trait::async_trait;
use stake_mirror_primitives::{job::JobState, types::EpochIndex};

use crate::errors::DbResult;

/// The effect of an [`JobStateDb::advance_state`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateUpdate {
    /// `next_index` was set to `to`.
    ///
    /// `to` is lower than `from` only when the update was forced.
    Advanced {
        /// The previous value.
        from: EpochIndex,

        /// The new value.
        to: EpochIndex,
    },

    /// The stored state already covers the target and nothing was written.
    Unchanged {
        /// The stored value.
        current: EpochIndex,
    },
}

impl StateUpdate {
    /// The value of `next_index` after the update.
    pub const fn next_index(&self) -> EpochIndex {
        match self {
            StateUpdate::Advanced { to, .. } => *to,
            StateUpdate::Unchanged { current } => *current,
        }
    }
}

/// Durable progress of named jobs.
#[async_trait]
pub trait JobStateDb {
    /// Returns the state of `job_name`, or [`JobState::new`] if the job has never been advanced.
    async fn fetch_state(&self, job_name: &str) -> DbResult<JobState>;

    /// Atomically moves `next_index` of `job_name` to `target_index`.
    ///
    /// Unless `force` is set this is a no-op when the stored `next_index` is already at or past
    /// `target_index`, so that a duplicate or late run can never move the job backwards.
    async fn advance_state(
        &self,
        job_name: &str,
        target_index: EpochIndex,
        force: bool,
    ) -> DbResult<StateUpdate>;
}
