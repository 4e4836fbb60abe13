//! In-memory Job State Store.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use stake_mirror_primitives::{job::JobState, types::EpochIndex};
use tokio::sync::RwLock;

use crate::{
    errors::DbResult,
    job::{JobStateDb, StateUpdate},
};

/// In-memory implementation of the job state store.
#[derive(Debug, Clone, Default)]
pub struct JobStateInMemory {
    /// `next_index` per job name.
    states: Arc<RwLock<HashMap<String, EpochIndex>>>,
}

#[async_trait]
impl JobStateDb for JobStateInMemory {
    async fn fetch_state(&self, job_name: &str) -> DbResult<JobState> {
        let next_index = self
            .states
            .read()
            .await
            .get(job_name)
            .copied()
            .unwrap_or_default();

        Ok(JobState {
            job_name: job_name.to_string(),
            next_index,
        })
    }

    async fn advance_state(
        &self,
        job_name: &str,
        target_index: EpochIndex,
        force: bool,
    ) -> DbResult<StateUpdate> {
        // The write lock is held across the read-modify-write.
        let mut states = self.states.write().await;
        let current = states.get(job_name).copied().unwrap_or_default();

        if !force && current >= target_index {
            return Ok(StateUpdate::Unchanged { current });
        }

        states.insert(job_name.to_string(), target_index);

        Ok(StateUpdate::Advanced {
            from: current,
            to: target_index,
        })
    }
}
