use stake_mirror_db::job::{JobStateDb, StateUpdate};
use stake_mirror_primitives::types::EpochIndex;
use tracing::{info, warn};

use super::init_database_handle;
use crate::config::Config;

/// Moves the job state to `index`. Without `force` the state only ever moves forward.
pub(crate) async fn set_state(
    config: Config,
    index: EpochIndex,
    force: bool,
) -> anyhow::Result<()> {
    let db = init_database_handle(&config).await?;
    let job_name = &config.mirror.job_name;

    match db.advance_state(job_name, index, force).await? {
        StateUpdate::Advanced { from, to } => {
            info!(%job_name, %from, %to, %force, "job state updated");
        }
        StateUpdate::Unchanged { current } => {
            warn!(
                %job_name,
                %current,
                requested = %index,
                "job state not moved backwards, pass --force to override"
            );
        }
    }

    Ok(())
}
