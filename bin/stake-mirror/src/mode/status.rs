use stake_mirror_db::job::JobStateDb;

use super::init_database_handle;
use crate::config::Config;

/// Prints the stored state of the configured job.
pub(crate) async fn status(config: Config) -> anyhow::Result<()> {
    let db = init_database_handle(&config).await?;
    let state = db.fetch_state(&config.mirror.job_name).await?;

    println!("job:        {}", state.job_name);
    println!("next epoch: {}", state.next_index);

    Ok(())
}
