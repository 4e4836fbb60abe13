//! Runs the engine a single time and exits.

use anyhow::bail;

use super::{init_database_handle, init_engine, log_outcome};
use crate::config::Config;

/// A single run. Fails if the run fails.
pub(crate) async fn once(config: Config) -> anyhow::Result<()> {
    let db = init_database_handle(&config).await?;
    let engine = init_engine(&config, db).await?;

    let result = engine.run().await;
    log_outcome(&result);

    if let Err(e) = result {
        bail!("run failed ({}): {e}", e.kind());
    }

    Ok(())
}
