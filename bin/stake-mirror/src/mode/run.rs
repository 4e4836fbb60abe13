//! Runs the engine on a fixed interval until interrupted.

use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use super::{init_database_handle, init_engine, log_outcome};
use crate::config::Config;

/// Starts a run on every tick. Runs never overlap and are never cut short: an interrupt is only
/// acted on between two runs.
pub(crate) async fn run(config: Config) -> anyhow::Result<()> {
    let db = init_database_handle(&config).await?;
    let engine = init_engine(&config, db).await?;

    let mut ticker = time::interval(config.mirror.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(interval = ?config.mirror.interval, job = %config.mirror.job_name, "scheduler started");

    loop {
        tokio::select! {
            biased;

            signal = &mut shutdown => {
                signal?;
                info!("received interrupt, stopping");
                break;
            }
            _ = ticker.tick() => {}
        }

        log_outcome(&engine.run().await);
    }

    Ok(())
}
