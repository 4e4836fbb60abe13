//! The commands of the stake mirror and the bootstrapping they share.

use std::{env, fs};

use anyhow::Context;
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use stake_mirror_contracts::{evm, gateway::DestinationGateway};
use stake_mirror_db::persistent::{constants::DB_FILE_NAME, sqlite::SqliteDb};
use stake_mirror_engine::{engine::MirrorEngine, errors::MirrorError, outcome::RunOutcome};
use tracing::{error, info};

use crate::config::Config;

pub(crate) mod once;
pub(crate) mod run;
pub(crate) mod set_state;
pub(crate) mod status;

/// Opens the database in the data directory, creating it if needed, and migrates it.
pub(crate) async fn init_database_handle(config: &Config) -> anyhow::Result<SqliteDb> {
    let datadir = &config.datadir;
    fs::create_dir_all(datadir)
        .with_context(|| format!("could not create datadir at {}", datadir.display()))?;

    let connect_options = SqliteConnectOptions::new()
        .filename(datadir.join(DB_FILE_NAME))
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await
        .context("could not connect to db")?;

    let migrations_path = env::current_dir()
        .context("could not get current working directory")?
        .join("migrations");
    info!(?migrations_path, "migrations path");

    let migrator = Migrator::new(migrations_path)
        .await
        .context("could not initialize migrator")?;

    info!(action = "running migrations", %DB_FILE_NAME);
    migrator
        .run(&pool)
        .await
        .context("could not run migrations")?;

    Ok(SqliteDb::new(pool).with_config(config.db))
}

/// Checks the configuration, connects to the destination chain and assembles the engine.
pub(crate) async fn init_engine(
    config: &Config,
    db: SqliteDb,
) -> anyhow::Result<MirrorEngine<SqliteDb, SqliteDb, impl DestinationGateway>> {
    let engine_config = config.engine_config()?;
    let gateway_config = config.gateway_config()?;
    let signer = config.chain.signer()?;

    let gateway = evm::connect(&gateway_config, signer).await?;

    Ok(MirrorEngine::new(engine_config, db.clone(), db, gateway))
}

/// Logs how a run ended.
pub(crate) fn log_outcome(result: &Result<RunOutcome, MirrorError>) {
    match result {
        Ok(RunOutcome::NoEpochDue {
            state,
            last_completed,
        }) => {
            info!(next_index = %state.next_index, ?last_completed, "no epoch due");
        }
        Ok(RunOutcome::RootNotPublished { state, epoch }) => {
            info!(next_index = %state.next_index, %epoch, "waiting for merkle root");
        }
        Ok(RunOutcome::Mirrored(report)) => {
            info!(
                from = %report.from_epoch,
                to = %report.to_epoch,
                submitted = %report.submitted,
                skipped = %report.skipped,
                bindings = %report.bindings,
                next_index = %report.state.next_index,
                "run complete"
            );
        }
        Err(e) => {
            error!(kind = %e.kind(), %e, "run failed, job state left unchanged");
        }
    }
}
