//! SQLite implementation of the stores.

use std::future::Future;

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use stake_mirror_primitives::{
    job::JobState,
    tx::SourceTransaction,
    types::{EpochIndex, SourceTxId, UnixTimestamp},
};
use tracing::{debug, warn};

use super::{config::DbConfig, errors::StorageError};
use crate::{
    chain::ChainDataDb,
    errors::{DbError, DbResult},
    job::{JobStateDb, StateUpdate},
};

/// Stores backed by a SQLite connection pool.
///
/// The schema lives in the `migrations` directory at the root of the workspace.
#[derive(Debug, Clone)]
pub struct SqliteDb {
    pool: SqlitePool,
    config: DbConfig,
}

impl SqliteDb {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            config: DbConfig::default(),
        }
    }

    /// Overrides the retry behavior.
    pub fn with_config(self, config: DbConfig) -> Self {
        Self { config, ..self }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Runs `operation` until it succeeds, fails with a non-transient error or has been retried
/// [`DbConfig::max_retry_count`] times.
pub async fn execute_with_retries<F, Fut, T>(config: &DbConfig, mut operation: F) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Err(DbError::Storage(err))
                if err.is_transient() && attempt < config.max_retry_count() =>
            {
                attempt += 1;
                warn!(
                    %err,
                    %attempt,
                    max_retry_count = %config.max_retry_count(),
                    "transient database error, retrying"
                );

                tokio::time::sleep(config.backoff_period()).await;
            }
            result => return result,
        }
    }
}

fn to_db_int(value: u64) -> Result<i64, StorageError> {
    i64::try_from(value)
        .map_err(|_| {
            StorageError::MismatchedTypes(format!("{value} does not fit in an i64 column"))
        })
}

fn from_db_int(value: i64) -> Result<u64, StorageError> {
    u64::try_from(value)
        .map_err(|_| StorageError::MismatchedTypes(format!("negative value {value} in u64 column")))
}

fn decode_body(row: &SqliteRow) -> Result<SourceTransaction, StorageError> {
    let body: String = row.try_get("body")?;

    serde_json::from_str(&body)
        .map_err(|e| StorageError::InvalidData(format!("could not decode transaction body: {e}")))
}

#[async_trait]
impl JobStateDb for SqliteDb {
    async fn fetch_state(&self, job_name: &str) -> DbResult<JobState> {
        execute_with_retries(&self.config, || fetch_job_state(&self.pool, job_name)).await
    }

    async fn advance_state(
        &self,
        job_name: &str,
        target_index: EpochIndex,
        force: bool,
    ) -> DbResult<StateUpdate> {
        execute_with_retries(&self.config, || {
            advance_job_state(&self.pool, job_name, target_index, force)
        })
        .await
    }
}

async fn fetch_job_state(pool: &SqlitePool, job_name: &str) -> DbResult<JobState> {
    let next_index: Option<i64> =
        sqlx::query_scalar("SELECT next_index FROM job_state WHERE job_name = ?")
            .bind(job_name)
            .fetch_optional(pool)
            .await
            .map_err(StorageError::from)?;

    let Some(next_index) = next_index else {
        return Ok(JobState::new(job_name));
    };

    Ok(JobState {
        job_name: job_name.to_string(),
        next_index: from_db_int(next_index)?,
    })
}

async fn advance_job_state(
    pool: &SqlitePool,
    job_name: &str,
    target_index: EpochIndex,
    force: bool,
) -> DbResult<StateUpdate> {
    let target = to_db_int(target_index)?;
    let mut tx = pool.begin().await.map_err(StorageError::from)?;

    let current: Option<i64> =
        sqlx::query_scalar("SELECT next_index FROM job_state WHERE job_name = ?")
            .bind(job_name)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StorageError::from)?;
    let current = current.map(from_db_int).transpose()?.unwrap_or_default();

    if !force && current >= target_index {
        tx.rollback().await.map_err(StorageError::from)?;
        debug!(%job_name, %current, %target_index, "job state already covers target");

        return Ok(StateUpdate::Unchanged { current });
    }

    // The guard keeps a concurrent writer that got here first from being overwritten with a
    // lower value.
    let result = sqlx::query(
        r#"INSERT INTO job_state (job_name, next_index) VALUES (?, ?)
        ON CONFLICT (job_name) DO UPDATE SET next_index = excluded.next_index
        WHERE ? OR job_state.next_index < excluded.next_index"#,
    )
    .bind(job_name)
    .bind(target)
    .bind(force)
    .execute(&mut *tx)
    .await
    .map_err(StorageError::from)?;

    if result.rows_affected() == 0 {
        tx.rollback().await.map_err(StorageError::from)?;

        return Ok(StateUpdate::Unchanged { current });
    }

    tx.commit().await.map_err(StorageError::from)?;

    Ok(StateUpdate::Advanced {
        from: current,
        to: target_index,
    })
}

#[async_trait]
impl ChainDataDb for SqliteDb {
    async fn get_transactions_in_window(
        &self,
        start: UnixTimestamp,
        end: UnixTimestamp,
    ) -> DbResult<Vec<SourceTransaction>> {
        let (start, end) = (to_db_int(start)?, to_db_int(end)?);

        execute_with_retries(&self.config, || fetch_window(&self.pool, start, end)).await
    }

    async fn get_transaction(
        &self,
        tx_id: SourceTxId,
        input_address: Option<&str>,
    ) -> DbResult<Option<SourceTransaction>> {
        let tx_id = tx_id.to_string();

        execute_with_retries(&self.config, || {
            fetch_transaction(&self.pool, &tx_id, input_address)
        })
        .await
    }

    async fn add_transaction(
        &self,
        tx: &SourceTransaction,
        input_address: Option<&str>,
    ) -> DbResult<()> {
        let tx_id = tx.id.to_string();
        let input_address = input_address.unwrap_or_default();
        let start_time = to_db_int(tx.start_time)?;
        let body = serde_json::to_string(tx).map_err(|e| {
            StorageError::InvalidData(format!("could not encode transaction {}: {e}", tx.id))
        })?;

        execute_with_retries(&self.config, || async {
            sqlx::query(
                r#"INSERT INTO source_txs (tx_id, input_address, start_time, body)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (tx_id, input_address) DO UPDATE
                SET start_time = excluded.start_time, body = excluded.body"#,
            )
            .bind(tx_id.as_str())
            .bind(input_address)
            .bind(start_time)
            .bind(body.as_str())
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| DbError::from(StorageError::from(e)))
        })
        .await
    }
}

async fn fetch_window(
    pool: &SqlitePool,
    start: i64,
    end: i64,
) -> DbResult<Vec<SourceTransaction>> {
    let rows = sqlx::query(
        r#"SELECT body FROM source_txs
        WHERE start_time >= ? AND start_time < ?
        GROUP BY tx_id
        ORDER BY MIN(start_time), MIN(rowid)"#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .map_err(StorageError::from)?;

    Ok(rows
        .iter()
        .map(decode_body)
        .collect::<Result<Vec<_>, _>>()?)
}

async fn fetch_transaction(
    pool: &SqlitePool,
    tx_id: &str,
    input_address: Option<&str>,
) -> DbResult<Option<SourceTransaction>> {
    let row = match input_address {
        Some(address) => {
            sqlx::query("SELECT body FROM source_txs WHERE tx_id = ? AND input_address = ?")
                .bind(tx_id)
                .bind(address)
                .fetch_optional(pool)
                .await
        }
        None => {
            sqlx::query("SELECT body FROM source_txs WHERE tx_id = ? ORDER BY rowid LIMIT 1")
                .bind(tx_id)
                .fetch_optional(pool)
                .await
        }
    }
    .map_err(StorageError::from)?;

    Ok(row.as_ref().map(decode_body).transpose()?)
}
