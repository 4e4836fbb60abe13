use thiserror::Error;

use crate::persistent::errors::StorageError;

/// Errors returned by every store in this crate.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite: {0}")]
    Storage(#[from] StorageError),
}

pub type DbResult<T> = Result<T, DbError>;
