//! Errors of the SQLite stores.

use thiserror::Error;

/// Errors that can occur when reading from or writing to the SQLite database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The driver failed, e.g. the database is locked or the connection dropped.
    #[error("sqlite: {0}")]
    Driver(#[from] sqlx::Error),

    /// A value does not fit the column type it is stored in.
    #[error("conversion: {0}")]
    MismatchedTypes(String),

    /// A stored row could not be decoded.
    #[error("data: {0}")]
    InvalidData(String),
}

impl StorageError {
    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Driver(sqlx::Error::Database(e)) => {
                // SQLITE_BUSY and SQLITE_LOCKED, including their extended codes.
                let primary = e
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| code & 0xff);

                matches!(primary, Some(5) | Some(6))
            }
            StorageError::Driver(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) => true,
            _ => false,
        }
    }
}
