//! Defaults of the persistence layer.

use std::time::Duration;

/// The number of times a transient database failure is retried before erroring out.
pub const DEFAULT_MAX_RETRY_COUNT: usize = 3;

/// How long to wait before retrying a failed database operation.
pub const DEFAULT_BACKOFF_PERIOD: Duration = Duration::from_millis(500);

/// The name of the SQLite file inside the data directory.
pub const DB_FILE_NAME: &str = "stake-mirror.db";
