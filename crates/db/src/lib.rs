//! Persistence for the stake mirror.
//!
//! Two stores are exposed as traits so that the engine can run against SQLite in production and
//! against the in-memory implementations in tests:
//!
//! - [`job::JobStateDb`]: the durable progress of a mirroring job.
//! - [`chain::ChainDataDb`]: the indexed source-chain transaction history.

pub mod chain;
pub mod errors;
pub mod inmemory;
pub mod job;
pub mod persistent;
