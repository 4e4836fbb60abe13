//! In-memory implementations of the stores, used in tests and dry runs.

pub mod chain;
pub mod job;

pub mod prelude {
    pub use super::{chain::ChainDataInMemory, job::JobStateInMemory};
}
