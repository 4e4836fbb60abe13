//! The mirror engine.
//!
//! A run reads the job state, determines the epochs that have completed since the last run,
//! validates and proves every staking transaction of those epochs against the roots published on
//! the destination chain, binds addresses, submits the stakes and finally advances the job state.
//! The job state only moves once every epoch of the run succeeded.

mod cache;
pub mod config;
pub mod engine;
pub mod errors;
pub mod outcome;
