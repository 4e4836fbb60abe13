//! This crate contains the data model, the pure functions and the small amount of cryptography
//! that the rest of the stake mirror workspace shares.
//!
//! It lies at the bottom of the crate-hierarchy in this workspace i.e., it does not depend on any
//! other crate in this workspace and performs no I/O.

pub mod address;
pub mod epoch;
pub mod errors;
pub mod job;
pub mod merkle;
pub mod reconstruct;
pub mod stake;
pub mod tx;
pub mod types;
