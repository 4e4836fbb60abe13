//! Behavior shared by the stake mirror binaries, currently the setup of logging and tracing.

pub mod logging;

// Re-exported so that binaries log through the same `tracing` version.
pub use tracing;
