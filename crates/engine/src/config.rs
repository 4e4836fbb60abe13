//! Engine configuration.

use std::num::NonZeroUsize;

use stake_mirror_primitives::{address::AddressCodec, types::EpochIndex};

/// Static settings of a [`MirrorEngine`](crate::engine::MirrorEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The key of the job state.
    pub job_name: String,

    /// Epochs before this one are never mirrored, even on the very first run.
    pub first_epoch: EpochIndex,

    /// How many transactions of an epoch are prepared concurrently.
    pub concurrency: NonZeroUsize,

    /// Encodes the source-chain addresses.
    pub codec: AddressCodec,
}
