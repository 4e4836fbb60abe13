//! The Destination Contract Gateway.

use alloy::primitives::B256;
use async_trait::async_trait;
use secp256k1::PublicKey;
use stake_mirror_primitives::{
    epoch::EpochConfig,
    stake::{StakeDescriptor, StakeMirrorProof},
    types::{EpochIndex, ShortId},
};

use crate::errors::GatewayResult;

/// Calls made to the destination chain.
///
/// Reads are side-effect free. Writes are signed with the operator's credential and resolve once
/// the transaction is mined; a mined but reverted transaction is an error.
#[async_trait]
pub trait DestinationGateway: Send + Sync {
    /// Reads the epoch configuration.
    ///
    /// Fails with [`GatewayError::ConfigUnavailable`](crate::errors::GatewayError::ConfigUnavailable)
    /// if it cannot be read.
    async fn get_epoch_config(&self) -> GatewayResult<EpochConfig>;

    /// Reads the Merkle root published for `epoch`.
    ///
    /// Fails with [`GatewayError::RootNotPublished`](crate::errors::GatewayError::RootNotPublished)
    /// while the root is still zero.
    async fn get_merkle_root(&self, epoch: EpochIndex) -> GatewayResult<B256>;

    /// Whether `address` is bound to a destination-chain address.
    async fn is_address_registered(&self, address: &ShortId) -> GatewayResult<bool>;

    /// Binds the source-chain address of `public_key` to its destination-chain address.
    async fn register_binding(&self, public_key: &PublicKey) -> GatewayResult<()>;

    /// Whether `stake` is already mirrored and active.
    async fn is_stake_mirrored(&self, stake: &StakeDescriptor) -> GatewayResult<bool>;

    /// Mirrors a stake together with its inclusion proof.
    async fn submit_stake_mirror(&self, proof: &StakeMirrorProof) -> GatewayResult<()>;
}
