//! The stake descriptor mirrored to the destination chain and its inclusion proof.

use alloy_primitives::{keccak256, FixedBytes, B256};
use alloy_sol_types::{sol_data, SolType};
use serde::{Deserialize, Serialize};

use crate::{
    tx::StakeKind,
    types::{EpochIndex, NodeId, ShortId, SourceTxId, UnixTimestamp},
};

/// The on-chain representation of one source-chain stake.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakeDescriptor {
    /// The staking transaction.
    pub tx_id: SourceTxId,

    /// Validator or delegator stake.
    pub kind: StakeKind,

    /// The short id of the address that funded the stake.
    pub input_address: ShortId,

    /// The validator the stake is attached to.
    pub node_id: NodeId,

    /// Stake start.
    pub start_time: UnixTimestamp,

    /// Stake end.
    pub end_time: UnixTimestamp,

    /// Staked amount.
    pub weight: u64,
}

impl StakeDescriptor {
    /// The ABI encoding of the descriptor as a static `PChainStake` tuple.
    pub fn abi_encode(&self) -> Vec<u8> {
        <(
            sol_data::FixedBytes<32>,
            sol_data::Uint<8>,
            sol_data::FixedBytes<20>,
            sol_data::FixedBytes<20>,
            sol_data::Uint<64>,
            sol_data::Uint<64>,
            sol_data::Uint<64>,
        )>::abi_encode(&(
            B256::from(*self.tx_id.as_bytes()),
            self.kind.as_u8(),
            FixedBytes::<20>::from(*self.input_address.as_bytes()),
            FixedBytes::<20>::from(*self.node_id.as_bytes()),
            self.start_time,
            self.end_time,
            self.weight,
        ))
    }

    /// The Merkle leaf of the descriptor: `keccak256(abi.encode(stake))`.
    pub fn leaf_hash(&self) -> B256 {
        keccak256(self.abi_encode())
    }
}

/// A stake descriptor together with the proof of its inclusion under an epoch's Merkle root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeMirrorProof {
    /// The epoch whose root the proof verifies against.
    pub epoch: EpochIndex,

    /// The root published for `epoch`.
    pub root: B256,

    /// The mirrored stake.
    pub stake: StakeDescriptor,

    /// Sibling hashes from the leaf up to the root.
    pub proof: Vec<B256>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> StakeDescriptor {
        StakeDescriptor {
            tx_id: SourceTxId::new([1; 32]),
            kind: StakeKind::Delegator,
            input_address: ShortId::new([2; 20]),
            node_id: ShortId::new([3; 20]),
            start_time: 10,
            end_time: 20,
            weight: 30,
        }
    }

    #[test]
    fn test_abi_layout() {
        let encoded = descriptor().abi_encode();

        assert_eq!(encoded.len(), 7 * 32, "static struct is 7 words");
        assert_eq!(&encoded[..32], &[1u8; 32]);
        assert_eq!(encoded[63], 1, "delegator is staking type 1");
        // bytesN are left-aligned.
        assert_eq!(&encoded[64..84], &[2u8; 20]);
        assert_eq!(&encoded[96..116], &[3u8; 20]);
        assert_eq!(encoded[159], 10);
        assert_eq!(encoded[191], 20);
        assert_eq!(encoded[223], 30);
    }

    #[test]
    fn test_leaf_hash_depends_on_every_field() {
        let base = descriptor();
        let mut changed = base.clone();
        changed.weight += 1;

        assert_ne!(base.leaf_hash(), changed.leaf_hash());
        assert_eq!(base.leaf_hash(), descriptor().leaf_hash());
    }
}
