//! ABI bindings of the destination chain contracts.

#![allow(missing_docs)]

use alloy::{primitives::FixedBytes, sol};
use stake_mirror_primitives::stake::StakeDescriptor;

sol! {
    #[sol(rpc)]
    interface IVoting {
        function getEpochConfiguration() external view returns (uint256 firstEpochStartTs, uint256 epochDurationSeconds);
        function getMerkleRoot(uint256 epochId) external view returns (bytes32);
    }

    #[sol(rpc)]
    interface IPChainStakeMirror {
        struct PChainStake {
            bytes32 txId;
            uint8 stakingType;
            bytes20 inputAddress;
            bytes20 nodeId;
            uint64 startTime;
            uint64 endTime;
            uint64 weight;
        }

        function mirrorStake(PChainStake calldata stakeData, bytes32[] calldata merkleProof) external;
        function isActiveStakeMirrored(bytes32 txId, bytes20 inputAddress) external view returns (bool);
        function addressBinder() external view returns (address);
    }

    #[sol(rpc)]
    interface IAddressBinder {
        function pAddressToCAddress(bytes20 pAddress) external view returns (address);
        function registerAddresses(bytes calldata publicKey, bytes20 pAddress, address cAddress) external;
    }
}

impl From<&StakeDescriptor> for IPChainStakeMirror::PChainStake {
    fn from(stake: &StakeDescriptor) -> Self {
        Self {
            txId: FixedBytes::from(*stake.tx_id.as_bytes()),
            stakingType: stake.kind.as_u8(),
            inputAddress: FixedBytes::from(*stake.input_address.as_bytes()),
            nodeId: FixedBytes::from(*stake.node_id.as_bytes()),
            startTime: stake.start_time,
            endTime: stake.end_time,
            weight: stake.weight,
        }
    }
}
