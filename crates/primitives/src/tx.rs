//! The source-chain transaction model as read from the indexed chain data and the normalized
//! input/output records derived from it.
//!
//! The source chain follows the UTXO model: inputs reference a prior transaction's output by
//! transaction id and output index. Outputs come in several kinds but only
//! [`SourceOutput::Transfer`] is accepted by the reconstructor, see
//! [`crate::reconstruct::build_outputs`].

use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

use crate::types::{NodeId, ShortId, SourceTxId, UnixTimestamp};

/// The kind of stake a source transaction creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeKind {
    /// The transaction adds a validator with self-stake.
    Validator,

    /// The transaction delegates stake to an existing validator.
    Delegator,
}

impl StakeKind {
    /// The `stakingType` discriminant used by the mirroring contract.
    pub const fn as_u8(&self) -> u8 {
        match self {
            StakeKind::Validator => 0,
            StakeKind::Delegator => 1,
        }
    }
}

/// The set of addresses that own an output together with its spending conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputOwners {
    /// Time before which the output cannot be spent.
    pub locktime: u64,

    /// Number of signatures required to spend.
    pub threshold: u32,

    /// The owner addresses.
    pub addresses: Vec<ShortId>,
}

impl OutputOwners {
    /// A spendable, single-signature owner set.
    pub fn single(address: ShortId) -> Self {
        Self {
            locktime: 0,
            threshold: 1,
            addresses: vec![address],
        }
    }
}

/// A plain transfer of native tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferOutput {
    /// Amount in the native token's smallest unit.
    pub amount: u64,

    /// Who can spend it.
    pub owners: OutputOwners,
}

/// An output of a source-chain transaction.
///
/// This is a closed set of the output kinds the source chain can produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceOutput {
    /// A simple transfer.
    Transfer(TransferOutput),

    /// A transfer that can only be staked until `locktime`.
    StakeableLocked {
        /// Time until which the funds are locked.
        locktime: u64,

        /// The wrapped transfer.
        transfer: TransferOutput,
    },

    /// A minting capability.
    Mint(OutputOwners),
}

impl SourceOutput {
    /// Name of the kind for diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            SourceOutput::Transfer(_) => "transfer",
            SourceOutput::StakeableLocked { .. } => "stakeable_locked",
            SourceOutput::Mint(_) => "mint",
        }
    }
}

/// A reference to the output of a prior transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceInput {
    /// The transaction that created the spent output.
    pub tx_id: SourceTxId,

    /// The position of the spent output in that transaction.
    pub output_index: u32,
}

/// Who receives the staking rewards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardOwner {
    /// A secp256k1 owner set.
    Secp256k1(OutputOwners),

    /// Any other ownership scheme the indexer encountered.
    Unsupported {
        /// The type name reported by the indexer.
        name: String,
    },
}

/// The inputs and outputs common to every source-chain transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseTx {
    /// The consumed outputs, in transaction order.
    pub inputs: Vec<SourceInput>,

    /// The produced outputs, in transaction order.
    pub outputs: Vec<SourceOutput>,
}

/// A staking transaction of the source chain as stored by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTransaction {
    /// The transaction id.
    pub id: SourceTxId,

    /// Validator or delegator stake.
    pub kind: StakeKind,

    /// Inputs and outputs.
    pub base: BaseTx,

    /// Recipient of staking rewards.
    pub reward_owner: RewardOwner,

    /// The validator the stake is attached to.
    pub node_id: NodeId,

    /// When the stake becomes active. This is the timestamp used for epoch windows.
    pub start_time: UnixTimestamp,

    /// When the stake ends.
    pub end_time: UnixTimestamp,

    /// Staked amount in the native token's smallest unit.
    pub weight: u64,

    /// Compressed public keys recovered from the transaction's credentials.
    pub signers: Vec<PublicKey>,
}

/// A normalized transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxOutput {
    /// The transaction that created the output.
    pub tx_id: SourceTxId,

    /// The position of the output in the transaction.
    pub index: u32,

    /// The transferred amount.
    pub amount: u64,

    /// The chain-native encoding of the single owner.
    pub address: String,
}

/// A normalized transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxInput {
    /// The spending transaction.
    pub tx_id: SourceTxId,

    /// The transaction that created the spent output.
    pub out_tx_id: SourceTxId,

    /// The position of the spent output.
    pub out_index: u32,

    /// The owner of the spent output.
    ///
    /// Never set at reconstruction time; it is resolved later from the referenced output.
    pub address: Option<String>,
}
