//! Generators of source-chain data.

use rand::{thread_rng, Rng};
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use stake_mirror_primitives::{
    address::source_short_id,
    tx::{
        BaseTx, OutputOwners, RewardOwner, SourceInput, SourceOutput, SourceTransaction,
        StakeKind, TransferOutput,
    },
    types::{ShortId, SourceTxId, UnixTimestamp},
};

/// Chain alias used by tests that format source-chain addresses.
pub const TEST_CHAIN_ALIAS: &str = "P";

/// Human-readable part used by tests that format source-chain addresses.
pub const TEST_HRP: &str = "costwo";

/// Start time of the funding transactions created by [`generate_funded_stake`].
///
/// Tests must place their epochs after this so that funding transactions never show up in a
/// window.
const FUNDING_START_TIME: UnixTimestamp = 1;

/// Duration of generated stakes.
const STAKE_DURATION: u64 = 14 * 24 * 60 * 60;

pub fn generate_tx_id() -> SourceTxId {
    SourceTxId::new(thread_rng().gen())
}

pub fn generate_short_id() -> ShortId {
    ShortId::new(thread_rng().gen())
}

pub fn generate_keypair() -> (SecretKey, PublicKey) {
    let secret_key = SecretKey::new(&mut secp256k1::rand::thread_rng());

    (secret_key, secret_key.public_key(SECP256K1))
}

fn transfer(amount: u64, owner: ShortId) -> SourceOutput {
    SourceOutput::Transfer(TransferOutput {
        amount,
        owners: OutputOwners::single(owner),
    })
}

/// Generates a self-contained staking transaction starting at `start_time`.
///
/// Its input points at a random transaction that is not indexed anywhere.
pub fn generate_source_tx(start_time: UnixTimestamp) -> SourceTransaction {
    let mut rng = thread_rng();
    let (_, public_key) = generate_keypair();
    let owner = source_short_id(&public_key);

    SourceTransaction {
        id: generate_tx_id(),
        kind: if rng.gen() {
            StakeKind::Validator
        } else {
            StakeKind::Delegator
        },
        base: BaseTx {
            inputs: vec![SourceInput {
                tx_id: generate_tx_id(),
                output_index: rng.gen_range(0..4),
            }],
            outputs: vec![transfer(rng.gen_range(1..1_000_000), owner)],
        },
        reward_owner: RewardOwner::Secp256k1(OutputOwners::single(owner)),
        node_id: generate_short_id(),
        start_time,
        end_time: start_time + STAKE_DURATION,
        weight: rng.gen_range(1_000..1_000_000_000),
        signers: vec![public_key],
    }
}

/// A stake together with the transaction that funded it.
#[derive(Debug, Clone)]
pub struct FundedStake {
    /// The key that owns the funding output and signed the stake.
    pub secret_key: SecretKey,

    /// Public key of `secret_key`.
    pub public_key: PublicKey,

    /// The transaction whose first output the stake spends.
    pub funding: SourceTransaction,

    /// The staking transaction.
    pub stake: SourceTransaction,
}

impl FundedStake {
    /// The source-chain short id of the staker.
    pub fn owner(&self) -> ShortId {
        source_short_id(&self.public_key)
    }
}

/// Generates a stake starting at `start_time` that spends an output owned by a fresh key.
pub fn generate_funded_stake(start_time: UnixTimestamp) -> FundedStake {
    let (secret_key, _) = generate_keypair();

    generate_funded_stake_for(secret_key, start_time)
}

/// Generates a stake starting at `start_time` that spends an output owned by `secret_key`.
pub fn generate_funded_stake_for(secret_key: SecretKey, start_time: UnixTimestamp) -> FundedStake {
    let mut rng = thread_rng();
    let public_key = secret_key.public_key(SECP256K1);
    let owner = source_short_id(&public_key);
    let amount = rng.gen_range(1_000_000..1_000_000_000);
    let weight = rng.gen_range(1_000..amount);

    let funding = SourceTransaction {
        id: generate_tx_id(),
        kind: StakeKind::Delegator,
        base: BaseTx {
            inputs: vec![],
            outputs: vec![transfer(amount, owner)],
        },
        reward_owner: RewardOwner::Secp256k1(OutputOwners::single(owner)),
        node_id: generate_short_id(),
        start_time: FUNDING_START_TIME,
        end_time: FUNDING_START_TIME + STAKE_DURATION,
        weight: amount,
        signers: vec![public_key],
    };

    let stake = SourceTransaction {
        id: generate_tx_id(),
        kind: StakeKind::Delegator,
        base: BaseTx {
            inputs: vec![SourceInput {
                tx_id: funding.id,
                output_index: 0,
            }],
            outputs: vec![transfer(amount - weight, owner)],
        },
        reward_owner: RewardOwner::Secp256k1(OutputOwners::single(owner)),
        node_id: generate_short_id(),
        start_time,
        end_time: start_time + STAKE_DURATION,
        weight,
        signers: vec![public_key],
    };

    FundedStake {
        secret_key,
        public_key,
        funding,
        stake,
    }
}
