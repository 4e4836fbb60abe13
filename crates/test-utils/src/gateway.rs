//! A scriptable in-process [`DestinationGateway`].

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use alloy::primitives::B256;
use async_trait::async_trait;
use secp256k1::PublicKey;
use stake_mirror_contracts::{
    errors::{GatewayError, GatewayResult},
    gateway::DestinationGateway,
};
use stake_mirror_primitives::{
    address::source_short_id,
    epoch::EpochConfig,
    merkle::MerkleTree,
    stake::{StakeDescriptor, StakeMirrorProof},
    types::{EpochIndex, ShortId, SourceTxId},
};

/// A write the engine issued against the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayWrite {
    /// `register_binding` for the given source-chain address.
    RegisterBinding(ShortId),

    /// `submit_stake_mirror` with the given payload.
    MirrorStake(StakeMirrorProof),
}

#[derive(Debug, Default)]
struct State {
    epoch_config: Option<EpochConfig>,
    roots: HashMap<EpochIndex, B256>,
    bound: HashSet<ShortId>,
    mirrored: HashSet<(SourceTxId, ShortId)>,
    reverting: HashSet<SourceTxId>,
    writes: Vec<GatewayWrite>,
    reads: usize,
}

/// Behaves like the destination contracts: roots are published per epoch, a mirror submission is
/// only accepted with a valid proof for a bound address, and every write is recorded.
///
/// Clones share their state.
#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<State>>,
}

impl FakeGateway {
    /// A gateway that reports `epoch_config`.
    pub fn new(epoch_config: EpochConfig) -> Self {
        let gateway = Self::default();
        gateway.state().epoch_config = Some(epoch_config);

        gateway
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake gateway state must not be poisoned")
    }

    /// Publishes `root` for `epoch`.
    pub fn publish_root(&self, epoch: EpochIndex, root: B256) {
        self.state().roots.insert(epoch, root);
    }

    /// Publishes the root of the tree built from `stakes` for `epoch`.
    pub fn publish_stakes<'a>(
        &self,
        epoch: EpochIndex,
        stakes: impl IntoIterator<Item = &'a StakeDescriptor>,
    ) {
        let tree = MerkleTree::from_leaves(stakes.into_iter().map(StakeDescriptor::leaf_hash));
        // An empty epoch still gets a non-zero root on chain.
        let root = tree.root().unwrap_or(B256::repeat_byte(0xee));

        self.publish_root(epoch, root);
    }

    /// Marks `address` as bound.
    pub fn bind(&self, address: ShortId) {
        self.state().bound.insert(address);
    }

    /// Marks `stake` as already mirrored.
    pub fn mark_mirrored(&self, stake: &StakeDescriptor) {
        self.state()
            .mirrored
            .insert((stake.tx_id, stake.input_address));
    }

    /// Makes every submission of `tx_id` revert.
    pub fn revert_submissions_of(&self, tx_id: SourceTxId) {
        self.state().reverting.insert(tx_id);
    }

    /// Makes the epoch configuration unreadable.
    pub fn clear_epoch_config(&self) {
        self.state().epoch_config = None;
    }

    /// All writes in the order they were issued, including reverted ones.
    pub fn writes(&self) -> Vec<GatewayWrite> {
        self.state().writes.clone()
    }

    /// The stake submissions that were issued.
    pub fn submissions(&self) -> Vec<StakeMirrorProof> {
        self.state()
            .writes
            .iter()
            .filter_map(|w| match w {
                GatewayWrite::MirrorStake(proof) => Some(proof.clone()),
                GatewayWrite::RegisterBinding(_) => None,
            })
            .collect()
    }

    /// The bindings that were registered.
    pub fn registrations(&self) -> Vec<ShortId> {
        self.state()
            .writes
            .iter()
            .filter_map(|w| match w {
                GatewayWrite::RegisterBinding(address) => Some(*address),
                GatewayWrite::MirrorStake(_) => None,
            })
            .collect()
    }

    /// The number of read calls served.
    pub fn reads(&self) -> usize {
        self.state().reads
    }
}

fn reverted(operation: &'static str) -> GatewayError {
    GatewayError::SubmissionReverted {
        operation,
        reason: "execution reverted".to_string(),
    }
}

#[async_trait]
impl DestinationGateway for FakeGateway {
    async fn get_epoch_config(&self) -> GatewayResult<EpochConfig> {
        let mut state = self.state();
        state.reads += 1;

        state.epoch_config.ok_or_else(|| {
            GatewayError::ConfigUnavailable("voting contract unreachable".to_string())
        })
    }

    async fn get_merkle_root(&self, epoch: EpochIndex) -> GatewayResult<B256> {
        let mut state = self.state();
        state.reads += 1;

        state
            .roots
            .get(&epoch)
            .copied()
            .ok_or(GatewayError::RootNotPublished { epoch })
    }

    async fn is_address_registered(&self, address: &ShortId) -> GatewayResult<bool> {
        let mut state = self.state();
        state.reads += 1;

        Ok(state.bound.contains(address))
    }

    async fn register_binding(&self, public_key: &PublicKey) -> GatewayResult<()> {
        let address = source_short_id(public_key);
        let mut state = self.state();

        state.writes.push(GatewayWrite::RegisterBinding(address));
        if !state.bound.insert(address) {
            return Err(reverted("registerAddresses"));
        }

        Ok(())
    }

    async fn is_stake_mirrored(&self, stake: &StakeDescriptor) -> GatewayResult<bool> {
        let mut state = self.state();
        state.reads += 1;

        Ok(state
            .mirrored
            .contains(&(stake.tx_id, stake.input_address)))
    }

    async fn submit_stake_mirror(&self, proof: &StakeMirrorProof) -> GatewayResult<()> {
        let mut state = self.state();
        state.writes.push(GatewayWrite::MirrorStake(proof.clone()));

        let stake = &proof.stake;
        let valid_proof = state.roots.get(&proof.epoch).is_some_and(|root| {
            *root == proof.root && MerkleTree::verify(root, &stake.leaf_hash(), &proof.proof)
        });

        if !valid_proof
            || !state.bound.contains(&stake.input_address)
            || state.reverting.contains(&stake.tx_id)
            || !state.mirrored.insert((stake.tx_id, stake.input_address))
        {
            return Err(reverted("mirrorStake"));
        }

        Ok(())
    }
}
