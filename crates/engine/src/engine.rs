//! The orchestrator of a mirroring run.

use std::{collections::HashSet, ops::AddAssign};

use alloy_primitives::B256;
use chrono::Utc;
use futures::{stream, StreamExt, TryStreamExt};
use secp256k1::PublicKey;
use stake_mirror_contracts::{errors::GatewayError, gateway::DestinationGateway};
use stake_mirror_db::{chain::ChainDataDb, job::JobStateDb};
use stake_mirror_primitives::{
    address::source_short_id,
    epoch::EpochWindow,
    job::JobState,
    merkle::MerkleTree,
    reconstruct::{build_inputs, build_outputs, resolve_reward_owner_address},
    stake::{StakeDescriptor, StakeMirrorProof},
    tx::{SourceTransaction, TxInput},
    types::{EpochIndex, UnixTimestamp},
};
use tracing::{debug, info, instrument};

use crate::{
    cache::OutputCache,
    config::EngineConfig,
    errors::MirrorError,
    outcome::{EpochReport, MirrorReport, RunOutcome},
};

/// A staking transaction that passed validation and is ready to be mirrored.
#[derive(Debug, Clone)]
struct PreparedStake {
    descriptor: StakeDescriptor,
    leaf: B256,

    /// The key that owns the staked input.
    signer: PublicKey,

    /// Whether the stake still has to be submitted.
    pending: bool,
}

impl AddAssign for EpochReport {
    fn add_assign(&mut self, other: Self) {
        self.transactions += other.transactions;
        self.submitted += other.submitted;
        self.skipped += other.skipped;
        self.bindings += other.bindings;
    }
}

/// Mirrors completed epochs of source-chain stakes to the destination chain.
#[derive(Debug)]
pub struct MirrorEngine<J, C, G> {
    config: EngineConfig,
    job_db: J,
    chain_db: C,
    gateway: G,
}

impl<J, C, G> MirrorEngine<J, C, G>
where
    J: JobStateDb + Send + Sync,
    C: ChainDataDb + Send + Sync,
    G: DestinationGateway,
{
    pub fn new(config: EngineConfig, job_db: J, chain_db: C, gateway: G) -> Self {
        Self {
            config,
            job_db,
            chain_db,
            gateway,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the job against the current wall-clock time.
    pub async fn run(&self) -> Result<RunOutcome, MirrorError> {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();

        self.run_at(now).await
    }

    /// Runs the job as if the current time were `now`.
    ///
    /// Every epoch from the stored `next_index` (or the configured first epoch) up to the latest
    /// completed one is mirrored. All roots are read and every transaction is validated before
    /// anything is written to the destination chain. The job state is advanced once, after the
    /// last epoch succeeded.
    #[instrument(skip(self), fields(job = %self.config.job_name))]
    pub async fn run_at(&self, now: UnixTimestamp) -> Result<RunOutcome, MirrorError> {
        let job_name = &self.config.job_name;
        let state = self.job_db.fetch_state(job_name).await?;
        let epochs = self.gateway.get_epoch_config().await?;

        let start = state.next_index.max(self.config.first_epoch);
        let last_completed = epochs.last_completed(now);
        let Some(target) = last_completed.filter(|target| *target >= start) else {
            debug!(next_index = %state.next_index, ?last_completed, "no epoch due");

            return Ok(RunOutcome::NoEpochDue {
                state,
                last_completed,
            });
        };

        let roots = match self.fetch_roots(start, target).await {
            Ok(roots) => roots,
            Err(MirrorError::Gateway(GatewayError::RootNotPublished { epoch })) => {
                info!(%epoch, "merkle root not published yet, deferring to the next run");

                return Ok(RunOutcome::RootNotPublished { state, epoch });
            }
            Err(err) => return Err(err),
        };

        info!(%start, %target, "mirroring epochs");

        let cache = OutputCache::default();
        let mut totals = EpochReport::default();
        for (epoch, root) in (start..=target).zip(roots) {
            totals += self
                .mirror_epoch(epochs.window(epoch), root, now, &cache)
                .await?;
        }

        let update = self
            .job_db
            .advance_state(job_name, target.saturating_add(1), false)
            .await?;
        let state = JobState {
            job_name: job_name.clone(),
            next_index: update.next_index(),
        };

        info!(
            next_index = %state.next_index,
            transactions = %totals.transactions,
            submitted = %totals.submitted,
            skipped = %totals.skipped,
            bindings = %totals.bindings,
            "mirrored epochs"
        );

        Ok(RunOutcome::Mirrored(MirrorReport {
            from_epoch: start,
            to_epoch: target,
            transactions: totals.transactions,
            submitted: totals.submitted,
            skipped: totals.skipped,
            bindings: totals.bindings,
            update,
            state,
        }))
    }

    /// Reads the roots of `start..=target`, the target first since it is the one most likely to
    /// be missing.
    async fn fetch_roots(
        &self,
        start: EpochIndex,
        target: EpochIndex,
    ) -> Result<Vec<B256>, MirrorError> {
        let target_root = self.gateway.get_merkle_root(target).await?;

        let mut roots = Vec::new();
        for epoch in start..target {
            roots.push(self.gateway.get_merkle_root(epoch).await?);
        }
        roots.push(target_root);

        Ok(roots)
    }

    #[instrument(skip_all, fields(epoch = %window.index))]
    async fn mirror_epoch(
        &self,
        window: EpochWindow,
        root: B256,
        now: UnixTimestamp,
        cache: &OutputCache,
    ) -> Result<EpochReport, MirrorError> {
        let txs = self
            .chain_db
            .get_transactions_in_window(window.start, window.end)
            .await?;
        debug!(
            count = %txs.len(),
            start = %window.start,
            end = %window.end,
            "fetched transactions"
        );

        let prepared: Vec<PreparedStake> = stream::iter(&txs)
            .map(|tx| self.prepare(tx, now, cache))
            .buffered(self.config.concurrency.get())
            .try_collect()
            .await?;

        let tree = MerkleTree::from_leaves(prepared.iter().map(|stake| stake.leaf));
        if let Some(computed) = tree.root() {
            if computed != root {
                return Err(MirrorError::MerkleRootMismatch {
                    epoch: window.index,
                    published: root,
                    computed,
                });
            }
        }

        let mut report = EpochReport {
            transactions: txs.len(),
            ..Default::default()
        };

        let mut checked = HashSet::new();
        for stake in prepared.iter().filter(|stake| stake.pending) {
            let address = stake.descriptor.input_address;
            if !checked.insert(address) || self.gateway.is_address_registered(&address).await? {
                continue;
            }

            self.gateway.register_binding(&stake.signer).await?;
            report.bindings += 1;
            info!(%address, "registered address binding");
        }

        for stake in &prepared {
            if !stake.pending {
                debug!(tx_id = %stake.descriptor.tx_id, "stake already mirrored or ended");
                report.skipped += 1;
                continue;
            }

            let proof = tree
                .proof(&stake.leaf)
                .ok_or(MirrorError::MerkleRootMismatch {
                    epoch: window.index,
                    published: root,
                    computed: stake.leaf,
                })?;

            self.gateway
                .submit_stake_mirror(&StakeMirrorProof {
                    epoch: window.index,
                    root,
                    stake: stake.descriptor.clone(),
                    proof,
                })
                .await?;
            report.submitted += 1;
            debug!(tx_id = %stake.descriptor.tx_id, "submitted stake");
        }

        Ok(report)
    }

    /// Validates a staking transaction and builds its descriptor. Performs no writes.
    async fn prepare(
        &self,
        tx: &SourceTransaction,
        now: UnixTimestamp,
        cache: &OutputCache,
    ) -> Result<PreparedStake, MirrorError> {
        let codec = &self.config.codec;

        let outputs = build_outputs(codec, tx.id, &tx.base.outputs)?;
        cache.insert_all(&outputs).await;

        let reward_address = resolve_reward_owner_address(codec, &tx.reward_owner)?;

        let input = build_inputs(tx.id, &tx.base)
            .into_iter()
            .next()
            .ok_or(MirrorError::MissingInput(tx.id))?;
        let input = self.resolve_input(input, cache).await?;
        let input_address = match &input.address {
            Some(address) => codec.parse(address)?,
            None => {
                return Err(MirrorError::UnresolvedInput {
                    tx_id: tx.id,
                    out_tx_id: input.out_tx_id,
                    out_index: input.out_index,
                })
            }
        };

        let signer = tx
            .signers
            .iter()
            .find(|key| source_short_id(key) == input_address)
            .copied()
            .ok_or(MirrorError::NoMatchingSigner {
                tx_id: tx.id,
                input_address,
            })?;

        let descriptor = StakeDescriptor {
            tx_id: tx.id,
            kind: tx.kind,
            input_address,
            node_id: tx.node_id,
            start_time: tx.start_time,
            end_time: tx.end_time,
            weight: tx.weight,
        };

        let pending =
            descriptor.end_time > now && !self.gateway.is_stake_mirrored(&descriptor).await?;

        debug!(tx_id = %tx.id, %input_address, %reward_address, %pending, "prepared stake");

        Ok(PreparedStake {
            leaf: descriptor.leaf_hash(),
            descriptor,
            signer,
            pending,
        })
    }

    /// Fills in the address of `input` from the outputs seen in this run or, failing that, from
    /// the indexed transaction that created the spent output.
    async fn resolve_input(
        &self,
        mut input: TxInput,
        cache: &OutputCache,
    ) -> Result<TxInput, MirrorError> {
        if input.address.is_some() {
            return Ok(input);
        }

        if let Some(address) = cache.get(input.out_tx_id, input.out_index).await {
            input.address = Some(address);
            return Ok(input);
        }

        let Some(source) = self.chain_db.get_transaction(input.out_tx_id, None).await? else {
            return Ok(input);
        };

        let outputs = build_outputs(&self.config.codec, source.id, &source.base.outputs)?;
        cache.insert_all(&outputs).await;

        input.address = outputs
            .into_iter()
            .find(|output| output.index == input.out_index)
            .map(|output| output.address);

        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use proptest::prelude::*;
    use stake_mirror_db::{inmemory::prelude::*, job::StateUpdate};
    use stake_mirror_primitives::{
        address::AddressCodec,
        epoch::EpochConfig,
        tx::{OutputOwners, RewardOwner, SourceOutput, TransferOutput},
    };
    use stake_mirror_test_utils::prelude::*;

    use super::*;
    use crate::errors::ErrorKind;

    const GENESIS: UnixTimestamp = 1_000_000;
    const PERIOD: u64 = 1_000;
    const JOB: &str = "mirror";

    fn epochs() -> EpochConfig {
        EpochConfig::new(GENESIS, PERIOD).unwrap()
    }

    fn codec() -> AddressCodec {
        AddressCodec::new(TEST_CHAIN_ALIAS, TEST_HRP).unwrap()
    }

    /// A time at which `epoch` is the latest completed epoch.
    fn after(epoch: EpochIndex) -> UnixTimestamp {
        epochs().window(epoch + 1).start + PERIOD / 2
    }

    /// A start time inside `epoch`.
    fn during(epoch: EpochIndex) -> UnixTimestamp {
        epochs().window(epoch).start + 10
    }

    struct Harness {
        engine: MirrorEngine<JobStateInMemory, ChainDataInMemory, FakeGateway>,
        job_db: JobStateInMemory,
        chain_db: ChainDataInMemory,
        gateway: FakeGateway,
    }

    impl Harness {
        fn new(first_epoch: EpochIndex) -> Self {
            let job_db = JobStateInMemory::default();
            let chain_db = ChainDataInMemory::default();
            let gateway = FakeGateway::new(epochs());
            let config = EngineConfig {
                job_name: JOB.to_string(),
                first_epoch,
                concurrency: NonZeroUsize::new(4).unwrap(),
                codec: codec(),
            };

            Self {
                engine: MirrorEngine::new(
                    config,
                    job_db.clone(),
                    chain_db.clone(),
                    gateway.clone(),
                ),
                job_db,
                chain_db,
                gateway,
            }
        }

        async fn set_next_index(&self, next_index: EpochIndex) {
            self.job_db
                .advance_state(JOB, next_index, true)
                .await
                .expect("must be able to set state");
        }

        async fn next_index(&self) -> EpochIndex {
            self.job_db
                .fetch_state(JOB)
                .await
                .expect("must be able to fetch state")
                .next_index
        }

        async fn index(&self, stakes: &[FundedStake]) {
            for stake in stakes {
                self.chain_db
                    .add_transaction(&stake.funding, None)
                    .await
                    .expect("must be able to index funding");
                self.chain_db
                    .add_transaction(&stake.stake, None)
                    .await
                    .expect("must be able to index stake");
            }
        }
    }

    fn descriptor(stake: &FundedStake) -> StakeDescriptor {
        StakeDescriptor {
            tx_id: stake.stake.id,
            kind: stake.stake.kind,
            input_address: stake.owner(),
            node_id: stake.stake.node_id,
            start_time: stake.stake.start_time,
            end_time: stake.stake.end_time,
            weight: stake.stake.weight,
        }
    }

    fn descriptors(stakes: &[FundedStake]) -> Vec<StakeDescriptor> {
        stakes.iter().map(descriptor).collect()
    }

    fn mirrored(outcome: RunOutcome) -> MirrorReport {
        match outcome {
            RunOutcome::Mirrored(report) => report,
            other => panic!("expected a mirrored outcome but got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_epoch_due() {
        let harness = Harness::new(0);
        harness.set_next_index(10).await;

        let outcome = harness
            .engine
            .run_at(after(9))
            .await
            .expect("run must succeed");

        assert_eq!(
            outcome,
            RunOutcome::NoEpochDue {
                state: JobState {
                    job_name: JOB.to_string(),
                    next_index: 10
                },
                last_completed: Some(9),
            }
        );
        assert_eq!(harness.gateway.reads(), 1, "only the epoch config must be read");
    }

    #[tokio::test]
    async fn test_no_epoch_completed_yet() {
        let harness = Harness::new(0);

        let outcome = harness
            .engine
            .run_at(GENESIS + PERIOD / 2)
            .await
            .expect("run must succeed");

        assert!(matches!(
            outcome,
            RunOutcome::NoEpochDue {
                last_completed: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_root_not_published_leaves_state() {
        let harness = Harness::new(0);
        harness.set_next_index(9).await;
        harness.gateway.publish_stakes(9, []);

        let outcome = harness
            .engine
            .run_at(after(10))
            .await
            .expect("an unpublished root is not a failure");

        assert!(matches!(
            outcome,
            RunOutcome::RootNotPublished { epoch: 10, .. }
        ));
        assert_eq!(harness.next_index().await, 9);
        assert!(harness.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn test_intermediate_root_not_published() {
        let harness = Harness::new(0);
        harness.set_next_index(3).await;
        let stake = generate_funded_stake(during(3));
        harness.index(std::slice::from_ref(&stake)).await;
        harness.gateway.publish_stakes(3, [&descriptor(&stake)]);
        harness.gateway.publish_stakes(5, []);

        let outcome = harness
            .engine
            .run_at(after(5))
            .await
            .expect("an unpublished root is not a failure");

        assert!(matches!(
            outcome,
            RunOutcome::RootNotPublished { epoch: 4, .. }
        ));
        assert!(
            harness.gateway.writes().is_empty(),
            "nothing must be written before every root is known"
        );
        assert_eq!(harness.next_index().await, 3);
    }

    #[tokio::test]
    async fn test_empty_window_advances_state() {
        let harness = Harness::new(0);
        harness.set_next_index(5).await;
        harness.gateway.publish_stakes(5, []);

        let report = mirrored(
            harness
                .engine
                .run_at(after(5))
                .await
                .expect("run must succeed"),
        );

        assert_eq!(report.submitted, 0);
        assert_eq!(report.transactions, 0);
        assert_eq!(report.update, StateUpdate::Advanced { from: 5, to: 6 });
        assert_eq!(harness.next_index().await, 6);
        assert!(harness.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn test_mirrors_epoch() {
        let harness = Harness::new(0);
        harness.set_next_index(5).await;
        let stakes: Vec<_> = (0..3).map(|i| generate_funded_stake(during(5) + i)).collect();
        harness.index(&stakes).await;
        harness.gateway.publish_stakes(5, &descriptors(&stakes));

        let report = mirrored(
            harness
                .engine
                .run_at(after(5))
                .await
                .expect("run must succeed"),
        );

        assert_eq!(report.from_epoch, 5);
        assert_eq!(report.to_epoch, 5);
        assert_eq!(report.transactions, 3);
        assert_eq!(report.submitted, 3);
        assert_eq!(report.bindings, 3);
        assert_eq!(report.state.next_index, 6);

        let submitted: Vec<_> = harness
            .gateway
            .submissions()
            .into_iter()
            .map(|proof| proof.stake)
            .collect();
        assert_eq!(
            submitted,
            descriptors(&stakes),
            "stakes must be submitted in chain order"
        );

        // A second run for the same time finds nothing to do.
        let writes = harness.gateway.writes().len();
        let outcome = harness
            .engine
            .run_at(after(5))
            .await
            .expect("run must succeed");
        assert!(matches!(outcome, RunOutcome::NoEpochDue { .. }));
        assert_eq!(harness.gateway.writes().len(), writes);
    }

    #[tokio::test]
    async fn test_bindings_are_checked_and_deduplicated() {
        let harness = Harness::new(0);
        let (secret_key, _) = generate_keypair();
        let first = generate_funded_stake_for(secret_key, during(0));
        let second = generate_funded_stake_for(secret_key, during(0) + 1);
        let bound = generate_funded_stake(during(0) + 2);
        let stakes = [first, second, bound];
        harness.index(&stakes).await;
        harness.gateway.bind(stakes[2].owner());
        harness.gateway.publish_stakes(0, &descriptors(&stakes));

        let report = mirrored(
            harness
                .engine
                .run_at(after(0))
                .await
                .expect("run must succeed"),
        );

        assert_eq!(report.bindings, 1);
        assert_eq!(harness.gateway.registrations(), vec![stakes[0].owner()]);
        assert_eq!(report.submitted, 3);
    }

    #[tokio::test]
    async fn test_skips_mirrored_and_ended_stakes() {
        let harness = Harness::new(0);
        let stakes: Vec<_> = (0..3).map(|i| generate_funded_stake(during(0) + i)).collect();
        let mut ended = stakes[2].clone();
        ended.stake.end_time = after(0) - 1;
        let stakes = vec![stakes[0].clone(), stakes[1].clone(), ended];
        harness.index(&stakes).await;
        harness.gateway.publish_stakes(0, &descriptors(&stakes));
        harness.gateway.bind(stakes[0].owner());
        harness.gateway.mark_mirrored(&descriptor(&stakes[0]));

        let report = mirrored(
            harness
                .engine
                .run_at(after(0))
                .await
                .expect("run must succeed"),
        );

        assert_eq!(report.submitted, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(
            harness.gateway.registrations(),
            vec![stakes[1].owner()],
            "skipped stakes must not be bound"
        );
        assert_eq!(harness.next_index().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_transaction_aborts_epoch() {
        let harness = Harness::new(0);
        let mut stakes: Vec<_> = (0..3).map(|i| generate_funded_stake(during(0) + i)).collect();
        stakes[1].stake.base.outputs[0] = SourceOutput::Transfer(TransferOutput {
            amount: 1,
            owners: OutputOwners {
                locktime: 0,
                threshold: 1,
                addresses: vec![generate_short_id(), generate_short_id()],
            },
        });
        harness.index(&stakes).await;
        harness.gateway.publish_stakes(0, &descriptors(&stakes));

        let err = harness
            .engine
            .run_at(after(0))
            .await
            .expect_err("malformed transaction must fail the run");

        assert_eq!(err.kind(), ErrorKind::MalformedTransaction);
        assert_eq!(harness.next_index().await, 0);
        assert!(
            harness.gateway.writes().is_empty(),
            "no other transaction of the epoch may be submitted"
        );
    }

    #[tokio::test]
    async fn test_unsupported_reward_owner_aborts_epoch() {
        let harness = Harness::new(0);
        let mut stake = generate_funded_stake(during(0));
        stake.stake.reward_owner = RewardOwner::Unsupported {
            name: "multisig".to_string(),
        };
        harness.index(std::slice::from_ref(&stake)).await;
        harness.gateway.publish_stakes(0, [&descriptor(&stake)]);

        let err = harness
            .engine
            .run_at(after(0))
            .await
            .expect_err("unsupported reward owner must fail the run");

        assert_eq!(err.kind(), ErrorKind::UnsupportedOwnerShape);
        assert!(harness.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_input_aborts_epoch() {
        let harness = Harness::new(0);
        let stake = generate_funded_stake(during(0));
        harness
            .chain_db
            .add_transaction(&stake.stake, None)
            .await
            .expect("must be able to index stake");
        harness.gateway.publish_stakes(0, [&descriptor(&stake)]);

        let err = harness
            .engine
            .run_at(after(0))
            .await
            .expect_err("unresolvable input must fail the run");

        assert!(matches!(err, MirrorError::UnresolvedInput { .. }));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn test_root_mismatch_aborts_epoch() {
        let harness = Harness::new(0);
        let stakes: Vec<_> = (0..2).map(|i| generate_funded_stake(during(0) + i)).collect();
        harness.index(&stakes).await;
        harness.gateway.publish_stakes(0, [&descriptor(&stakes[0])]);

        let err = harness
            .engine
            .run_at(after(0))
            .await
            .expect_err("root mismatch must fail the run");

        assert!(matches!(err, MirrorError::MerkleRootMismatch { epoch: 0, .. }));
        assert!(harness.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn test_epoch_boundary() {
        let harness = Harness::new(0);
        harness.set_next_index(5).await;
        let at_end = generate_funded_stake(epochs().window(5).end);
        harness.index(std::slice::from_ref(&at_end)).await;
        harness.gateway.publish_stakes(5, []);
        harness.gateway.publish_stakes(6, [&descriptor(&at_end)]);

        let report = mirrored(
            harness
                .engine
                .run_at(after(6))
                .await
                .expect("run must succeed"),
        );

        assert_eq!((report.from_epoch, report.to_epoch), (5, 6));
        let submissions = harness.gateway.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(
            submissions[0].epoch, 6,
            "a stake starting at the end of a window belongs to the next epoch"
        );
        assert_eq!(harness.next_index().await, 7);
    }

    #[tokio::test]
    async fn test_first_epoch_is_respected() {
        let harness = Harness::new(7);
        harness.gateway.publish_stakes(7, []);

        let report = mirrored(
            harness
                .engine
                .run_at(after(7))
                .await
                .expect("run must succeed"),
        );

        assert_eq!(report.from_epoch, 7);
        assert_eq!(harness.gateway.reads(), 2, "earlier roots must not be read");
        assert_eq!(harness.next_index().await, 8);
    }

    #[tokio::test]
    async fn test_reverted_submission_leaves_state() {
        let harness = Harness::new(0);
        let stakes: Vec<_> = (0..3).map(|i| generate_funded_stake(during(0) + i)).collect();
        harness.index(&stakes).await;
        harness.gateway.publish_stakes(0, &descriptors(&stakes));
        harness.gateway.revert_submissions_of(stakes[1].stake.id);

        let err = harness
            .engine
            .run_at(after(0))
            .await
            .expect_err("reverted submission must fail the run");

        assert_eq!(err.kind(), ErrorKind::SubmissionReverted);
        assert_eq!(harness.next_index().await, 0);
    }

    #[tokio::test]
    async fn test_unavailable_epoch_config() {
        let harness = Harness::new(0);
        harness.gateway.clear_epoch_config();

        let err = harness
            .engine
            .run_at(after(0))
            .await
            .expect_err("missing epoch config must fail the run");

        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_retry_after_partial_submission() {
        let harness = Harness::new(0);
        let stakes: Vec<_> = (0..2).map(|i| generate_funded_stake(during(0) + i)).collect();
        harness.index(&stakes).await;
        harness.gateway.publish_stakes(0, &descriptors(&stakes));
        // The first stake made it on chain before the previous run crashed.
        harness.gateway.bind(stakes[0].owner());
        harness.gateway.mark_mirrored(&descriptor(&stakes[0]));

        let report = mirrored(
            harness
                .engine
                .run_at(after(0))
                .await
                .expect("run must succeed"),
        );

        assert_eq!((report.submitted, report.skipped), (1, 1));
        assert_eq!(harness.next_index().await, 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn proptest_no_partial_epoch_commit((n, k) in (1usize..6).prop_flat_map(|n| (Just(n), 0..n))) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("must be able to build runtime");

            runtime.block_on(async {
                let harness = Harness::new(0);
                harness.set_next_index(2).await;
                let stakes: Vec<_> = (0..n as u64)
                    .map(|i| generate_funded_stake(during(2) + i))
                    .collect();
                harness.index(&stakes).await;
                harness.gateway.publish_stakes(2, &descriptors(&stakes));
                harness.gateway.revert_submissions_of(stakes[k].stake.id);

                let result = harness.engine.run_at(after(2)).await;

                prop_assert!(result.is_err());
                prop_assert_eq!(harness.next_index().await, 2);
                Ok(())
            })?;
        }
    }
}
