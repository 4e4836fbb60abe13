//! [`DestinationGateway`] implementation for an EVM chain, built on `alloy`.

use std::{fmt, future::IntoFuture, time::Duration};

use alloy::{
    contract::Error as ContractError,
    network::{Ethereum, EthereumWallet, ReceiptResponse},
    primitives::{Address, Bytes, FixedBytes, B256, U256},
    providers::{PendingTransactionBuilder, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::{
        http::{Client, Http},
        RpcError,
    },
};
use async_trait::async_trait;
use secp256k1::PublicKey;
use stake_mirror_primitives::{
    address::derive_addresses,
    epoch::EpochConfig,
    stake::{StakeDescriptor, StakeMirrorProof},
    types::{EpochIndex, ShortId},
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    bindings::{
        IAddressBinder::{self, IAddressBinderInstance},
        IPChainStakeMirror::{self, IPChainStakeMirrorInstance, PChainStake},
        IVoting::{self, IVotingInstance},
    },
    config::GatewayConfig,
    errors::{GatewayError, GatewayResult},
    gateway::DestinationGateway,
};

type Transport = Http<Client>;

type PendingTx = PendingTransactionBuilder<Transport, Ethereum>;

/// Gateway to the voting, mirroring and address binder contracts.
pub struct EvmGateway<P> {
    voting: IVotingInstance<Transport, P>,
    mirroring: IPChainStakeMirrorInstance<Transport, P>,
    binder: IAddressBinderInstance<Transport, P>,
    operator: Address,
    call_timeout: Duration,

    /// Held from sending a transaction until its receipt arrives so that only one nonce is in
    /// flight at a time.
    send_lock: Mutex<()>,
}

impl<P> fmt::Debug for EvmGateway<P>
where
    P: Provider<Transport> + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmGateway")
            .field("voting", self.voting.address())
            .field("mirroring", self.mirroring.address())
            .field("binder", self.binder.address())
            .field("operator", &self.operator)
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

/// Connects to the destination chain and discovers the address binder contract.
pub async fn connect(
    config: &GatewayConfig,
    signer: PrivateKeySigner,
) -> GatewayResult<EvmGateway<impl Provider<Transport> + Clone>> {
    config.validate()?;

    let operator = signer.address();
    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::from(signer))
        .on_http(config.rpc_url.clone());

    let chain_id = with_timeout(
        config.call_timeout,
        "eth_chainId",
        provider.get_chain_id(),
        |e| network_error("eth_chainId", e),
    )
    .await?;
    if chain_id != config.chain_id {
        return Err(GatewayError::InvalidConfiguration(format!(
            "node reports chain id {chain_id}, expected {}",
            config.chain_id
        )));
    }

    let voting = IVoting::new(config.voting, provider.clone());
    let mirroring = IPChainStakeMirror::new(config.mirroring, provider.clone());

    let binder_call = mirroring.addressBinder();
    let binder_address = with_timeout(
        config.call_timeout,
        "addressBinder",
        binder_call.call(),
        |e| network_error("addressBinder", e),
    )
    .await?
    ._0;
    let binder_address = require_binder(config.mirroring, binder_address)?;
    let binder = IAddressBinder::new(binder_address, provider);

    info!(
        %operator,
        voting = %config.voting,
        mirroring = %config.mirroring,
        binder = %binder_address,
        "connected to destination chain"
    );

    Ok(EvmGateway {
        voting,
        mirroring,
        binder,
        operator,
        call_timeout: config.call_timeout,
        send_lock: Mutex::new(()),
    })
}

/// JSON-RPC error code nodes return when execution reverts.
const EXECUTION_REVERTED: i64 = 3;

async fn with_timeout<F, T, E>(
    timeout: Duration,
    operation: &'static str,
    call: F,
    on_error: impl FnOnce(E) -> GatewayError,
) -> GatewayResult<T>
where
    F: IntoFuture<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(on_error),
        Err(_) => Err(GatewayError::Timeout {
            operation,
            after: timeout,
        }),
    }
}

fn network_error(operation: &'static str, err: impl fmt::Display) -> GatewayError {
    GatewayError::Network {
        operation,
        reason: err.to_string(),
    }
}

/// Classifies a failed `send`. Gas estimation runs before the transaction is signed, so a call
/// the contract rejects fails here with an error response rather than with a failed receipt.
fn send_error(operation: &'static str, err: ContractError) -> GatewayError {
    if let ContractError::TransportError(RpcError::ErrorResp(payload)) = &err {
        if payload.code == EXECUTION_REVERTED || payload.message.contains("revert") {
            return GatewayError::SubmissionReverted {
                operation,
                reason: payload.message.to_string(),
            };
        }
    }

    network_error(operation, err)
}

fn check_receipt(operation: &'static str, status: bool, tx_hash: B256) -> GatewayResult<()> {
    if !status {
        return Err(GatewayError::SubmissionReverted {
            operation,
            reason: format!("transaction {tx_hash} failed"),
        });
    }

    Ok(())
}

fn published_root(epoch: EpochIndex, root: B256) -> GatewayResult<B256> {
    if root.is_zero() {
        return Err(GatewayError::RootNotPublished { epoch });
    }

    Ok(root)
}

fn require_binder(mirroring: Address, binder: Address) -> GatewayResult<Address> {
    if binder.is_zero() {
        return Err(GatewayError::InvalidConfiguration(format!(
            "mirroring contract {mirroring} has no address binder"
        )));
    }

    Ok(binder)
}

fn to_u64(value: U256, what: &str) -> GatewayResult<u64> {
    u64::try_from(value).map_err(|_| {
        GatewayError::ConfigUnavailable(format!("{what} {value} does not fit in u64"))
    })
}

impl<P> EvmGateway<P>
where
    P: Provider<Transport> + Clone,
{
    /// The destination-chain address that signs transactions.
    pub fn operator(&self) -> Address {
        self.operator
    }

    async fn call<F, T, E>(&self, operation: &'static str, call: F) -> GatewayResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: fmt::Display,
    {
        with_timeout(self.call_timeout, operation, call, |e| {
            network_error(operation, e)
        })
        .await
    }

    /// Sends a transaction and waits for its receipt. Both steps share the call timeout.
    async fn send<F>(&self, operation: &'static str, send: F) -> GatewayResult<B256>
    where
        F: IntoFuture<Output = Result<PendingTx, ContractError>>,
    {
        let _guard = self.send_lock.lock().await;

        let pending = with_timeout(self.call_timeout, operation, send, |e| {
            send_error(operation, e)
        })
        .await?;
        let receipt = self.call(operation, pending.get_receipt()).await?;
        check_receipt(operation, receipt.status(), receipt.transaction_hash())?;

        Ok(receipt.transaction_hash())
    }
}

#[async_trait]
impl<P> DestinationGateway for EvmGateway<P>
where
    P: Provider<Transport> + Clone,
{
    async fn get_epoch_config(&self) -> GatewayResult<EpochConfig> {
        let call = self.voting.getEpochConfiguration();
        let config = self
            .call("getEpochConfiguration", call.call())
            .await
            .map_err(|e| GatewayError::ConfigUnavailable(e.to_string()))?;

        let start = to_u64(config.firstEpochStartTs, "epoch start")?;
        let period = to_u64(config.epochDurationSeconds, "epoch period")?;

        EpochConfig::new(start, period).map_err(|e| GatewayError::ConfigUnavailable(e.to_string()))
    }

    async fn get_merkle_root(&self, epoch: EpochIndex) -> GatewayResult<B256> {
        let call = self.voting.getMerkleRoot(U256::from(epoch));
        let root = self.call("getMerkleRoot", call.call()).await?._0;

        published_root(epoch, root)
    }

    async fn is_address_registered(&self, address: &ShortId) -> GatewayResult<bool> {
        let call = self
            .binder
            .pAddressToCAddress(FixedBytes::from(*address.as_bytes()));
        let bound = self.call("pAddressToCAddress", call.call()).await?._0;

        Ok(!bound.is_zero())
    }

    async fn register_binding(&self, public_key: &PublicKey) -> GatewayResult<()> {
        let (source, destination) = derive_addresses(public_key);
        let call = self.binder.registerAddresses(
            Bytes::copy_from_slice(&public_key.serialize()),
            FixedBytes::from(*source.as_bytes()),
            destination,
        );

        let tx_hash = self.send("registerAddresses", call.send()).await?;

        debug!(%source, %destination, %tx_hash, "registered address binding");

        Ok(())
    }

    async fn is_stake_mirrored(&self, stake: &StakeDescriptor) -> GatewayResult<bool> {
        let call = self.mirroring.isActiveStakeMirrored(
            FixedBytes::from(*stake.tx_id.as_bytes()),
            FixedBytes::from(*stake.input_address.as_bytes()),
        );

        Ok(self.call("isActiveStakeMirrored", call.call()).await?._0)
    }

    async fn submit_stake_mirror(&self, proof: &StakeMirrorProof) -> GatewayResult<()> {
        let call = self
            .mirroring
            .mirrorStake(PChainStake::from(&proof.stake), proof.proof.clone());

        let tx_hash = self.send("mirrorStake", call.send()).await?;

        debug!(tx_id = %proof.stake.tx_id, epoch = %proof.epoch, %tx_hash, "mirrored stake");

        Ok(())
    }
}
