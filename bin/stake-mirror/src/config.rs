//! Configuration of the stake mirror binary.

use std::{fmt, fs, num::NonZeroUsize, path::PathBuf, time::Duration};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use serde::{Deserialize, Serialize};
use stake_mirror_contracts::config::GatewayConfig;
use stake_mirror_db::persistent::config::DbConfig;
use stake_mirror_engine::config::EngineConfig;
use stake_mirror_primitives::{address::AddressCodec, types::EpochIndex};
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::constants::{
    env, DEFAULT_CHAIN_ALIAS, DEFAULT_CONCURRENCY, DEFAULT_INTERVAL, DEFAULT_JOB_NAME,
    DEFAULT_RPC_TIMEOUT,
};

/// Problems found while checking the configuration, before anything connects anywhere.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("neither chain.private_key_file nor chain.private_key is set")]
    MissingCredential,

    #[error("could not read private key file {path:?}: {reason}")]
    UnreadableKeyFile { path: PathBuf, reason: String },

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("{0} contract address must not be zero")]
    ZeroAddress(&'static str),

    #[error("invalid rpc url {url}: {reason}")]
    InvalidRpcUrl { url: String, reason: String },

    #[error("invalid address encoding: {0}")]
    InvalidAddressEncoding(String),

    #[error("mirror.concurrency must be positive")]
    ZeroConcurrency,

    #[error("invalid value in {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },
}

/// The configuration of the stake mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Config {
    /// The directory that holds the database.
    pub datadir: PathBuf,

    pub chain: ChainConfig,

    pub contracts: ContractsConfig,

    #[serde(default)]
    pub epochs: EpochsConfig,

    #[serde(default)]
    pub mirror: MirrorConfig,

    /// The configuration for the sqlite3 database.
    #[serde(default)]
    pub db: DbConfig,
}

/// Access to the destination chain.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ChainConfig {
    pub eth_rpc_url: String,

    pub chain_id: u64,

    /// Alias prefixed to source-chain addresses, e.g. `P` in `P-costwo1...`.
    #[serde(default = "default_chain_alias")]
    pub chain_alias: String,

    /// The bech32 human-readable part of source-chain addresses.
    pub address_hrp: String,

    /// Deprecated in favor of `private_key_file`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,

    /// A file containing the hex-encoded key that signs destination-chain transactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_file: Option<PathBuf>,

    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout: Duration,
}

impl fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConfig")
            .field("eth_rpc_url", &self.eth_rpc_url)
            .field("chain_id", &self.chain_id)
            .field("chain_alias", &self.chain_alias)
            .field("address_hrp", &self.address_hrp)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("private_key_file", &self.private_key_file)
            .field("rpc_timeout", &self.rpc_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ContractsConfig {
    pub voting: Address,
    pub mirroring: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EpochsConfig {
    /// Epochs before this one are never mirrored.
    #[serde(default)]
    pub first: EpochIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct MirrorConfig {
    /// The key under which progress is stored.
    #[serde(default = "default_job_name")]
    pub job_name: String,

    /// Time between two runs in `run` mode.
    #[serde(default = "default_interval")]
    pub interval: Duration,

    /// How many transactions are prepared in parallel.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            job_name: default_job_name(),
            interval: DEFAULT_INTERVAL,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

fn default_chain_alias() -> String {
    DEFAULT_CHAIN_ALIAS.to_string()
}

const fn default_rpc_timeout() -> Duration {
    DEFAULT_RPC_TIMEOUT
}

fn default_job_name() -> String {
    DEFAULT_JOB_NAME.to_string()
}

const fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

const fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Config {
    /// Replaces file values with the ones set in the environment. `lookup` returns the value of
    /// an environment variable.
    pub(crate) fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(env::ETH_RPC_URL) {
            self.chain.eth_rpc_url = url;
        }

        if let Some(key) = lookup(env::PRIVATE_KEY) {
            self.chain.private_key = Some(key);
        }

        if let Some(path) = lookup(env::PRIVATE_KEY_FILE) {
            self.chain.private_key_file = Some(path.into());
        }

        if let Some(datadir) = lookup(env::DATADIR) {
            self.datadir = datadir.into();
        }

        let parse_address = |name: &'static str, value: String| {
            value
                .parse::<Address>()
                .map_err(|e| ConfigError::InvalidEnv {
                    name,
                    reason: e.to_string(),
                })
        };

        if let Some(voting) = lookup(env::VOTING_CONTRACT) {
            self.contracts.voting = parse_address(env::VOTING_CONTRACT, voting)?;
        }

        if let Some(mirroring) = lookup(env::MIRRORING_CONTRACT) {
            self.contracts.mirroring = parse_address(env::MIRRORING_CONTRACT, mirroring)?;
        }

        Ok(())
    }

    pub(crate) fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let codec = AddressCodec::new(self.chain.chain_alias.clone(), &self.chain.address_hrp)
            .map_err(|e| ConfigError::InvalidAddressEncoding(e.to_string()))?;
        let concurrency =
            NonZeroUsize::new(self.mirror.concurrency).ok_or(ConfigError::ZeroConcurrency)?;

        Ok(EngineConfig {
            job_name: self.mirror.job_name.clone(),
            first_epoch: self.epochs.first,
            concurrency,
            codec,
        })
    }

    pub(crate) fn gateway_config(&self) -> Result<GatewayConfig, ConfigError> {
        if self.contracts.voting.is_zero() {
            return Err(ConfigError::ZeroAddress("voting"));
        }

        if self.contracts.mirroring.is_zero() {
            return Err(ConfigError::ZeroAddress("mirroring"));
        }

        let rpc_url =
            Url::parse(&self.chain.eth_rpc_url).map_err(|e| ConfigError::InvalidRpcUrl {
                url: self.chain.eth_rpc_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(GatewayConfig {
            rpc_url,
            chain_id: self.chain.chain_id,
            voting: self.contracts.voting,
            mirroring: self.contracts.mirroring,
            call_timeout: self.chain.rpc_timeout,
        })
    }
}

impl ChainConfig {
    /// The hex-encoded signing key. The key file wins over the inline key.
    pub(crate) fn private_key(&self) -> Result<String, ConfigError> {
        if let Some(path) = &self.private_key_file {
            let contents =
                fs::read_to_string(path).map_err(|e| ConfigError::UnreadableKeyFile {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;

            let key = contents.trim();
            if key.is_empty() {
                return Err(ConfigError::UnreadableKeyFile {
                    path: path.clone(),
                    reason: "file is empty".to_string(),
                });
            }

            return Ok(key.to_string());
        }

        if let Some(key) = &self.private_key {
            warn!("chain.private_key is deprecated, move the key to chain.private_key_file");

            return Ok(key.trim().to_string());
        }

        Err(ConfigError::MissingCredential)
    }

    pub(crate) fn signer(&self) -> Result<PrivateKeySigner, ConfigError> {
        self.private_key()?
            .parse::<PrivateKeySigner>()
            .map_err(|e| ConfigError::InvalidKey(e.to_string()))
    }
}
