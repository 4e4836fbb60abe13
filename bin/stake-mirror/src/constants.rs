use std::time::Duration;

/// Name the service logs and exports spans under.
pub(crate) const SERVICE_NAME: &str = "stake-mirror";

pub(crate) const DEFAULT_JOB_NAME: &str = "stake-mirror";

pub(crate) const DEFAULT_CHAIN_ALIAS: &str = "P";

pub(crate) const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

pub(crate) const DEFAULT_CONCURRENCY: usize = 8;

pub(crate) const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variables that override values of the configuration file.
pub(crate) mod env {
    pub(crate) const ETH_RPC_URL: &str = "STAKE_MIRROR_ETH_RPC_URL";
    pub(crate) const PRIVATE_KEY: &str = "STAKE_MIRROR_PRIVATE_KEY";
    pub(crate) const PRIVATE_KEY_FILE: &str = "STAKE_MIRROR_PRIVATE_KEY_FILE";
    pub(crate) const MIRRORING_CONTRACT: &str = "STAKE_MIRROR_MIRRORING_CONTRACT";
    pub(crate) const VOTING_CONTRACT: &str = "STAKE_MIRROR_VOTING_CONTRACT";
    pub(crate) const DATADIR: &str = "STAKE_MIRROR_DATADIR";
}
