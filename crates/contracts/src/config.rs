//! Connection settings of the EVM gateway.

use std::time::Duration;

use alloy::primitives::Address;
use url::Url;

use crate::errors::{GatewayError, GatewayResult};

/// Where the contracts live and how to reach them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// The JSON-RPC endpoint of the destination chain.
    pub rpc_url: Url,

    /// The expected chain id. The connection is refused if the node reports another one.
    pub chain_id: u64,

    /// The voting contract that publishes epoch configuration and Merkle roots.
    pub voting: Address,

    /// The stake mirroring contract.
    pub mirroring: Address,

    /// The upper bound of a single RPC call, including waiting for a receipt.
    pub call_timeout: Duration,
}

impl GatewayConfig {
    /// Checks that both contract addresses are set and that the timeout is usable.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.voting.is_zero() {
            return Err(GatewayError::InvalidConfiguration(
                "voting contract address not set".to_string(),
            ));
        }

        if self.mirroring.is_zero() {
            return Err(GatewayError::InvalidConfiguration(
                "mirroring contract address not set".to_string(),
            ));
        }

        if self.call_timeout.is_zero() {
            return Err(GatewayError::InvalidConfiguration(
                "rpc call timeout must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    fn config() -> GatewayConfig {
        GatewayConfig {
            rpc_url: "http://localhost:8545".parse().unwrap(),
            chain_id: 114,
            voting: address!("1000000000000000000000000000000000000001"),
            mirroring: address!("1000000000000000000000000000000000000002"),
            call_timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_validate() {
        assert!(config().validate().is_ok());

        let mut missing_voting = config();
        missing_voting.voting = Address::ZERO;
        assert!(matches!(
            missing_voting.validate(),
            Err(GatewayError::InvalidConfiguration(_))
        ));

        let mut missing_mirroring = config();
        missing_mirroring.mirroring = Address::ZERO;
        assert!(matches!(
            missing_mirroring.validate(),
            Err(GatewayError::InvalidConfiguration(_))
        ));
    }
}
