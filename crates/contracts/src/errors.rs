//! Errors of the destination chain gateway.

use std::time::Duration;

use stake_mirror_primitives::types::EpochIndex;
use thiserror::Error;

/// Errors raised when talking to the destination chain contracts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The gateway was configured with unusable values.
    #[error("invalid gateway configuration: {0}")]
    InvalidConfiguration(String),

    /// The epoch configuration could not be read.
    #[error("epoch configuration unavailable: {0}")]
    ConfigUnavailable(String),

    /// The root of `epoch` has not been finalized yet.
    #[error("merkle root for epoch {epoch} is not published yet")]
    RootNotPublished {
        /// The requested epoch.
        epoch: EpochIndex,
    },

    /// The RPC layer failed.
    #[error("rpc call {operation} failed: {reason}")]
    Network {
        /// The contract call that failed.
        operation: &'static str,

        /// The error reported by the transport or the node.
        reason: String,
    },

    /// The RPC layer did not answer in time.
    #[error("rpc call {operation} timed out after {after:?}")]
    Timeout {
        /// The contract call that timed out.
        operation: &'static str,

        /// The configured timeout.
        after: Duration,
    },

    /// The contract rejected a transaction, either while estimating gas or once mined.
    #[error("{operation} reverted: {reason}")]
    SubmissionReverted {
        /// The contract call that reverted.
        operation: &'static str,

        /// The revert message of the node, or the hash of the mined transaction.
        reason: String,
    },
}

/// Shorthand for results of gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;
