//! Errors of a mirroring run.

use std::fmt;

use alloy_primitives::B256;
use stake_mirror_contracts::errors::GatewayError;
use stake_mirror_db::errors::DbError;
use stake_mirror_primitives::{
    errors::{AddressError, ReconstructError},
    types::{EpochIndex, ShortId, SourceTxId},
};
use thiserror::Error;

/// The coarse classification of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The job is misconfigured and must not run.
    Configuration,

    /// A transaction has outputs of an unsupported shape.
    MalformedTransaction,

    /// A transaction has a reward owner of an unsupported shape.
    UnsupportedOwnerShape,

    /// An RPC call of either chain failed or timed out.
    Network,

    /// The destination chain rejected a registration or a mirror submission.
    SubmissionReverted,

    /// The local database failed.
    Storage,

    /// The data of the two chains is inconsistent.
    Protocol,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::MalformedTransaction => "malformed-transaction",
            ErrorKind::UnsupportedOwnerShape => "unsupported-owner-shape",
            ErrorKind::Network => "network",
            ErrorKind::SubmissionReverted => "submission-reverted",
            ErrorKind::Storage => "storage",
            ErrorKind::Protocol => "protocol",
        };

        f.write_str(kind)
    }
}

/// Errors that abort a run without advancing the job state.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// A transaction could not be reconstructed.
    #[error("reconstruction: {0}")]
    Reconstruct(#[from] ReconstructError),

    /// A stored address could not be decoded.
    #[error("address: {0}")]
    Address(#[from] AddressError),

    /// A staking transaction spends nothing.
    #[error("staking transaction {0} has no inputs")]
    MissingInput(SourceTxId),

    /// The output spent by a staking transaction is not indexed.
    #[error("input {out_tx_id}:{out_index} of transaction {tx_id} could not be resolved")]
    UnresolvedInput {
        /// The staking transaction.
        tx_id: SourceTxId,

        /// The transaction that created the spent output.
        out_tx_id: SourceTxId,

        /// The index of the spent output.
        out_index: u32,
    },

    /// None of the signers of a staking transaction owns its input.
    #[error("no signer of transaction {tx_id} matches input address {input_address}")]
    NoMatchingSigner {
        /// The staking transaction.
        tx_id: SourceTxId,

        /// The owner of the spent output.
        input_address: ShortId,
    },

    /// The stakes of an epoch do not hash to the published root.
    #[error("epoch {epoch} root mismatch: published {published}, computed {computed}")]
    MerkleRootMismatch {
        /// The epoch.
        epoch: EpochIndex,

        /// The root read from the destination chain.
        published: B256,

        /// The root built from the local transactions.
        computed: B256,
    },

    /// The destination chain call failed.
    #[error("gateway: {0}")]
    Gateway(#[from] GatewayError),

    /// The database failed.
    #[error("db: {0}")]
    Db(#[from] DbError),
}

impl MirrorError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MirrorError::Reconstruct(ReconstructError::UnsupportedOwnerShape(_)) => {
                ErrorKind::UnsupportedOwnerShape
            }
            MirrorError::Reconstruct(_)
            | MirrorError::Address(_)
            | MirrorError::MissingInput(_)
            | MirrorError::NoMatchingSigner { .. } => ErrorKind::MalformedTransaction,
            MirrorError::UnresolvedInput { .. } | MirrorError::MerkleRootMismatch { .. } => {
                ErrorKind::Protocol
            }
            MirrorError::Gateway(err) => match err {
                GatewayError::InvalidConfiguration(_) => ErrorKind::Configuration,
                GatewayError::ConfigUnavailable(_)
                | GatewayError::Network { .. }
                | GatewayError::Timeout { .. } => ErrorKind::Network,
                GatewayError::SubmissionReverted { .. } => ErrorKind::SubmissionReverted,
                GatewayError::RootNotPublished { .. } => ErrorKind::Protocol,
            },
            MirrorError::Db(_) => ErrorKind::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use stake_mirror_primitives::errors::MalformedReason;

    use super::*;

    #[test]
    fn test_kind() {
        let malformed = MirrorError::from(ReconstructError::MalformedTransaction {
            tx_id: SourceTxId::default(),
            output_index: 0,
            reason: MalformedReason::OwnerCount(2),
        });
        assert_eq!(malformed.kind(), ErrorKind::MalformedTransaction);

        let owner = MirrorError::from(ReconstructError::UnsupportedOwnerShape("multisig".into()));
        assert_eq!(owner.kind(), ErrorKind::UnsupportedOwnerShape);

        let timeout = MirrorError::from(GatewayError::Timeout {
            operation: "getMerkleRoot",
            after: Duration::from_secs(1),
        });
        assert_eq!(timeout.kind(), ErrorKind::Network);

        let reverted = MirrorError::from(GatewayError::SubmissionReverted {
            operation: "mirrorStake",
            reason: "execution reverted: stake already mirrored".into(),
        });
        assert_eq!(reverted.kind(), ErrorKind::SubmissionReverted);

        let config = MirrorError::from(GatewayError::InvalidConfiguration("zero address".into()));
        assert_eq!(config.kind(), ErrorKind::Configuration);
    }
}
