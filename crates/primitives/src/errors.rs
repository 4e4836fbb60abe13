//! Errors raised by the pure functions of this crate.

use thiserror::Error;

use crate::types::SourceTxId;

/// Errors that can occur when parsing a fixed-size identifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseIdError {
    /// The input is not valid hex.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The input decoded to the wrong number of bytes.
    #[error("expected {expected} bytes but got {actual}")]
    Length {
        /// Expected length in bytes.
        expected: usize,

        /// Actual length in bytes.
        actual: usize,
    },
}

/// Errors that can occur when formatting, parsing or deriving chain-native addresses.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AddressError {
    /// The human-readable part is not a valid bech32 hrp.
    #[error("invalid hrp {hrp}: {reason}")]
    InvalidHrp {
        /// The offending hrp.
        hrp: String,

        /// Why it was rejected.
        reason: String,
    },

    /// The address lacks the `<chain>-` prefix.
    #[error("address {0} is missing the chain alias")]
    MissingChainAlias(String),

    /// The address belongs to another chain.
    #[error("address {address} has chain alias {actual}, expected {expected}")]
    ChainAliasMismatch {
        /// The offending address.
        address: String,

        /// The alias configured for this chain.
        expected: String,

        /// The alias found in the address.
        actual: String,
    },

    /// The address uses a different hrp than the configured one.
    #[error("address {address} has hrp {actual}, expected {expected}")]
    HrpMismatch {
        /// The offending address.
        address: String,

        /// The configured hrp.
        expected: String,

        /// The hrp found in the address.
        actual: String,
    },

    /// The bech32 codec rejected the data.
    #[error("bech32: {0}")]
    Bech32(String),

    /// The payload is not a 20-byte short id.
    #[error("invalid address payload: {0}")]
    Payload(#[from] ParseIdError),

    /// The public key could not be parsed.
    #[error("invalid public key: {0}")]
    PublicKey(#[from] secp256k1::Error),
}

/// The specific way in which a transaction output violated the supported shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    /// The output is not a simple transfer.
    #[error("output has unsupported kind {0}")]
    UnsupportedKind(&'static str),

    /// The output does not have exactly one owner.
    #[error("output has {0} owner addresses, expected exactly one")]
    OwnerCount(usize),
}

/// Errors raised by the transaction reconstructor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconstructError {
    /// An output of an externally-sourced transaction violates the supported shape.
    #[error("malformed transaction {tx_id}: output {output_index}: {reason}")]
    MalformedTransaction {
        /// The transaction that carried the output.
        tx_id: SourceTxId,

        /// The position of the first offending output.
        output_index: u32,

        /// What was wrong with it.
        reason: MalformedReason,
    },

    /// The reward owner is not a single-address secp256k1 owner.
    #[error("unsupported reward owner shape: {0}")]
    UnsupportedOwnerShape(String),

    /// An owner address could not be encoded.
    #[error("address: {0}")]
    Address(#[from] AddressError),
}

/// Errors that can occur when building an epoch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EpochError {
    /// The period of an epoch must be positive.
    #[error("epoch period must be greater than zero")]
    ZeroPeriod,
}
