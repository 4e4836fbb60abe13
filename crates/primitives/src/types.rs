//! Fixed-size identifiers used on the source chain.

use std::{fmt, str::FromStr};

use bitcoin::hex::DisplayHex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ParseIdError;

/// Seconds since the UNIX epoch.
pub type UnixTimestamp = u64;

/// Index of an epoch as derived from the on-chain epoch configuration.
pub type EpochIndex = u64;

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; $len]);

        impl $name {
            /// The length of the identifier in bytes.
            pub const LEN: usize = $len;

            /// Wraps raw bytes.
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Returns the underlying bytes.
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Copies the identifier out of a slice of exactly [`Self::LEN`] bytes.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseIdError> {
                let bytes: [u8; $len] = bytes.try_into().map_err(|_| ParseIdError::Length {
                    expected: $len,
                    actual: bytes.len(),
                })?;

                Ok(Self(bytes))
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(value: [u8; $len]) -> Self {
                Self(value)
            }
        }

        impl From<$name> for [u8; $len] {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0.to_lower_hex_string())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = hex::decode(s.trim_start_matches("0x"))?;

                Self::from_slice(&bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let encoded = String::deserialize(deserializer)?;

                encoded.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_id!(
    /// Identifier of a source-chain transaction.
    SourceTxId,
    32
);

hex_id!(
    /// A 20-byte short identifier: the `hash160` of a public key on the source chain.
    ///
    /// Owner addresses and node ids share this representation.
    ShortId,
    20
);

/// Identifier of a validator node on the source chain.
pub type NodeId = ShortId;
