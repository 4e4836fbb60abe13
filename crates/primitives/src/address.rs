//! Chain-native address encoding and the derivation of both chains' addresses from a public key.
//!
//! A source-chain address is the bech32 encoding of a [`ShortId`] prefixed with the chain alias,
//! e.g. `P-costwo1...`. A destination-chain address is the usual EVM address.

use alloy_primitives::{keccak256, Address};
use bech32::{Bech32, Hrp};
use bitcoin::hashes::{hash160, Hash};
use secp256k1::PublicKey;

use crate::{errors::AddressError, types::ShortId};

/// Formats and parses source-chain addresses for a given chain alias and hrp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCodec {
    chain_alias: String,
    hrp: Hrp,
}

impl AddressCodec {
    /// Creates a new codec, e.g. `AddressCodec::new("P", "costwo")`.
    pub fn new(chain_alias: impl Into<String>, hrp: &str) -> Result<Self, AddressError> {
        let hrp = Hrp::parse(hrp).map_err(|e| AddressError::InvalidHrp {
            hrp: hrp.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            chain_alias: chain_alias.into(),
            hrp,
        })
    }

    /// The configured human-readable part.
    pub fn hrp(&self) -> &Hrp {
        &self.hrp
    }

    /// Encodes `id` as `<alias>-<bech32>`.
    pub fn format(&self, id: &ShortId) -> Result<String, AddressError> {
        let encoded = bech32::encode::<Bech32>(self.hrp, id.as_bytes())
            .map_err(|e| AddressError::Bech32(e.to_string()))?;

        Ok(format!("{}-{encoded}", self.chain_alias))
    }

    /// Parses an address produced by [`Self::format`].
    pub fn parse(&self, address: &str) -> Result<ShortId, AddressError> {
        let (alias, encoded) = address
            .split_once('-')
            .ok_or_else(|| AddressError::MissingChainAlias(address.to_string()))?;

        if alias != self.chain_alias {
            return Err(AddressError::ChainAliasMismatch {
                address: address.to_string(),
                expected: self.chain_alias.clone(),
                actual: alias.to_string(),
            });
        }

        let (hrp, payload) =
            bech32::decode(encoded).map_err(|e| AddressError::Bech32(e.to_string()))?;

        if hrp != self.hrp {
            return Err(AddressError::HrpMismatch {
                address: address.to_string(),
                expected: self.hrp.to_string(),
                actual: hrp.to_string(),
            });
        }

        Ok(ShortId::from_slice(&payload)?)
    }
}

/// The short id of a public key on the source chain: `ripemd160(sha256(compressed key))`.
pub fn source_short_id(public_key: &PublicKey) -> ShortId {
    ShortId::new(hash160::Hash::hash(&public_key.serialize()).to_byte_array())
}

/// The destination-chain address of a public key: the last 20 bytes of the keccak hash of the
/// uncompressed key without its prefix byte.
pub fn destination_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();

    Address::from_slice(&keccak256(&uncompressed[1..])[12..])
}

/// Derives both chains' addresses of a public key.
pub fn derive_addresses(public_key: &PublicKey) -> (ShortId, Address) {
    (
        source_short_id(public_key),
        destination_address(public_key),
    )
}

/// Parses a compressed or uncompressed secp256k1 public key.
pub fn parse_public_key(bytes: &[u8]) -> Result<PublicKey, AddressError> {
    Ok(PublicKey::from_slice(bytes)?)
}
