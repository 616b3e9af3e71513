//! Address handling for the shardlink client library.
//!
//! This module converts between the network's human-readable address format
//! (a checksummed bech32 encoding of the raw 32-byte public key with a fixed
//! network prefix) and its raw representations, derives the shard an address
//! belongs to, and computes deterministic contract deployment addresses.

mod derive;

pub use derive::compute_contract_address;

use bech32::{FromBase32, ToBase32, Variant};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a raw public key in bytes.
pub const PUBKEY_LENGTH: usize = 32;

/// Human-readable prefix of all addresses on the network.
pub const ADDRESS_HRP: &str = "erd";

/// Length of the all-zero prefix that marks a metachain system address.
const METACHAIN_PREFIX_LENGTH: usize = 25;

/// Errors that can occur when decoding addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
	/// Error that occurs when address text or bytes are malformed.
	#[error("invalid address format: {0}")]
	InvalidAddressFormat(String),
}

/// The network partition an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shard {
	/// A regular shard, identified by its index.
	Regular(u32),
	/// The reserved metachain handling system-level operations.
	Metachain,
}

/// A 32-byte account address.
///
/// Equivalent addresses convert losslessly between the bech32 and raw hex
/// representations. The all-zero address denotes "no account" and is the
/// receiver of contract deployment transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; PUBKEY_LENGTH]);

impl Address {
	/// The well-known all-zero address.
	pub fn zero() -> Self {
		Self([0u8; PUBKEY_LENGTH])
	}

	/// Builds an address from raw public key bytes.
	///
	/// Fails unless the input is exactly 32 bytes.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
		let raw: [u8; PUBKEY_LENGTH] = bytes.try_into().map_err(|_| {
			AddressError::InvalidAddressFormat(format!(
				"expected {} bytes, got {}",
				PUBKEY_LENGTH,
				bytes.len()
			))
		})?;
		Ok(Self(raw))
	}

	/// Parses the raw hex representation.
	pub fn from_hex(s: &str) -> Result<Self, AddressError> {
		let bytes = hex::decode(s)
			.map_err(|e| AddressError::InvalidAddressFormat(format!("bad hex: {}", e)))?;
		Self::from_bytes(&bytes)
	}

	/// Decodes the human-readable bech32 representation.
	///
	/// Rejects any string with a bad checksum, the wrong prefix, or whose
	/// payload does not round-trip to exactly 32 bytes.
	pub fn from_bech32(s: &str) -> Result<Self, AddressError> {
		let (hrp, data, variant) = bech32::decode(s)
			.map_err(|e| AddressError::InvalidAddressFormat(format!("{}: {}", s, e)))?;
		if hrp != ADDRESS_HRP {
			return Err(AddressError::InvalidAddressFormat(format!(
				"wrong prefix '{}', expected '{}'",
				hrp, ADDRESS_HRP
			)));
		}
		if variant != Variant::Bech32 {
			return Err(AddressError::InvalidAddressFormat(
				"wrong bech32 variant".to_string(),
			));
		}
		let bytes = Vec::<u8>::from_base32(&data)
			.map_err(|e| AddressError::InvalidAddressFormat(format!("bad payload: {}", e)))?;
		Self::from_bytes(&bytes)
	}

	/// Encodes the human-readable bech32 representation.
	pub fn to_bech32(&self) -> String {
		// The HRP is a valid constant, so encoding cannot fail.
		bech32::encode(ADDRESS_HRP, self.0.to_base32(), Variant::Bech32).unwrap_or_default()
	}

	/// The raw hex representation.
	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}

	/// The raw public key bytes.
	pub fn as_bytes(&self) -> &[u8; PUBKEY_LENGTH] {
		&self.0
	}

	/// Whether this is the all-zero address.
	pub fn is_zero(&self) -> bool {
		self.0.iter().all(|b| *b == 0)
	}

	/// Whether this address is reserved for the metachain.
	///
	/// System addresses carry a 25-byte all-zero prefix; the all-zero
	/// address also belongs to the metachain.
	pub fn is_metachain(&self) -> bool {
		self.0[..METACHAIN_PREFIX_LENGTH].iter().all(|b| *b == 0)
	}

	/// Derives the shard this address belongs to.
	///
	/// The shard is taken from the low bits of the last public key byte.
	/// Shard counts are not always powers of two, so the mask is first the
	/// next power-of-two-minus-one; when the masked value falls outside the
	/// shard range, a one-bit-narrower mask is applied instead. This keeps
	/// the partition close to even for any shard count.
	pub fn shard_of(&self, num_shards: u32) -> Shard {
		if self.is_metachain() {
			return Shard::Metachain;
		}
		if num_shards <= 1 {
			return Shard::Regular(0);
		}

		let bits = 32 - (num_shards - 1).leading_zeros();
		let mask_high = if bits >= 8 {
			0xffu8
		} else {
			((1u32 << bits) - 1) as u8
		};
		let mask_low = mask_high >> 1;

		let last = self.0[PUBKEY_LENGTH - 1];
		let mut shard = last & mask_high;
		if u32::from(shard) > num_shards - 1 {
			shard = last & mask_low;
		}
		Shard::Regular(u32::from(shard))
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_bech32())
	}
}

impl FromStr for Address {
	type Err = AddressError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_bech32(s)
	}
}

impl Serialize for Address {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_bech32())
	}
}

impl<'de> Deserialize<'de> for Address {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		Address::from_bech32(&s).map_err(serde::de::Error::custom)
	}
}
