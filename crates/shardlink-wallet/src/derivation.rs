//! SLIP-0010 ed25519 key derivation.
//!
//! Only hardened derivation exists for ed25519, so every path segment is
//! offset into the hardened range.

use crate::WalletError;
use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Master key HMAC domain separator, fixed by SLIP-0010 for ed25519.
const CURVE_SEED: &[u8] = b"ed25519 seed";

const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Account derivation path prefix: `m/44'/508'/0'/0'`, followed by the
/// account index as the final hardened segment.
const PATH_PREFIX: [u32; 4] = [44, 508, 0, 0];

/// Derives the secret key for the given account index from a bip39 seed.
pub fn derive_secret_key(seed: &[u8], index: u32) -> Result<[u8; 32], WalletError> {
	let (mut key, mut chain_code) = split_digest(hmac_sha512(CURVE_SEED, seed)?);
	for segment in PATH_PREFIX.iter().chain(std::iter::once(&index)) {
		let hardened = segment | HARDENED_OFFSET;
		let mut data = Vec::with_capacity(37);
		data.push(0x00);
		data.extend_from_slice(&key);
		data.extend_from_slice(&hardened.to_be_bytes());
		(key, chain_code) = split_digest(hmac_sha512(&chain_code, &data)?);
	}
	Ok(key)
}

fn hmac_sha512(key: &[u8], data: &[u8]) -> Result<[u8; 64], WalletError> {
	let mut mac = HmacSha512::new_from_slice(key)
		.map_err(|e| WalletError::Derivation(e.to_string()))?;
	mac.update(data);
	Ok(mac.finalize().into_bytes().into())
}

fn split_digest(digest: [u8; 64]) -> ([u8; 32], [u8; 32]) {
	let mut key = [0u8; 32];
	let mut chain_code = [0u8; 32];
	key.copy_from_slice(&digest[..32]);
	chain_code.copy_from_slice(&digest[32..]);
	(key, chain_code)
}
