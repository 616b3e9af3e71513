//! Deterministic contract address derivation.

use crate::{Address, PUBKEY_LENGTH};
use sha3::{Digest, Keccak256};

/// Virtual machine type tag embedded in contract addresses.
const VM_TYPE_TAG: [u8; 2] = [0x05, 0x00];

/// Number of leading zero bytes in a contract address.
const LEADING_ZEROS: usize = 8;

/// Computes the address a contract will receive when deployed.
///
/// This is a pure function of the deployer's raw public key and the nonce of
/// the deployment transaction: the Keccak-256 hash of the key concatenated
/// with the nonce as 8 bytes little-endian, laid out as
/// `[8 zero bytes][2-byte VM tag][middle 20 hash bytes][last 2 deployer bytes]`.
/// The byte layout is a consensus-level convention and must not change.
pub fn compute_contract_address(deployer: &Address, nonce: u64) -> Address {
	let mut hasher = Keccak256::new();
	hasher.update(deployer.as_bytes());
	hasher.update(nonce.to_le_bytes());
	let hash = hasher.finalize();

	let mut raw = [0u8; PUBKEY_LENGTH];
	raw[LEADING_ZEROS..LEADING_ZEROS + 2].copy_from_slice(&VM_TYPE_TAG);
	raw[10..30].copy_from_slice(&hash[10..30]);
	raw[30..].copy_from_slice(&deployer.as_bytes()[30..]);
	Address(raw)
}
