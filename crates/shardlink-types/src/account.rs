//! Account state types.

use serde::{Deserialize, Serialize};

/// On-chain state of an account, as reported by the network.
///
/// This may be an externally-owned account or a contract address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOnChain {
	/// The account address in human-readable form.
	pub address: String,
	/// The balance, denominated in the smallest on-chain unit.
	pub balance: String,
	/// The last nonce used for sending transactions.
	#[serde(default)]
	pub nonce: u64,
	/// The code deployed at this address, empty for plain accounts.
	#[serde(default)]
	pub code: String,
}
