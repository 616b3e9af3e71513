//! Network configuration types.
//!
//! These values are obtained by querying the network and feed the default
//! gas computation when building transactions.

use serde::{Deserialize, Serialize};

/// Configuration of the network a provider is connected to.
///
/// Every field is required: a node response that omits one of them is
/// rejected at deserialization time instead of silently producing
/// nonsensical gas figures downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
	/// Version of the node software running on the network.
	pub version: String,
	/// Unique id of the chain, included in every signed transaction.
	pub chain_id: String,
	/// Gas charged per byte of the transaction `data` field.
	pub gas_per_data_byte: u64,
	/// Minimum gas limit of a basic transaction, excluding data costs.
	pub min_gas_limit: u64,
	/// Minimum gas price accepted by the network.
	pub min_gas_price: u64,
	/// Minimum value for the transaction version field.
	pub min_transaction_version: u32,
}
