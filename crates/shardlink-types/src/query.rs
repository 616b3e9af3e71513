//! Contract query request and response types.

use serde::{Deserialize, Serialize};

/// Parameters for querying a contract function in read-only mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractQueryParams {
	/// Address of the contract, in human-readable form.
	pub contract_address: String,
	/// Name of the function to call.
	pub function_name: String,
	/// Hex-encoded arguments to pass to the function.
	pub args: Vec<String>,
}

/// Result of a read-only contract query.
///
/// Each entry of `return_data` is a base64-encoded return value which is
/// interpreted positionally by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractQueryResult {
	/// The ordered list of base64-encoded return values.
	#[serde(default)]
	pub return_data: Vec<String>,
	/// The result code, indicating success or failure.
	#[serde(default)]
	pub return_code: String,
	/// Gas which would be refunded had this been a transaction.
	#[serde(default)]
	pub gas_refund: u64,
	/// Gas that would be left unused had this been a transaction.
	#[serde(default)]
	pub gas_remaining: u64,
}
