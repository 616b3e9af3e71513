//! Transaction types, receipts and on-chain status.

use serde::{Deserialize, Serialize};

/// An unsigned transaction, ready to be handed to a signer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
	/// The sender address in human-readable form.
	pub sender: String,
	/// The receiver address in human-readable form.
	pub receiver: String,
	/// The amount to transfer, denominated in the smallest on-chain unit.
	pub value: String,
	/// The gas price. Populated with the network default when absent.
	pub gas_price: Option<u64>,
	/// The gas limit. Populated with the network default when absent.
	pub gas_limit: Option<u64>,
	/// The `data` field to send with the transaction.
	pub data: Option<String>,
	/// Signer-specific metadata. The structure depends on the signer in use.
	pub meta: Option<serde_json::Value>,
	/// Explicit nonce. When unset the signer resolves it from the network.
	pub nonce: Option<u64>,
}

/// A signed transaction, ready to be broadcast.
///
/// Field order matters: serializing this struct (with an empty signature and
/// the `data` field base64-encoded) yields the exact canonical byte sequence
/// the signature is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
	/// The resolved transaction nonce.
	pub nonce: u64,
	/// The amount to transfer, denominated in the smallest on-chain unit.
	pub value: String,
	/// The receiver address in human-readable form.
	pub receiver: String,
	/// The sender address in human-readable form.
	pub sender: String,
	/// The gas price.
	#[serde(rename = "gasPrice")]
	pub gas_price: u64,
	/// The gas limit.
	#[serde(rename = "gasLimit")]
	pub gas_limit: u64,
	/// The `data` field, base64-encoded. Omitted from the wire form when unset.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
	/// The network chain id.
	#[serde(rename = "chainID")]
	pub chain_id: String,
	/// Transaction version.
	pub version: u32,
	/// Signature hex. Empty while the canonical form is being signed.
	#[serde(skip_serializing_if = "String::is_empty", default)]
	pub signature: String,
}

impl SignedTransaction {
	/// Returns the canonical serialization the signature is computed over.
	///
	/// This is the compact JSON form of the transaction with the signature
	/// field absent.
	pub fn signable_bytes(&self) -> Vec<u8> {
		let mut unsigned = self.clone();
		unsigned.signature = String::new();
		// Serialization of this struct cannot fail: every field is a plain
		// scalar or string.
		serde_json::to_vec(&unsigned).unwrap_or_default()
	}
}

/// Receipt for a transaction that was broadcast to the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The transaction hash, for tracking purposes.
	pub hash: String,
	/// The signed transaction that was broadcast, when available.
	pub signed_transaction: Option<SignedTransaction>,
	/// The on-chain transaction record, once the transaction is resolved.
	pub on_chain: Option<TransactionOnChain>,
}

impl TransactionReceipt {
	/// Creates a receipt holding only the transaction hash.
	pub fn from_hash(hash: impl Into<String>) -> Self {
		Self {
			hash: hash.into(),
			signed_transaction: None,
			on_chain: None,
		}
	}
}

/// Execution status of a tracked transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
	/// The transaction is yet to be executed by the network.
	Pending,
	/// The transaction was executed and performed all of its actions.
	Success,
	/// The transaction failed to execute or to perform all of its actions.
	Failure,
}

impl TransactionStatus {
	/// Maps a raw node status string onto the fixed status vocabulary.
	///
	/// Anything outside the known terminal words is treated as pending.
	pub fn from_raw(status: &str) -> Self {
		match status {
			"success" | "executed" => TransactionStatus::Success,
			"fail" | "invalid" | "not-executed" => TransactionStatus::Failure,
			_ => TransactionStatus::Pending,
		}
	}

	/// Returns true for success or failure.
	pub fn is_terminal(&self) -> bool {
		!matches!(self, TransactionStatus::Pending)
	}
}

/// A previously broadcast transaction, as recorded on chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionOnChain {
	/// The sender address.
	pub sender: String,
	/// The receiver address.
	pub receiver: String,
	/// The transferred amount in the smallest on-chain unit.
	pub value: String,
	/// The transaction nonce.
	pub nonce: u64,
	/// Epoch round in which the transaction was executed.
	pub round: u64,
	/// Epoch in which the transaction was executed.
	pub epoch: u64,
	/// Gas price.
	pub gas_price: u64,
	/// Gas limit.
	pub gas_limit: u64,
	/// The `data` field, when present.
	pub data: Option<String>,
	/// Shard of the sender address.
	pub source_shard: u32,
	/// Shard of the receiver address.
	pub destination_shard: u32,
	/// Execution status.
	pub status: TransactionStatus,
	/// Transaction signature hex.
	pub signature: Option<String>,
	/// Execution timestamp, seconds since the Unix epoch.
	pub timestamp: u64,
	/// Error messages attached to execution-result records, if any.
	pub smart_contract_errors: Vec<String>,
	/// The raw transaction payload as returned by the node.
	pub raw: serde_json::Value,
}

impl TransactionOnChain {
	/// Builds an on-chain record from the raw node payload.
	///
	/// The status is mapped through [`TransactionStatus::from_raw`], then
	/// forced to failure when any attached execution-result record carries a
	/// non-empty error message, even if the raw status claims success.
	pub fn from_raw(raw: serde_json::Value) -> Self {
		let get_str = |key: &str| {
			raw.get(key)
				.and_then(|v| v.as_str())
				.unwrap_or_default()
				.to_string()
		};
		let get_u64 = |key: &str| raw.get(key).and_then(|v| v.as_u64()).unwrap_or_default();

		let smart_contract_errors = collect_execution_errors(&raw);
		let mut status = TransactionStatus::from_raw(&get_str("status"));
		if !smart_contract_errors.is_empty() {
			status = TransactionStatus::Failure;
		}

		Self {
			sender: get_str("sender"),
			receiver: get_str("receiver"),
			value: get_str("value"),
			nonce: get_u64("nonce"),
			round: get_u64("round"),
			epoch: get_u64("epoch"),
			gas_price: get_u64("gasPrice"),
			gas_limit: get_u64("gasLimit"),
			data: raw.get("data").and_then(|v| v.as_str()).map(String::from),
			source_shard: get_u64("sourceShard") as u32,
			destination_shard: get_u64("destinationShard") as u32,
			status,
			signature: raw
				.get("signature")
				.and_then(|v| v.as_str())
				.map(String::from),
			timestamp: get_u64("timestamp"),
			smart_contract_errors,
			raw,
		}
	}
}

/// Collects non-empty error messages from execution-result records.
fn collect_execution_errors(raw: &serde_json::Value) -> Vec<String> {
	raw.get("smartContractResults")
		.and_then(|v| v.as_array())
		.map(|results| {
			results
				.iter()
				.filter_map(|r| r.get("returnMessage").and_then(|m| m.as_str()))
				.filter(|m| !m.is_empty())
				.map(String::from)
				.collect()
		})
		.unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_status_vocabulary() {
		assert_eq!(TransactionStatus::from_raw("success"), TransactionStatus::Success);
		assert_eq!(TransactionStatus::from_raw("executed"), TransactionStatus::Success);
		assert_eq!(TransactionStatus::from_raw("fail"), TransactionStatus::Failure);
		assert_eq!(TransactionStatus::from_raw("invalid"), TransactionStatus::Failure);
		assert_eq!(TransactionStatus::from_raw("not-executed"), TransactionStatus::Failure);
		assert_eq!(TransactionStatus::from_raw("pending"), TransactionStatus::Pending);
		assert_eq!(TransactionStatus::from_raw("received"), TransactionStatus::Pending);
		assert_eq!(TransactionStatus::from_raw(""), TransactionStatus::Pending);
	}

	#[test]
	fn test_from_raw_maps_fields() {
		let tx = TransactionOnChain::from_raw(json!({
			"sender": "erd1aaa",
			"receiver": "erd1bbb",
			"value": "1000",
			"nonce": 7,
			"round": 12,
			"epoch": 2,
			"gasPrice": 1000000000u64,
			"gasLimit": 70000,
			"status": "success",
			"timestamp": 1600000000,
		}));

		assert_eq!(tx.status, TransactionStatus::Success);
		assert_eq!(tx.nonce, 7);
		assert_eq!(tx.gas_price, 1_000_000_000);
		assert!(tx.smart_contract_errors.is_empty());
	}

	#[test]
	fn test_execution_error_forces_failure() {
		// The raw status claims success but an execution-result record
		// carries an error message.
		let tx = TransactionOnChain::from_raw(json!({
			"status": "success",
			"smartContractResults": [
				{ "returnMessage": "" },
				{ "returnMessage": "out of funds" },
			],
		}));

		assert_eq!(tx.status, TransactionStatus::Failure);
		assert_eq!(tx.smart_contract_errors, vec!["out of funds".to_string()]);
	}

	#[test]
	fn test_signable_bytes_field_order() {
		let tx = SignedTransaction {
			nonce: 7,
			value: "1000000000000000000".to_string(),
			receiver: "erd1bbb".to_string(),
			sender: "erd1aaa".to_string(),
			gas_price: 1_000_000_000,
			gas_limit: 70_000,
			data: Some("YWRkQDAyOWE=".to_string()),
			chain_id: "1".to_string(),
			version: 1,
			signature: "deadbeef".to_string(),
		};

		let json = String::from_utf8(tx.signable_bytes()).unwrap();
		assert_eq!(
			json,
			"{\"nonce\":7,\"value\":\"1000000000000000000\",\"receiver\":\"erd1bbb\",\
			\"sender\":\"erd1aaa\",\"gasPrice\":1000000000,\"gasLimit\":70000,\
			\"data\":\"YWRkQDAyOWE=\",\"chainID\":\"1\",\"version\":1}"
		);
	}

	#[test]
	fn test_signable_bytes_omits_empty_data() {
		let tx = SignedTransaction {
			nonce: 0,
			value: "0".to_string(),
			receiver: "erd1bbb".to_string(),
			sender: "erd1aaa".to_string(),
			gas_price: 1_000_000_000,
			gas_limit: 50_000,
			data: None,
			chain_id: "T".to_string(),
			version: 1,
			signature: String::new(),
		};

		let json = String::from_utf8(tx.signable_bytes()).unwrap();
		assert!(!json.contains("\"data\""));
		assert!(!json.contains("\"signature\""));
	}
}
