//! HTTP proxy implementation of the node interface.
//!
//! This speaks to a proxy endpoint over plain HTTP using reqwest. Every
//! response arrives in a `{ data, error, code }` envelope which is unwrapped
//! and checked before the payload is deserialized.

use crate::{NodeProvider, ProviderError};
use async_trait::async_trait;
use serde::Deserialize;
use shardlink_types::{
	AccountOnChain, ContractQueryParams, ContractQueryResult, NetworkConfig, SignedTransaction,
	TransactionOnChain, TransactionReceipt,
};

/// Code carried by a successful response envelope.
const SUCCESS_CODE: &str = "successful";

/// A [`NodeProvider`] which speaks to a proxy endpoint.
pub struct ProxyProvider {
	client: reqwest::Client,
	base_url: String,
}

impl ProxyProvider {
	/// Creates a provider for the given proxy base URL.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			base_url: base_url.into().trim_end_matches('/').to_string(),
		}
	}

	/// Performs a GET request and unwraps the response envelope.
	async fn get(&self, path: &str, context: &str) -> Result<serde_json::Value, ProviderError> {
		let response = self
			.client
			.get(format!("{}{}", self.base_url, path))
			.send()
			.await
			.map_err(|e| ProviderError::Network(format!("{}: {}", context, e)))?;
		let envelope: serde_json::Value = response
			.json()
			.await
			.map_err(|e| ProviderError::Network(format!("{}: {}", context, e)))?;
		unwrap_envelope(envelope, context)
	}

	/// Performs a POST request with a JSON body and unwraps the envelope.
	async fn post(
		&self,
		path: &str,
		body: &serde_json::Value,
		context: &str,
	) -> Result<serde_json::Value, ProviderError> {
		let response = self
			.client
			.post(format!("{}{}", self.base_url, path))
			.json(body)
			.send()
			.await
			.map_err(|e| ProviderError::Network(format!("{}: {}", context, e)))?;
		let envelope: serde_json::Value = response
			.json()
			.await
			.map_err(|e| ProviderError::Network(format!("{}: {}", context, e)))?;
		unwrap_envelope(envelope, context)
	}
}

/// Raw network configuration keys as returned by the node.
#[derive(Debug, Deserialize)]
struct RawNetworkConfig {
	erd_latest_tag_software_version: String,
	erd_chain_id: String,
	erd_gas_per_data_byte: u64,
	erd_min_gas_limit: u64,
	erd_min_gas_price: u64,
	erd_min_transaction_version: u32,
}

impl From<RawNetworkConfig> for NetworkConfig {
	fn from(raw: RawNetworkConfig) -> Self {
		NetworkConfig {
			version: raw.erd_latest_tag_software_version,
			chain_id: raw.erd_chain_id,
			gas_per_data_byte: raw.erd_gas_per_data_byte,
			min_gas_limit: raw.erd_min_gas_limit,
			min_gas_price: raw.erd_min_gas_price,
			min_transaction_version: raw.erd_min_transaction_version,
		}
	}
}

/// Unwraps a `{ data, error, code }` response envelope.
///
/// A non-empty error, a code other than `successful`, or missing data all
/// surface as [`ProviderError::NodeResponse`].
fn unwrap_envelope(
	envelope: serde_json::Value,
	context: &str,
) -> Result<serde_json::Value, ProviderError> {
	let error = envelope
		.get("error")
		.and_then(|v| v.as_str())
		.unwrap_or_default();
	let code = envelope
		.get("code")
		.and_then(|v| v.as_str())
		.unwrap_or_default();

	if !error.is_empty() || code != SUCCESS_CODE {
		let reason = if error.is_empty() { code } else { error };
		let reason = if reason.is_empty() {
			"internal error"
		} else {
			reason
		};
		return Err(ProviderError::NodeResponse(format!(
			"{}: {}",
			context, reason
		)));
	}

	match envelope.get("data") {
		Some(data) if !data.is_null() => Ok(data.clone()),
		_ => Err(ProviderError::NodeResponse(format!(
			"{}: no data returned",
			context
		))),
	}
}

/// Extracts a named field from an unwrapped envelope payload.
fn take_field(
	data: &serde_json::Value,
	field: &str,
	context: &str,
) -> Result<serde_json::Value, ProviderError> {
	data.get(field).cloned().ok_or_else(|| {
		ProviderError::NodeResponse(format!("{}: missing '{}' field", context, field))
	})
}

#[async_trait]
impl NodeProvider for ProxyProvider {
	async fn get_network_config(&self) -> Result<NetworkConfig, ProviderError> {
		let context = "error fetching network config";
		let data = self.get("/network/config", context).await?;
		let config = take_field(&data, "config", context)?;
		let raw: RawNetworkConfig = serde_json::from_value(config)
			.map_err(|e| ProviderError::NodeResponse(format!("{}: {}", context, e)))?;
		Ok(raw.into())
	}

	async fn get_account(&self, address: &str) -> Result<AccountOnChain, ProviderError> {
		let context = "error fetching address info";
		let data = self.get(&format!("/address/{}", address), context).await?;
		let account = take_field(&data, "account", context)?;
		serde_json::from_value(account)
			.map_err(|e| ProviderError::NodeResponse(format!("{}: {}", context, e)))
	}

	async fn query_contract(
		&self,
		params: &ContractQueryParams,
	) -> Result<ContractQueryResult, ProviderError> {
		let context = "error querying contract";
		let body = serde_json::json!({
			"scAddress": params.contract_address,
			"funcName": params.function_name,
			"args": params.args,
		});
		let data = self.post("/vm-values/query", &body, context).await?;
		let result = take_field(&data, "data", context)?;
		serde_json::from_value(result)
			.map_err(|e| ProviderError::NodeResponse(format!("{}: {}", context, e)))
	}

	async fn send_signed_transaction(
		&self,
		tx: &SignedTransaction,
	) -> Result<TransactionReceipt, ProviderError> {
		let context = "error sending transaction";
		let body = serde_json::to_value(tx)
			.map_err(|e| ProviderError::NodeResponse(format!("{}: {}", context, e)))?;
		let data = self.post("/transaction/send", &body, context).await?;
		let hash = take_field(&data, "txHash", context)?;
		let hash = hash.as_str().ok_or_else(|| {
			ProviderError::NodeResponse(format!("{}: malformed transaction hash", context))
		})?;

		tracing::info!(tx_hash = %hash, "Broadcast transaction");

		Ok(TransactionReceipt {
			hash: hash.to_string(),
			signed_transaction: Some(tx.clone()),
			on_chain: None,
		})
	}

	async fn get_transaction(&self, tx_hash: &str) -> Result<TransactionOnChain, ProviderError> {
		let context = "error fetching transaction";
		let data = self
			.get(&format!("/transaction/{}", tx_hash), context)
			.await?;
		let raw = take_field(&data, "transaction", context)?;
		if raw.is_null() {
			return Err(ProviderError::NodeResponse(format!(
				"{}: transaction not found",
				context
			)));
		}
		Ok(TransactionOnChain::from_raw(raw))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_unwrap_envelope_success() {
		let data = unwrap_envelope(
			json!({ "data": { "txHash": "abc" }, "error": "", "code": "successful" }),
			"ctx",
		)
		.unwrap();
		assert_eq!(data["txHash"], "abc");
	}

	#[test]
	fn test_unwrap_envelope_error_code() {
		let err = unwrap_envelope(json!({ "data": {}, "error": "", "code": "internal_issue" }), "ctx")
			.unwrap_err();
		assert!(matches!(err, ProviderError::NodeResponse(msg) if msg.contains("internal_issue")));
	}

	#[test]
	fn test_unwrap_envelope_explicit_error() {
		let err = unwrap_envelope(
			json!({ "error": "boom", "code": "successful" }),
			"ctx",
		)
		.unwrap_err();
		assert!(matches!(err, ProviderError::NodeResponse(msg) if msg.contains("boom")));
	}

	#[test]
	fn test_unwrap_envelope_missing_data() {
		let err = unwrap_envelope(json!({ "error": "", "code": "successful" }), "ctx").unwrap_err();
		assert!(matches!(err, ProviderError::NodeResponse(msg) if msg.contains("no data")));
	}

	#[test]
	fn test_network_config_mapping() {
		let raw: RawNetworkConfig = serde_json::from_value(json!({
			"erd_latest_tag_software_version": "v1.1.6.0",
			"erd_chain_id": "1",
			"erd_gas_per_data_byte": 1500,
			"erd_min_gas_limit": 50000,
			"erd_min_gas_price": 1000000000u64,
			"erd_min_transaction_version": 1,
		}))
		.unwrap();
		let config: NetworkConfig = raw.into();
		assert_eq!(config.chain_id, "1");
		assert_eq!(config.min_gas_limit, 50_000);
		assert_eq!(config.gas_per_data_byte, 1_500);
	}

	#[test]
	fn test_network_config_missing_field_is_an_error() {
		// A config with no gas price must fail loudly rather than default.
		let result: Result<RawNetworkConfig, _> = serde_json::from_value(json!({
			"erd_latest_tag_software_version": "v1.1.6.0",
			"erd_chain_id": "1",
			"erd_gas_per_data_byte": 1500,
			"erd_min_gas_limit": 50000,
			"erd_min_transaction_version": 1,
		}));
		assert!(result.is_err());
	}
}
