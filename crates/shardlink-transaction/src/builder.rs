//! Transaction builders.
//!
//! A builder knows its receiver and the `data` arguments of the operation it
//! represents; the provided [`TransactionBuilder::to_transaction`] turns that
//! into a signable transaction with network-sourced gas defaults.

use crate::{BuildError, RequiredField, TransactionOptions};
use async_trait::async_trait;
use shardlink_provider::NodeProvider;
use shardlink_types::{
	encoding::{join_data_args, pad_even_hex, string_to_hex},
	Transaction,
};

/// Name of the token transfer instruction on the wire.
const TOKEN_TRANSFER_INSTRUCTION: &str = "ESDTTransfer";

/// Generic transaction builder.
///
/// Implementations provide the receiver and the raw data arguments; the
/// trait supplies payload assembly (including the token-transfer prefix) and
/// the conversion to a signable [`Transaction`].
#[async_trait]
pub trait TransactionBuilder: Send + Sync {
	/// The options this builder was created with.
	fn options(&self) -> &TransactionOptions;

	/// The receiver address in human-readable form.
	fn receiver(&self) -> String;

	/// The `data` tokens of the operation: function name first, then
	/// hex-encoded arguments in call order. Empty for a plain transfer.
	fn data_args(&self) -> Vec<String>;

	/// The full `data` string of this transaction.
	///
	/// When the options carry a token transfer, the transfer instruction
	/// (token-id hex, amount hex) is prepended ahead of the regular call
	/// arguments.
	fn data_string(&self) -> String {
		let mut args = Vec::new();
		if let Some(transfer) = &self.options().token_transfer {
			args.push(TOKEN_TRANSFER_INSTRUCTION.to_string());
			args.push(string_to_hex(&transfer.token_id));
			args.push(pad_even_hex(
				transfer.amount.to_raw_scale().to_string_radix(16),
			));
		}
		args.extend(self.data_args());
		join_data_args(&args)
	}

	/// Builds the signable transaction for this operation.
	///
	/// Default gas figures are sourced from the current network
	/// configuration: `gas_limit = min_gas_limit + gas_per_data_byte *
	/// data.len()` and `gas_price = min_gas_price`. Caller-supplied values
	/// in the options always override the computed defaults.
	async fn to_transaction(
		&self,
		provider: &dyn NodeProvider,
	) -> Result<Transaction, BuildError> {
		let options = self.options();
		options.require(&[RequiredField::Sender])?;

		let receiver = self.receiver();
		if receiver.is_empty() {
			return Err(BuildError::MissingRequiredField("receiver"));
		}

		let data = self.data_string();
		let config = provider.get_network_config().await?;
		let default_gas_limit =
			config.min_gas_limit + config.gas_per_data_byte * data.len() as u64;

		let value = options
			.value
			.as_ref()
			.map(|v| v.to_raw_scale().to_string())
			.unwrap_or_else(|| "0".to_string());

		Ok(Transaction {
			// Presence checked above.
			sender: options.sender.clone().unwrap_or_default(),
			receiver,
			value,
			gas_price: Some(options.gas_price.unwrap_or(config.min_gas_price)),
			gas_limit: Some(options.gas_limit.unwrap_or(default_gas_limit)),
			data: if data.is_empty() { None } else { Some(data) },
			meta: options.meta.clone(),
			nonce: options.nonce,
		})
	}
}

/// Builder for a plain value transfer, with no call data of its own.
///
/// Combined with [`TransactionOptions::token_transfer`] this also covers
/// fungible-token transfers.
pub struct TransferBuilder {
	receiver: String,
	options: TransactionOptions,
}

impl TransferBuilder {
	/// Creates a transfer to the given receiver.
	pub fn new(receiver: impl Into<String>, options: TransactionOptions) -> Self {
		Self {
			receiver: receiver.into(),
			options,
		}
	}
}

#[async_trait]
impl TransactionBuilder for TransferBuilder {
	fn options(&self) -> &TransactionOptions {
		&self.options
	}

	fn receiver(&self) -> String {
		self.receiver.clone()
	}

	fn data_args(&self) -> Vec<String> {
		Vec::new()
	}
}

/// Builder for a function call transaction.
pub struct FunctionCallBuilder {
	receiver: String,
	function: String,
	args: Vec<String>,
	options: TransactionOptions,
}

impl FunctionCallBuilder {
	/// Creates a call of `function` on the given receiver.
	///
	/// Arguments must already be hex-encoded.
	pub fn new(
		receiver: impl Into<String>,
		function: impl Into<String>,
		args: Vec<String>,
		options: TransactionOptions,
	) -> Self {
		Self {
			receiver: receiver.into(),
			function: function.into(),
			args,
			options,
		}
	}
}

#[async_trait]
impl TransactionBuilder for FunctionCallBuilder {
	fn options(&self) -> &TransactionOptions {
		&self.options
	}

	fn receiver(&self) -> String {
		self.receiver.clone()
	}

	fn data_args(&self) -> Vec<String> {
		let mut args = vec![self.function.clone()];
		args.extend(self.args.iter().cloned());
		args
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::TokenTransfer;
	use async_trait::async_trait;
	use shardlink_numeric::{Scale, ScaledDecimal};
	use shardlink_provider::ProviderError;
	use shardlink_types::{
		AccountOnChain, ContractQueryParams, ContractQueryResult, NetworkConfig,
		SignedTransaction, TransactionOnChain, TransactionReceipt,
	};

	/// Provider serving a fixed network configuration.
	struct StaticProvider;

	#[async_trait]
	impl NodeProvider for StaticProvider {
		async fn get_network_config(&self) -> Result<NetworkConfig, ProviderError> {
			Ok(NetworkConfig {
				version: "v1".to_string(),
				chain_id: "T".to_string(),
				gas_per_data_byte: 1_500,
				min_gas_limit: 50_000,
				min_gas_price: 1_000_000_000,
				min_transaction_version: 1,
			})
		}

		async fn get_account(&self, _address: &str) -> Result<AccountOnChain, ProviderError> {
			unimplemented!("not used by builders")
		}

		async fn query_contract(
			&self,
			_params: &ContractQueryParams,
		) -> Result<ContractQueryResult, ProviderError> {
			unimplemented!("not used by builders")
		}

		async fn send_signed_transaction(
			&self,
			_tx: &SignedTransaction,
		) -> Result<TransactionReceipt, ProviderError> {
			unimplemented!("not used by builders")
		}

		async fn get_transaction(
			&self,
			_tx_hash: &str,
		) -> Result<TransactionOnChain, ProviderError> {
			unimplemented!("not used by builders")
		}
	}

	fn sender_options() -> TransactionOptions {
		TransactionOptions {
			sender: Some("erd1sender".to_string()),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn test_function_call_gas_defaults() {
		let builder = FunctionCallBuilder::new(
			"erd1receiver",
			"add",
			vec!["029a".to_string()],
			sender_options(),
		);

		let tx = builder.to_transaction(&StaticProvider).await.unwrap();
		assert_eq!(tx.data.as_deref(), Some("add@029a"));
		// 50_000 + 1_500 per byte of "add@029a" (8 bytes).
		assert_eq!(tx.gas_limit, Some(62_000));
		assert_eq!(tx.gas_price, Some(1_000_000_000));
		assert_eq!(tx.value, "0");
	}

	#[tokio::test]
	async fn test_caller_gas_overrides_win() {
		let mut options = sender_options();
		options.gas_price = Some(2_000_000_000);
		options.gas_limit = Some(15_000_000);
		let builder = FunctionCallBuilder::new("erd1receiver", "add", vec![], options);

		let tx = builder.to_transaction(&StaticProvider).await.unwrap();
		assert_eq!(tx.gas_price, Some(2_000_000_000));
		assert_eq!(tx.gas_limit, Some(15_000_000));
	}

	#[tokio::test]
	async fn test_missing_sender_fails() {
		let builder =
			FunctionCallBuilder::new("erd1receiver", "add", vec![], TransactionOptions::default());

		let err = builder.to_transaction(&StaticProvider).await.unwrap_err();
		assert!(matches!(err, BuildError::MissingRequiredField("sender")));
	}

	#[tokio::test]
	async fn test_missing_receiver_fails() {
		let builder = FunctionCallBuilder::new("", "add", vec![], sender_options());

		let err = builder.to_transaction(&StaticProvider).await.unwrap_err();
		assert!(matches!(err, BuildError::MissingRequiredField("receiver")));
	}

	#[tokio::test]
	async fn test_value_rendered_at_raw_scale() {
		let mut options = sender_options();
		options.value = Some(ScaledDecimal::new("1.5", Scale::Display).unwrap());
		let builder = TransferBuilder::new("erd1receiver", options);

		let tx = builder.to_transaction(&StaticProvider).await.unwrap();
		assert_eq!(tx.value, "1500000000000000000");
		assert_eq!(tx.data, None);
		// No data: the minimum gas limit applies unchanged.
		assert_eq!(tx.gas_limit, Some(50_000));
	}

	#[tokio::test]
	async fn test_token_transfer_prefix() {
		let mut options = sender_options();
		options.token_transfer = Some(TokenTransfer {
			token_id: "TKN-abc123".to_string(),
			amount: ScaledDecimal::from_int(666, Scale::Raw),
		});
		let builder = FunctionCallBuilder::new(
			"erd1receiver",
			"add",
			vec!["05".to_string()],
			options,
		);

		assert_eq!(
			builder.data_string(),
			"ESDTTransfer@544b4e2d616263313233@029a@add@05"
		);
	}
}
