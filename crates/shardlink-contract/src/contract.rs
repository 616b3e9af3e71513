//! Contract handles and deployment.
//!
//! A [`Contract`] pairs a deployed address with a provider and a set of base
//! transaction options. Per-call options are merged over the base options, so
//! a handle created with a sender and gas policy can be invoked repeatedly
//! with only the arguments changing.

use crate::{CodeMetadata, ContractError};
use async_trait::async_trait;
use shardlink_address::{compute_contract_address, Address};
use shardlink_provider::NodeProvider;
use shardlink_transaction::{
	BuildError, FunctionCallBuilder, Signer, TransactionBuilder, TransactionOptions,
};
use shardlink_types::{ContractQueryParams, ContractQueryResult, TransactionReceipt};
use std::fmt;
use std::sync::Arc;

/// Virtual machine type tag embedded in every deployment payload.
const VM_TYPE_HEX: &str = "0500";

/// Name of the upgrade instruction on the wire.
const UPGRADE_INSTRUCTION: &str = "upgradeContract";

/// A handle to a deployed contract.
pub struct Contract {
	address: Address,
	provider: Arc<dyn NodeProvider>,
	base_options: TransactionOptions,
}

impl Contract {
	/// Creates a handle without checking that anything is deployed there.
	pub fn new(
		provider: Arc<dyn NodeProvider>,
		address: Address,
		base_options: TransactionOptions,
	) -> Self {
		Self {
			address,
			provider,
			base_options,
		}
	}

	/// Creates a handle, verifying that code is deployed at the address.
	pub async fn at(
		provider: Arc<dyn NodeProvider>,
		address: Address,
		base_options: TransactionOptions,
	) -> Result<Self, ContractError> {
		let account = provider.get_account(&address.to_bech32()).await?;
		if account.code.is_empty() {
			return Err(ContractError::NoCode(address.to_bech32()));
		}
		Ok(Self::new(provider, address, base_options))
	}

	/// The contract's address.
	pub fn address(&self) -> &Address {
		&self.address
	}

	/// Builds a function call against this contract without sending it.
	///
	/// Call options are merged over the handle's base options.
	pub fn create_invocation(
		&self,
		function: impl Into<String>,
		args: Vec<String>,
		call_options: &TransactionOptions,
	) -> FunctionCallBuilder {
		FunctionCallBuilder::new(
			self.address.to_bech32(),
			function,
			args,
			self.base_options.merge(call_options),
		)
	}

	/// Queries a read-only function of this contract.
	pub async fn query(
		&self,
		function: &str,
		args: Vec<String>,
	) -> Result<ContractQueryResult, ContractError> {
		let result = self
			.provider
			.query_contract(&ContractQueryParams {
				contract_address: self.address.to_bech32(),
				function_name: function.to_string(),
				args,
			})
			.await?;
		if !result.return_code.is_empty() && result.return_code != "ok" {
			return Err(ContractError::QueryFailed(result.return_code));
		}
		Ok(result)
	}

	/// Signs and broadcasts a function call against this contract.
	pub async fn invoke(
		&self,
		signer: &dyn Signer,
		function: &str,
		args: Vec<String>,
		call_options: &TransactionOptions,
	) -> Result<TransactionReceipt, ContractError> {
		let builder = self.create_invocation(function, args, call_options);
		let tx = builder.to_transaction(self.provider.as_ref()).await?;
		let signed = signer.sign_transaction(&tx, self.provider.as_ref()).await?;
		let receipt = self.provider.send_signed_transaction(&signed).await?;
		tracing::info!(
			contract = %self.address,
			function,
			tx_hash = %receipt.hash,
			"Contract call submitted"
		);
		Ok(receipt)
	}

	/// Deploys a contract and returns a handle to the deployed address.
	///
	/// The deployed address is a pure function of the deployer and the nonce
	/// the deployment transaction runs at; when the options carry no nonce it
	/// is fetched from the deployer's account so the address can be computed
	/// before the transaction even executes.
	pub async fn deploy(
		provider: Arc<dyn NodeProvider>,
		signer: &dyn Signer,
		code_hex: impl Into<String>,
		metadata: CodeMetadata,
		init_args: Vec<String>,
		options: TransactionOptions,
	) -> Result<(Self, TransactionReceipt), ContractError> {
		let mut options = options;
		let sender = options
			.sender
			.clone()
			.ok_or(BuildError::MissingRequiredField("sender"))?;
		let nonce = match options.nonce {
			Some(nonce) => nonce,
			None => provider.get_account(&sender).await?.nonce,
		};
		options.nonce = Some(nonce);

		let builder = DeployBuilder::new(code_hex, metadata, init_args, options.clone());
		let tx = builder.to_transaction(provider.as_ref()).await?;
		let signed = signer.sign_transaction(&tx, provider.as_ref()).await?;
		let receipt = provider.send_signed_transaction(&signed).await?;

		let deployer = Address::from_bech32(&sender)?;
		let deployed = compute_contract_address(&deployer, nonce);
		tracing::info!(
			contract = %deployed,
			tx_hash = %receipt.hash,
			"Contract deployment submitted"
		);

		// The resolved nonce belonged to the deployment alone.
		options.nonce = None;
		Ok((Self::new(provider, deployed, options), receipt))
	}

	/// Signs and broadcasts an upgrade of this contract's code.
	pub async fn upgrade(
		&self,
		signer: &dyn Signer,
		code_hex: impl Into<String>,
		metadata: CodeMetadata,
		init_args: Vec<String>,
		call_options: &TransactionOptions,
	) -> Result<TransactionReceipt, ContractError> {
		let builder = UpgradeBuilder::new(
			self.address.to_bech32(),
			code_hex,
			metadata,
			init_args,
			self.base_options.merge(call_options),
		);
		let tx = builder.to_transaction(self.provider.as_ref()).await?;
		let signed = signer.sign_transaction(&tx, self.provider.as_ref()).await?;
		let receipt = self.provider.send_signed_transaction(&signed).await?;
		tracing::info!(
			contract = %self.address,
			tx_hash = %receipt.hash,
			"Contract upgrade submitted"
		);
		Ok(receipt)
	}
}

// The provider handle is not Debug, so the derive is unavailable.
impl fmt::Debug for Contract {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Contract")
			.field("address", &self.address.to_bech32())
			.field("base_options", &self.base_options)
			.finish_non_exhaustive()
	}
}

/// Builder for a contract deployment transaction.
///
/// The payload is `code @ vm-type @ metadata @ init args…` and the receiver
/// is always the zero address.
pub struct DeployBuilder {
	code_hex: String,
	metadata: CodeMetadata,
	init_args: Vec<String>,
	options: TransactionOptions,
}

impl DeployBuilder {
	pub fn new(
		code_hex: impl Into<String>,
		metadata: CodeMetadata,
		init_args: Vec<String>,
		options: TransactionOptions,
	) -> Self {
		Self {
			code_hex: code_hex.into(),
			metadata,
			init_args,
			options,
		}
	}
}

#[async_trait]
impl TransactionBuilder for DeployBuilder {
	fn options(&self) -> &TransactionOptions {
		&self.options
	}

	fn receiver(&self) -> String {
		Address::zero().to_bech32()
	}

	fn data_args(&self) -> Vec<String> {
		let mut args = vec![
			self.code_hex.clone(),
			VM_TYPE_HEX.to_string(),
			self.metadata.to_hex(),
		];
		args.extend(self.init_args.iter().cloned());
		args
	}
}

/// Builder for a contract upgrade transaction.
pub struct UpgradeBuilder {
	receiver: String,
	code_hex: String,
	metadata: CodeMetadata,
	init_args: Vec<String>,
	options: TransactionOptions,
}

impl UpgradeBuilder {
	pub fn new(
		receiver: impl Into<String>,
		code_hex: impl Into<String>,
		metadata: CodeMetadata,
		init_args: Vec<String>,
		options: TransactionOptions,
	) -> Self {
		Self {
			receiver: receiver.into(),
			code_hex: code_hex.into(),
			metadata,
			init_args,
			options,
		}
	}
}

#[async_trait]
impl TransactionBuilder for UpgradeBuilder {
	fn options(&self) -> &TransactionOptions {
		&self.options
	}

	fn receiver(&self) -> String {
		self.receiver.clone()
	}

	fn data_args(&self) -> Vec<String> {
		let mut args = vec![
			UPGRADE_INSTRUCTION.to_string(),
			self.code_hex.clone(),
			self.metadata.to_hex(),
		];
		args.extend(self.init_args.iter().cloned());
		args
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use shardlink_provider::ProviderError;
	use shardlink_transaction::SignerError;
	use shardlink_types::{
		AccountOnChain, NetworkConfig, SignedTransaction, Transaction, TransactionOnChain,
	};
	use tokio::sync::Mutex;

	const DEPLOYER: &str = "erd1tcylw3y4s2y43xps0cjuvgql2zld9aze4c7ku6ekhezu39tpag5q6audht";

	/// Provider with a fixed account and config, capturing what was sent.
	struct RecordingProvider {
		account_nonce: u64,
		account_code: String,
		sent: Mutex<Option<SignedTransaction>>,
	}

	impl RecordingProvider {
		fn new(account_nonce: u64, account_code: &str) -> Arc<Self> {
			Arc::new(Self {
				account_nonce,
				account_code: account_code.to_string(),
				sent: Mutex::new(None),
			})
		}
	}

	#[async_trait]
	impl NodeProvider for RecordingProvider {
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

		async fn get_account(&self, address: &str) -> Result<AccountOnChain, ProviderError> {
			Ok(AccountOnChain {
				address: address.to_string(),
				balance: "0".to_string(),
				nonce: self.account_nonce,
				code: self.account_code.clone(),
			})
		}

		async fn query_contract(
			&self,
			_params: &ContractQueryParams,
		) -> Result<ContractQueryResult, ProviderError> {
			unimplemented!("not used here")
		}

		async fn send_signed_transaction(
			&self,
			tx: &SignedTransaction,
		) -> Result<TransactionReceipt, ProviderError> {
			*self.sent.lock().await = Some(tx.clone());
			Ok(TransactionReceipt::from_hash("txhash"))
		}

		async fn get_transaction(
			&self,
			_tx_hash: &str,
		) -> Result<TransactionOnChain, ProviderError> {
			unimplemented!("not used here")
		}
	}

	/// Signer that copies the transaction through without a real signature.
	struct PassthroughSigner;

	#[async_trait]
	impl Signer for PassthroughSigner {
		fn address(&self) -> String {
			DEPLOYER.to_string()
		}

		async fn sign_transaction(
			&self,
			tx: &Transaction,
			_provider: &dyn NodeProvider,
		) -> Result<SignedTransaction, SignerError> {
			Ok(SignedTransaction {
				nonce: tx.nonce.unwrap_or_default(),
				value: tx.value.clone(),
				receiver: tx.receiver.clone(),
				sender: tx.sender.clone(),
				gas_price: tx.gas_price.unwrap_or_default(),
				gas_limit: tx.gas_limit.unwrap_or_default(),
				data: tx.data.clone(),
				chain_id: "T".to_string(),
				version: 1,
				signature: "00".to_string(),
			})
		}
	}

	fn deployer_options() -> TransactionOptions {
		TransactionOptions {
			sender: Some(DEPLOYER.to_string()),
			..Default::default()
		}
	}

	#[test]
	fn test_deploy_payload_layout() {
		let builder = DeployBuilder::new(
			"c0de",
			CodeMetadata::new(true, false, false),
			vec!["029a".to_string()],
			deployer_options(),
		);
		assert_eq!(builder.data_string(), "c0de@0500@0100@029a");
		assert_eq!(
			builder.receiver(),
			"erd1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq6gq4hu"
		);
	}

	#[test]
	fn test_upgrade_payload_layout() {
		let builder = UpgradeBuilder::new(
			"erd1contract",
			"c0de",
			CodeMetadata::new(true, true, false),
			vec![],
			deployer_options(),
		);
		assert_eq!(builder.data_string(), "upgradeContract@c0de@0500");
	}

	#[tokio::test]
	async fn test_deploy_computes_address_from_fetched_nonce() {
		let provider = RecordingProvider::new(0, "");
		let (contract, receipt) = Contract::deploy(
			provider.clone(),
			&PassthroughSigner,
			"c0de",
			CodeMetadata::default(),
			vec![],
			deployer_options(),
		)
		.await
		.unwrap();

		assert_eq!(receipt.hash, "txhash");
		assert_eq!(
			contract.address().to_bech32(),
			"erd1qqqqqqqqqqqqqpgqvjupyg34fv0wmngcmnpre6qzs65yja85ag5qx0w529"
		);
		let sent = provider.sent.lock().await.clone().unwrap();
		assert_eq!(sent.nonce, 0);
		assert_eq!(sent.data.as_deref(), Some("c0de@0500@0000"));
	}

	#[tokio::test]
	async fn test_deploy_honors_explicit_nonce() {
		let provider = RecordingProvider::new(42, "");
		let mut options = deployer_options();
		options.nonce = Some(5);
		let (contract, _) = Contract::deploy(
			provider,
			&PassthroughSigner,
			"c0de",
			CodeMetadata::default(),
			vec![],
			options,
		)
		.await
		.unwrap();

		assert_eq!(
			contract.address().to_bech32(),
			"erd1qqqqqqqqqqqqqpgqkknks6pw74u0pkmtxhf7lds44e3gageuag5qpgnvz9"
		);
	}

	#[test]
	fn test_debug_output_names_address() {
		let provider = RecordingProvider::new(0, "");
		let address = Address::from_bech32(DEPLOYER).unwrap();
		let contract = Contract::new(provider, address, TransactionOptions::default());
		assert!(format!("{:?}", contract).contains(DEPLOYER));
	}

	#[tokio::test]
	async fn test_at_rejects_codeless_account() {
		let provider = RecordingProvider::new(0, "");
		let address = Address::from_bech32(DEPLOYER).unwrap();
		let err = Contract::at(provider, address, TransactionOptions::default())
			.await
			.unwrap_err();
		assert!(matches!(err, ContractError::NoCode(_)));
	}

	#[tokio::test]
	async fn test_at_accepts_deployed_account() {
		let provider = RecordingProvider::new(0, "c0de");
		let address = Address::from_bech32(DEPLOYER).unwrap();
		assert!(
			Contract::at(provider, address, TransactionOptions::default())
				.await
				.is_ok()
		);
	}

	#[tokio::test]
	async fn test_invoke_merges_base_options() {
		let provider = RecordingProvider::new(0, "c0de");
		let address = Address::from_bech32(DEPLOYER).unwrap();
		let contract = Contract::new(provider.clone(), address, deployer_options());

		let receipt = contract
			.invoke(
				&PassthroughSigner,
				"add",
				vec!["029a".to_string()],
				&TransactionOptions::default(),
			)
			.await
			.unwrap();

		assert_eq!(receipt.hash, "txhash");
		let sent = provider.sent.lock().await.clone().unwrap();
		assert_eq!(sent.sender, DEPLOYER);
		assert_eq!(sent.data.as_deref(), Some("add@029a"));
	}
}
