//! Username resolution against the on-chain DNS contracts.
//!
//! Usernames are registered with a DNS contract on the shard the name hashes
//! to; a client that only holds the name does not know which shard that is.
//! [`Dns::resolve`] therefore scans the configured per-shard contracts and
//! returns the address registered under the name, if any shard knows it.

use shardlink_address::{Address, AddressError};
use shardlink_contract::{decode_query_result, Contract, ContractError, DecodedValue, ValueType};
use shardlink_provider::NodeProvider;
use shardlink_transaction::TransactionOptions;
use shardlink_types::string_to_hex;
use std::sync::Arc;
use thiserror::Error;

/// Name of the lookup function on the DNS contracts.
const RESOLVE_FUNCTION: &str = "resolve";

/// The mainnet DNS contracts, one per shard.
const MAINNET_SHARD_CONTRACTS: [&str; 5] = [
	"erd1qqqqqqqqqqqqqpgqe2cmllq3zhwfuzdpdzqh7223xnc907ffqphs865ruf",
	"erd1qqqqqqqqqqqqqpgq776u6lt7u5dr6ekn0636t3ua845gfppgqq4q4gewzt",
	"erd1qqqqqqqqqqqqqpgq3uxwmwtgmms6jytn3vzlw89vrxxe9xjwqrmsjex283",
	"erd1qqqqqqqqqqqqqpgqhmfvs04uzqrjajvslgsypfjhtyyaz7esqqjspwx8zh",
	"erd1qqqqqqqqqqqqqpgqmta7xtt292599mray67za5c3rl2yc5h0qq5sfya89w",
];

/// Errors that can occur while resolving a username.
#[derive(Debug, Error)]
pub enum DnsError {
	/// A malformed DNS contract address in the configuration.
	#[error(transparent)]
	Address(#[from] AddressError),
	/// A DNS contract query failed.
	#[error(transparent)]
	Contract(#[from] ContractError),
}

/// The set of DNS contracts to scan, one entry per shard.
#[derive(Debug, Clone)]
pub struct DnsConfig {
	/// Contract addresses in human-readable form.
	pub shard_contracts: Vec<String>,
}

impl Default for DnsConfig {
	fn default() -> Self {
		Self {
			shard_contracts: MAINNET_SHARD_CONTRACTS
				.iter()
				.map(|address| address.to_string())
				.collect(),
		}
	}
}

/// A username resolver backed by the per-shard DNS contracts.
pub struct Dns {
	provider: Arc<dyn NodeProvider>,
	base_options: TransactionOptions,
	config: DnsConfig,
}

impl Dns {
	/// Creates a resolver against the mainnet DNS contracts.
	pub fn new(provider: Arc<dyn NodeProvider>, base_options: TransactionOptions) -> Self {
		Self::with_config(provider, base_options, DnsConfig::default())
	}

	/// Creates a resolver against a custom set of DNS contracts.
	pub fn with_config(
		provider: Arc<dyn NodeProvider>,
		base_options: TransactionOptions,
		config: DnsConfig,
	) -> Self {
		Self {
			provider,
			base_options,
			config,
		}
	}

	/// Looks up the address registered under a username.
	///
	/// Each configured shard contract is queried in turn; the first one that
	/// returns data wins. A name no shard knows resolves to `None`.
	pub async fn resolve(&self, name: &str) -> Result<Option<Address>, DnsError> {
		let name_arg = string_to_hex(name);
		for contract_address in &self.config.shard_contracts {
			let contract = Contract::new(
				self.provider.clone(),
				Address::from_bech32(contract_address)?,
				self.base_options.clone(),
			);
			let result = contract
				.query(RESOLVE_FUNCTION, vec![name_arg.clone()])
				.await?;
			if result.return_data.is_empty() {
				continue;
			}
			if let DecodedValue::Address(address) =
				decode_query_result(&result, ValueType::Address, 0, None)?
			{
				tracing::debug!(name, resolved = %address, "Username resolved");
				return Ok(Some(address));
			}
		}
		Ok(None)
	}
}
