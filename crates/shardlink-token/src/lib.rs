//! Fungible token operations for the shardlink client library.
//!
//! Tokens are managed by a system contract living on the metachain: issuance,
//! supply changes, pausing, freezing and configuration changes are all
//! regular contract calls against that address. This module wraps those calls
//! and the associated property queries behind a typed [`Token`] handle.

use regex::Regex;
use shardlink_address::{Address, AddressError};
use shardlink_contract::{decode_query_result, Contract, ContractError, DecodedValue, ValueType};
use shardlink_numeric::{NumericError, Scale, ScaledDecimal};
use shardlink_provider::{NodeProvider, ProviderError};
use shardlink_transaction::{
	BuildError, Signer, SignerError, TokenTransfer, TransactionBuilder, TransactionOptions,
	TransferBuilder,
};
use shardlink_types::{
	encoding::{pad_even_hex, string_to_hex},
	ContractQueryResult, TransactionReceipt, ARGS_DELIMITER,
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Address of the metachain system contract handling token issuance and all
/// other token management operations.
pub const METACHAIN_TOKEN_CONTRACT: &str =
	"erd1qqqqqqqqqqqqqqqpqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqzllls8a5w6u";

/// Gas limit used for token management operations unless overridden.
pub const TOKEN_MGMT_STANDARD_GAS_COST: u64 = 51_000_000;

/// Issuance cost in display units, charged by the system contract.
const ISSUE_COST_DISPLAY: i128 = 5;

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum TokenError {
	/// The queried token identifier is not known to the system contract.
	#[error("unknown token: {0}")]
	UnknownToken(String),
	/// The token property listing could not be interpreted.
	#[error("invalid token info: {0}")]
	InvalidTokenInfo(String),
	/// A malformed address.
	#[error(transparent)]
	Address(#[from] AddressError),
	/// A malformed numeric value.
	#[error(transparent)]
	Numeric(#[from] NumericError),
	/// Error from the contract layer.
	#[error(transparent)]
	Contract(#[from] ContractError),
	/// Error from the node.
	#[error(transparent)]
	Provider(#[from] ProviderError),
	/// Error while building a transaction.
	#[error(transparent)]
	Build(#[from] BuildError),
	/// Error while signing a transaction.
	#[error(transparent)]
	Signer(#[from] SignerError),
}

/// Mutable token configuration flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenConfig {
	pub can_upgrade: bool,
	pub can_mint: bool,
	pub can_burn: bool,
	pub can_change_owner: bool,
	pub can_pause: bool,
	pub can_freeze: bool,
	pub can_wipe: bool,
}

impl TokenConfig {
	/// The configuration as wire pairs: hex key followed by hex boolean.
	fn to_data_args(self) -> Vec<String> {
		let pairs = [
			("canUpgrade", self.can_upgrade),
			("canMint", self.can_mint),
			("canBurn", self.can_burn),
			("canChangeOwner", self.can_change_owner),
			("canPause", self.can_pause),
			("canFreeze", self.can_freeze),
			("canWipe", self.can_wipe),
		];
		pairs
			.iter()
			.flat_map(|(key, value)| {
				[
					string_to_hex(key),
					string_to_hex(if *value { "true" } else { "false" }),
				]
			})
			.collect()
	}
}

/// Token properties as reported by the system contract.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
	pub id: String,
	pub name: String,
	pub owner: Address,
	pub supply: ScaledDecimal,
	pub paused: bool,
	pub config: TokenConfig,
}

/// A handle to an issued fungible token.
pub struct Token {
	id: String,
	provider: Arc<dyn NodeProvider>,
	base_options: TransactionOptions,
	contract: Contract,
}

impl Token {
	fn assemble(
		provider: Arc<dyn NodeProvider>,
		id: impl Into<String>,
		base_options: TransactionOptions,
	) -> Result<Self, TokenError> {
		let contract = Contract::new(
			provider.clone(),
			Address::from_bech32(METACHAIN_TOKEN_CONTRACT)?,
			base_options.clone(),
		);
		Ok(Self {
			id: id.into(),
			provider,
			base_options,
			contract,
		})
	}

	/// The token identifier.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Issues a new token.
	///
	/// The system contract charges a fixed issuance cost which is attached as
	/// the transaction value unless the options already carry one. The
	/// identifier assigned to the new token is reported through the
	/// transaction's execution results, not through this call; discovering it
	/// is left to the caller once the transaction completes.
	pub async fn issue(
		provider: Arc<dyn NodeProvider>,
		signer: &dyn Signer,
		name: &str,
		ticker: &str,
		initial_supply: &ScaledDecimal,
		options: TransactionOptions,
	) -> Result<TransactionReceipt, TokenError> {
		let contract = Contract::new(
			provider.clone(),
			Address::from_bech32(METACHAIN_TOKEN_CONTRACT)?,
			options,
		);
		let call_options = TransactionOptions {
			gas_limit: Some(TOKEN_MGMT_STANDARD_GAS_COST),
			value: Some(ScaledDecimal::from_int(ISSUE_COST_DISPLAY, Scale::Display)),
			..Default::default()
		};
		let receipt = contract
			.invoke(
				signer,
				"issue",
				vec![
					string_to_hex(name),
					string_to_hex(ticker),
					amount_to_hex(initial_supply),
				],
				&call_options,
			)
			.await?;
		tracing::info!(ticker, tx_hash = %receipt.hash, "Token issuance submitted");
		Ok(receipt)
	}

	/// Loads an existing token, verifying that it is known to the system.
	pub async fn load(
		provider: Arc<dyn NodeProvider>,
		id: impl Into<String>,
		base_options: TransactionOptions,
	) -> Result<Self, TokenError> {
		let token = Self::assemble(provider, id, base_options)?;
		token.get_info().await?;
		Ok(token)
	}

	/// Lists every token identifier known to the system contract.
	pub async fn get_all_token_ids(
		provider: Arc<dyn NodeProvider>,
		options: TransactionOptions,
	) -> Result<Vec<String>, TokenError> {
		let contract = Contract::new(
			provider,
			Address::from_bech32(METACHAIN_TOKEN_CONTRACT)?,
			options,
		);
		let result = contract.query("getAllESDTTokens", vec![]).await?;
		let listing = string_at(&result, 0)?;
		if listing.is_empty() {
			return Ok(Vec::new());
		}
		Ok(listing.split(ARGS_DELIMITER).map(String::from).collect())
	}

	/// Fetches the token's current properties.
	pub async fn get_info(&self) -> Result<TokenInfo, TokenError> {
		let result = self
			.contract
			.query("getTokenProperties", vec![string_to_hex(&self.id)])
			.await?;

		let name = string_at(&result, 0)?;
		if name.is_empty() {
			return Err(TokenError::UnknownToken(self.id.clone()));
		}

		let owner = match decode_query_result(&result, ValueType::Address, 1, None)? {
			DecodedValue::Address(address) => address,
			other => {
				return Err(TokenError::InvalidTokenInfo(format!(
					"unexpected owner value: {other:?}"
				)))
			}
		};

		let supply_text = string_at(&result, 2)?;
		let supply = if supply_text.is_empty() {
			ScaledDecimal::zero(Scale::Raw)
		} else {
			ScaledDecimal::new(&supply_text, Scale::Raw)?
		};

		Ok(TokenInfo {
			id: self.id.clone(),
			name,
			owner,
			supply,
			paused: bool_at(&result, 4)?,
			config: TokenConfig {
				can_upgrade: bool_at(&result, 5)?,
				can_mint: bool_at(&result, 6)?,
				can_burn: bool_at(&result, 7)?,
				can_change_owner: bool_at(&result, 8)?,
				can_pause: bool_at(&result, 9)?,
				can_freeze: bool_at(&result, 10)?,
				can_wipe: bool_at(&result, 11)?,
			},
		})
	}

	/// Transfers tokens to another address.
	pub async fn transfer(
		&self,
		signer: &dyn Signer,
		to: &str,
		amount: &ScaledDecimal,
		overrides: &TransactionOptions,
	) -> Result<TransactionReceipt, TokenError> {
		let mut options = self.base_options.merge(overrides);
		options.token_transfer = Some(TokenTransfer {
			token_id: self.id.clone(),
			amount: amount.to_raw_scale(),
		});

		let builder = TransferBuilder::new(to, options);
		let tx = builder.to_transaction(self.provider.as_ref()).await?;
		let signed = signer.sign_transaction(&tx, self.provider.as_ref()).await?;
		let receipt = self.provider.send_signed_transaction(&signed).await?;
		tracing::info!(
			token = %self.id,
			to,
			tx_hash = %receipt.hash,
			"Token transfer submitted"
		);
		Ok(receipt)
	}

	/// Changes the total supply of the token.
	pub async fn mint(
		&self,
		signer: &dyn Signer,
		new_supply: &ScaledDecimal,
		overrides: &TransactionOptions,
	) -> Result<TransactionReceipt, TokenError> {
		self.manage(
			signer,
			"mint",
			vec![string_to_hex(&self.id), amount_to_hex(new_supply)],
			overrides,
		)
		.await
	}

	/// Burns the caller's own tokens.
	pub async fn burn(
		&self,
		signer: &dyn Signer,
		amount: &ScaledDecimal,
		overrides: &TransactionOptions,
	) -> Result<TransactionReceipt, TokenError> {
		self.manage(
			signer,
			"ESDTburn",
			vec![string_to_hex(&self.id), amount_to_hex(amount)],
			overrides,
		)
		.await
	}

	/// Pauses token transfers. Burning and minting stay allowed.
	pub async fn pause(
		&self,
		signer: &dyn Signer,
		overrides: &TransactionOptions,
	) -> Result<TransactionReceipt, TokenError> {
		self.manage(signer, "pause", vec![string_to_hex(&self.id)], overrides)
			.await
	}

	/// Resumes token transfers.
	pub async fn unpause(
		&self,
		signer: &dyn Signer,
		overrides: &TransactionOptions,
	) -> Result<TransactionReceipt, TokenError> {
		self.manage(signer, "unPause", vec![string_to_hex(&self.id)], overrides)
			.await
	}

	/// Freezes transfers to and from a specific account.
	pub async fn freeze(
		&self,
		signer: &dyn Signer,
		address: &Address,
		overrides: &TransactionOptions,
	) -> Result<TransactionReceipt, TokenError> {
		self.manage(
			signer,
			"freeze",
			vec![string_to_hex(&self.id), address.to_hex()],
			overrides,
		)
		.await
	}

	/// Unfreezes transfers to and from a specific account.
	pub async fn unfreeze(
		&self,
		signer: &dyn Signer,
		address: &Address,
		overrides: &TransactionOptions,
	) -> Result<TransactionReceipt, TokenError> {
		self.manage(
			signer,
			"unFreeze",
			vec![string_to_hex(&self.id), address.to_hex()],
			overrides,
		)
		.await
	}

	/// Wipes all tokens from a currently frozen account.
	pub async fn wipe(
		&self,
		signer: &dyn Signer,
		address: &Address,
		overrides: &TransactionOptions,
	) -> Result<TransactionReceipt, TokenError> {
		self.manage(
			signer,
			"wipe",
			vec![string_to_hex(&self.id), address.to_hex()],
			overrides,
		)
		.await
	}

	/// Transfers ownership of the token to another account.
	pub async fn change_owner(
		&self,
		signer: &dyn Signer,
		new_owner: &Address,
		overrides: &TransactionOptions,
	) -> Result<TransactionReceipt, TokenError> {
		self.manage(
			signer,
			"transferOwnership",
			vec![string_to_hex(&self.id), new_owner.to_hex()],
			overrides,
		)
		.await
	}

	/// Replaces the token configuration.
	pub async fn update_config(
		&self,
		signer: &dyn Signer,
		new_config: TokenConfig,
		overrides: &TransactionOptions,
	) -> Result<TransactionReceipt, TokenError> {
		let mut args = vec![string_to_hex(&self.id)];
		args.extend(new_config.to_data_args());
		self.manage(signer, "controlChanges", args, overrides).await
	}

	/// Invokes a management function with the standard gas limit default.
	async fn manage(
		&self,
		signer: &dyn Signer,
		function: &str,
		args: Vec<String>,
		overrides: &TransactionOptions,
	) -> Result<TransactionReceipt, TokenError> {
		let mut options = overrides.clone();
		if options.gas_limit.is_none() {
			options.gas_limit = Some(TOKEN_MGMT_STANDARD_GAS_COST);
		}
		Ok(self.contract.invoke(signer, function, args, &options).await?)
	}
}

// The provider handle is not Debug, so the derive is unavailable.
impl fmt::Debug for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Token")
			.field("id", &self.id)
			.field("base_options", &self.base_options)
			.finish_non_exhaustive()
	}
}

/// The raw-scale amount as a minimal even-length hex magnitude.
fn amount_to_hex(amount: &ScaledDecimal) -> String {
	pad_even_hex(amount.to_raw_scale().to_string_radix(16))
}

fn string_at(result: &ContractQueryResult, index: usize) -> Result<String, TokenError> {
	match decode_query_result(result, ValueType::String, index, None)? {
		DecodedValue::String(s) => Ok(s),
		_ => Ok(String::new()),
	}
}

/// Reads a `Key-true` / `Key-false` property slot.
fn bool_at(result: &ContractQueryResult, index: usize) -> Result<bool, TokenError> {
	let pattern = Regex::new("(true|false)")
		.map_err(|e| TokenError::InvalidTokenInfo(format!("regex error: {e}")))?;
	match decode_query_result(result, ValueType::Boolean, index, Some(&pattern))? {
		DecodedValue::Boolean(b) => Ok(b),
		_ => Ok(false),
	}
}
