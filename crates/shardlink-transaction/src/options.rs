//! Transaction options and the merge/validate pattern.
//!
//! Base options are provided once (for instance when a contract handle is
//! created) and per-call options are merged over them, leaving both inputs
//! unchanged. Required-field checks are expressed as a set of tags and
//! return a typed error instead of being repeated ad hoc at every call site.

use crate::BuildError;
use shardlink_numeric::ScaledDecimal;

/// A fungible-token transfer to attach to a transaction.
///
/// When present, the builder prepends the transfer instruction to the
/// `data` payload ahead of the regular function call arguments.
#[derive(Debug, Clone)]
pub struct TokenTransfer {
	/// Identifier of the token being transferred.
	pub token_id: String,
	/// Amount to transfer, at the raw scale.
	pub amount: ScaledDecimal,
}

/// Fields a caller may be required to supply for a given operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
	/// The sender address.
	Sender,
	/// The transfer value.
	Value,
	/// An explicit gas limit.
	GasLimit,
}

/// Options for building and sending transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionOptions {
	/// Sender address in human-readable form.
	pub sender: Option<String>,
	/// Amount to transfer. Defaults to zero.
	pub value: Option<ScaledDecimal>,
	/// Gas price override. Defaults to the network minimum.
	pub gas_price: Option<u64>,
	/// Gas limit override. Defaults to the computed network minimum.
	pub gas_limit: Option<u64>,
	/// Explicit nonce. When unset the signer resolves it from the network.
	pub nonce: Option<u64>,
	/// Signer-specific metadata passed through to the transaction.
	pub meta: Option<serde_json::Value>,
	/// Token transfer to attach ahead of the call arguments.
	pub token_transfer: Option<TokenTransfer>,
}

impl TransactionOptions {
	/// Returns a copy of these options extended with the given overrides.
	///
	/// Fields set in `overrides` win; everything else is taken from `self`.
	/// Both inputs are left unmodified.
	pub fn merge(&self, overrides: &TransactionOptions) -> TransactionOptions {
		TransactionOptions {
			sender: overrides.sender.clone().or_else(|| self.sender.clone()),
			value: overrides.value.clone().or_else(|| self.value.clone()),
			gas_price: overrides.gas_price.or(self.gas_price),
			gas_limit: overrides.gas_limit.or(self.gas_limit),
			nonce: overrides.nonce.or(self.nonce),
			meta: overrides.meta.clone().or_else(|| self.meta.clone()),
			token_transfer: overrides
				.token_transfer
				.clone()
				.or_else(|| self.token_transfer.clone()),
		}
	}

	/// Checks that every listed field is present.
	pub fn require(&self, fields: &[RequiredField]) -> Result<(), BuildError> {
		for field in fields {
			let present = match field {
				RequiredField::Sender => self.sender.is_some(),
				RequiredField::Value => self.value.is_some(),
				RequiredField::GasLimit => self.gas_limit.is_some(),
			};
			if !present {
				return Err(BuildError::MissingRequiredField(match field {
					RequiredField::Sender => "sender",
					RequiredField::Value => "value",
					RequiredField::GasLimit => "gas limit",
				}));
			}
		}
		Ok(())
	}
}
