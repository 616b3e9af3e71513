//! Transaction assembly module for the shardlink client library.
//!
//! This module builds unsigned transactions: it merges per-call options over
//! base options, validates required fields, derives default gas figures from
//! the current network configuration, and encodes the `data` payload. It also
//! defines the signer seam every wallet implementation plugs into.

mod builder;
mod options;

pub use builder::{FunctionCallBuilder, TransactionBuilder, TransferBuilder};
pub use options::{RequiredField, TokenTransfer, TransactionOptions};

use async_trait::async_trait;
use shardlink_provider::{NodeProvider, ProviderError};
use shardlink_numeric::NumericError;
use shardlink_types::{SignedTransaction, Transaction};
use thiserror::Error;

/// Errors that can occur while building a transaction.
#[derive(Debug, Error)]
pub enum BuildError {
	/// A field required by the operation is absent from the merged options.
	#[error("{0} must be set")]
	MissingRequiredField(&'static str),
	/// Error from the node while fetching the network configuration.
	#[error(transparent)]
	Provider(#[from] ProviderError),
	/// A malformed numeric amount.
	#[error(transparent)]
	Numeric(#[from] NumericError),
}

/// Errors that can occur while signing a transaction.
#[derive(Debug, Error)]
pub enum SignerError {
	/// Error that occurs when the signing operation itself fails.
	#[error("signing failed: {0}")]
	SigningFailed(String),
	/// Error from the node while resolving the nonce or chain parameters.
	#[error(transparent)]
	Provider(#[from] ProviderError),
}

/// Interface for signing transactions.
///
/// A signer resolves an unset nonce and the chain parameters through the
/// provider, serializes the transaction canonically, and produces a
/// signature hex string.
#[async_trait]
pub trait Signer: Send + Sync {
	/// The signer's address in human-readable form.
	fn address(&self) -> String;

	/// Signs a transaction, resolving nonce and chain parameters as needed.
	async fn sign_transaction(
		&self,
		tx: &Transaction,
		provider: &dyn NodeProvider,
	) -> Result<SignedTransaction, SignerError>;
}
