//! Contract interaction module for the shardlink client library.
//!
//! This module provides the high-level contract surface: deploying and
//! upgrading contract code, invoking functions through a signer, running
//! read-only queries, and decoding positional query return values into
//! typed Rust values.

mod contract;
mod decode;
mod metadata;

pub use contract::{Contract, DeployBuilder, UpgradeBuilder};
pub use decode::{decode_query_result, DecodedValue, ValueType};
pub use metadata::CodeMetadata;

use shardlink_address::AddressError;
use shardlink_numeric::NumericError;
use shardlink_provider::ProviderError;
use shardlink_transaction::{BuildError, SignerError};
use thiserror::Error;

/// Errors that can occur during contract interaction.
#[derive(Debug, Error)]
pub enum ContractError {
	/// No code is deployed at the given address.
	#[error("no contract code at {0}")]
	NoCode(String),
	/// The node executed the query but reported a non-ok return code.
	#[error("query failed with return code {0}")]
	QueryFailed(String),
	/// A query return value could not be decoded as the expected type.
	#[error("invalid query result: {0}")]
	InvalidQueryResult(String),
	/// A malformed address.
	#[error(transparent)]
	Address(#[from] AddressError),
	/// A malformed numeric return value.
	#[error(transparent)]
	Numeric(#[from] NumericError),
	/// Error from the node.
	#[error(transparent)]
	Provider(#[from] ProviderError),
	/// Error while building the transaction.
	#[error(transparent)]
	Build(#[from] BuildError),
	/// Error while signing the transaction.
	#[error(transparent)]
	Signer(#[from] SignerError),
}
