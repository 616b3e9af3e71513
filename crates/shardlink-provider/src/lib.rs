//! Node API module for the shardlink client library.
//!
//! This module defines the interface every node backend must implement and
//! provides the HTTP proxy implementation plus the transaction tracker that
//! polls a broadcast transaction until it reaches a terminal status.

use async_trait::async_trait;
use shardlink_types::{
	AccountOnChain, ContractQueryParams, ContractQueryResult, NetworkConfig, SignedTransaction,
	TransactionOnChain, TransactionReceipt,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod proxy;
}

mod tracker;

pub use implementations::proxy::ProxyProvider;
pub use tracker::{
	wait_for_transaction, TrackingError, TransactionFailedError, TransactionTracker,
	DEFAULT_POLL_INTERVAL,
};

/// Errors that can occur while talking to a node.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
	/// Error that occurs during network communication.
	#[error("network error: {0}")]
	Network(String),
	/// Error that occurs when the node returns an explicit error, a
	/// non-success code, or a response with no usable data.
	#[error("node response error: {0}")]
	NodeResponse(String),
}

/// Interface for interacting with the network through a node.
///
/// The handle is shared read-only by every component that needs it; no
/// implementation holds state beyond the duration of a single request.
#[async_trait]
pub trait NodeProvider: Send + Sync {
	/// Fetches the current configuration of the network.
	async fn get_network_config(&self) -> Result<NetworkConfig, ProviderError>;

	/// Fetches the on-chain state of the given address.
	async fn get_account(&self, address: &str) -> Result<AccountOnChain, ProviderError>;

	/// Calls a contract function in read-only mode.
	async fn query_contract(
		&self,
		params: &ContractQueryParams,
	) -> Result<ContractQueryResult, ProviderError>;

	/// Broadcasts a signed transaction and returns its receipt.
	async fn send_signed_transaction(
		&self,
		tx: &SignedTransaction,
	) -> Result<TransactionReceipt, ProviderError>;

	/// Fetches a previously broadcast transaction by hash.
	async fn get_transaction(&self, tx_hash: &str) -> Result<TransactionOnChain, ProviderError>;
}
