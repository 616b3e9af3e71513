//! Transaction status polling.
//!
//! A [`TransactionTracker`] owns the polling loop for one transaction hash:
//! it fetches the transaction at a fixed interval, classifies the reported
//! status, and resolves exactly once at the first terminal status. Terminal
//! outcomes are sticky for the lifetime of the tracker instance.

use crate::{NodeProvider, ProviderError};
use futures::future;
use shardlink_types::{TransactionReceipt, TransactionStatus};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Delay between consecutive status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// An on-chain execution failure, carrying the partial receipt.
///
/// The receipt holds the on-chain record at the moment of failure so the
/// failure reason can be surfaced to the caller.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransactionFailedError {
	/// Human-readable failure reason.
	pub message: String,
	/// Receipt with the on-chain record at the time of failure.
	pub receipt: TransactionReceipt,
}

/// Errors that can occur while tracking a transaction.
#[derive(Debug, Clone, Error)]
pub enum TrackingError {
	/// The transaction reached the failure status on chain.
	#[error(transparent)]
	Failed(#[from] TransactionFailedError),
	/// A poll-level I/O failure. Terminal for the tracker; retry policy
	/// belongs to the caller.
	#[error("error checking transaction {hash}: {message}")]
	Io {
		/// Hash of the tracked transaction.
		hash: String,
		/// The underlying provider error.
		message: String,
	},
	/// The caller's cancellation signal fired before a terminal status.
	#[error("tracking cancelled")]
	Cancelled,
}

/// Polls a transaction until it reaches a terminal status.
///
/// Polls are strictly sequential: a new poll begins only after the previous
/// one resolves, separated by the configured interval. Independent trackers
/// for different hashes run fully in parallel with no coordination.
pub struct TransactionTracker {
	provider: Arc<dyn NodeProvider>,
	tx_hash: String,
	poll_interval: Duration,
	/// First terminal outcome, replayed on any later wait.
	outcome: Mutex<Option<Result<TransactionReceipt, TrackingError>>>,
}

impl TransactionTracker {
	/// Creates a tracker for the given transaction hash.
	pub fn new(provider: Arc<dyn NodeProvider>, tx_hash: impl Into<String>) -> Self {
		Self {
			provider,
			tx_hash: tx_hash.into(),
			poll_interval: DEFAULT_POLL_INTERVAL,
			outcome: Mutex::new(None),
		}
	}

	/// Overrides the inter-poll delay.
	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	/// Waits until the transaction has finished executing.
	///
	/// Resolves with the full receipt on success. On failure the error
	/// carries the partial receipt with the on-chain record.
	pub async fn wait_for_completion(&self) -> Result<TransactionReceipt, TrackingError> {
		self.wait_with_cancel(future::pending::<()>()).await
	}

	/// Waits until the transaction finishes or the cancel future resolves.
	///
	/// When the signal fires, the next scheduled poll resolves immediately
	/// with [`TrackingError::Cancelled`] instead of continuing.
	pub async fn wait_with_cancel(
		&self,
		cancel: impl Future<Output = ()> + Send,
	) -> Result<TransactionReceipt, TrackingError> {
		let mut outcome = self.outcome.lock().await;
		if let Some(result) = outcome.as_ref() {
			// Terminal states are sticky.
			return result.clone();
		}

		tokio::pin!(cancel);
		let result = loop {
			tokio::select! {
				biased;
				_ = &mut cancel => break Err(TrackingError::Cancelled),
				_ = tokio::time::sleep(self.poll_interval) => {}
			}

			let tx = match self.provider.get_transaction(&self.tx_hash).await {
				Ok(tx) => tx,
				Err(e) => break Err(self.io_error(e)),
			};

			match tx.status {
				TransactionStatus::Success => {
					tracing::debug!(tx_hash = %self.tx_hash, "Transaction succeeded");
					break Ok(TransactionReceipt {
						hash: self.tx_hash.clone(),
						signed_transaction: None,
						on_chain: Some(tx),
					});
				}
				TransactionStatus::Failure => {
					let message = if tx.smart_contract_errors.is_empty() {
						format!("transaction failed: {}", self.tx_hash)
					} else {
						format!(
							"smart contract error:\n\n{}",
							tx.smart_contract_errors.join("\n")
						)
					};
					let receipt = TransactionReceipt {
						hash: self.tx_hash.clone(),
						signed_transaction: None,
						on_chain: Some(tx),
					};
					break Err(TrackingError::Failed(TransactionFailedError {
						message,
						receipt,
					}));
				}
				TransactionStatus::Pending => {
					tracing::debug!(tx_hash = %self.tx_hash, "Transaction still pending");
				}
			}
		};

		*outcome = Some(result.clone());
		result
	}

	fn io_error(&self, e: ProviderError) -> TrackingError {
		TrackingError::Io {
			hash: self.tx_hash.clone(),
			message: e.to_string(),
		}
	}
}

/// Waits for a broadcast transaction to finish executing.
///
/// Convenience wrapper over [`TransactionTracker`] with the default poll
/// interval.
pub async fn wait_for_transaction(
	provider: Arc<dyn NodeProvider>,
	tx_hash: &str,
) -> Result<TransactionReceipt, TrackingError> {
	TransactionTracker::new(provider, tx_hash)
		.wait_for_completion()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::NodeProvider;
	use async_trait::async_trait;
	use shardlink_types::{
		AccountOnChain, ContractQueryParams, ContractQueryResult, NetworkConfig,
		SignedTransaction, TransactionOnChain,
	};
	use std::collections::VecDeque;
	use std::sync::atomic::{AtomicUsize, Ordering};

	/// Provider serving a scripted sequence of poll responses.
	struct ScriptedProvider {
		responses: Mutex<VecDeque<Result<serde_json::Value, ProviderError>>>,
		polls: AtomicUsize,
	}

	impl ScriptedProvider {
		fn new(responses: Vec<Result<serde_json::Value, ProviderError>>) -> Arc<Self> {
			Arc::new(Self {
				responses: Mutex::new(responses.into()),
				polls: AtomicUsize::new(0),
			})
		}

		fn from_statuses(statuses: &[&str]) -> Arc<Self> {
			Self::new(
				statuses
					.iter()
					.map(|s| Ok(serde_json::json!({ "status": s })))
					.collect(),
			)
		}
	}

	#[async_trait]
	impl NodeProvider for ScriptedProvider {
		async fn get_network_config(&self) -> Result<NetworkConfig, ProviderError> {
			unimplemented!("not used by the tracker")
		}

		async fn get_account(&self, _address: &str) -> Result<AccountOnChain, ProviderError> {
			unimplemented!("not used by the tracker")
		}

		async fn query_contract(
			&self,
			_params: &ContractQueryParams,
		) -> Result<ContractQueryResult, ProviderError> {
			unimplemented!("not used by the tracker")
		}

		async fn send_signed_transaction(
			&self,
			_tx: &SignedTransaction,
		) -> Result<TransactionReceipt, ProviderError> {
			unimplemented!("not used by the tracker")
		}

		async fn get_transaction(
			&self,
			_tx_hash: &str,
		) -> Result<TransactionOnChain, ProviderError> {
			self.polls.fetch_add(1, Ordering::SeqCst);
			let next = self
				.responses
				.lock()
				.await
				.pop_front()
				.expect("script exhausted");
			next.map(TransactionOnChain::from_raw)
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_resolves_on_third_poll() {
		let provider = ScriptedProvider::from_statuses(&["pending", "pending", "success"]);
		let tracker = TransactionTracker::new(provider.clone(), "txhash1");

		let receipt = tracker.wait_for_completion().await.unwrap();
		assert_eq!(receipt.hash, "txhash1");
		assert_eq!(
			receipt.on_chain.unwrap().status,
			TransactionStatus::Success
		);
		assert_eq!(provider.polls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn test_failure_after_second_poll() {
		let provider = ScriptedProvider::from_statuses(&["pending", "fail"]);
		let tracker = TransactionTracker::new(provider.clone(), "txhash2");

		let err = tracker.wait_for_completion().await.unwrap_err();
		match err {
			TrackingError::Failed(failed) => {
				assert_eq!(failed.receipt.hash, "txhash2");
				assert_eq!(
					failed.receipt.on_chain.as_ref().unwrap().status,
					TransactionStatus::Failure
				);
			}
			other => panic!("expected failure, got {:?}", other),
		}
		// Rejected on the second poll, not earlier or later.
		assert_eq!(provider.polls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_terminal_state_is_sticky() {
		let provider =
			ScriptedProvider::from_statuses(&["success", "fail", "pending"]);
		let tracker = TransactionTracker::new(provider.clone(), "txhash3");

		assert!(tracker.wait_for_completion().await.is_ok());
		// Later waits replay the first terminal outcome without polling.
		assert!(tracker.wait_for_completion().await.is_ok());
		assert_eq!(provider.polls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_execution_error_forces_failure() {
		let provider = ScriptedProvider::new(vec![Ok(serde_json::json!({
			"status": "success",
			"smartContractResults": [ { "returnMessage": "user error" } ],
		}))]);
		let tracker = TransactionTracker::new(provider, "txhash4");

		let err = tracker.wait_for_completion().await.unwrap_err();
		match err {
			TrackingError::Failed(failed) => {
				assert!(failed.message.contains("user error"));
			}
			other => panic!("expected failure, got {:?}", other),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_io_failure_is_terminal() {
		let provider = ScriptedProvider::new(vec![Err(ProviderError::Network(
			"connection refused".to_string(),
		))]);
		let tracker = TransactionTracker::new(provider.clone(), "txhash5");

		let err = tracker.wait_for_completion().await.unwrap_err();
		assert!(matches!(err, TrackingError::Io { .. }));
		// The outcome is sticky: no further polls happen.
		let err = tracker.wait_for_completion().await.unwrap_err();
		assert!(matches!(err, TrackingError::Io { .. }));
		assert_eq!(provider.polls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_cancellation_resolves_next_poll() {
		let provider = ScriptedProvider::from_statuses(&["pending", "pending", "pending"]);
		let tracker = TransactionTracker::new(provider, "txhash6");

		let (tx, rx) = tokio::sync::oneshot::channel::<()>();
		tx.send(()).unwrap();

		let err = tracker
			.wait_with_cancel(async {
				let _ = rx.await;
			})
			.await
			.unwrap_err();
		assert!(matches!(err, TrackingError::Cancelled));
	}
}
