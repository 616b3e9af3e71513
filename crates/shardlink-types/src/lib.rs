//! Common types module for the shardlink client library.
//!
//! This module defines the core data types and structures shared by the
//! other shardlink crates. It provides a single canonical data model for
//! network configuration, accounts, transactions and contract queries,
//! together with the wire-level argument encoding helpers.

/// Account state types returned by the network.
pub mod account;
/// Transaction payload argument encoding helpers.
pub mod encoding;
/// Network configuration types.
pub mod network;
/// Contract query request/response types.
pub mod query;
/// Transaction types, receipts and on-chain status.
pub mod transaction;

pub use account::AccountOnChain;
pub use encoding::{join_data_args, number_to_hex, string_to_hex, ARGS_DELIMITER};
pub use network::NetworkConfig;
pub use query::{ContractQueryParams, ContractQueryResult};
pub use transaction::{
	SignedTransaction, Transaction, TransactionOnChain, TransactionReceipt, TransactionStatus,
};
