//! Error types for the chain adapter system.

use crate::chains::ChainType;
use crate::providers::ProviderClientError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChainAdapterError>;

#[derive(Error, Debug)]
pub enum ChainAdapterError {
	/// Missing or malformed caller-supplied argument.
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	#[error("Network [{0}] is not supported")]
	UnsupportedChain(ChainType),

	/// A registered factory produced an adapter for another chain.
	#[error("Adapter type [{actual}] does not match requested type [{expected}]")]
	AdapterTypeMismatch {
		expected: ChainType,
		actual: ChainType,
	},

	#[error("{chain} provider error during {operation}: {source}")]
	Provider {
		chain: ChainType,
		operation: &'static str,
		#[source]
		source: ProviderClientError,
	},

	#[error("Wallet error: {0}")]
	Wallet(String),

	#[error("Signing error: {0}")]
	Signing(String),

	#[error("Insufficient funds: {0}")]
	InsufficientFunds(String),

	#[error("Configuration error: {0}")]
	Config(String),
}

impl ChainAdapterError {
	/// Wraps an upstream failure with the chain and operation it came from.
	pub fn provider(chain: ChainType, operation: &'static str, source: ProviderClientError) -> Self {
		Self::Provider {
			chain,
			operation,
			source,
		}
	}

	/// Returns true for failures caused by the network or an upstream service
	/// rather than by the caller's arguments.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::Provider { .. })
	}
}
