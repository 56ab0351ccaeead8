//! Concrete chain adapter implementations.
//!
//! `ChainAdapterType` is the closed set of adapters the manager hands out.
//! It implements `ChainAdapter` by delegating to the wrapped adapter, so
//! callers can use it generically or downcast with `as_bitcoin` /
//! `as_ethereum` to reach chain-specific helpers.

pub mod bitcoin;
pub mod ethereum;

use self::bitcoin::BitcoinChainAdapter;
use self::ethereum::EthereumChainAdapter;
use async_trait::async_trait;
use chain_types::{
	Account, BuildSendTxInput, BuildSendTxOutput, ChainAdapter, ChainType, FeeData,
	GetAddressInput, Pagination, Result, SignTxInput, TxHistory, ValidAddressResult,
};
use std::fmt;

/// Enum containing all supported chain adapter types
#[derive(Clone)]
pub enum ChainAdapterType {
	Bitcoin(BitcoinChainAdapter),
	Ethereum(EthereumChainAdapter),
}

impl ChainAdapterType {
	pub fn as_bitcoin(&self) -> Option<&BitcoinChainAdapter> {
		match self {
			Self::Bitcoin(adapter) => Some(adapter),
			_ => None,
		}
	}

	pub fn as_ethereum(&self) -> Option<&EthereumChainAdapter> {
		match self {
			Self::Ethereum(adapter) => Some(adapter),
			_ => None,
		}
	}

	fn inner(&self) -> &dyn ChainAdapter {
		match self {
			Self::Bitcoin(adapter) => adapter,
			Self::Ethereum(adapter) => adapter,
		}
	}
}

impl fmt::Debug for ChainAdapterType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ChainAdapterType")
			.field(&self.get_type())
			.finish()
	}
}

impl From<BitcoinChainAdapter> for ChainAdapterType {
	fn from(adapter: BitcoinChainAdapter) -> Self {
		Self::Bitcoin(adapter)
	}
}

impl From<EthereumChainAdapter> for ChainAdapterType {
	fn from(adapter: EthereumChainAdapter) -> Self {
		Self::Ethereum(adapter)
	}
}

#[async_trait]
impl ChainAdapter for ChainAdapterType {
	fn get_type(&self) -> ChainType {
		self.inner().get_type()
	}

	async fn get_account(&self, address: &str) -> Result<Account> {
		self.inner().get_account(address).await
	}

	async fn get_tx_history(
		&self,
		address: &str,
		pagination: Option<Pagination>,
	) -> Result<TxHistory> {
		self.inner().get_tx_history(address, pagination).await
	}

	async fn build_send_transaction(
		&self,
		input: BuildSendTxInput<'_>,
	) -> Result<Option<BuildSendTxOutput>> {
		self.inner().build_send_transaction(input).await
	}

	async fn get_address(&self, input: GetAddressInput<'_>) -> Result<String> {
		self.inner().get_address(input).await
	}

	async fn sign_transaction(&self, input: SignTxInput<'_>) -> Result<String> {
		self.inner().sign_transaction(input).await
	}

	async fn get_fee_data(&self) -> Result<FeeData> {
		self.inner().get_fee_data().await
	}

	async fn broadcast_transaction(&self, hex: &str) -> Result<String> {
		self.inner().broadcast_transaction(hex).await
	}

	async fn validate_address(&self, address: &str) -> ValidAddressResult {
		self.inner().validate_address(address).await
	}
}
