//! Interfaces of the blockchain data providers and fee oracles.

use crate::{
	bitcoin::{BitcoinAccount, RawTransaction, Utxo},
	common::{BroadcastTxResponse, Pagination, TxHistory},
	ethereum::{EthereumAccount, GasEstimateRequest},
	fees::BitcoinFeeData,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderClientError {
	#[error("Request failed: {0}")]
	Http(#[source] Box<dyn std::error::Error + Send + Sync>),

	#[error("Unexpected status {status}: {body}")]
	Status { status: u16, body: String },

	#[error("Invalid response: {0}")]
	Decode(String),

	#[error("Invalid URL: {0}")]
	InvalidUrl(String),

	#[error("Rejected: {0}")]
	Rejected(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderClientError>;

#[async_trait]
pub trait BitcoinProvider: Send + Sync {
	/// Account snapshot for an address or extended public key
	async fn get_account(&self, pubkey: &str) -> ProviderResult<BitcoinAccount>;

	async fn get_tx_history(
		&self,
		pubkey: &str,
		pagination: &Pagination,
	) -> ProviderResult<TxHistory>;

	/// Every unspent output controlled by an extended public key
	async fn get_utxos(&self, pubkey: &str) -> ProviderResult<Vec<Utxo>>;

	async fn get_transaction(&self, txid: &str) -> ProviderResult<RawTransaction>;

	async fn broadcast(&self, hex: &str) -> ProviderResult<BroadcastTxResponse>;
}

#[async_trait]
pub trait EthereumProvider: Send + Sync {
	async fn get_account(&self, address: &str) -> ProviderResult<EthereumAccount>;

	async fn get_tx_history(
		&self,
		address: &str,
		pagination: &Pagination,
	) -> ProviderResult<TxHistory>;

	/// Next nonce for the address
	async fn get_nonce(&self, address: &str) -> ProviderResult<u64>;

	/// Gas units required by the call, as a decimal string
	async fn estimate_gas(&self, request: &GasEstimateRequest) -> ProviderResult<String>;

	async fn broadcast(&self, hex: &str) -> ProviderResult<BroadcastTxResponse>;
}

#[async_trait]
pub trait BitcoinFeeOracle: Send + Sync {
	async fn get_fees(&self) -> ProviderResult<BitcoinFeeData>;
}

#[async_trait]
pub trait GasOracle: Send + Sync {
	/// One estimate per upstream source
	async fn get_gas_prices(&self) -> ProviderResult<Vec<GasOracleEntry>>;
}

/// Upstream source tag of a gas estimate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GasOracleSource {
	EthGasStation,
	Etherscan,
	Etherchain,
	GasNow,
	MyCrypto,
	UpVest,
	GethPending,
	Median,
	Average,
	Other(String),
}

impl From<String> for GasOracleSource {
	fn from(tag: String) -> Self {
		match tag.as_str() {
			"ETH_GAS_STATION" => Self::EthGasStation,
			"ETHERSCAN" => Self::Etherscan,
			"ETHERCHAIN" => Self::Etherchain,
			"GAS_NOW" => Self::GasNow,
			"MY_CRYPTO" => Self::MyCrypto,
			"UP_VEST" => Self::UpVest,
			"GETH_PENDING" => Self::GethPending,
			"MEDIAN" => Self::Median,
			"AVERAGE" => Self::Average,
			_ => Self::Other(tag),
		}
	}
}

impl From<GasOracleSource> for String {
	fn from(source: GasOracleSource) -> Self {
		source.to_string()
	}
}

impl fmt::Display for GasOracleSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let tag = match self {
			Self::EthGasStation => "ETH_GAS_STATION",
			Self::Etherscan => "ETHERSCAN",
			Self::Etherchain => "ETHERCHAIN",
			Self::GasNow => "GAS_NOW",
			Self::MyCrypto => "MY_CRYPTO",
			Self::UpVest => "UP_VEST",
			Self::GethPending => "GETH_PENDING",
			Self::Median => "MEDIAN",
			Self::Average => "AVERAGE",
			Self::Other(tag) => tag,
		};
		f.write_str(tag)
	}
}

/// Gas prices reported by one oracle source, in wei
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasOracleEntry {
	pub source: GasOracleSource,
	pub fast: u64,
	pub instant: u64,
	pub low: u64,
	pub standard: u64,
	#[serde(default)]
	pub timestamp: u64,
}
