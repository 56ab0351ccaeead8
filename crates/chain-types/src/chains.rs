//! Chain identifiers and the uniform chain adapter contract.

use crate::{
	bitcoin::{BitcoinAccount, BitcoinAccountParams, BitcoinSignTx},
	coin_select::Recipient,
	common::{Pagination, TxHistory, ValidAddressResult},
	errors::{ChainAdapterError, Result},
	ethereum::{EthereumAccount, EthereumSignTx},
	fees::FeeData,
	wallet::HdWallet,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chain identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
	Bitcoin,
	Ethereum,
}

impl ChainType {
	pub const ALL: [ChainType; 2] = [ChainType::Bitcoin, ChainType::Ethereum];

	pub fn as_str(&self) -> &'static str {
		match self {
			ChainType::Bitcoin => "bitcoin",
			ChainType::Ethereum => "ethereum",
		}
	}
}

impl fmt::Display for ChainType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ChainType {
	type Err = ChainAdapterError;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"bitcoin" => Ok(ChainType::Bitcoin),
			"ethereum" => Ok(ChainType::Ethereum),
			other => Err(ChainAdapterError::InvalidInput(format!(
				"Unrecognized chain identifier: {:?}",
				other
			))),
		}
	}
}

/// Account snapshot as reported by a chain's data provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "chain", rename_all = "lowercase")]
pub enum Account {
	Bitcoin(BitcoinAccount),
	Ethereum(EthereumAccount),
}

/// Transaction produced by `build_send_transaction`, ready for the signing device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chain", rename_all = "lowercase")]
pub enum UnsignedTransaction {
	Bitcoin(BitcoinSignTx),
	Ethereum(EthereumSignTx),
}

impl UnsignedTransaction {
	pub fn chain_type(&self) -> ChainType {
		match self {
			UnsignedTransaction::Bitcoin(_) => ChainType::Bitcoin,
			UnsignedTransaction::Ethereum(_) => ChainType::Ethereum,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSendTxOutput {
	pub tx_to_sign: UnsignedTransaction,
	pub estimated_fees: Option<FeeData>,
}

/// Arguments for building a value transfer.
///
/// Fields that only apply to one chain are ignored by the other: `recipients`,
/// `op_return_data` and `account_params` are read by the Bitcoin adapter;
/// `to`, `value`, `path`, `erc20_contract_address` and `limit` by the
/// Ethereum adapter. `fee` is sat/byte on Bitcoin and a gas price in wei on
/// Ethereum.
pub struct BuildSendTxInput<'a> {
	pub wallet: &'a dyn HdWallet,
	pub to: Option<String>,
	/// Amount in base units, as a decimal string.
	pub value: Option<String>,
	pub path: Option<String>,
	pub fee: Option<String>,
	pub erc20_contract_address: Option<String>,
	/// Gas limit, as a decimal string.
	pub limit: Option<String>,
	pub recipients: Vec<Recipient>,
	pub op_return_data: Option<String>,
	pub account_params: BitcoinAccountParams,
}

impl<'a> BuildSendTxInput<'a> {
	pub fn new(wallet: &'a dyn HdWallet) -> Self {
		Self {
			wallet,
			to: None,
			value: None,
			path: None,
			fee: None,
			erc20_contract_address: None,
			limit: None,
			recipients: Vec::new(),
			op_return_data: None,
			account_params: BitcoinAccountParams::default(),
		}
	}
}

pub struct SignTxInput<'a> {
	pub tx_to_sign: UnsignedTransaction,
	pub wallet: &'a dyn HdWallet,
}

/// Arguments for deriving an address.
///
/// Bitcoin derives `m/purpose'/0'/account'/change/index`; when `index` is
/// `None` the next unused receive or change index reported by the provider
/// is used. Ethereum derives at `path`.
pub struct GetAddressInput<'a> {
	pub wallet: &'a dyn HdWallet,
	pub path: Option<String>,
	pub account_params: BitcoinAccountParams,
	pub is_change: bool,
	pub index: Option<u32>,
}

impl<'a> GetAddressInput<'a> {
	pub fn new(wallet: &'a dyn HdWallet) -> Self {
		Self {
			wallet,
			path: None,
			account_params: BitcoinAccountParams::default(),
			is_change: false,
			index: None,
		}
	}
}

/// Chain adapter trait for building, signing and broadcasting transactions
#[async_trait]
pub trait ChainAdapter: Send + Sync {
	/// Get the chain this adapter serves
	fn get_type(&self) -> ChainType;

	/// Get the balance snapshot of an address or extended public key
	async fn get_account(&self, address: &str) -> Result<Account>;

	/// Get a page of transaction history
	async fn get_tx_history(
		&self,
		address: &str,
		pagination: Option<Pagination>,
	) -> Result<TxHistory>;

	/// Build an unsigned transaction.
	///
	/// Returns `Ok(None)` when the wallet cannot supply the keys the build needs.
	async fn build_send_transaction(
		&self,
		input: BuildSendTxInput<'_>,
	) -> Result<Option<BuildSendTxOutput>>;

	/// Derive an address from the wallet
	async fn get_address(&self, input: GetAddressInput<'_>) -> Result<String>;

	/// Sign a transaction, returning the serialized hex
	async fn sign_transaction(&self, input: SignTxInput<'_>) -> Result<String>;

	/// Get the slow/average/fast fee estimate
	async fn get_fee_data(&self) -> Result<FeeData>;

	/// Broadcast a signed transaction, returning its id
	async fn broadcast_transaction(&self, hex: &str) -> Result<String>;

	/// Check an address. Never fails; malformed input is reported as invalid.
	async fn validate_address(&self, address: &str) -> ValidAddressResult;
}
