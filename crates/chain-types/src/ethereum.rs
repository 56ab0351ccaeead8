//! Ethereum account and signing-request types.

use crate::common::Token;
use serde::{Deserialize, Serialize};

/// Mainnet chain id; the only network the adapter builds for.
pub const MAINNET_CHAIN_ID: u64 = 1;

/// First account of the standard BIP-44 Ethereum tree.
pub const DEFAULT_ETH_PATH: &str = "m/44'/60'/0'/0/0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthereumAccount {
	pub network: String,
	pub symbol: String,
	pub address: String,
	pub balance: String,
	pub unconfirmed_balance: String,
	pub unconfirmed_txs: u64,
	pub txs: u64,
	#[serde(default)]
	pub tokens: Vec<Token>,
	#[serde(default)]
	pub nonce: u64,
}

/// Parameters for a gas estimate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimateRequest {
	pub from: String,
	pub to: String,
	/// Decimal wei
	pub value: String,
	/// `0x`-prefixed call data, empty for plain transfers
	pub data: String,
}

/// Legacy (EIP-155) transaction for the signing device.
///
/// Numeric fields other than `nonce` are `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthereumSignTx {
	pub address_n_list: Vec<u32>,
	pub to: String,
	pub value: String,
	pub data: String,
	pub nonce: String,
	pub gas_price: String,
	pub gas_limit: String,
	pub chain_id: u64,
}
