//! Common types used by every chain adapter.

use crate::errors::{ChainAdapterError, Result};
use ::bitcoin::bip32::DerivationPath;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Bit set on hardened BIP-32 child indices.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Transaction history query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	pub page_num: Option<u32>,
	pub page_size: Option<u32>,
	pub contract: Option<String>,
}

/// Single history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
	pub network: String,
	pub symbol: String,
	pub txid: String,
	pub status: String,
	pub from: String,
	pub to: String,
	pub block_hash: String,
	pub block_height: i64,
	pub confirmations: u64,
	pub timestamp: u64,
	pub value: String,
	pub fee: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxHistory {
	pub page: u32,
	pub total_pages: u32,
	pub txs: u64,
	pub transactions: Vec<Transaction>,
}

/// Token balance attached to an account snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
	#[serde(rename = "type")]
	pub token_type: String,
	pub name: String,
	pub path: Option<String>,
	pub contract: Option<String>,
	pub transfers: u64,
	pub symbol: Option<String>,
	pub decimals: Option<u8>,
	pub balance: Option<String>,
	pub total_received: Option<String>,
	pub total_sent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastTxResponse {
	#[serde(default)]
	pub network: Option<String>,
	pub txid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidAddressResultType {
	Valid,
	Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidAddressResult {
	pub valid: bool,
	pub result: ValidAddressResultType,
}

impl ValidAddressResult {
	pub fn valid() -> Self {
		Self {
			valid: true,
			result: ValidAddressResultType::Valid,
		}
	}

	pub fn invalid() -> Self {
		Self {
			valid: false,
			result: ValidAddressResultType::Invalid,
		}
	}

	pub fn from_bool(valid: bool) -> Self {
		if valid {
			Self::valid()
		} else {
			Self::invalid()
		}
	}
}

/// Converts a BIP-32 path such as `m/84'/0'/0'/1/7` into the index list a
/// signing device expects.
pub fn bip32_to_address_n_list(path: &str) -> Result<Vec<u32>> {
	let parsed = DerivationPath::from_str(path).map_err(|e| {
		ChainAdapterError::InvalidInput(format!("Invalid derivation path {:?}: {}", path, e))
	})?;

	Ok(parsed
		.as_ref()
		.iter()
		.map(|child| u32::from(*child))
		.collect())
}

/// Account-level path `m/purpose'/coin_type'/account'`.
pub fn account_path(purpose: u32, coin_type: u32, account: u32) -> String {
	format!("m/{}'/{}'/{}'", purpose, coin_type, account)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_bip32_to_address_n_list() {
		let list = bip32_to_address_n_list("m/84'/0'/0'/1/7").unwrap();
		assert_eq!(
			list,
			vec![
				HARDENED_OFFSET + 84,
				HARDENED_OFFSET,
				HARDENED_OFFSET,
				1,
				7
			]
		);
	}

	#[test]
	fn test_bip32_rejects_garbage() {
		let result = bip32_to_address_n_list("84/zero");
		assert!(matches!(result, Err(ChainAdapterError::InvalidInput(_))));
	}

	#[test]
	fn test_account_path() {
		assert_eq!(account_path(84, 0, 2), "m/84'/0'/2'");
	}

	#[test]
	fn test_valid_address_result_serialization() {
		let json = serde_json::to_value(ValidAddressResult::invalid()).unwrap();
		assert_eq!(json, serde_json::json!({"valid": false, "result": "invalid"}));
	}

	#[test]
	fn test_tx_history_deserializes_camel_case() {
		let history: TxHistory = serde_json::from_value(serde_json::json!({
			"page": 1,
			"totalPages": 3,
			"txs": 1,
			"transactions": [{
				"network": "bitcoin",
				"symbol": "BTC",
				"txid": "abc",
				"status": "confirmed",
				"from": "bc1qfrom",
				"to": "bc1qto",
				"blockHash": "0000",
				"blockHeight": 700000,
				"confirmations": 6,
				"timestamp": 1630000000,
				"value": "1000",
				"fee": "150"
			}]
		}))
		.unwrap();

		assert_eq!(history.total_pages, 3);
		assert_eq!(history.transactions[0].block_height, 700000);
	}
}
