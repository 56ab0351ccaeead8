//! Bitcoin account, UTXO and signing-request types.

use crate::common::Token;
use serde::{Deserialize, Serialize};

/// BIP-84 native segwit purpose.
pub const DEFAULT_PURPOSE: u32 = 84;
pub const DEFAULT_ACCOUNT: u32 = 0;
/// SLIP-44 coin type for Bitcoin.
pub const BITCOIN_COIN_TYPE: u32 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitcoinAccount {
	pub network: String,
	pub symbol: String,
	pub address: String,
	pub balance: String,
	pub unconfirmed_balance: String,
	pub unconfirmed_txs: u64,
	pub txs: u64,
	#[serde(default)]
	pub tokens: Vec<Token>,
	/// Next unused receive index of the account
	pub receive_index: Option<u32>,
	/// Next unused change index of the account
	pub change_index: Option<u32>,
}

/// Unspent output as returned by the data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
	pub txid: String,
	pub vout: u32,
	#[serde(with = "amount_string")]
	pub value: u64,
	pub height: Option<u64>,
	pub confirmations: u64,
	pub address: Option<String>,
	pub path: Option<String>,
	pub locktime: Option<u32>,
	pub coinbase: Option<bool>,
	pub non_witness_utxo: Option<String>,
}

/// Parent transaction of a UTXO
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
	pub txid: String,
	pub hex: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitcoinInputScriptType {
	/// Legacy P2PKH
	#[serde(rename = "p2pkh")]
	SpendAddress,
	#[serde(rename = "p2sh")]
	SpendMultisig,
	/// Native segwit P2WPKH
	#[default]
	#[serde(rename = "p2wpkh")]
	SpendWitness,
	/// Segwit nested in P2SH
	#[serde(rename = "p2sh-p2wpkh")]
	SpendP2shWitness,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitcoinOutputAddressType {
	#[serde(rename = "p2pkh")]
	Spend,
	#[serde(rename = "p2sh")]
	SpendMultisig,
	#[default]
	#[serde(rename = "p2wpkh")]
	SpendWitness,
	#[serde(rename = "p2sh-p2wpkh")]
	SpendP2shWitness,
}

impl From<BitcoinInputScriptType> for BitcoinOutputAddressType {
	fn from(script_type: BitcoinInputScriptType) -> Self {
		match script_type {
			BitcoinInputScriptType::SpendAddress => BitcoinOutputAddressType::Spend,
			BitcoinInputScriptType::SpendMultisig => BitcoinOutputAddressType::SpendMultisig,
			BitcoinInputScriptType::SpendWitness => BitcoinOutputAddressType::SpendWitness,
			BitcoinInputScriptType::SpendP2shWitness => BitcoinOutputAddressType::SpendP2shWitness,
		}
	}
}

/// Account-level derivation settings.
///
/// Defaults: purpose 84 (native segwit), account 0, witness script type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitcoinAccountParams {
	pub purpose: u32,
	pub account: u32,
	pub script_type: BitcoinInputScriptType,
}

impl Default for BitcoinAccountParams {
	fn default() -> Self {
		Self {
			purpose: DEFAULT_PURPOSE,
			account: DEFAULT_ACCOUNT,
			script_type: BitcoinInputScriptType::SpendWitness,
		}
	}
}

impl BitcoinAccountParams {
	/// `m/purpose'/0'/account'`
	pub fn account_path(&self) -> String {
		crate::common::account_path(self.purpose, BITCOIN_COIN_TYPE, self.account)
	}

	/// `m/purpose'/0'/account'/change/index`
	pub fn address_path(&self, is_change: bool, index: u32) -> String {
		format!(
			"{}/{}/{}",
			self.account_path(),
			if is_change { 1 } else { 0 },
			index
		)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitcoinSignTxInput {
	pub address_n_list: Vec<u32>,
	pub script_type: BitcoinInputScriptType,
	pub amount: String,
	pub vout: u32,
	pub txid: String,
	/// Parent transaction, needed by non-witness signers
	pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitcoinSignTxOutput {
	pub address: String,
	pub address_type: BitcoinOutputAddressType,
	pub amount: String,
	pub is_change: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitcoinSignTx {
	pub coin: String,
	pub inputs: Vec<BitcoinSignTxInput>,
	pub outputs: Vec<BitcoinSignTxOutput>,
	/// Total fee in satoshis
	pub fee: u64,
	pub op_return_data: Option<String>,
}

/// Providers report UTXO values either as JSON numbers or as decimal strings.
mod amount_string {
	use serde::{de, Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Number(u64),
			Text(String),
		}

		match Raw::deserialize(deserializer)? {
			Raw::Number(n) => Ok(n),
			Raw::Text(s) => s.parse().map_err(de::Error::custom),
		}
	}
}
