//! Coin selection strategy interface.

use crate::bitcoin::BitcoinInputScriptType;
use serde::{Deserialize, Serialize};

/// Desired payment. An output without an address is change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
	/// Satoshis
	pub value: u64,
	pub address: Option<String>,
}

impl Recipient {
	pub fn new(address: impl Into<String>, value: u64) -> Self {
		Self {
			value,
			address: Some(address.into()),
		}
	}
}

/// UTXO annotated with everything the signer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectableUtxo {
	pub txid: String,
	pub vout: u32,
	pub value: u64,
	pub address_n_list: Vec<u32>,
	pub script_type: BitcoinInputScriptType,
	pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSelection {
	pub inputs: Vec<SelectableUtxo>,
	pub outputs: Vec<Recipient>,
	pub fee: u64,
}

impl CoinSelection {
	/// Sum of input values, `None` on overflow.
	pub fn input_total(&self) -> Option<u64> {
		self.inputs
			.iter()
			.try_fold(0u64, |total, input| total.checked_add(input.value))
	}

	/// Sum of output values, `None` on overflow.
	pub fn output_total(&self) -> Option<u64> {
		self.outputs
			.iter()
			.try_fold(0u64, |total, output| total.checked_add(output.value))
	}
}

/// Pure function choosing inputs for a payment at a fee rate in sat/byte.
///
/// Returns `None` when no combination of `utxos` covers the recipients plus fee.
pub trait CoinSelector: Send + Sync {
	fn select(
		&self,
		utxos: &[SelectableUtxo],
		recipients: &[Recipient],
		fee_rate: u64,
	) -> Option<CoinSelection>;
}
