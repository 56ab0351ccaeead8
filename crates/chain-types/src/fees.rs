//! Normalized three-tier fee estimates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitcoinFeeTier {
	pub blocks_until_confirmation: u32,
	pub sats_per_byte: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitcoinFeeData {
	pub slow: BitcoinFeeTier,
	pub average: BitcoinFeeTier,
	pub fast: BitcoinFeeTier,
}

/// Gas prices in wei, as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthereumFeeData {
	pub slow: String,
	pub average: String,
	pub fast: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chain", rename_all = "lowercase")]
pub enum FeeData {
	Bitcoin(BitcoinFeeData),
	Ethereum(EthereumFeeData),
}
