//! Interface of the hierarchical-deterministic wallet / signing device.
//!
//! The device owns all key material. Adapters only ask it for public keys,
//! addresses and signatures, and a `None` answer means the requested key is
//! not available on the device.

use crate::bitcoin::{BitcoinInputScriptType, BitcoinSignTx};
use crate::ethereum::EthereumSignTx;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
	#[error("Device unavailable: {0}")]
	Unavailable(String),
	#[error("Request rejected: {0}")]
	Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyRequest {
	pub coin: String,
	pub address_n_list: Vec<u32>,
	pub curve: String,
	pub script_type: Option<BitcoinInputScriptType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
	/// Extended public key
	pub xpub: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTx {
	pub serialized_tx: String,
}

#[async_trait]
pub trait HdWallet: Send + Sync {
	async fn get_public_keys(
		&self,
		requests: &[PublicKeyRequest],
	) -> Result<Option<Vec<PublicKey>>, DeviceError>;

	async fn btc_get_address(
		&self,
		address_n_list: &[u32],
		script_type: BitcoinInputScriptType,
	) -> Result<Option<String>, DeviceError>;

	async fn btc_sign_tx(&self, tx: &BitcoinSignTx) -> Result<Option<SignedTx>, DeviceError>;

	async fn eth_get_address(&self, address_n_list: &[u32]) -> Result<Option<String>, DeviceError>;

	async fn eth_sign_tx(&self, tx: &EthereumSignTx) -> Result<Option<SignedTx>, DeviceError>;
}
