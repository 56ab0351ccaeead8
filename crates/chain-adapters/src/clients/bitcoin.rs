//! Unchained-style REST client for Bitcoin account data.

use super::{decode_broadcast, pagination_query};
use crate::utils::{client_for, HttpClient};
use async_trait::async_trait;
use chain_types::{
	bitcoin::{BitcoinAccount, RawTransaction, Utxo},
	BitcoinProvider, Pagination, ProviderResult, TxHistory, BroadcastTxResponse,
};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpBitcoinProvider {
	client: HttpClient,
}

impl HttpBitcoinProvider {
	pub fn new(base_url: &str, timeout: Duration) -> chain_types::Result<Self> {
		Ok(Self {
			client: client_for("bitcoin", base_url, timeout)?,
		})
	}
}

#[async_trait]
impl BitcoinProvider for HttpBitcoinProvider {
	async fn get_account(&self, pubkey: &str) -> ProviderResult<BitcoinAccount> {
		self.client
			.get_json(&format!("api/v1/account/{}", pubkey), &[])
			.await
	}

	async fn get_tx_history(
		&self,
		pubkey: &str,
		pagination: &Pagination,
	) -> ProviderResult<TxHistory> {
		self.client
			.get_json(
				&format!("api/v1/account/{}/txs", pubkey),
				&pagination_query(pagination),
			)
			.await
	}

	async fn get_utxos(&self, pubkey: &str) -> ProviderResult<Vec<Utxo>> {
		self.client
			.get_json(&format!("api/v1/account/{}/utxos", pubkey), &[])
			.await
	}

	async fn get_transaction(&self, txid: &str) -> ProviderResult<RawTransaction> {
		self.client
			.get_json(&format!("api/v1/tx/{}", txid), &[])
			.await
	}

	async fn broadcast(&self, hex: &str) -> ProviderResult<BroadcastTxResponse> {
		let response: Value = self
			.client
			.post_json("api/v1/send", &json!({ "hex": hex }))
			.await?;
		decode_broadcast(response)
	}
}
