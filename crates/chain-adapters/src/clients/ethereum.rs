//! Unchained-style REST client for Ethereum account data.

use super::{decode_broadcast, pagination_query};
use crate::utils::{client_for, HttpClient};
use async_trait::async_trait;
use chain_types::{
	ethereum::{EthereumAccount, GasEstimateRequest},
	BroadcastTxResponse, EthereumProvider, Pagination, ProviderClientError, ProviderResult,
	TxHistory,
};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpEthereumProvider {
	client: HttpClient,
}

impl HttpEthereumProvider {
	pub fn new(base_url: &str, timeout: Duration) -> chain_types::Result<Self> {
		Ok(Self {
			client: client_for("ethereum", base_url, timeout)?,
		})
	}
}

/// Numeric fields may arrive as JSON numbers or decimal strings.
fn numeric_string(value: Value, field: &str) -> ProviderResult<String> {
	match value {
		Value::String(s) => Ok(s),
		Value::Number(n) => Ok(n.to_string()),
		other => Err(ProviderClientError::Decode(format!(
			"expected numeric {}, got {}",
			field, other
		))),
	}
}

#[async_trait]
impl EthereumProvider for HttpEthereumProvider {
	async fn get_account(&self, address: &str) -> ProviderResult<EthereumAccount> {
		self.client
			.get_json(&format!("api/v1/account/{}", address), &[])
			.await
	}

	async fn get_tx_history(
		&self,
		address: &str,
		pagination: &Pagination,
	) -> ProviderResult<TxHistory> {
		self.client
			.get_json(
				&format!("api/v1/account/{}/txs", address),
				&pagination_query(pagination),
			)
			.await
	}

	async fn get_nonce(&self, address: &str) -> ProviderResult<u64> {
		let value: Value = self
			.client
			.get_json(&format!("api/v1/account/{}/nonce", address), &[])
			.await?;
		numeric_string(value, "nonce")?
			.parse()
			.map_err(|e| ProviderClientError::Decode(format!("invalid nonce: {}", e)))
	}

	async fn estimate_gas(&self, request: &GasEstimateRequest) -> ProviderResult<String> {
		let query = [
			("from", request.from.clone()),
			("to", request.to.clone()),
			("value", request.value.clone()),
			("data", request.data.clone()),
		];
		let value: Value = self.client.get_json("api/v1/gas/estimate", &query).await?;
		numeric_string(value, "gas estimate")
	}

	async fn broadcast(&self, hex: &str) -> ProviderResult<BroadcastTxResponse> {
		let response: Value = self
			.client
			.post_json("api/v1/send", &json!({ "hex": hex }))
			.await?;
		decode_broadcast(response)
	}
}
