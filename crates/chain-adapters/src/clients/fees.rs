//! Fee estimation clients.

use crate::utils::{client_for, HttpClient};
use async_trait::async_trait;
use chain_types::{
	BitcoinFeeData, BitcoinFeeOracle, GasOracle, GasOracleEntry, ProviderResult,
};
use serde::Deserialize;
use std::time::Duration;

/// Reads three-tier Bitcoin fee estimates from `{base}/api/v1/fees`.
#[derive(Debug, Clone)]
pub struct HttpBitcoinFeeOracle {
	client: HttpClient,
}

impl HttpBitcoinFeeOracle {
	pub fn new(base_url: &str, timeout: Duration) -> chain_types::Result<Self> {
		Ok(Self {
			client: client_for("bitcoin", base_url, timeout)?,
		})
	}
}

#[async_trait]
impl BitcoinFeeOracle for HttpBitcoinFeeOracle {
	async fn get_fees(&self) -> ProviderResult<BitcoinFeeData> {
		self.client.get_json("api/v1/fees", &[]).await
	}
}

#[derive(Deserialize)]
struct GasOracleResponse {
	result: Vec<GasOracleEntry>,
}

/// Reads per-source gas price estimates from a 0x-style gas API.
#[derive(Debug, Clone)]
pub struct HttpGasOracle {
	client: HttpClient,
}

impl HttpGasOracle {
	pub fn new(url: &str, timeout: Duration) -> chain_types::Result<Self> {
		Ok(Self {
			client: client_for("ethereum", url, timeout)?,
		})
	}
}

#[async_trait]
impl GasOracle for HttpGasOracle {
	async fn get_gas_prices(&self) -> ProviderResult<Vec<GasOracleEntry>> {
		let response: GasOracleResponse = self.client.get_json("", &[]).await?;
		Ok(response.result)
	}
}
