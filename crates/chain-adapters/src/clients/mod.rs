//! HTTP implementations of the provider and fee-oracle interfaces.

pub mod bitcoin;
pub mod ethereum;
pub mod fees;

pub use self::bitcoin::HttpBitcoinProvider;
pub use self::ethereum::HttpEthereumProvider;
pub use self::fees::{HttpBitcoinFeeOracle, HttpGasOracle};

use chain_types::{BroadcastTxResponse, Pagination, ProviderClientError, ProviderResult};
use serde_json::Value;

/// Query string of a paginated history request.
pub(crate) fn pagination_query(pagination: &Pagination) -> Vec<(&'static str, String)> {
	let mut query = Vec::new();
	if let Some(page) = pagination.page_num {
		query.push(("page", page.to_string()));
	}
	if let Some(size) = pagination.page_size {
		query.push(("pageSize", size.to_string()));
	}
	if let Some(contract) = &pagination.contract {
		query.push(("contract", contract.clone()));
	}
	query
}

/// Broadcast endpoints answer with either a bare txid or `{"txid": ...}`.
/// A body carrying `error` instead of a txid means the node refused the
/// transaction.
pub(crate) fn decode_broadcast(value: Value) -> ProviderResult<BroadcastTxResponse> {
	match value {
		Value::String(txid) => Ok(BroadcastTxResponse { network: None, txid }),
		Value::Object(ref body) if body.get("txid").is_none() && body.contains_key("error") => {
			let reason = match &body["error"] {
				Value::String(message) => message.clone(),
				other => other.to_string(),
			};
			Err(ProviderClientError::Rejected(reason))
		}
		Value::Object(_) => serde_json::from_value(value)
			.map_err(|e| ProviderClientError::Decode(e.to_string())),
		other => Err(ProviderClientError::Decode(format!(
			"unexpected broadcast response: {}",
			other
		))),
	}
}
