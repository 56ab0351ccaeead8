//! Account-model adapter for Ethereum mainnet.
//!
//! Builds legacy transactions for the signing device: the nonce comes from
//! the data provider, the gas price from the caller or the gas oracle's
//! median entry, and the gas limit from the caller or a provider estimate.
//! ERC-20 transfers are expressed as a zero-value call to the token contract.

use super::abi::IERC20;
use alloy::{
	primitives::{Address, U256},
	sol_types::SolCall,
};
use async_trait::async_trait;
use chain_types::{
	bip32_to_address_n_list,
	ethereum::{EthereumSignTx, GasEstimateRequest, DEFAULT_ETH_PATH, MAINNET_CHAIN_ID},
	Account, BuildSendTxInput, BuildSendTxOutput, ChainAdapter, ChainAdapterError, ChainType,
	EthereumFeeData, EthereumProvider, FeeData, GasOracle, GasOracleSource, GetAddressInput,
	HdWallet, Pagination, ProviderClientError, Result, SignTxInput, TxHistory,
	UnsignedTransaction, ValidAddressResult,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Checks for `0x` followed by 40 hex digits. Mixed-case input must also
/// carry a valid EIP-55 checksum.
pub fn is_valid_ethereum_address(address: &str) -> bool {
	let Some(digits) = address.strip_prefix("0x") else {
		return false;
	};
	if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
		return false;
	}

	let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
	let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
	if has_lower && has_upper {
		return Address::parse_checksummed(address, None).is_ok();
	}
	true
}

/// Ethereum chain adapter.
#[derive(Clone)]
pub struct EthereumChainAdapter {
	provider: Arc<dyn EthereumProvider>,
	gas_oracle: Arc<dyn GasOracle>,
}

/// Destination, on-chain value and call data of a transfer.
struct TransferTarget {
	to: String,
	value: U256,
	data: String,
}

fn parse_quantity(field: &str, value: &str) -> Result<U256> {
	U256::from_str_radix(value.trim(), 10).map_err(|_| {
		ChainAdapterError::InvalidInput(format!("Invalid {}: {:?}", field, value))
	})
}

fn parse_address(field: &str, value: &str) -> Result<Address> {
	Address::from_str(value.trim()).map_err(|_| {
		ChainAdapterError::InvalidInput(format!("Invalid {} address: {:?}", field, value))
	})
}

/// `0x`-prefixed minimal hex, `0x0` for zero.
fn to_hex_quantity(value: U256) -> String {
	format!("0x{:x}", value)
}

/// Resolves what actually goes on chain for a transfer of `amount` to `to`.
///
/// A token transfer sends zero ether to the contract, with the recipient and
/// amount moved into `transfer(address,uint256)` call data.
fn transfer_target(to: &str, amount: U256, erc20_contract: Option<&str>) -> Result<TransferTarget> {
	let recipient = parse_address("recipient", to)?;

	match erc20_contract {
		Some(contract) => {
			parse_address("token contract", contract)?;
			let call = IERC20::transferCall {
				to: recipient,
				amount,
			};
			Ok(TransferTarget {
				to: contract.trim().to_string(),
				value: U256::ZERO,
				data: format!("0x{}", hex::encode(call.abi_encode())),
			})
		}
		None => Ok(TransferTarget {
			to: to.trim().to_string(),
			value: amount,
			data: String::new(),
		}),
	}
}

impl EthereumChainAdapter {
	pub fn new(provider: Arc<dyn EthereumProvider>, gas_oracle: Arc<dyn GasOracle>) -> Self {
		Self {
			provider,
			gas_oracle,
		}
	}

	fn provider_error(
		operation: &'static str,
	) -> impl FnOnce(ProviderClientError) -> ChainAdapterError {
		move |e| {
			error!("ethereum {} failed: {}", operation, e);
			ChainAdapterError::provider(ChainType::Ethereum, operation, e)
		}
	}

	async fn wallet_address(
		&self,
		wallet: &dyn HdWallet,
		address_n_list: &[u32],
	) -> Result<Option<String>> {
		wallet
			.eth_get_address(address_n_list)
			.await
			.map_err(|e| ChainAdapterError::Wallet(format!("Failed to derive address: {}", e)))
	}

	/// Median gas prices, remapped onto the slow/average/fast tiers.
	async fn median_fees(&self) -> Result<EthereumFeeData> {
		let entries = self
			.gas_oracle
			.get_gas_prices()
			.await
			.map_err(Self::provider_error("get_fee_data"))?;

		let median = entries
			.into_iter()
			.find(|entry| entry.source == GasOracleSource::Median)
			.ok_or_else(|| {
				ChainAdapterError::provider(
					ChainType::Ethereum,
					"get_fee_data",
					ProviderClientError::Decode("gas oracle response has no MEDIAN entry".to_string()),
				)
			})?;

		Ok(EthereumFeeData {
			fast: median.instant.to_string(),
			average: median.fast.to_string(),
			slow: median.low.to_string(),
		})
	}

	async fn resolve_gas_price(&self, fee: Option<&str>) -> Result<(U256, Option<FeeData>)> {
		match fee {
			Some(fee) => Ok((parse_quantity("gas price", fee)?, None)),
			None => {
				let fees = self.median_fees().await?;
				let price = parse_quantity("gas price", &fees.average)?;
				Ok((price, Some(FeeData::Ethereum(fees))))
			}
		}
	}

	async fn resolve_gas_limit(&self, limit: Option<&str>, request: GasEstimateRequest) -> Result<U256> {
		if let Some(limit) = limit {
			return parse_quantity("gas limit", limit);
		}

		let estimate = self
			.provider
			.estimate_gas(&request)
			.await
			.map_err(Self::provider_error("estimate_gas"))?;
		U256::from_str_radix(estimate.trim(), 10).map_err(|_| {
			ChainAdapterError::provider(
				ChainType::Ethereum,
				"estimate_gas",
				ProviderClientError::Decode(format!("invalid gas estimate: {:?}", estimate)),
			)
		})
	}
}

#[async_trait]
impl ChainAdapter for EthereumChainAdapter {
	fn get_type(&self) -> ChainType {
		ChainType::Ethereum
	}

	async fn get_account(&self, address: &str) -> Result<Account> {
		if address.is_empty() {
			return Err(ChainAdapterError::InvalidInput(
				"Address parameter is not defined".to_string(),
			));
		}

		let account = self
			.provider
			.get_account(address)
			.await
			.map_err(Self::provider_error("get_account"))?;
		Ok(Account::Ethereum(account))
	}

	async fn get_tx_history(
		&self,
		address: &str,
		pagination: Option<Pagination>,
	) -> Result<TxHistory> {
		if address.is_empty() {
			return Err(ChainAdapterError::InvalidInput(
				"Address parameter is not defined".to_string(),
			));
		}

		self.provider
			.get_tx_history(address, &pagination.unwrap_or_default())
			.await
			.map_err(Self::provider_error("get_tx_history"))
	}

	async fn build_send_transaction(
		&self,
		input: BuildSendTxInput<'_>,
	) -> Result<Option<BuildSendTxOutput>> {
		let to = input
			.to
			.as_deref()
			.ok_or_else(|| ChainAdapterError::InvalidInput("Recipient address is required".to_string()))?;
		let value = input
			.value
			.as_deref()
			.ok_or_else(|| ChainAdapterError::InvalidInput("Value is required".to_string()))?;
		let amount = parse_quantity("value", value)?;

		let target = transfer_target(to, amount, input.erc20_contract_address.as_deref())?;

		let path = input.path.as_deref().unwrap_or(DEFAULT_ETH_PATH);
		let address_n_list = bip32_to_address_n_list(path)?;
		let Some(from) = self.wallet_address(input.wallet, &address_n_list).await? else {
			return Ok(None);
		};

		let nonce = self
			.provider
			.get_nonce(&from)
			.await
			.map_err(Self::provider_error("get_nonce"))?;

		let (gas_price, estimated_fees) = self.resolve_gas_price(input.fee.as_deref()).await?;
		let gas_limit = self
			.resolve_gas_limit(
				input.limit.as_deref(),
				GasEstimateRequest {
					from: from.clone(),
					to: target.to.clone(),
					value: target.value.to_string(),
					data: target.data.clone(),
				},
			)
			.await?;

		debug!(
			"Ethereum tx from {} nonce {} gas price {} gas limit {}",
			from, nonce, gas_price, gas_limit
		);

		Ok(Some(BuildSendTxOutput {
			tx_to_sign: UnsignedTransaction::Ethereum(EthereumSignTx {
				address_n_list,
				to: target.to,
				value: to_hex_quantity(target.value),
				data: target.data,
				nonce: nonce.to_string(),
				gas_price: to_hex_quantity(gas_price),
				gas_limit: to_hex_quantity(gas_limit),
				chain_id: MAINNET_CHAIN_ID,
			}),
			estimated_fees,
		}))
	}

	async fn get_address(&self, input: GetAddressInput<'_>) -> Result<String> {
		let path = input.path.as_deref().unwrap_or(DEFAULT_ETH_PATH);
		let address_n_list = bip32_to_address_n_list(path)?;

		self.wallet_address(input.wallet, &address_n_list)
			.await?
			.ok_or_else(|| ChainAdapterError::Wallet(format!("Wallet returned no address for {}", path)))
	}

	async fn sign_transaction(&self, input: SignTxInput<'_>) -> Result<String> {
		let tx = match input.tx_to_sign {
			UnsignedTransaction::Ethereum(tx) => tx,
			other => {
				return Err(ChainAdapterError::InvalidInput(format!(
					"Ethereum adapter cannot sign a {} transaction",
					other.chain_type()
				)))
			}
		};

		let signed = input
			.wallet
			.eth_sign_tx(&tx)
			.await
			.map_err(|e| ChainAdapterError::Signing(e.to_string()))?
			.ok_or_else(|| ChainAdapterError::Signing("Error signing tx".to_string()))?;

		Ok(signed.serialized_tx)
	}

	async fn get_fee_data(&self) -> Result<FeeData> {
		Ok(FeeData::Ethereum(self.median_fees().await?))
	}

	async fn broadcast_transaction(&self, hex: &str) -> Result<String> {
		if hex.is_empty() {
			return Err(ChainAdapterError::InvalidInput(
				"Transaction hex is required".to_string(),
			));
		}

		let response = self
			.provider
			.broadcast(hex)
			.await
			.map_err(Self::provider_error("broadcast_transaction"))?;
		info!("Broadcast ethereum transaction {}", response.txid);
		Ok(response.txid)
	}

	async fn validate_address(&self, address: &str) -> ValidAddressResult {
		ValidAddressResult::from_bool(is_valid_ethereum_address(address))
	}
}
