//! UTXO-model adapter built on an account data provider, a fee oracle and
//! a pluggable coin selection strategy.
//!
//! Building a payment walks a fixed pipeline: derive the account's extended
//! public key, list its UTXOs, fetch each spendable UTXO's parent transaction,
//! run coin selection, derive a change address when the selection needs one,
//! and assemble the signing request.

use async_trait::async_trait;
use ::bitcoin::{address::NetworkUnchecked, Address, Network};
use chain_types::{
	bip32_to_address_n_list,
	bitcoin::{
		BitcoinAccountParams, BitcoinOutputAddressType, BitcoinSignTx, BitcoinSignTxInput,
		BitcoinSignTxOutput, Utxo,
	},
	Account, BitcoinFeeOracle, BitcoinProvider, BuildSendTxInput, BuildSendTxOutput,
	ChainAdapter, ChainAdapterError, ChainType, CoinSelection, CoinSelector, FeeData,
	GetAddressInput, HdWallet, Pagination, ProviderClientError, PublicKeyRequest, Recipient,
	Result, SelectableUtxo, SignTxInput, TxHistory, UnsignedTransaction, ValidAddressResult,
};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Minimum relay fee accepted by default Bitcoin Core nodes.
pub const MIN_RELAY_FEE_SATS_PER_KB: u64 = 3000;

const COIN_NAME: &str = "bitcoin";
const DEVICE_COIN_NAME: &str = "Bitcoin";
const CURVE: &str = "secp256k1";

/// Checks that `address` is a well-formed Bitcoin mainnet address.
pub fn is_valid_bitcoin_address(address: &str) -> bool {
	address
		.parse::<Address<NetworkUnchecked>>()
		.map(|address| address.is_valid_for_network(Network::Bitcoin))
		.unwrap_or(false)
}

/// Bitcoin chain adapter.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct BitcoinChainAdapter {
	provider: Arc<dyn BitcoinProvider>,
	fee_oracle: Arc<dyn BitcoinFeeOracle>,
	coin_selector: Option<Arc<dyn CoinSelector>>,
}

/// Builder for creating BitcoinChainAdapter instances.
pub struct BitcoinChainAdapterBuilder {
	provider: Arc<dyn BitcoinProvider>,
	fee_oracle: Arc<dyn BitcoinFeeOracle>,
	coin_selector: Option<Arc<dyn CoinSelector>>,
}

impl BitcoinChainAdapterBuilder {
	/// Sets the strategy used to pick inputs. Without one, building a send
	/// transaction fails with a configuration error.
	pub fn with_coin_selector(mut self, coin_selector: Arc<dyn CoinSelector>) -> Self {
		self.coin_selector = Some(coin_selector);
		self
	}

	pub fn with_optional_coin_selector(mut self, coin_selector: Option<Arc<dyn CoinSelector>>) -> Self {
		self.coin_selector = coin_selector;
		self
	}

	pub fn build(self) -> BitcoinChainAdapter {
		BitcoinChainAdapter {
			provider: self.provider,
			fee_oracle: self.fee_oracle,
			coin_selector: self.coin_selector,
		}
	}
}

impl BitcoinChainAdapter {
	/// Creates a new BitcoinChainAdapter builder.
	pub fn builder(
		provider: Arc<dyn BitcoinProvider>,
		fee_oracle: Arc<dyn BitcoinFeeOracle>,
	) -> BitcoinChainAdapterBuilder {
		BitcoinChainAdapterBuilder {
			provider,
			fee_oracle,
			coin_selector: None,
		}
	}

	fn provider_error(
		operation: &'static str,
	) -> impl FnOnce(ProviderClientError) -> ChainAdapterError {
		move |e| {
			error!("bitcoin {} failed: {}", operation, e);
			ChainAdapterError::provider(ChainType::Bitcoin, operation, e)
		}
	}

	/// Asks the wallet for the account-level extended public key.
	///
	/// `Ok(None)` means the device has no key for this account.
	async fn account_xpub(
		&self,
		wallet: &dyn HdWallet,
		params: &BitcoinAccountParams,
	) -> Result<Option<String>> {
		let request = PublicKeyRequest {
			coin: DEVICE_COIN_NAME.to_string(),
			address_n_list: bip32_to_address_n_list(&params.account_path())?,
			curve: CURVE.to_string(),
			script_type: Some(params.script_type),
		};

		let keys = wallet
			.get_public_keys(std::slice::from_ref(&request))
			.await
			.map_err(|e| ChainAdapterError::Wallet(format!("Failed to get public keys: {}", e)))?;

		Ok(keys.and_then(|keys| keys.into_iter().next()).map(|key| key.xpub))
	}

	/// Next unused receive or change index of the account.
	async fn next_index(&self, xpub: &str, is_change: bool) -> Result<u32> {
		let account = self
			.provider
			.get_account(xpub)
			.await
			.map_err(Self::provider_error("get_account"))?;

		let index = if is_change {
			account.change_index
		} else {
			account.receive_index
		};
		index.ok_or_else(|| {
			ChainAdapterError::Wallet(format!(
				"Provider reported no next {} index for the account",
				if is_change { "change" } else { "receive" }
			))
		})
	}

	async fn derive_address(
		&self,
		wallet: &dyn HdWallet,
		params: &BitcoinAccountParams,
		is_change: bool,
		index: u32,
	) -> Result<String> {
		let path = params.address_path(is_change, index);
		let address_n_list = bip32_to_address_n_list(&path)?;

		wallet
			.btc_get_address(&address_n_list, params.script_type)
			.await
			.map_err(|e| ChainAdapterError::Wallet(format!("Failed to derive address: {}", e)))?
			.ok_or_else(|| ChainAdapterError::Wallet(format!("Wallet returned no address for {}", path)))
	}

	/// Resolves the sat/byte fee rate, falling back to the oracle's average tier.
	async fn resolve_fee_rate(&self, fee: Option<&str>) -> Result<(u64, Option<FeeData>)> {
		match fee {
			Some(fee) => {
				let rate = fee.trim().parse::<u64>().map_err(|_| {
					ChainAdapterError::InvalidInput(format!("Invalid fee rate: {:?}", fee))
				})?;
				Ok((rate, None))
			}
			None => {
				let fees = self
					.fee_oracle
					.get_fees()
					.await
					.map_err(Self::provider_error("get_fee_data"))?;
				Ok((fees.average.sats_per_byte, Some(FeeData::Bitcoin(fees))))
			}
		}
	}

	/// Attaches parent transactions to every UTXO with a known derivation path.
	async fn spendable_utxos(
		&self,
		utxos: Vec<Utxo>,
		params: &BitcoinAccountParams,
	) -> Result<Vec<SelectableUtxo>> {
		let (with_path, without_path): (Vec<_>, Vec<_>) =
			utxos.into_iter().partition(|utxo| utxo.path.is_some());
		for utxo in &without_path {
			warn!(
				"Skipping UTXO {}:{} without a derivation path",
				utxo.txid, utxo.vout
			);
		}

		let lookups = with_path.into_iter().map(|utxo| async move {
			let path = utxo.path.as_deref().unwrap_or_default();
			let address_n_list = bip32_to_address_n_list(path)?;
			let parent = self
				.provider
				.get_transaction(&utxo.txid)
				.await
				.map_err(Self::provider_error("get_transaction"))?;

			Ok::<_, ChainAdapterError>(SelectableUtxo {
				txid: utxo.txid,
				vout: utxo.vout,
				value: utxo.value,
				address_n_list,
				script_type: params.script_type,
				hex: parent.hex,
			})
		});

		try_join_all(lookups).await
	}

	fn select_coins(
		&self,
		utxos: &[SelectableUtxo],
		input: &BuildSendTxInput<'_>,
		fee_rate: u64,
	) -> Result<CoinSelection> {
		let selector = self.coin_selector.as_ref().ok_or_else(|| {
			ChainAdapterError::Config("No coin selection strategy configured".to_string())
		})?;

		let selection = selector
			.select(utxos, &input.recipients, fee_rate)
			.ok_or_else(|| {
				ChainAdapterError::InsufficientFunds(format!(
					"No input combination covers the payment at {} sat/byte",
					fee_rate
				))
			})?;

		let overflow = || ChainAdapterError::InsufficientFunds("Selected amounts overflow".to_string());
		let available = selection.input_total().ok_or_else(overflow)?;
		let required = selection
			.output_total()
			.and_then(|total| total.checked_add(selection.fee))
			.ok_or_else(overflow)?;
		if available < required {
			return Err(ChainAdapterError::InsufficientFunds(format!(
				"Selected inputs total {} sats but outputs plus fee need {}",
				available, required
			)));
		}

		Ok(selection)
	}

	/// Turns selected outputs into signer outputs; address-less outputs become change.
	async fn signer_outputs(
		&self,
		wallet: &dyn HdWallet,
		params: &BitcoinAccountParams,
		xpub: &str,
		outputs: Vec<Recipient>,
	) -> Result<Vec<BitcoinSignTxOutput>> {
		let needs_change = outputs.iter().any(|output| output.address.is_none());
		let change_address = if needs_change {
			let index = self.next_index(xpub, true).await?;
			let address = self.derive_address(wallet, params, true, index).await?;
			debug!("Derived change address at index {}", index);
			Some(address)
		} else {
			None
		};

		let address_type = BitcoinOutputAddressType::from(params.script_type);
		Ok(outputs
			.into_iter()
			.map(|output| {
				let is_change = output.address.is_none();
				BitcoinSignTxOutput {
					address: output
						.address
						.or_else(|| change_address.clone())
						.unwrap_or_default(),
					address_type,
					amount: output.value.to_string(),
					is_change,
				}
			})
			.collect())
	}
}

fn signer_inputs(inputs: Vec<SelectableUtxo>) -> Vec<BitcoinSignTxInput> {
	inputs
		.into_iter()
		.map(|input| BitcoinSignTxInput {
			address_n_list: input.address_n_list,
			script_type: input.script_type,
			amount: input.value.to_string(),
			vout: input.vout,
			txid: input.txid,
			hex: input.hex,
		})
		.collect()
}

#[async_trait]
impl ChainAdapter for BitcoinChainAdapter {
	fn get_type(&self) -> ChainType {
		ChainType::Bitcoin
	}

	async fn get_account(&self, pubkey: &str) -> Result<Account> {
		if pubkey.is_empty() {
			return Err(ChainAdapterError::InvalidInput(
				"Pubkey parameter is not defined".to_string(),
			));
		}

		let account = self
			.provider
			.get_account(pubkey)
			.await
			.map_err(Self::provider_error("get_account"))?;
		Ok(Account::Bitcoin(account))
	}

	async fn get_tx_history(
		&self,
		pubkey: &str,
		pagination: Option<Pagination>,
	) -> Result<TxHistory> {
		if pubkey.is_empty() {
			return Err(ChainAdapterError::InvalidInput(
				"Pubkey parameter is not defined".to_string(),
			));
		}

		self.provider
			.get_tx_history(pubkey, &pagination.unwrap_or_default())
			.await
			.map_err(Self::provider_error("get_tx_history"))
	}

	async fn build_send_transaction(
		&self,
		input: BuildSendTxInput<'_>,
	) -> Result<Option<BuildSendTxOutput>> {
		if input.recipients.is_empty() {
			return Err(ChainAdapterError::InvalidInput(
				"At least one recipient is required".to_string(),
			));
		}
		let params = input.account_params;

		let Some(xpub) = self.account_xpub(input.wallet, &params).await? else {
			warn!("Wallet has no public key for {}", params.account_path());
			return Ok(None);
		};

		let utxos = self
			.provider
			.get_utxos(&xpub)
			.await
			.map_err(Self::provider_error("get_utxos"))?;
		debug!("Found {} UTXOs for account {}", utxos.len(), params.account_path());

		let spendable = self.spendable_utxos(utxos, &params).await?;
		let (fee_rate, estimated_fees) = self.resolve_fee_rate(input.fee.as_deref()).await?;
		let selection = self.select_coins(&spendable, &input, fee_rate)?;

		let outputs = self
			.signer_outputs(input.wallet, &params, &xpub, selection.outputs)
			.await?;

		info!(
			"Built bitcoin transaction with {} inputs, {} outputs, fee {} sats",
			selection.inputs.len(),
			outputs.len(),
			selection.fee
		);

		Ok(Some(BuildSendTxOutput {
			tx_to_sign: UnsignedTransaction::Bitcoin(BitcoinSignTx {
				coin: COIN_NAME.to_string(),
				inputs: signer_inputs(selection.inputs),
				outputs,
				fee: selection.fee,
				op_return_data: input.op_return_data,
			}),
			estimated_fees,
		}))
	}

	async fn get_address(&self, input: GetAddressInput<'_>) -> Result<String> {
		let params = input.account_params;
		let index = match input.index {
			Some(index) => index,
			None => {
				let xpub = self
					.account_xpub(input.wallet, &params)
					.await?
					.ok_or_else(|| ChainAdapterError::Wallet("Unable to get wallet's pubkeys".to_string()))?;
				self.next_index(&xpub, input.is_change).await?
			}
		};

		self.derive_address(input.wallet, &params, input.is_change, index)
			.await
	}

	async fn sign_transaction(&self, input: SignTxInput<'_>) -> Result<String> {
		let tx = match input.tx_to_sign {
			UnsignedTransaction::Bitcoin(tx) => tx,
			other => {
				return Err(ChainAdapterError::InvalidInput(format!(
					"Bitcoin adapter cannot sign a {} transaction",
					other.chain_type()
				)))
			}
		};

		let signed = input
			.wallet
			.btc_sign_tx(&tx)
			.await
			.map_err(|e| ChainAdapterError::Signing(e.to_string()))?
			.ok_or_else(|| ChainAdapterError::Signing("Error signing tx".to_string()))?;

		Ok(signed.serialized_tx)
	}

	async fn get_fee_data(&self) -> Result<FeeData> {
		let fees = self
			.fee_oracle
			.get_fees()
			.await
			.map_err(Self::provider_error("get_fee_data"))?;
		Ok(FeeData::Bitcoin(fees))
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
		info!("Broadcast bitcoin transaction {}", response.txid);
		Ok(response.txid)
	}

	async fn validate_address(&self, address: &str) -> ValidAddressResult {
		ValidAddressResult::from_bool(is_valid_bitcoin_address(address))
	}
}
