//! In-memory collaborators for adapter and manager tests.

use ::bitcoin::bip32::ChildNumber;
use async_trait::async_trait;
use chain_types::{
	bitcoin::{BitcoinAccount, BitcoinInputScriptType, BitcoinSignTx, RawTransaction, Utxo},
	ethereum::{EthereumAccount, EthereumSignTx, GasEstimateRequest},
	BitcoinFeeData, BitcoinFeeOracle, BitcoinFeeTier, BitcoinProvider,
	BroadcastTxResponse, CoinSelection, CoinSelector, DeviceError, EthereumProvider, GasOracle,
	GasOracleEntry, GasOracleSource, HdWallet, Pagination, ProviderClientError, ProviderResult,
	PublicKey, PublicKeyRequest, Recipient, SelectableUtxo, SignedTx, TxHistory,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const TEST_XPUB: &str = "zpub-test-account";
pub const TEST_ETH_ADDRESS: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

/// `m/...` rendering of a device index list.
pub fn bip32_path(address_n_list: &[u32]) -> String {
	address_n_list
		.iter()
		.fold(String::from("m"), |path, index| {
			format!("{}/{}", path, ChildNumber::from(*index))
		})
}

pub struct FakeWallet {
	pub xpub: Option<String>,
	pub eth_address: Option<String>,
	pub addresses_available: bool,
	pub signature: Option<String>,
	pub fail_signing: bool,
	pub key_requests: Mutex<Vec<PublicKeyRequest>>,
	pub signed_btc: Mutex<Option<BitcoinSignTx>>,
	pub signed_eth: Mutex<Option<EthereumSignTx>>,
}

impl Default for FakeWallet {
	fn default() -> Self {
		Self {
			xpub: Some(TEST_XPUB.to_string()),
			eth_address: Some(TEST_ETH_ADDRESS.to_string()),
			addresses_available: true,
			signature: Some("deadbeef".to_string()),
			fail_signing: false,
			key_requests: Mutex::new(Vec::new()),
			signed_btc: Mutex::new(None),
			signed_eth: Mutex::new(None),
		}
	}
}

impl FakeWallet {
	/// Address the fake derives for a path: `addr:<bip32 path>`.
	pub fn address_for(path: &str) -> String {
		format!("addr:{}", path)
	}

	fn signed(&self) -> Result<Option<SignedTx>, DeviceError> {
		if self.fail_signing {
			return Err(DeviceError::Rejected("user cancelled".to_string()));
		}
		Ok(self.signature.clone().map(|serialized_tx| SignedTx { serialized_tx }))
	}
}

#[async_trait]
impl HdWallet for FakeWallet {
	async fn get_public_keys(
		&self,
		requests: &[PublicKeyRequest],
	) -> Result<Option<Vec<PublicKey>>, DeviceError> {
		self.key_requests.lock().unwrap().extend_from_slice(requests);
		Ok(self.xpub.clone().map(|xpub| vec![PublicKey { xpub }]))
	}

	async fn btc_get_address(
		&self,
		address_n_list: &[u32],
		_script_type: BitcoinInputScriptType,
	) -> Result<Option<String>, DeviceError> {
		if !self.addresses_available {
			return Ok(None);
		}
		Ok(Some(Self::address_for(&bip32_path(address_n_list))))
	}

	async fn btc_sign_tx(&self, tx: &BitcoinSignTx) -> Result<Option<SignedTx>, DeviceError> {
		*self.signed_btc.lock().unwrap() = Some(tx.clone());
		self.signed()
	}

	async fn eth_get_address(&self, _address_n_list: &[u32]) -> Result<Option<String>, DeviceError> {
		Ok(self.eth_address.clone())
	}

	async fn eth_sign_tx(&self, tx: &EthereumSignTx) -> Result<Option<SignedTx>, DeviceError> {
		*self.signed_eth.lock().unwrap() = Some(tx.clone());
		self.signed()
	}
}

pub fn bitcoin_account(receive_index: Option<u32>, change_index: Option<u32>) -> BitcoinAccount {
	BitcoinAccount {
		network: "bitcoin".to_string(),
		symbol: "BTC".to_string(),
		address: TEST_XPUB.to_string(),
		balance: "100000".to_string(),
		unconfirmed_balance: "0".to_string(),
		unconfirmed_txs: 0,
		txs: 3,
		tokens: Vec::new(),
		receive_index,
		change_index,
	}
}

pub fn utxo(txid: &str, value: u64, path: Option<&str>) -> Utxo {
	Utxo {
		txid: txid.to_string(),
		vout: 0,
		value,
		height: Some(800_000),
		confirmations: 6,
		address: None,
		path: path.map(str::to_string),
		locktime: None,
		coinbase: None,
		non_witness_utxo: None,
	}
}

pub fn empty_history() -> TxHistory {
	TxHistory {
		page: 1,
		total_pages: 1,
		txs: 0,
		transactions: Vec::new(),
	}
}

pub struct FakeBitcoinProvider {
	pub account: BitcoinAccount,
	pub utxos: Vec<Utxo>,
	pub raw_txs: HashMap<String, String>,
	pub broadcast_txid: String,
	pub fail: bool,
	pub tx_lookups: AtomicUsize,
	pub last_pagination: Mutex<Option<Pagination>>,
}

impl Default for FakeBitcoinProvider {
	fn default() -> Self {
		Self {
			account: bitcoin_account(Some(4), Some(2)),
			utxos: Vec::new(),
			raw_txs: HashMap::new(),
			broadcast_txid: "btc-txid".to_string(),
			fail: false,
			tx_lookups: AtomicUsize::new(0),
			last_pagination: Mutex::new(None),
		}
	}
}

impl FakeBitcoinProvider {
	/// Adds a spendable UTXO and its parent transaction.
	pub fn with_utxo(mut self, txid: &str, value: u64, path: &str) -> Self {
		self.utxos.push(utxo(txid, value, Some(path)));
		self.raw_txs.insert(txid.to_string(), format!("raw-{}", txid));
		self
	}

	fn check(&self) -> ProviderResult<()> {
		if self.fail {
			return Err(ProviderClientError::Status {
				status: 503,
				body: "unavailable".to_string(),
			});
		}
		Ok(())
	}
}

#[async_trait]
impl BitcoinProvider for FakeBitcoinProvider {
	async fn get_account(&self, _pubkey: &str) -> ProviderResult<BitcoinAccount> {
		self.check()?;
		Ok(self.account.clone())
	}

	async fn get_tx_history(
		&self,
		_pubkey: &str,
		pagination: &Pagination,
	) -> ProviderResult<TxHistory> {
		self.check()?;
		*self.last_pagination.lock().unwrap() = Some(pagination.clone());
		Ok(empty_history())
	}

	async fn get_utxos(&self, _pubkey: &str) -> ProviderResult<Vec<Utxo>> {
		self.check()?;
		Ok(self.utxos.clone())
	}

	async fn get_transaction(&self, txid: &str) -> ProviderResult<RawTransaction> {
		self.check()?;
		self.tx_lookups.fetch_add(1, Ordering::SeqCst);
		let hex = self.raw_txs.get(txid).ok_or_else(|| ProviderClientError::Status {
			status: 404,
			body: format!("unknown tx {}", txid),
		})?;
		Ok(RawTransaction {
			txid: txid.to_string(),
			hex: hex.clone(),
		})
	}

	async fn broadcast(&self, _hex: &str) -> ProviderResult<BroadcastTxResponse> {
		self.check()?;
		Ok(BroadcastTxResponse {
			network: Some("bitcoin".to_string()),
			txid: self.broadcast_txid.clone(),
		})
	}
}

pub struct FakeFeeOracle {
	pub fees: BitcoinFeeData,
}

impl Default for FakeFeeOracle {
	fn default() -> Self {
		let tier = |blocks_until_confirmation, sats_per_byte| BitcoinFeeTier {
			blocks_until_confirmation,
			sats_per_byte,
		};
		Self {
			fees: BitcoinFeeData {
				slow: tier(144, 2),
				average: tier(6, 10),
				fast: tier(1, 25),
			},
		}
	}
}

#[async_trait]
impl BitcoinFeeOracle for FakeFeeOracle {
	async fn get_fees(&self) -> ProviderResult<BitcoinFeeData> {
		Ok(self.fees)
	}
}

/// Greedy selector charging a flat `fee_rate * 100` sats and returning any
/// excess as an address-less change output.
#[derive(Default)]
pub struct GreedySelector {
	pub last_fee_rate: Mutex<Option<u64>>,
}

impl CoinSelector for GreedySelector {
	fn select(
		&self,
		utxos: &[SelectableUtxo],
		recipients: &[Recipient],
		fee_rate: u64,
	) -> Option<CoinSelection> {
		*self.last_fee_rate.lock().unwrap() = Some(fee_rate);
		let fee = fee_rate * 100;
		let target: u64 = recipients.iter().map(|r| r.value).sum::<u64>() + fee;

		let mut inputs = Vec::new();
		let mut total = 0;
		for utxo in utxos {
			if total >= target {
				break;
			}
			total += utxo.value;
			inputs.push(utxo.clone());
		}
		if total < target {
			return None;
		}

		let mut outputs = recipients.to_vec();
		if total > target {
			outputs.push(Recipient {
				value: total - target,
				address: None,
			});
		}
		Some(CoinSelection {
			inputs,
			outputs,
			fee,
		})
	}
}

/// Selector that claims to cover a payment its inputs cannot pay for.
pub struct OverspendingSelector;

impl CoinSelector for OverspendingSelector {
	fn select(
		&self,
		utxos: &[SelectableUtxo],
		recipients: &[Recipient],
		_fee_rate: u64,
	) -> Option<CoinSelection> {
		Some(CoinSelection {
			inputs: utxos.to_vec(),
			outputs: recipients.to_vec(),
			fee: u64::MAX / 2,
		})
	}
}

/// Returns outputs whose total does not fit in a `u64`.
pub struct OverflowingSelector;

impl CoinSelector for OverflowingSelector {
	fn select(
		&self,
		utxos: &[SelectableUtxo],
		recipients: &[Recipient],
		_fee_rate: u64,
	) -> Option<CoinSelection> {
		let mut outputs = recipients.to_vec();
		outputs.push(Recipient {
			value: u64::MAX,
			address: None,
		});
		Some(CoinSelection {
			inputs: utxos.iter().take(1).cloned().collect(),
			outputs,
			fee: 100,
		})
	}
}

pub struct FakeEthereumProvider {
	pub nonce: u64,
	pub gas_estimate: String,
	pub broadcast_txid: String,
	pub estimates: Mutex<Vec<GasEstimateRequest>>,
	pub fail: bool,
}

impl Default for FakeEthereumProvider {
	fn default() -> Self {
		Self {
			nonce: 7,
			gas_estimate: "21000".to_string(),
			broadcast_txid: "0xeth-txid".to_string(),
			estimates: Mutex::new(Vec::new()),
			fail: false,
		}
	}
}

impl FakeEthereumProvider {
	fn check(&self) -> ProviderResult<()> {
		if self.fail {
			return Err(ProviderClientError::Http("connection refused".into()));
		}
		Ok(())
	}
}

#[async_trait]
impl EthereumProvider for FakeEthereumProvider {
	async fn get_account(&self, address: &str) -> ProviderResult<EthereumAccount> {
		self.check()?;
		Ok(EthereumAccount {
			network: "ethereum".to_string(),
			symbol: "ETH".to_string(),
			address: address.to_string(),
			balance: "1000".to_string(),
			unconfirmed_balance: "0".to_string(),
			unconfirmed_txs: 0,
			txs: self.nonce,
			tokens: Vec::new(),
			nonce: self.nonce,
		})
	}

	async fn get_tx_history(
		&self,
		_address: &str,
		_pagination: &Pagination,
	) -> ProviderResult<TxHistory> {
		self.check()?;
		Ok(empty_history())
	}

	async fn get_nonce(&self, _address: &str) -> ProviderResult<u64> {
		self.check()?;
		Ok(self.nonce)
	}

	async fn estimate_gas(&self, request: &GasEstimateRequest) -> ProviderResult<String> {
		self.check()?;
		self.estimates.lock().unwrap().push(request.clone());
		Ok(self.gas_estimate.clone())
	}

	async fn broadcast(&self, _hex: &str) -> ProviderResult<BroadcastTxResponse> {
		self.check()?;
		Ok(BroadcastTxResponse {
			network: None,
			txid: self.broadcast_txid.clone(),
		})
	}
}

pub struct FakeGasOracle {
	pub entries: Vec<GasOracleEntry>,
}

impl Default for FakeGasOracle {
	fn default() -> Self {
		Self {
			entries: vec![
				gas_entry(GasOracleSource::Etherscan, 40, 45, 20),
				gas_entry(GasOracleSource::Median, 5, 3, 1),
			],
		}
	}
}

pub fn gas_entry(source: GasOracleSource, fast: u64, instant: u64, low: u64) -> GasOracleEntry {
	GasOracleEntry {
		source,
		fast,
		instant,
		low,
		standard: fast,
		timestamp: 0,
	}
}

#[async_trait]
impl GasOracle for FakeGasOracle {
	async fn get_gas_prices(&self) -> ProviderResult<Vec<GasOracleEntry>> {
		Ok(self.entries.clone())
	}
}
