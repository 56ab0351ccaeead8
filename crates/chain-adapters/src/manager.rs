//! Registry and lazy cache of chain adapters.
//!
//! The `ChainAdapterManager` maps each `ChainType` to a factory. The first
//! `get_adapter` call for a chain runs its factory, checks that the adapter
//! really serves that chain, and caches it; later calls return the same
//! instance.
//!
//! # Thread Safety
//!
//! The manager is `Send + Sync` and meant to be shared behind an `Arc`.
//! Construction happens while holding the cache entry for the chain, so
//! concurrent first calls run the factory exactly once. A factory must not
//! call back into `get_adapter`.

use crate::clients::{HttpBitcoinFeeOracle, HttpBitcoinProvider, HttpEthereumProvider, HttpGasOracle};
use crate::implementations::{
	bitcoin::BitcoinChainAdapter, ethereum::EthereumChainAdapter, ChainAdapterType,
};
use chain_types::{
	configs::ChainAdaptersConfig, BitcoinFeeOracle, BitcoinProvider, ChainAdapter,
	ChainAdapterError, ChainType, CoinSelector, EthereumProvider, GasOracle, Result,
};
use dashmap::{mapref::entry::Entry, DashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info};

/// Zero-argument constructor registered for a chain.
pub type AdapterFactory = Arc<dyn Fn() -> ChainAdapterType + Send + Sync>;

/// Collaborators shared by the adapters a manager builds from configuration.
#[derive(Clone, Default)]
pub struct ManagerDependencies {
	/// Strategy for Bitcoin input selection. Without one, Bitcoin
	/// `build_send_transaction` fails with a configuration error.
	pub coin_selector: Option<Arc<dyn CoinSelector>>,
}

#[derive(Default)]
pub struct ChainAdapterManager {
	/// Registration order is preserved for listing.
	factories: RwLock<Vec<(ChainType, AdapterFactory)>>,
	instances: DashMap<ChainType, Arc<ChainAdapterType>>,
}

impl ChainAdapterManager {
	/// Creates a new empty manager.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a manager with HTTP-backed adapters for every configured chain.
	///
	/// # Errors
	///
	/// Returns `ChainAdapterError::Config` if no chain is configured or an
	/// endpoint URL is unusable, and `InvalidInput` for unrecognized chain names.
	pub fn from_config(config: &ChainAdaptersConfig, dependencies: ManagerDependencies) -> Result<Self> {
		if config.chains.is_empty() {
			return Err(ChainAdapterError::Config(
				"Blockchain urls required".to_string(),
			));
		}

		let manager = Self::new();
		for (chain, endpoint) in config.typed_chains()? {
			let timeout = Duration::from_secs(endpoint.timeout_secs());
			match chain {
				ChainType::Bitcoin => {
					let provider = Arc::new(HttpBitcoinProvider::new(&endpoint.base_url, timeout)?);
					let fee_oracle = Arc::new(HttpBitcoinFeeOracle::new(endpoint.fee_url(), timeout)?);
					manager.register_bitcoin(provider, fee_oracle, dependencies.coin_selector.clone());
				}
				ChainType::Ethereum => {
					let provider = Arc::new(HttpEthereumProvider::new(&endpoint.base_url, timeout)?);
					let gas_oracle = Arc::new(HttpGasOracle::new(endpoint.gas_oracle_url(), timeout)?);
					manager.register_ethereum(provider, gas_oracle);
				}
			}
			debug!("Configured {} adapter at {}", chain, endpoint.base_url);
		}

		Ok(manager)
	}

	/// Registers (or replaces) the factory for `chain`.
	///
	/// Replacing a factory keeps its original position in the registration
	/// order and does not evict an adapter that was already constructed.
	pub fn register<F>(&self, chain: ChainType, factory: F)
	where
		F: Fn() -> ChainAdapterType + Send + Sync + 'static,
	{
		let factory: AdapterFactory = Arc::new(factory);
		let mut factories = self.factories.write().unwrap_or_else(PoisonError::into_inner);

		match factories.iter_mut().find(|(registered, _)| *registered == chain) {
			Some(entry) => {
				info!("Replacing chain adapter factory for {}", chain);
				entry.1 = factory;
			}
			None => {
				info!("Registering chain adapter factory for {}", chain);
				factories.push((chain, factory));
			}
		}
	}

	/// Registers a factory by chain name, e.g. from configuration.
	///
	/// # Errors
	///
	/// Returns `ChainAdapterError::InvalidInput` for unrecognized names.
	pub fn register_named<F>(&self, chain: &str, factory: F) -> Result<()>
	where
		F: Fn() -> ChainAdapterType + Send + Sync + 'static,
	{
		let chain = chain.parse::<ChainType>()?;
		self.register(chain, factory);
		Ok(())
	}

	/// Registers a Bitcoin adapter over the given collaborators.
	pub fn register_bitcoin(
		&self,
		provider: Arc<dyn BitcoinProvider>,
		fee_oracle: Arc<dyn BitcoinFeeOracle>,
		coin_selector: Option<Arc<dyn CoinSelector>>,
	) {
		self.register(ChainType::Bitcoin, move || {
			BitcoinChainAdapter::builder(provider.clone(), fee_oracle.clone())
				.with_optional_coin_selector(coin_selector.clone())
				.build()
				.into()
		});
	}

	/// Registers an Ethereum adapter over the given collaborators.
	pub fn register_ethereum(&self, provider: Arc<dyn EthereumProvider>, gas_oracle: Arc<dyn GasOracle>) {
		self.register(ChainType::Ethereum, move || {
			EthereumChainAdapter::new(provider.clone(), gas_oracle.clone()).into()
		});
	}

	/// Chains with a registered factory, in registration order.
	pub fn supported_chains(&self) -> Vec<ChainType> {
		self.factories
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.iter()
			.map(|(chain, _)| *chain)
			.collect()
	}

	/// Registered factories, in registration order.
	pub fn supported_adapters(&self) -> Vec<AdapterFactory> {
		self.factories
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.iter()
			.map(|(_, factory)| factory.clone())
			.collect()
	}

	fn factory(&self, chain: ChainType) -> Option<AdapterFactory> {
		self.factories
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.iter()
			.find(|(registered, _)| *registered == chain)
			.map(|(_, factory)| factory.clone())
	}

	/// Returns the adapter for `chain`, constructing it on first use.
	///
	/// # Errors
	///
	/// * `UnsupportedChain` if no factory is registered for `chain`
	/// * `AdapterTypeMismatch` if the factory produced an adapter for another
	///   chain; nothing is cached in that case
	pub fn get_adapter(&self, chain: ChainType) -> Result<Arc<ChainAdapterType>> {
		if let Some(adapter) = self.instances.get(&chain) {
			return Ok(Arc::clone(adapter.value()));
		}

		let factory = self
			.factory(chain)
			.ok_or(ChainAdapterError::UnsupportedChain(chain))?;

		match self.instances.entry(chain) {
			Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
			Entry::Vacant(entry) => {
				let adapter = factory();
				let actual = adapter.get_type();
				if actual != chain {
					return Err(ChainAdapterError::AdapterTypeMismatch {
						expected: chain,
						actual,
					});
				}

				info!("Constructed {} chain adapter", chain);
				let adapter = Arc::new(adapter);
				entry.insert(Arc::clone(&adapter));
				Ok(adapter)
			}
		}
	}

	/// Number of adapters constructed so far.
	pub fn cached_count(&self) -> usize {
		self.instances.len()
	}
}

impl fmt::Debug for ChainAdapterManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChainAdapterManager")
			.field("chains", &self.supported_chains())
			.field("cached", &self.cached_count())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::*;
	use chain_types::configs::ChainEndpointConfig;
	use chain_types::{BuildSendTxInput, FeeData, Recipient, UnsignedTransaction};
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::thread;
	use wiremock::matchers::{method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn bitcoin_adapter() -> ChainAdapterType {
		BitcoinChainAdapter::builder(
			Arc::new(FakeBitcoinProvider::default()),
			Arc::new(FakeFeeOracle::default()),
		)
		.build()
		.into()
	}

	fn ethereum_adapter() -> ChainAdapterType {
		EthereumChainAdapter::new(
			Arc::new(FakeEthereumProvider::default()),
			Arc::new(FakeGasOracle::default()),
		)
		.into()
	}

	#[test]
	fn test_get_adapter_returns_same_instance() {
		let manager = ChainAdapterManager::new();
		manager.register(ChainType::Bitcoin, bitcoin_adapter);

		let first = manager.get_adapter(ChainType::Bitcoin).unwrap();
		let second = manager.get_adapter(ChainType::Bitcoin).unwrap();
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(first.get_type(), ChainType::Bitcoin);
		assert_eq!(manager.cached_count(), 1);
	}

	#[test]
	fn test_concurrent_first_calls_construct_once() {
		let manager = Arc::new(ChainAdapterManager::new());
		let constructions = Arc::new(AtomicUsize::new(0));
		let counter = constructions.clone();
		manager.register(ChainType::Ethereum, move || {
			counter.fetch_add(1, Ordering::SeqCst);
			ethereum_adapter()
		});

		let handles: Vec<_> = (0..16)
			.map(|_| {
				let manager = manager.clone();
				thread::spawn(move || manager.get_adapter(ChainType::Ethereum).unwrap())
			})
			.collect();
		let adapters: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

		assert_eq!(constructions.load(Ordering::SeqCst), 1);
		assert!(adapters.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
	}

	#[test]
	fn test_unsupported_chain() {
		let manager = ChainAdapterManager::new();
		manager.register(ChainType::Bitcoin, bitcoin_adapter);

		let err = manager.get_adapter(ChainType::Ethereum).unwrap_err();
		assert!(matches!(err, ChainAdapterError::UnsupportedChain(ChainType::Ethereum)));
		assert_eq!(err.to_string(), "Network [ethereum] is not supported");
	}

	#[test]
	fn test_type_mismatch_is_not_cached() {
		let manager = ChainAdapterManager::new();
		manager.register(ChainType::Bitcoin, ethereum_adapter);

		let err = manager.get_adapter(ChainType::Bitcoin).unwrap_err();
		assert!(matches!(
			err,
			ChainAdapterError::AdapterTypeMismatch {
				expected: ChainType::Bitcoin,
				actual: ChainType::Ethereum,
			}
		));
		assert_eq!(manager.cached_count(), 0);

		// fixing the registration makes the chain usable
		manager.register(ChainType::Bitcoin, bitcoin_adapter);
		assert!(manager.get_adapter(ChainType::Bitcoin).is_ok());
	}

	#[test]
	fn test_supported_chains_in_registration_order() {
		let manager = ChainAdapterManager::new();
		assert!(manager.supported_chains().is_empty());

		manager.register(ChainType::Ethereum, ethereum_adapter);
		manager.register(ChainType::Bitcoin, bitcoin_adapter);
		assert_eq!(
			manager.supported_chains(),
			vec![ChainType::Ethereum, ChainType::Bitcoin]
		);

		let factories = manager.supported_adapters();
		assert_eq!(factories.len(), 2);
		assert_eq!(factories[0]().get_type(), ChainType::Ethereum);
		assert_eq!(factories[1]().get_type(), ChainType::Bitcoin);
	}

	#[test]
	fn test_reregister_keeps_position_and_cache() {
		let manager = ChainAdapterManager::new();
		manager.register(ChainType::Bitcoin, bitcoin_adapter);
		manager.register(ChainType::Ethereum, ethereum_adapter);
		let cached = manager.get_adapter(ChainType::Bitcoin).unwrap();

		let calls = Arc::new(AtomicUsize::new(0));
		let counter = calls.clone();
		manager.register(ChainType::Bitcoin, move || {
			counter.fetch_add(1, Ordering::SeqCst);
			bitcoin_adapter()
		});

		assert_eq!(
			manager.supported_chains(),
			vec![ChainType::Bitcoin, ChainType::Ethereum]
		);
		assert!(Arc::ptr_eq(&cached, &manager.get_adapter(ChainType::Bitcoin).unwrap()));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_register_named() {
		let manager = ChainAdapterManager::new();
		manager.register_named("Ethereum", ethereum_adapter).unwrap();
		assert_eq!(manager.supported_chains(), vec![ChainType::Ethereum]);

		let err = manager.register_named("dogecoin", bitcoin_adapter).unwrap_err();
		assert!(matches!(err, ChainAdapterError::InvalidInput(_)));
	}

	#[test]
	fn test_from_config_requires_chains() {
		let err = ChainAdapterManager::from_config(
			&ChainAdaptersConfig::default(),
			ManagerDependencies::default(),
		)
		.unwrap_err();
		assert!(matches!(err, ChainAdapterError::Config(ref msg) if msg == "Blockchain urls required"));
	}

	#[test]
	fn test_from_config_rejects_bad_entries() {
		let mut config = ChainAdaptersConfig::default();
		config
			.chains
			.insert("litecoin".to_string(), ChainEndpointConfig::new("https://ltc.example.com"));
		assert!(matches!(
			ChainAdapterManager::from_config(&config, ManagerDependencies::default()),
			Err(ChainAdapterError::InvalidInput(_))
		));

		let mut config = ChainAdaptersConfig::default();
		config
			.chains
			.insert("bitcoin".to_string(), ChainEndpointConfig::new(""));
		assert!(matches!(
			ChainAdapterManager::from_config(&config, ManagerDependencies::default()),
			Err(ChainAdapterError::Config(_))
		));
	}

	#[tokio::test]
	async fn test_from_config_end_to_end() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/api/v1/fees"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"slow": { "blocksUntilConfirmation": 144, "satsPerByte": 1 },
				"average": { "blocksUntilConfirmation": 6, "satsPerByte": 4 },
				"fast": { "blocksUntilConfirmation": 1, "satsPerByte": 9 }
			})))
			.mount(&server)
			.await;
		Mock::given(method("GET"))
			.and(path("/gas"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"result": [{ "source": "MEDIAN", "fast": 5, "instant": 3, "low": 1, "standard": 4 }]
			})))
			.mount(&server)
			.await;

		let mut config = ChainAdaptersConfig::default();
		config
			.chains
			.insert("bitcoin".to_string(), ChainEndpointConfig::new(server.uri()));
		let mut ethereum = ChainEndpointConfig::new(server.uri());
		ethereum.gas_oracle_url = Some(format!("{}/gas", server.uri()));
		config.chains.insert("ethereum".to_string(), ethereum);

		let manager = ChainAdapterManager::from_config(&config, ManagerDependencies::default()).unwrap();
		assert_eq!(
			manager.supported_chains(),
			vec![ChainType::Bitcoin, ChainType::Ethereum]
		);

		let bitcoin = manager.get_adapter(ChainType::Bitcoin).unwrap();
		match bitcoin.get_fee_data().await.unwrap() {
			FeeData::Bitcoin(fees) => assert_eq!(fees.fast.sats_per_byte, 9),
			other => panic!("unexpected fee data: {:?}", other),
		}

		let ethereum = manager.get_adapter(ChainType::Ethereum).unwrap();
		match ethereum.get_fee_data().await.unwrap() {
			FeeData::Ethereum(fees) => assert_eq!(fees.average, "5"),
			other => panic!("unexpected fee data: {:?}", other),
		}
		assert!(ethereum.as_ethereum().is_some());
		assert_eq!(
			manager.supported_chains(),
			vec![ChainType::Bitcoin, ChainType::Ethereum]
		);

		let reversed = ChainAdapterManager::from_config(&config, ManagerDependencies::default()).unwrap();
		let ethereum = reversed.get_adapter(ChainType::Ethereum).unwrap();
		let bitcoin = reversed.get_adapter(ChainType::Bitcoin).unwrap();
		assert_eq!(ethereum.get_type(), ChainType::Ethereum);
		assert_eq!(bitcoin.get_type(), ChainType::Bitcoin);
		assert_eq!(
			reversed.supported_chains(),
			vec![ChainType::Bitcoin, ChainType::Ethereum]
		);
		assert_eq!(reversed.cached_count(), 2);
	}

	#[tokio::test]
	async fn test_adapters_share_injected_selector() {
		let manager = ChainAdapterManager::new();
		let selector = Arc::new(GreedySelector::default());
		manager.register_bitcoin(
			Arc::new(FakeBitcoinProvider::default().with_utxo("aa", 90_000, "m/84'/0'/0'/0/0")),
			Arc::new(FakeFeeOracle::default()),
			Some(selector.clone() as Arc<dyn CoinSelector>),
		);

		let adapter = manager.get_adapter(ChainType::Bitcoin).unwrap();
		let wallet = FakeWallet::default();
		let mut input = BuildSendTxInput::new(&wallet);
		input.recipients = vec![Recipient::new("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4", 1_000)];
		input.fee = Some("3".to_string());

		let output = adapter.build_send_transaction(input).await.unwrap().unwrap();
		assert!(matches!(output.tx_to_sign, UnsignedTransaction::Bitcoin(_)));
		assert_eq!(*selector.last_fee_rate.lock().unwrap(), Some(3));
	}
}
