//! Bitcoin (UTXO model) chain adapter.

mod adapter;

pub use adapter::{
	is_valid_bitcoin_address, BitcoinChainAdapter, BitcoinChainAdapterBuilder,
	MIN_RELAY_FEE_SATS_PER_KB,
};
