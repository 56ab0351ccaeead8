//! Ethereum (account model) chain adapter.

mod abi;
mod adapter;

pub use adapter::{is_valid_ethereum_address, EthereumChainAdapter};
