//! Chain adapters for Bitcoin and Ethereum.
//!
//! This crate provides the concrete implementations of the `ChainAdapter`
//! contract defined in `chain-types`, the HTTP clients they talk to, and the
//! `ChainAdapterManager` that constructs and caches one adapter per chain.
//!
//! # Architecture
//!
//! - `manager`: factory registration and lazy, cached adapter construction
//! - `implementations`: the Bitcoin and Ethereum adapters and the
//!   `ChainAdapterType` dispatch enum
//! - `clients`: reqwest-based data provider and fee oracle clients
//! - `utils`: shared JSON-over-HTTP plumbing

pub mod clients;
pub mod implementations;
pub mod manager;
pub mod utils;

#[cfg(test)]
mod testing;

pub use implementations::{
	bitcoin::BitcoinChainAdapter, ethereum::EthereumChainAdapter, ChainAdapterType,
};
pub use manager::{AdapterFactory, ChainAdapterManager, ManagerDependencies};
