//! # Configuration Types
//!
//! Configuration schema for the chain adapter workspace: which chains are
//! served, where their data providers and fee oracles live, and how logs
//! are emitted.

use crate::chains::ChainType;
use crate::errors::{ChainAdapterError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default request timeout for provider clients, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default Ethereum gas oracle.
pub const DEFAULT_GAS_ORACLE_URL: &str = "https://gas.api.0x.org/";

/// Root configuration object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainAdaptersConfig {
	#[serde(default)]
	pub logging: LoggingConfig,
	/// Endpoint settings keyed by chain name (`bitcoin`, `ethereum`).
	#[serde(default)]
	pub chains: BTreeMap<String, ChainEndpointConfig>,
}

impl ChainAdaptersConfig {
	/// Resolves the chain table into typed identifiers.
	///
	/// Fails on unrecognized chain names.
	pub fn typed_chains(&self) -> Result<Vec<(ChainType, &ChainEndpointConfig)>> {
		self.chains
			.iter()
			.map(|(name, endpoint)| Ok((name.parse::<ChainType>()?, endpoint)))
			.collect()
	}

	pub fn endpoint(&self, chain: ChainType) -> Option<&ChainEndpointConfig> {
		self.chains
			.iter()
			.find(|(name, _)| name.parse::<ChainType>().ok() == Some(chain))
			.map(|(_, endpoint)| endpoint)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
	/// Log level filter (trace, debug, info, warn, error)
	#[serde(default = "default_log_level")]
	pub level: String,
	/// Emit JSON lines instead of human-readable output
	#[serde(default)]
	pub json: bool,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: default_log_level(),
			json: false,
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

/// Connection settings of one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEndpointConfig {
	/// Base URL of the chain data provider
	pub base_url: String,
	/// Base URL of the Bitcoin fee endpoint; defaults to `base_url`
	#[serde(default)]
	pub fee_url: Option<String>,
	/// Ethereum gas oracle URL; defaults to the 0x gas API
	#[serde(default)]
	pub gas_oracle_url: Option<String>,
	/// Per-request timeout in seconds
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

impl ChainEndpointConfig {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			fee_url: None,
			gas_oracle_url: None,
			timeout_secs: None,
		}
	}

	pub fn fee_url(&self) -> &str {
		self.fee_url.as_deref().unwrap_or(&self.base_url)
	}

	pub fn gas_oracle_url(&self) -> &str {
		self.gas_oracle_url
			.as_deref()
			.unwrap_or(DEFAULT_GAS_ORACLE_URL)
	}

	pub fn timeout_secs(&self) -> u64 {
		self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
	}
}

/// Checks that a URL is present and uses http(s).
pub fn validate_base_url(chain: &str, url: &str) -> Result<()> {
	if url.trim().is_empty() {
		return Err(ChainAdapterError::Config(format!(
			"Base URL for chain {} is required",
			chain
		)));
	}
	if !(url.starts_with("http://") || url.starts_with("https://")) {
		return Err(ChainAdapterError::Config(format!(
			"Base URL for chain {} must start with http:// or https://",
			chain
		)));
	}
	Ok(())
}
