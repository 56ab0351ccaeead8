//! Configuration loading for the chain adapter workspace.
//!
//! Reads a `ChainAdaptersConfig` from TOML, JSON or YAML, substitutes
//! `${VAR}` references from the environment, applies `CHAIN_ADAPTERS_*`
//! overrides and validates the result before any adapter is built.

pub mod loader;

pub use chain_types::configs::{ChainAdaptersConfig, ChainEndpointConfig, LoggingConfig};
pub use loader::{ConfigFormat, ConfigLoader};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}
