//! Configuration loading from files and environment.

use crate::ConfigError;
use chain_types::configs::{validate_base_url, ChainAdaptersConfig, ChainEndpointConfig};
use chain_types::ChainType;
use regex::Regex;
use std::env;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_ENV_PREFIX: &str = "CHAIN_ADAPTERS_";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
	Toml,
	Json,
	Yaml,
}

impl ConfigFormat {
	/// Picks the format from a file extension.
	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Ok(Self::Toml),
			Some("json") => Ok(Self::Json),
			Some("yaml") | Some("yml") => Ok(Self::Yaml),
			_ => Err(ConfigError::ParseError(format!(
				"Unsupported config format: {:?}",
				path
			))),
		}
	}
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			env_prefix: DEFAULT_ENV_PREFIX.to_string(),
		}
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Load, override and validate configuration from a file
	pub fn from_file<P: AsRef<Path>>(&self, path: P) -> Result<ChainAdaptersConfig, ConfigError> {
		let path = path.as_ref();
		info!("Loading configuration from {:?}", path);

		if !path.exists() {
			return Err(ConfigError::FileNotFound(path.display().to_string()));
		}
		let format = ConfigFormat::from_path(path)?;
		let contents = std::fs::read_to_string(path)?;

		self.load_str(&contents, format, |name| env::var(name).ok())
	}

	/// Load from a string, resolving environment references through `lookup`.
	pub fn load_str<F>(
		&self,
		contents: &str,
		format: ConfigFormat,
		lookup: F,
	) -> Result<ChainAdaptersConfig, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let substituted = substitute_env_vars(contents, &lookup)?;
		let mut config = parse(&substituted, format)?;
		self.apply_env_overrides(&mut config, &lookup);
		validate(&config)?;
		Ok(config)
	}

	fn apply_env_overrides<F>(&self, config: &mut ChainAdaptersConfig, lookup: &F)
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(level) = lookup(&format!("{}LOG_LEVEL", self.env_prefix)) {
			debug!("Overriding log level from environment");
			config.logging.level = level;
		}

		for chain in ChainType::ALL {
			let key = format!(
				"{}{}_URL",
				self.env_prefix,
				chain.as_str().to_ascii_uppercase()
			);
			let Some(url) = lookup(&key) else {
				continue;
			};

			debug!("Overriding {} base URL from environment", chain);
			let existing = config
				.chains
				.iter_mut()
				.find(|(name, _)| name.parse::<ChainType>().ok() == Some(chain))
				.map(|(_, endpoint)| endpoint);
			if let Some(endpoint) = existing {
				endpoint.base_url = url;
			} else {
				config
					.chains
					.insert(chain.as_str().to_string(), ChainEndpointConfig::new(url));
			}
		}
	}
}

/// Parse configuration text without validating it
pub fn parse(contents: &str, format: ConfigFormat) -> Result<ChainAdaptersConfig, ConfigError> {
	match format {
		ConfigFormat::Toml => toml::from_str(contents)
			.map_err(|e| ConfigError::ParseError(format!("Failed to parse TOML: {}", e))),
		ConfigFormat::Json => serde_json::from_str(contents)
			.map_err(|e| ConfigError::ParseError(format!("Failed to parse JSON: {}", e))),
		ConfigFormat::Yaml => serde_yaml::from_str(contents)
			.map_err(|e| ConfigError::ParseError(format!("Failed to parse YAML: {}", e))),
	}
}

/// Replaces every `${VAR}` with its value. A missing variable is an error.
fn substitute_env_vars<F>(content: &str, lookup: &F) -> Result<String, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;

	let mut result = String::with_capacity(content.len());
	let mut last = 0;
	for cap in re.captures_iter(content) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = lookup(var_name.as_str())
			.ok_or_else(|| ConfigError::EnvVarNotFound(var_name.as_str().to_string()))?;

		result.push_str(&content[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&content[last..]);

	Ok(result)
}

/// Validate configuration
pub fn validate(config: &ChainAdaptersConfig) -> Result<(), ConfigError> {
	if config.chains.is_empty() {
		return Err(ConfigError::ValidationError(
			"At least one chain must be configured".to_string(),
		));
	}

	for (name, endpoint) in &config.chains {
		name.parse::<ChainType>()
			.map_err(|e| ConfigError::ValidationError(e.to_string()))?;
		validate_base_url(name, &endpoint.base_url)
			.map_err(|e| ConfigError::ValidationError(e.to_string()))?;
		for url in [&endpoint.fee_url, &endpoint.gas_oracle_url].into_iter().flatten() {
			validate_base_url(name, url)
				.map_err(|e| ConfigError::ValidationError(e.to_string()))?;
		}
		if endpoint.timeout_secs == Some(0) {
			return Err(ConfigError::ValidationError(format!(
				"Timeout for chain {} must be positive",
				name
			)));
		}
	}

	let level = config.logging.level.to_ascii_lowercase();
	if !LOG_LEVELS.contains(&level.as_str()) {
		return Err(ConfigError::ValidationError(format!(
			"Unknown log level: {}",
			config.logging.level
		)));
	}

	Ok(())
}
