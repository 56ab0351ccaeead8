use anyhow::{Context, Result};
use chain_adapters::{ChainAdapterManager, ManagerDependencies};
use chain_config::{ChainAdaptersConfig, ConfigLoader};
use chain_types::ChainAdapter;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = ConfigLoader::new()
		.from_file(&cli.config)
		.with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

	let log_level = cli
		.log_level
		.clone()
		.unwrap_or_else(|| config.logging.level.clone());
	setup_tracing(&log_level, config.logging.json)?;

	run(cli.command, &config).await
}

async fn run(command: Commands, config: &ChainAdaptersConfig) -> Result<()> {
	if let Commands::Validate = command {
		info!("Configuration is valid");
		return print_json(config);
	}

	// Signing is not exposed, so no coin selection strategy is needed here.
	let manager = ChainAdapterManager::from_config(config, ManagerDependencies::default())
		.context("Failed to build chain adapters")?;

	match command {
		Commands::Chains => print_json(&manager.supported_chains()),
		Commands::Fees(chain) => {
			let adapter = manager.get_adapter(chain.chain)?;
			print_json(&adapter.get_fee_data().await?)
		}
		Commands::Account { chain, address } => {
			let adapter = manager.get_adapter(chain.chain)?;
			print_json(&adapter.get_account(&address).await?)
		}
		Commands::History {
			chain,
			address,
			page,
		} => {
			let adapter = manager.get_adapter(chain.chain)?;
			print_json(&adapter.get_tx_history(&address, Some(page.into())).await?)
		}
		Commands::Broadcast { chain, hex } => {
			let adapter = manager.get_adapter(chain.chain)?;
			let txid = adapter.broadcast_transaction(&hex).await?;
			print_json(&serde_json::json!({ "txid": txid }))
		}
		Commands::ValidateAddress { chain, address } => {
			let adapter = manager.get_adapter(chain.chain)?;
			print_json(&adapter.validate_address(&address).await)
		}
		Commands::Validate => Ok(()),
	}
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn setup_tracing(log_level: &str, json: bool) -> Result<()> {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

	let (plain, json) = if json {
		(None, Some(fmt::layer().json().with_writer(std::io::stderr)))
	} else {
		(Some(fmt::layer().with_writer(std::io::stderr)), None)
	};

	tracing_subscriber::registry()
		.with(env_filter)
		.with(plain)
		.with(json)
		.try_init()
		.context("Failed to initialize tracing")?;

	Ok(())
}
