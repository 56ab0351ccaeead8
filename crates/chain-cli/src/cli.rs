use chain_types::{ChainType, Pagination};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chain-adapters")]
#[command(about = "Query and broadcast through the Bitcoin and Ethereum chain adapters", long_about = None)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Commands,

	#[arg(
		short,
		long,
		value_name = "FILE",
		env = "CHAIN_ADAPTERS_CONFIG",
		default_value = "config/local.toml"
	)]
	pub config: PathBuf,

	/// Overrides the configured log level
	#[arg(long)]
	pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// List the chains with a configured adapter
	Chains,
	/// Show the slow/average/fast fee estimate
	Fees(ChainArg),
	/// Show the balance snapshot of an address or extended public key
	Account {
		#[command(flatten)]
		chain: ChainArg,
		address: String,
	},
	/// Show a page of transaction history
	History {
		#[command(flatten)]
		chain: ChainArg,
		address: String,
		#[command(flatten)]
		page: PageArgs,
	},
	/// Broadcast a signed transaction
	Broadcast {
		#[command(flatten)]
		chain: ChainArg,
		hex: String,
	},
	/// Check whether an address is valid for a chain
	ValidateAddress {
		#[command(flatten)]
		chain: ChainArg,
		address: String,
	},
	/// Validate the configuration file
	Validate,
}

#[derive(Args, Debug)]
pub struct ChainArg {
	/// Chain to use (bitcoin, ethereum)
	#[arg(long)]
	pub chain: ChainType,
}

#[derive(Args, Debug)]
pub struct PageArgs {
	#[arg(long)]
	pub page: Option<u32>,
	#[arg(long)]
	pub page_size: Option<u32>,
	/// Token contract to filter by
	#[arg(long)]
	pub contract: Option<String>,
}

impl From<PageArgs> for Pagination {
	fn from(args: PageArgs) -> Self {
		Pagination {
			page_num: args.page,
			page_size: args.page_size,
			contract: args.contract,
		}
	}
}
