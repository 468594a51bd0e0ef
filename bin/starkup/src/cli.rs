use std::path::PathBuf;

use clap::Parser;
use starkup_deploy::ConfigOverrides;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "starkup")]
#[command(
    author,
    version,
    about = "Declare and deploy the cNGN Starknet contracts in dependency order"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "STARKUP_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// The target network: sepolia (alias testnet) or mainnet.
    ///
    /// Overrides STARKNET_NETWORK and NETWORK.
    #[arg(short, long)]
    pub network: Option<String>,

    /// Path to a Starkup.toml configuration file.
    ///
    /// If not provided, ./Starkup.toml is used when it exists.
    #[arg(long, alias = "conf", env = "STARKUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// The owner passed to the contract constructors.
    ///
    /// Overrides CONTRACT_OWNER_ADDRESS. Defaults to the account address.
    #[arg(long, alias = "owner")]
    pub owner_address: Option<String>,

    /// A custom Starknet JSON-RPC endpoint instead of the network's public one.
    #[arg(long, alias = "rpc")]
    pub rpc_url: Option<String>,

    /// The directory holding the compiled contract classes.
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// The directory receiving the deployment manifests.
    #[arg(long)]
    pub deployments_dir: Option<PathBuf>,

    /// Use the artifacts already on disk instead of running the build command.
    #[arg(long)]
    pub skip_build: bool,
}

impl Cli {
    /// Values given on the command line, layered over every other config source.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            network: self.network.clone(),
            owner_address: self.owner_address.clone(),
            rpc_url: self.rpc_url.clone(),
            artifacts_dir: self.artifacts_dir.clone(),
            deployments_dir: self.deployments_dir.clone(),
            skip_build: self.skip_build.then_some(true),
        }
    }
}
