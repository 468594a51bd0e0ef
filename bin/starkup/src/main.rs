//! starkup is a CLI tool that declares and deploys the cNGN contracts on Starknet.

mod cli;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use starkup_deploy::{DeployConfig, DeployError, DeployOutcome, Deployer};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine, the environment may already be set.
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_target(false)
        .init();

    match run(&cli).await {
        Ok(DeployOutcome::Completed { .. }) | Ok(DeployOutcome::Declined) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<DeployError>() {
                Some(DeployError::Persistence { .. }) => tracing::error!(
                    "Error: {}. The contracts were deployed; recover their identifiers from the output above.",
                    err
                ),
                _ => tracing::error!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<DeployOutcome> {
    let config = DeployConfig::load(cli.config.as_deref(), cli.overrides())?;
    let deployer = Deployer::from_config(&config)?;

    Ok(deployer.deploy().await?)
}
