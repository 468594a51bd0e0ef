use std::future::Future;
use std::io::{BufRead, Write};

use comfy_table::{Table, presets::UTF8_FULL};

use crate::{
    ArtifactLoader, ContractSpec, DeployConfig, DeployError, DeploySettings, DeploymentGraph,
    DeploymentManifest, GateDecision, ManifestRecorder, NetworkClient, Orchestrator,
    PersistedManifest, StarknetClient, build_step, contracts, gate, orchestrator::section,
};

/// How a run ended without error.
#[derive(Debug)]
pub enum DeployOutcome {
    /// Every contract was declared and deployed, and the manifest was saved.
    Completed {
        manifest: DeploymentManifest,
        persisted: PersistedManifest,
    },
    /// The operator did not confirm a high-stakes deployment.
    Declined,
}

/// Main deployer that runs a complete deployment against one network.
///
/// Order of operations: safety gate, network connection, account check, build,
/// declarations, deployments, manifest.
#[derive(Debug, Clone)]
pub struct Deployer {
    settings: DeploySettings,
    contracts: Vec<ContractSpec>,
}

impl Deployer {
    /// Create a deployer for the cNGN contract set.
    pub fn new(settings: DeploySettings) -> Self {
        let contracts = contracts::cngn_contracts(settings.owner);
        Self {
            settings,
            contracts,
        }
    }

    /// Validate `config` and create a deployer from it.
    pub fn from_config(config: &DeployConfig) -> Result<Self, DeployError> {
        Ok(Self::new(config.validate()?))
    }

    /// Replace the contract set, given in declaration order.
    pub fn with_contracts(mut self, contracts: Vec<ContractSpec>) -> Self {
        self.contracts = contracts;
        self
    }

    /// Deploy against the configured Starknet endpoint, prompting on the terminal.
    pub async fn deploy(&self) -> Result<DeployOutcome, DeployError> {
        let mut stdout = std::io::stdout();
        self.deploy_with(&mut std::io::stdin().lock(), &mut stdout, || {
            StarknetClient::connect(&self.settings)
        })
        .await
    }

    /// Deploy with an explicit prompt and client factory.
    ///
    /// `connect` is only called once the safety gate has let the run proceed.
    pub async fn deploy_with<R, W, F, Fut, C>(
        &self,
        input: &mut R,
        output: &mut W,
        connect: F,
    ) -> Result<DeployOutcome, DeployError>
    where
        R: BufRead,
        W: Write,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, DeployError>>,
        C: NetworkClient,
    {
        let graph = DeploymentGraph::new(self.contracts.clone())?;

        section("cNGN Contracts Deployment");
        tracing::info!("Network: {}", self.settings.network);
        tracing::info!("Owner: {:#x}", self.settings.owner);
        tracing::info!("RPC: {}", self.settings.rpc_url);

        if gate::confirm(self.settings.network, input, output) == GateDecision::Declined {
            tracing::info!("Deployment cancelled.");
            return Ok(DeployOutcome::Declined);
        }

        let client = connect().await?;
        self.execute(&client, &graph).await
    }

    async fn execute<C: NetworkClient>(
        &self,
        client: &C,
        graph: &DeploymentGraph,
    ) -> Result<DeployOutcome, DeployError> {
        tracing::info!("Checking account...");
        let nonce = client.nonce().await?;
        tracing::info!("Account nonce: {:#x}", nonce);

        if let Some(command) = &self.settings.build_command {
            build_step::run_build(command).await?;
        }

        let loader = ArtifactLoader::new(&self.settings.artifacts_dir, &self.settings.package);
        let orchestrator =
            Orchestrator::new(client, &loader, self.settings.network, self.settings.owner);
        let manifest = orchestrator.run(graph).await?;

        let recorder = ManifestRecorder::new(&self.settings.deployments_dir);
        let persisted = match recorder.persist(&manifest) {
            Ok(persisted) => persisted,
            Err(err) => {
                // The contracts exist on chain regardless; print what would have been saved.
                tracing::error!("Contracts are deployed but the manifest could not be saved.");
                if let Ok(json) = manifest.to_json() {
                    tracing::error!("Deployment manifest:\n{}", json);
                }
                return Err(err);
            }
        };

        section("Deployment Complete!");
        tracing::info!("Deployment saved to: {}", persisted.snapshot.display());
        tracing::info!("Contract addresses:\n{}", self.summary(&manifest));

        Ok(DeployOutcome::Completed {
            manifest,
            persisted,
        })
    }

    fn summary(&self, manifest: &DeploymentManifest) -> Table {
        let explorer = self.settings.network.explorer_url();

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["Contract", "Class hash", "Address", "Explorer"]);
        for (name, contract) in &manifest.contracts {
            table.add_row(vec![
                name.clone(),
                format!("{:#x}", contract.class_hash),
                format!("{:#x}", contract.address),
                format!("{}/contract/{:#x}", explorer, contract.address),
            ]);
        }
        table
    }
}
