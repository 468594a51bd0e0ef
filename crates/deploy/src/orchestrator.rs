//! Drives the whole contract set through declaration and deployment.

use std::collections::HashMap;

use chrono::Utc;
use starknet::core::types::Felt;

use crate::{
    ArtifactLoader, ClassRecord, DeployError, DeploymentGraph, DeploymentManifest,
    InstanceRecord, Network, NetworkClient, declare_contract, deploy_contract,
};

/// Declares every class, then deploys every contract in dependency order.
///
/// The run is strictly sequential and stops at the first failure. Nothing is
/// rolled back: declarations and deployments that already succeeded stay on
/// chain, and the identifiers gathered so far are dropped with the error.
pub struct Orchestrator<'a, C> {
    client: &'a C,
    loader: &'a ArtifactLoader,
    network: Network,
    owner: Felt,
}

impl<'a, C: NetworkClient> Orchestrator<'a, C> {
    pub fn new(client: &'a C, loader: &'a ArtifactLoader, network: Network, owner: Felt) -> Self {
        Self {
            client,
            loader,
            network,
            owner,
        }
    }

    /// Run the sequence and return the complete manifest.
    pub async fn run(&self, graph: &DeploymentGraph) -> Result<DeploymentManifest, DeployError> {
        // Every artifact must be present and valid before the first submission.
        let artifacts = graph
            .contracts()
            .iter()
            .map(|spec| self.loader.load(&spec.name))
            .collect::<Result<Vec<_>, _>>()?;
        for artifact in &artifacts {
            self.client.check_artifact(artifact)?;
        }

        section("Declaring Contracts");

        let mut classes: HashMap<String, ClassRecord> = HashMap::new();
        for artifact in &artifacts {
            let class = declare_contract(self.client, artifact).await?;
            classes.insert(artifact.name.clone(), class);
        }

        section("Deploying Contracts");

        let mut instances: HashMap<String, InstanceRecord> = HashMap::new();
        for spec in graph.deploy_order() {
            let class = classes.get(&spec.name).copied().ok_or_else(|| {
                DeployError::IncompleteManifest(format!("class hash of {}", spec.name))
            })?;
            let calldata = spec.calldata(&instances)?;

            let instance = deploy_contract(self.client, &spec.name, class, &calldata).await?;
            instances.insert(spec.name.clone(), instance);
        }

        DeploymentManifest::assemble(
            self.network,
            self.owner,
            Utc::now(),
            graph.contracts(),
            &classes,
            &instances,
        )
    }
}

pub(crate) fn section(title: &str) {
    tracing::info!("========================================");
    tracing::info!("   {}", title);
    tracing::info!("========================================");
}
