//! The two publish steps of a contract: declare its class, then instantiate it.

use starknet::core::types::Felt;

use crate::{CompiledArtifact, DeclareOutcome, DeployError, NetworkClient};

/// A declared contract class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassRecord {
    pub class_hash: Felt,
}

/// A deployed contract instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceRecord {
    pub address: Felt,
}

/// Declare the class of `artifact` and wait for finality.
///
/// Declaring a class the network already knows is not an error: the class hash
/// is recomputed locally from the artifact, so re-running after a partial
/// failure does not upload unchanged code again.
pub async fn declare_contract<C: NetworkClient>(
    client: &C,
    artifact: &CompiledArtifact,
) -> Result<ClassRecord, DeployError> {
    tracing::info!(contract = %artifact.name, "Declaring {}...", artifact.name);

    let class_hash = match client.declare(artifact).await? {
        DeclareOutcome::Declared {
            tx_hash,
            class_hash,
        } => {
            tracing::info!(tx_hash = %format!("{:#x}", tx_hash), "  Transaction hash");
            tracing::info!("  Waiting for confirmation...");
            client.await_confirmation(tx_hash).await?;

            tracing::info!(class_hash = %format!("{:#x}", class_hash), "  Class declared");
            class_hash
        }
        DeclareOutcome::AlreadyKnown => {
            let class_hash = client.class_hash(artifact)?;
            tracing::info!(class_hash = %format!("{:#x}", class_hash), "  Already declared");
            class_hash
        }
    };

    Ok(ClassRecord { class_hash })
}

/// Instantiate `class` with `constructor_args` and wait for finality.
///
/// Instantiation is not idempotent, so every failure is returned unchanged.
pub async fn deploy_contract<C: NetworkClient>(
    client: &C,
    name: &str,
    class: ClassRecord,
    constructor_args: &[Felt],
) -> Result<InstanceRecord, DeployError> {
    tracing::info!(
        contract = name,
        class_hash = %format!("{:#x}", class.class_hash),
        args = constructor_args.len(),
        "Deploying {}...",
        name
    );

    let instantiation = client
        .instantiate(class.class_hash, constructor_args)
        .await?;

    tracing::info!(tx_hash = %format!("{:#x}", instantiation.tx_hash), "  Transaction hash");
    tracing::info!("  Waiting for confirmation...");
    client.await_confirmation(instantiation.tx_hash).await?;

    tracing::info!(address = %format!("{:#x}", instantiation.address), "  Contract deployed");

    Ok(InstanceRecord {
        address: instantiation.address,
    })
}
