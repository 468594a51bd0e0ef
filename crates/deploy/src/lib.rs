//! starkup-deploy - Deployment library for Starknet contract sets.
//!
//! This crate declares and deploys a fixed set of interdependent Cairo contracts,
//! wiring each constructor with the addresses of the contracts deployed before
//! it, and records the resulting class hashes and addresses in a manifest.

mod artifacts;
mod build_step;
mod client;
mod config;
pub mod contracts;
mod deployer;
mod error;
pub mod gate;
mod graph;
mod manifest;
mod network;
mod orchestrator;
mod recorder;
mod rpc;
mod steps;

pub use artifacts::{ArtifactLoader, CompiledArtifact};
pub use build_step::run_build;
pub use client::{DeclareOutcome, Instantiation, NetworkClient, is_already_declared};
pub use config::{
    CONFIG_FILENAME, ConfigOverrides, DeployConfig, DeploySettings, Secret, SigningSecret,
};
pub use deployer::{DeployOutcome, Deployer};
pub use error::DeployError;
pub use gate::GateDecision;
pub use graph::{ConstructorArg, ContractSpec, DeploymentGraph};
pub use manifest::{DeployedContract, DeploymentManifest};
pub use network::{MAINNET_RPC_URL, Network, SEPOLIA_RPC_URL};
pub use orchestrator::Orchestrator;
pub use recorder::{ManifestRecorder, PersistedManifest};
pub use rpc::StarknetClient;
pub use steps::{ClassRecord, InstanceRecord, declare_contract, deploy_contract};

/// Re-exported so callers can build constructor arguments without depending on `starknet`.
pub use starknet::core::types::Felt;
