//! Error types for the deployment pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort a deployment run.
///
/// Every variant is fatal. The "class already declared" condition is not part of
/// this taxonomy: the network client reports it as
/// [`DeclareOutcome::AlreadyKnown`](crate::DeclareOutcome::AlreadyKnown) and the
/// declare step recovers from it in place.
#[derive(Error, Debug)]
pub enum DeployError {
    /// Missing credential, missing address or unrecognized network selector.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A build output is absent.
    #[error("Artifact not found: {}\nRun 'scarb build' first.", path.display())]
    ArtifactMissing { path: PathBuf },

    /// A build output exists but is not valid JSON, or not a valid class.
    #[error("Invalid artifact {}: {source}", path.display())]
    InvalidArtifact {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The external build step failed.
    #[error("Build failed: {0}")]
    Build(String),

    /// Any declare, deploy, confirmation or account state failure.
    #[error("Network failure: {0}")]
    Network(String),

    /// The contract set cannot be ordered for deployment.
    #[error("Invalid contract dependency graph: {0}")]
    DependencyGraph(String),

    /// A manifest was assembled before every contract had a class hash and an address.
    #[error("Deployment manifest is incomplete: missing {0}")]
    IncompleteManifest(String),

    /// The on-chain work succeeded but the manifest could not be written.
    #[error("Failed to persist deployment manifest to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
