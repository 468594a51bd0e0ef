//! The interface the orchestrator needs from a ledger network.

use std::future::Future;

use starknet::core::types::Felt;

use crate::{CompiledArtifact, DeployError};

/// Messages the sequencer uses when a class is declared twice.
const ALREADY_DECLARED_PATTERNS: [&str; 2] =
    ["already declared", "StarknetErrorCode.CLASS_ALREADY_DECLARED"];

/// Whether a failure message means "this class is already known to the network".
pub fn is_already_declared(message: &str) -> bool {
    ALREADY_DECLARED_PATTERNS
        .iter()
        .any(|pattern| message.contains(pattern))
}

/// Outcome of a class declaration submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclareOutcome {
    /// The declaration was accepted; `tx_hash` still has to be confirmed.
    Declared { tx_hash: Felt, class_hash: Felt },
    /// The network already knows this class.
    AlreadyKnown,
}

/// An accepted contract instantiation, not yet confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instantiation {
    pub tx_hash: Felt,
    pub address: Felt,
}

/// Primitives of a remote ledger.
///
/// Implementations own the account nonce; callers keep at most one submission
/// outstanding. Any failure other than [`DeclareOutcome::AlreadyKnown`] is a
/// [`DeployError::Network`].
pub trait NetworkClient: Send + Sync {
    /// Check that `artifact` holds a class this network can accept.
    ///
    /// Called for every contract before the first submission, so a malformed
    /// artifact never leaves a run half declared.
    fn check_artifact(&self, artifact: &CompiledArtifact) -> Result<(), DeployError>;

    /// Submit a class declaration.
    fn declare(
        &self,
        artifact: &CompiledArtifact,
    ) -> impl Future<Output = Result<DeclareOutcome, DeployError>> + Send;

    /// Submit an instantiation of `class_hash`.
    fn instantiate(
        &self,
        class_hash: Felt,
        constructor_args: &[Felt],
    ) -> impl Future<Output = Result<Instantiation, DeployError>> + Send;

    /// Block until `tx_hash` reaches finality. A reverted transaction is an error.
    fn await_confirmation(&self, tx_hash: Felt)
    -> impl Future<Output = Result<(), DeployError>> + Send;

    /// Read the account nonce.
    fn nonce(&self) -> impl Future<Output = Result<Felt, DeployError>> + Send;

    /// Compute the class hash of `artifact` with the network's hashing rule.
    fn class_hash(&self, artifact: &CompiledArtifact) -> Result<Felt, DeployError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizes_both_already_declared_patterns() {
        assert!(is_already_declared("Class with hash 0x12 is already declared."));
        assert!(is_already_declared(
            "Error: StarknetErrorCode.CLASS_ALREADY_DECLARED: 0x12"
        ));
        assert!(!is_already_declared("Insufficient max fee"));
        assert!(!is_already_declared("ALREADY DECLARED"));
    }
}
