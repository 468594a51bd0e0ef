//! Starknet JSON-RPC implementation of [`NetworkClient`].

use std::{path::Path, sync::Arc, time::Duration};

use backon::{ConstantBuilder, Retryable};
use rand::Rng;
use serde::de::DeserializeOwned;
use starknet::{
    accounts::{Account, AccountError, ConnectedAccount, ExecutionEncoding, SingleOwnerAccount},
    contract::ContractFactory,
    core::types::{
        ExecutionResult, Felt, FlattenedSierraClass, StarknetError,
        contract::{CompiledClass, SierraClass},
    },
    providers::{
        Provider, ProviderError,
        jsonrpc::{HttpTransport, JsonRpcClient},
    },
    signers::{LocalWallet, SigningKey},
};

use crate::{
    CompiledArtifact, DeclareOutcome, DeployError, DeploySettings, Instantiation, NetworkClient,
    client::is_already_declared,
};

/// Interval between two receipt polls.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Number of receipt polls before giving up on a transaction (10 minutes).
const RECEIPT_MAX_POLLS: usize = 120;

type RpcAccount = SingleOwnerAccount<JsonRpcClient<HttpTransport>, LocalWallet>;

/// A single-owner Starknet account connected to a JSON-RPC endpoint.
pub struct StarknetClient {
    account: RpcAccount,
}

impl StarknetClient {
    /// Connect to the configured endpoint and bind the signing account.
    pub async fn connect(settings: &DeploySettings) -> Result<Self, DeployError> {
        let provider = JsonRpcClient::new(HttpTransport::new(settings.rpc_url.clone()));

        let chain_id = provider.chain_id().await.map_err(|e| {
            DeployError::Network(format!(
                "Failed to fetch chain id from {}: {}",
                settings.rpc_url, e
            ))
        })?;

        tracing::debug!(chain_id = %format!("{:#x}", chain_id), "Connected to Starknet RPC");

        let signer = LocalWallet::from(SigningKey::from_secret_scalar(
            settings.private_key.scalar(),
        ));
        let account = SingleOwnerAccount::new(
            provider,
            signer,
            settings.account_address,
            chain_id,
            ExecutionEncoding::New,
        );

        Ok(Self { account })
    }
}

fn invalid_artifact(path: &Path, err: impl std::fmt::Display) -> DeployError {
    DeployError::InvalidArtifact {
        path: path.to_path_buf(),
        source: err.to_string().into(),
    }
}

fn parse_class<T: DeserializeOwned>(
    value: &serde_json::Value,
    path: &Path,
) -> Result<T, DeployError> {
    T::deserialize(value).map_err(|source| DeployError::InvalidArtifact {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

/// A class in the shape `declare_v3` submits.
struct PreparedClass {
    flattened: FlattenedSierraClass,
    compiled_class_hash: Felt,
}

fn prepare_class(artifact: &CompiledArtifact) -> Result<PreparedClass, DeployError> {
    let sierra: SierraClass = parse_class(&artifact.class, &artifact.class_path)?;
    let casm: CompiledClass = parse_class(&artifact.compiled, &artifact.compiled_path)?;

    let compiled_class_hash = casm
        .class_hash()
        .map_err(|e| invalid_artifact(&artifact.compiled_path, e))?;
    let flattened = sierra
        .flatten()
        .map_err(|e| invalid_artifact(&artifact.class_path, e))?;

    Ok(PreparedClass {
        flattened,
        compiled_class_hash,
    })
}

/// Whether a declaration failed because the network already knows the class.
fn is_class_already_declared<S>(err: &AccountError<S>) -> bool
where
    AccountError<S>: std::fmt::Display,
{
    match err {
        AccountError::Provider(ProviderError::StarknetError(error)) => match error {
            StarknetError::ClassAlreadyDeclared => true,
            // Fee estimation reports the sequencer rejection as a failed execution,
            // whose display is only the variant name.
            StarknetError::TransactionExecutionError(data) => {
                is_already_declared(&format!("{:?}", data.execution_error))
            }
            StarknetError::ValidationFailure(message) => is_already_declared(message),
            _ => false,
        },
        other => is_already_declared(&other.to_string()),
    }
}

impl NetworkClient for StarknetClient {
    fn check_artifact(&self, artifact: &CompiledArtifact) -> Result<(), DeployError> {
        prepare_class(artifact).map(|_| ())
    }

    async fn declare(&self, artifact: &CompiledArtifact) -> Result<DeclareOutcome, DeployError> {
        let prepared = prepare_class(artifact)?;

        let result = self
            .account
            .declare_v3(Arc::new(prepared.flattened), prepared.compiled_class_hash)
            .send()
            .await;

        match result {
            Ok(declared) => Ok(DeclareOutcome::Declared {
                tx_hash: declared.transaction_hash,
                class_hash: declared.class_hash,
            }),
            Err(err) if is_class_already_declared(&err) => Ok(DeclareOutcome::AlreadyKnown),
            Err(err) => Err(DeployError::Network(format!(
                "Failed to declare {}: {}",
                artifact.name, err
            ))),
        }
    }

    async fn instantiate(
        &self,
        class_hash: Felt,
        constructor_args: &[Felt],
    ) -> Result<Instantiation, DeployError> {
        let salt = Felt::from(rand::rng().random::<u128>());

        let factory = ContractFactory::new(class_hash, &self.account);
        let deployment = factory.deploy_v3(constructor_args.to_vec(), salt, true);
        let address = deployment.deployed_address();

        let result = deployment.send().await.map_err(|e| {
            DeployError::Network(format!(
                "Failed to deploy class {:#x}: {}",
                class_hash, e
            ))
        })?;

        Ok(Instantiation {
            tx_hash: result.transaction_hash,
            address,
        })
    }

    async fn await_confirmation(&self, tx_hash: Felt) -> Result<(), DeployError> {
        let provider = self.account.provider();

        let receipt = (|| async { provider.get_transaction_receipt(tx_hash).await })
            .retry(
                ConstantBuilder::default()
                    .with_delay(RECEIPT_POLL_INTERVAL)
                    .with_max_times(RECEIPT_MAX_POLLS),
            )
            .when(|e| {
                matches!(
                    e,
                    ProviderError::StarknetError(StarknetError::TransactionHashNotFound)
                )
            })
            .notify(|_, delay| {
                tracing::trace!(
                    tx_hash = %format!("{:#x}", tx_hash),
                    ?delay,
                    "Transaction not yet received, polling again..."
                );
            })
            .await
            .map_err(|e| {
                DeployError::Network(format!(
                    "Failed to confirm transaction {:#x}: {}",
                    tx_hash, e
                ))
            })?;

        match receipt.receipt.execution_result() {
            ExecutionResult::Succeeded => Ok(()),
            ExecutionResult::Reverted { reason } => Err(DeployError::Network(format!(
                "Transaction {:#x} reverted: {}",
                tx_hash, reason
            ))),
        }
    }

    async fn nonce(&self) -> Result<Felt, DeployError> {
        self.account.get_nonce().await.map_err(|e| {
            DeployError::Network(format!(
                "Could not read account nonce. Check your credentials: {}",
                e
            ))
        })
    }

    fn class_hash(&self, artifact: &CompiledArtifact) -> Result<Felt, DeployError> {
        let sierra: SierraClass = parse_class(&artifact.class, &artifact.class_path)?;
        sierra
            .class_hash()
            .map_err(|e| invalid_artifact(&artifact.class_path, e))
    }
}
