//! The deployment manifest written at the end of a successful run.

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use starknet::core::types::Felt;

use crate::{ClassRecord, ContractSpec, DeployError, InstanceRecord, Network};

/// Class hash and address of one deployed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedContract {
    pub class_hash: Felt,
    pub address: Felt,
}

/// Identifiers of every contract deployed by a run.
///
/// `contracts` is keyed by contract name, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentManifest {
    pub network: Network,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub timestamp: String,
    pub owner: Felt,
    pub contracts: IndexMap<String, DeployedContract>,
}

impl DeploymentManifest {
    /// Assemble the manifest of a run.
    ///
    /// Every contract of `contracts` must have both a class record and an
    /// instance record, otherwise [`DeployError::IncompleteManifest`] is returned.
    pub fn assemble(
        network: Network,
        owner: Felt,
        created_at: DateTime<Utc>,
        contracts: &[ContractSpec],
        classes: &HashMap<String, ClassRecord>,
        instances: &HashMap<String, InstanceRecord>,
    ) -> Result<Self, DeployError> {
        let contracts = contracts
            .iter()
            .map(|spec| {
                let class = classes.get(&spec.name).ok_or_else(|| {
                    DeployError::IncompleteManifest(format!("class hash of {}", spec.name))
                })?;
                let instance = instances.get(&spec.name).ok_or_else(|| {
                    DeployError::IncompleteManifest(format!("address of {}", spec.name))
                })?;

                Ok((
                    spec.name.clone(),
                    DeployedContract {
                        class_hash: class.class_hash,
                        address: instance.address,
                    },
                ))
            })
            .collect::<Result<IndexMap<_, _>, DeployError>>()?;

        Ok(Self {
            network,
            timestamp: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            owner,
            contracts,
        })
    }

    /// The timestamp with `:` and `.` replaced, usable in a file name.
    pub fn file_stamp(&self) -> String {
        self.timestamp.replace([':', '.'], "-")
    }

    /// Pretty-printed JSON representation.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a persisted manifest.
    pub fn load_from_file(path: &Path) -> Result<Self, DeployError> {
        let content = std::fs::read_to_string(path).map_err(|source| DeployError::Persistence {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|e| DeployError::Persistence {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }
}
