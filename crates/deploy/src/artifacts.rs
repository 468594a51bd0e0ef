//! Loading compiled contract classes from the build output directory.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::DeployError;

/// Suffix of the Sierra class file produced by `scarb build`.
const CLASS_SUFFIX: &str = "contract_class.json";
/// Suffix of the CASM file produced by `scarb build`.
const COMPILED_SUFFIX: &str = "compiled_contract_class.json";

/// The two build outputs of one contract.
///
/// Both representations are kept as parsed JSON; the network client decides how
/// to interpret them.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledArtifact {
    /// Logical contract name.
    pub name: String,
    /// The Sierra contract class.
    pub class: Value,
    /// The compiled (CASM) class.
    pub compiled: Value,
    /// Where `class` was read from.
    pub class_path: PathBuf,
    /// Where `compiled` was read from.
    pub compiled_path: PathBuf,
}

/// Resolves contract names to their build outputs.
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    dir: PathBuf,
    package: String,
}

impl ArtifactLoader {
    pub fn new(dir: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            package: package.into(),
        }
    }

    /// Path of the Sierra class file for `name`.
    pub fn class_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}.{}", self.package, name, CLASS_SUFFIX))
    }

    /// Path of the CASM file for `name`.
    pub fn compiled_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}.{}", self.package, name, COMPILED_SUFFIX))
    }

    /// Load both build outputs of `name`.
    pub fn load(&self, name: &str) -> Result<CompiledArtifact, DeployError> {
        let class_path = self.class_path(name);
        let compiled_path = self.compiled_path(name);
        let class = read_json(&class_path)?;
        let compiled = read_json(&compiled_path)?;

        tracing::debug!(
            contract = name,
            class_path = %class_path.display(),
            compiled_path = %compiled_path.display(),
            "Loaded contract artifacts"
        );

        Ok(CompiledArtifact {
            name: name.to_string(),
            class,
            compiled,
            class_path,
            compiled_path,
        })
    }
}

fn read_json(path: &Path) -> Result<Value, DeployError> {
    if !path.exists() {
        return Err(DeployError::ArtifactMissing {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read(path).map_err(|_| DeployError::ArtifactMissing {
        path: path.to_path_buf(),
    })?;

    serde_json::from_slice(&content).map_err(|source| DeployError::InvalidArtifact {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_artifact_paths_follow_naming_template() {
        let loader = ArtifactLoader::new("target/dev", "cngn");

        assert_eq!(
            loader.class_path("Forwarder"),
            PathBuf::from("target/dev/cngn_Forwarder.contract_class.json")
        );
        assert_eq!(
            loader.compiled_path("Forwarder"),
            PathBuf::from("target/dev/cngn_Forwarder.compiled_contract_class.json")
        );
    }

    #[test]
    fn test_load_both_outputs() {
        let temp_dir = TempDir::new("starkup-test").expect("Failed to create temp dir");
        let loader = ArtifactLoader::new(temp_dir.path(), "cngn");
        std::fs::write(loader.class_path("Cngn"), r#"{"sierra_program": []}"#).unwrap();
        std::fs::write(loader.compiled_path("Cngn"), r#"{"bytecode": []}"#).unwrap();

        let artifact = loader.load("Cngn").unwrap();

        assert_eq!(artifact.name, "Cngn");
        assert_eq!(artifact.class["sierra_program"], serde_json::json!([]));
        assert_eq!(artifact.compiled["bytecode"], serde_json::json!([]));
    }

    #[test]
    fn test_missing_compiled_output_reports_expected_path() {
        let temp_dir = TempDir::new("starkup-test").expect("Failed to create temp dir");
        let loader = ArtifactLoader::new(temp_dir.path(), "cngn");
        std::fs::write(loader.class_path("Cngn"), "{}").unwrap();

        match loader.load("Cngn") {
            Err(DeployError::ArtifactMissing { path }) => {
                assert_eq!(path, loader.compiled_path("Cngn"))
            }
            other => panic!("expected ArtifactMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupted_output_is_invalid_artifact() {
        let temp_dir = TempDir::new("starkup-test").expect("Failed to create temp dir");
        let loader = ArtifactLoader::new(temp_dir.path(), "cngn");
        std::fs::write(loader.class_path("Cngn"), "{ invalid json }").unwrap();
        std::fs::write(loader.compiled_path("Cngn"), "{}").unwrap();

        assert!(matches!(
            loader.load("Cngn"),
            Err(DeployError::InvalidArtifact { .. })
        ));
    }
}
