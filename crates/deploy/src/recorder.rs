//! Persisting deployment manifests.
//!
//! Every run writes two files with the same content into the deployments
//! directory: `<network>_<timestamp>.json`, which is never overwritten, and
//! `<network>_latest.json`, which always points at the most recent run.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use crate::{DeployError, DeploymentManifest, Network};

/// Where a manifest was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedManifest {
    pub snapshot: PathBuf,
    pub latest: PathBuf,
}

/// Writes manifests into a deployments directory.
#[derive(Debug, Clone)]
pub struct ManifestRecorder {
    dir: PathBuf,
}

impl ManifestRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn snapshot_path(&self, manifest: &DeploymentManifest) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", manifest.network, manifest.file_stamp()))
    }

    pub fn latest_path(&self, network: Network) -> PathBuf {
        self.dir.join(format!("{}_latest.json", network))
    }

    /// Write the timestamped snapshot, then replace the latest pointer.
    pub fn persist(&self, manifest: &DeploymentManifest) -> Result<PersistedManifest, DeployError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| DeployError::Persistence {
            path: self.dir.clone(),
            source,
        })?;

        let snapshot = self.snapshot_path(manifest);
        let json = manifest.to_json().map_err(|e| DeployError::Persistence {
            path: snapshot.clone(),
            source: std::io::Error::other(e),
        })?;

        write_new(&snapshot, &json)?;
        tracing::debug!(path = %snapshot.display(), "Deployment snapshot written");

        let latest = self.latest_path(manifest.network);
        replace(&latest, &json)?;
        tracing::debug!(path = %latest.display(), "Latest deployment updated");

        Ok(PersistedManifest { snapshot, latest })
    }
}

fn write_new(path: &Path, content: &str) -> Result<(), DeployError> {
    let persistence = |source| DeployError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(persistence)?;
    file.write_all(content.as_bytes()).map_err(persistence)?;
    file.sync_all().map_err(persistence)
}

/// Replace `path` through a temporary sibling so readers never see a partial file.
fn replace(path: &Path, content: &str) -> Result<(), DeployError> {
    let persistence = |source| DeployError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, content).map_err(persistence)?;
    std::fs::rename(&tmp, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        persistence(source)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use starknet::core::types::Felt;
    use tempdir::TempDir;

    use crate::DeployedContract;

    fn manifest(timestamp: &str) -> DeploymentManifest {
        DeploymentManifest {
            network: Network::Sepolia,
            timestamp: timestamp.to_string(),
            owner: Felt::from(0xe1u32),
            contracts: IndexMap::from([(
                "A".to_string(),
                DeployedContract {
                    class_hash: Felt::from(0xc1u32),
                    address: Felt::from(0xa1u32),
                },
            )]),
        }
    }

    #[test]
    fn test_persist_writes_snapshot_and_latest() {
        let temp_dir = TempDir::new("starkup-test").expect("Failed to create temp dir");
        let recorder = ManifestRecorder::new(temp_dir.path().join("deployments"));
        let manifest = manifest("2026-10-19T08:48:05.123Z");

        let persisted = recorder.persist(&manifest).unwrap();

        assert_eq!(
            persisted.snapshot,
            temp_dir
                .path()
                .join("deployments/sepolia_2026-10-19T08-48-05-123Z.json")
        );
        assert_eq!(
            persisted.latest,
            temp_dir.path().join("deployments/sepolia_latest.json")
        );

        let snapshot = std::fs::read_to_string(&persisted.snapshot).unwrap();
        let latest = std::fs::read_to_string(&persisted.latest).unwrap();
        assert_eq!(snapshot, latest);
        assert_eq!(
            DeploymentManifest::load_from_file(&persisted.latest).unwrap(),
            manifest
        );
    }

    #[test]
    fn test_latest_is_overwritten_snapshots_are_kept() {
        let temp_dir = TempDir::new("starkup-test").expect("Failed to create temp dir");
        let recorder = ManifestRecorder::new(temp_dir.path());

        let first = recorder.persist(&manifest("2026-10-19T08:48:05.123Z")).unwrap();
        let second_manifest = manifest("2026-10-19T09:00:00.000Z");
        let second = recorder.persist(&second_manifest).unwrap();

        assert!(first.snapshot.exists());
        assert!(second.snapshot.exists());
        assert_eq!(first.latest, second.latest);
        assert_eq!(
            DeploymentManifest::load_from_file(&second.latest).unwrap(),
            second_manifest
        );
        assert!(!temp_dir.path().join("sepolia_latest.json.tmp").exists());
    }

    #[test]
    fn test_existing_snapshot_is_never_overwritten() {
        let temp_dir = TempDir::new("starkup-test").expect("Failed to create temp dir");
        let recorder = ManifestRecorder::new(temp_dir.path());
        let manifest = manifest("2026-10-19T08:48:05.123Z");
        std::fs::write(recorder.snapshot_path(&manifest), "previous").unwrap();

        let result = recorder.persist(&manifest);

        assert!(matches!(result, Err(DeployError::Persistence { .. })));
        assert_eq!(
            std::fs::read_to_string(recorder.snapshot_path(&manifest)).unwrap(),
            "previous"
        );
        assert!(!recorder.latest_path(Network::Sepolia).exists());
    }

    #[test]
    fn test_failed_latest_replace_leaves_no_temp_file() {
        let temp_dir = TempDir::new("starkup-test").expect("Failed to create temp dir");
        let recorder = ManifestRecorder::new(temp_dir.path());
        // A non-empty directory where the latest file should go.
        let latest = recorder.latest_path(Network::Sepolia);
        std::fs::create_dir_all(latest.join("occupied")).unwrap();

        let result = recorder.persist(&manifest("2026-10-19T08:48:05.123Z"));

        assert!(matches!(result, Err(DeployError::Persistence { .. })));
        assert!(latest.is_dir());
        assert!(!temp_dir.path().join("sepolia_latest.json.tmp").exists());
    }

    #[test]
    fn test_unwritable_directory_is_persistence_error() {
        let temp_dir = TempDir::new("starkup-test").expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("deployments");
        std::fs::write(&blocker, "not a directory").unwrap();

        let recorder = ManifestRecorder::new(&blocker);
        let result = recorder.persist(&manifest("2026-10-19T08:48:05.123Z"));

        assert!(matches!(result, Err(DeployError::Persistence { .. })));
    }
}
