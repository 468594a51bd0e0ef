//! Startup configuration.
//!
//! The configuration is read once at startup from, in increasing priority:
//! built-in defaults, an optional `Starkup.toml`, the environment and the
//! command line. [`DeployConfig::validate`] turns the raw values into typed
//! [`DeploySettings`] before anything touches the network.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    value::{Uncased, UncasedStr},
};
use serde::{Deserialize, Serialize};
use starknet::core::types::Felt;
use url::Url;

use crate::{DeployError, Network};

/// The default name for the starkup configuration file.
pub const CONFIG_FILENAME: &str = "Starkup.toml";

/// Raw deployment configuration, as layered by figment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Network selector (`sepolia`, `testnet` or `mainnet`).
    pub network: String,
    /// Signing key of the deploying account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<Secret>,
    /// Address of the deploying account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_address: Option<String>,
    /// Owner passed to the contract constructors. Defaults to the account address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_address: Option<String>,
    /// Overrides the network's public RPC endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    /// Directory holding the compiled contract classes.
    pub artifacts_dir: PathBuf,
    /// Package prefix of the artifact file names.
    pub package: String,
    /// Directory receiving the deployment manifests.
    pub deployments_dir: PathBuf,
    /// Command producing the artifacts.
    pub build_command: Vec<String>,
    /// Skip the build command and use the artifacts already on disk.
    pub skip_build: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            network: Network::Sepolia.to_string(),
            private_key: None,
            account_address: None,
            owner_address: None,
            rpc_url: None,
            artifacts_dir: PathBuf::from("target/dev"),
            package: "cngn".to_string(),
            deployments_dir: PathBuf::from("deployments"),
            build_command: vec!["scarb".to_string(), "build".to_string()],
            skip_build: false,
        }
    }
}

/// Command line values layered on top of every other source.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployments_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_build: Option<bool>,
}

/// Maps the environment variables understood by starkup to config fields.
fn env_field(key: &UncasedStr) -> Option<Uncased<'_>> {
    let field = match key.as_str().to_ascii_uppercase().as_str() {
        "STARKNET_NETWORK" => "network",
        "STARKNET_PRIVATE_KEY" => "private_key",
        "STARKNET_ACCOUNT_ADDRESS" => "account_address",
        "CONTRACT_OWNER_ADDRESS" => "owner_address",
        "STARKNET_RPC_URL" => "rpc_url",
        _ => return None,
    };
    Some(field.into())
}

impl DeployConfig {
    /// Build the layered figment without command line overrides.
    ///
    /// An explicit `config_path` must exist. Without one, `Starkup.toml` in the
    /// working directory is used when present.
    pub fn figment(config_path: Option<&Path>) -> Result<Figment, DeployError> {
        let toml = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(DeployError::Configuration(format!(
                        "Configuration file not found: {}",
                        path.display()
                    )));
                }
                Toml::file_exact(path)
            }
            None => Toml::file(CONFIG_FILENAME),
        };

        Ok(Figment::from(Serialized::defaults(DeployConfig::default()))
            .merge(toml)
            // `NETWORK` is the legacy selector, `STARKNET_NETWORK` wins over it.
            .merge(Env::raw().only(&["NETWORK"]).map(|_| "network".into()))
            .merge(Env::raw().filter_map(env_field)))
    }

    /// Load the configuration from every source.
    pub fn load(
        config_path: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<Self, DeployError> {
        let config: Self = Self::figment(config_path)?
            .merge(Serialized::defaults(overrides))
            .extract()
            .map_err(|e| DeployError::Configuration(e.to_string()))?;

        tracing::debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Check the configuration and convert it into typed settings.
    pub fn validate(&self) -> Result<DeploySettings, DeployError> {
        let (Some(private_key), Some(account_address)) =
            (self.private_key.as_ref(), self.account_address.as_deref())
        else {
            return Err(DeployError::Configuration(
                "Missing STARKNET_PRIVATE_KEY or STARKNET_ACCOUNT_ADDRESS. \
                 Please set these in your .env file"
                    .to_string(),
            ));
        };

        let network = Network::from_str(&self.network).map_err(|_| {
            DeployError::Configuration(format!(
                "Invalid network '{}'. Use 'sepolia' or 'mainnet'",
                self.network
            ))
        })?;

        let rpc_url = self
            .rpc_url
            .as_deref()
            .unwrap_or(network.default_rpc_url());
        let rpc_url = Url::parse(rpc_url).map_err(|e| {
            DeployError::Configuration(format!("Invalid RPC URL '{}': {}", rpc_url, e))
        })?;

        let account_address = parse_felt("account address", account_address)?;
        let owner = match self.owner_address.as_deref() {
            Some(owner) => parse_felt("owner address", owner)?,
            None => account_address,
        };

        if self.build_command.is_empty() && !self.skip_build {
            return Err(DeployError::Configuration(
                "The build command is empty".to_string(),
            ));
        }

        let private_key = Felt::from_hex(private_key.expose().trim()).map_err(|_| {
            DeployError::Configuration("Invalid private key: not a hex field element".to_string())
        })?;

        Ok(DeploySettings {
            network,
            rpc_url,
            private_key: SigningSecret(private_key),
            account_address,
            owner,
            artifacts_dir: self.artifacts_dir.clone(),
            package: self.package.clone(),
            deployments_dir: self.deployments_dir.clone(),
            build_command: (!self.skip_build).then(|| self.build_command.clone()),
        })
    }
}

fn parse_felt(what: &str, value: &str) -> Result<Felt, DeployError> {
    Felt::from_hex(value.trim()).map_err(|_| {
        DeployError::Configuration(format!(
            "Invalid {}: '{}' is not a hex field element",
            what, value
        ))
    })
}

/// A credential read from configuration. Never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// The parsed signing key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SigningSecret(Felt);

impl SigningSecret {
    pub fn scalar(&self) -> Felt {
        self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(***)")
    }
}

/// Validated, immutable settings for one run.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    pub network: Network,
    pub rpc_url: Url,
    pub private_key: SigningSecret,
    pub account_address: Felt,
    pub owner: Felt,
    pub artifacts_dir: PathBuf,
    pub package: String,
    pub deployments_dir: PathBuf,
    /// `None` when the build step is skipped.
    pub build_command: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn complete_config() -> DeployConfig {
        DeployConfig {
            private_key: Some(Secret::new("0x1234")),
            account_address: Some("0xabc".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_owner_defaults_to_account_address() {
        let settings = complete_config().validate().unwrap();

        assert_eq!(settings.network, Network::Sepolia);
        assert_eq!(settings.owner, Felt::from_hex_unchecked("0xabc"));
        assert_eq!(settings.rpc_url.as_str(), crate::network::SEPOLIA_RPC_URL);
        assert_eq!(
            settings.build_command,
            Some(vec!["scarb".to_string(), "build".to_string()])
        );
    }

    #[test]
    fn test_distinct_owner_and_rpc_override() {
        let config = DeployConfig {
            owner_address: Some("0xdef".to_string()),
            rpc_url: Some("http://127.0.0.1:5050/".to_string()),
            network: "mainnet".to_string(),
            skip_build: true,
            ..complete_config()
        };
        let settings = config.validate().unwrap();

        assert_eq!(settings.network, Network::Mainnet);
        assert_eq!(settings.owner, Felt::from_hex_unchecked("0xdef"));
        assert_eq!(settings.rpc_url.as_str(), "http://127.0.0.1:5050/");
        assert_eq!(settings.build_command, None);
    }

    #[test]
    fn test_missing_credential_is_configuration_error() {
        let config = DeployConfig {
            private_key: None,
            ..complete_config()
        };
        assert!(matches!(
            config.validate(),
            Err(DeployError::Configuration(_))
        ));

        let config = DeployConfig {
            account_address: None,
            ..complete_config()
        };
        assert!(matches!(
            config.validate(),
            Err(DeployError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_network_is_configuration_error() {
        let config = DeployConfig {
            network: "goerli".to_string(),
            ..complete_config()
        };
        let err = config.validate().unwrap_err();

        assert!(matches!(err, DeployError::Configuration(_)));
        assert!(err.to_string().contains("goerli"));
    }

    #[test]
    fn test_malformed_address_is_configuration_error() {
        let config = DeployConfig {
            account_address: Some("not-hex".to_string()),
            ..complete_config()
        };
        assert!(matches!(
            config.validate(),
            Err(DeployError::Configuration(_))
        ));
    }

    #[test]
    fn test_secret_is_redacted() {
        let config = complete_config();
        let printed = format!("{:?} {:?}", config, config.validate().unwrap());

        assert!(!printed.contains("0x1234"));
    }

    #[test]
    fn test_load_from_file_with_overrides() {
        let temp_dir = TempDir::new("starkup-test").expect("Failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "network = \"mainnet\"\npackage = \"token\"\nartifacts_dir = \"out\"\n",
        )
        .expect("Failed to write config");

        let overrides = ConfigOverrides {
            artifacts_dir: Some(PathBuf::from("build/dev")),
            skip_build: Some(true),
            ..Default::default()
        };
        let config = DeployConfig::load(Some(&path), overrides).unwrap();

        assert_eq!(config.package, "token");
        assert_eq!(config.artifacts_dir, PathBuf::from("build/dev"));
        assert!(config.skip_build);
        assert_eq!(config.deployments_dir, PathBuf::from("deployments"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp_dir = TempDir::new("starkup-test").expect("Failed to create temp dir");
        let path = temp_dir.path().join("nonexistent.toml");

        assert!(matches!(
            DeployConfig::load(Some(&path), ConfigOverrides::default()),
            Err(DeployError::Configuration(_))
        ));
    }
}
