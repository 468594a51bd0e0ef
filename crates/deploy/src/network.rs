//! Target Starknet networks.

use serde::{Deserialize, Serialize};

// The `starknet` client speaks JSON-RPC v0.8; older endpoints return fee
// estimates it cannot decode.

/// Public JSON-RPC v0.8 endpoint for Starknet Sepolia.
pub const SEPOLIA_RPC_URL: &str = "https://starknet-sepolia.public.blastapi.io/rpc/v0_8";
/// Public JSON-RPC v0.8 endpoint for Starknet mainnet.
pub const MAINNET_RPC_URL: &str = "https://starknet-mainnet.public.blastapi.io/rpc/v0_8";

/// The network a deployment targets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Network {
    #[strum(to_string = "sepolia", serialize = "testnet")]
    Sepolia,
    #[strum(to_string = "mainnet")]
    Mainnet,
}

impl Network {
    /// Whether mutating operations against this network need operator consent.
    pub fn is_high_stakes(&self) -> bool {
        matches!(self, Network::Mainnet)
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Sepolia => SEPOLIA_RPC_URL,
            Network::Mainnet => MAINNET_RPC_URL,
        }
    }

    pub fn explorer_url(&self) -> &'static str {
        match self {
            Network::Sepolia => "https://sepolia.starkscan.co",
            Network::Mainnet => "https://starkscan.co",
        }
    }
}
