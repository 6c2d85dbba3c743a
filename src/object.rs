use std::fmt::{Debug, Display};

use chrono::{DateTime, SecondsFormat, Utc};
use starknet::core::types::{
    contract::{CompiledClass, SierraClass},
    Felt,
};
use url::Url;

use crate::error::DeployError;

pub const SEPOLIA_RPC_URL: &str = "https://starknet-sepolia.public.blastapi.io";
pub const MAINNET_RPC_URL: &str = "https://starknet-mainnet.public.blastapi.io";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Sepolia,
    Custom(Url),
}

impl Network {
    pub fn default_rpc_url(&self) -> Result<Url, DeployError> {
        let url = match self {
            Network::Mainnet => MAINNET_RPC_URL,
            Network::Sepolia => SEPOLIA_RPC_URL,
            Network::Custom(url) => return Ok(url.clone()),
        };
        url.parse().map_err(|e: url::ParseError| DeployError::ConfigInvalid {
            name: "RPC_URL",
            reason: e.to_string(),
        })
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Sepolia => write!(f, "sepolia"),
            Network::Custom(url) => write!(f, "{}", url),
        }
    }
}

impl TryFrom<String> for Network {
    type Error = DeployError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "sepolia" | "testnet" => Ok(Network::Sepolia),
            _ => value
                .parse()
                .map(Network::Custom)
                .map_err(|e: url::ParseError| DeployError::ConfigInvalid {
                    name: "STARKNET_NETWORK",
                    reason: e.to_string(),
                }),
        }
    }
}

/// Deployer account material, held in memory for the lifetime of the process
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub account_address: Felt,
    pub public_key: Felt,
    pub private_key: Felt,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account_address", &format_args!("{:#x}", self.account_address))
            .field("public_key", &format_args!("{:#x}", self.public_key))
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// The two compiled outputs of the Permit2 contract
#[derive(Debug, Clone)]
pub struct ContractArtifacts {
    pub sierra_class: SierraClass,
    pub casm_class: CompiledClass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    pub class_hash: String,
    pub deployed_address: String,
    pub transaction_hash: String,
    pub deployment_time: DateTime<Utc>,
}

impl DeploymentResult {
    pub fn rfc3339_time(&self) -> String {
        self.deployment_time
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRecord {
    pub network: String,
    pub date: String,
    pub deployer_address: String,
    pub deployment_tx_hash: String,
    pub class_hash: String,
    pub deployed_address: String,
    pub salt: String,
    pub already_declared: bool,
    // Not written by the deployer, add it by hand in the history file to leave notes for others
    #[serde(default)]
    pub comment: Option<String>,
}

impl DeploymentRecord {
    pub fn new(
        network: &Network,
        deployer_address: Felt,
        result: &DeploymentResult,
        salt: Felt,
        already_declared: bool,
    ) -> Self {
        Self {
            network: network.to_string(),
            date: result.rfc3339_time(),
            deployer_address: format!("{:#x}", deployer_address),
            deployment_tx_hash: result.transaction_hash.clone(),
            class_hash: result.class_hash.clone(),
            deployed_address: result.deployed_address.clone(),
            salt: format!("{:#x}", salt),
            already_declared,
            comment: None,
        }
    }
}
