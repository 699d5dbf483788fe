use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::contract::{abi, ANVIL_CHAIN_ID, DEFAULT_NETWORK, ZKSYNC_LOCAL_CHAIN_ID};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub deployments: HashMap<String, DeploymentConfig>,
    #[serde(default = "default_network")]
    pub default_network: String,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_network() -> String {
    DEFAULT_NETWORK.to_string()
}

/// The only transport the server speaks
pub const STDIO_TRANSPORT: &str = "stdio";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub address: String,
    pub chain_id: u64,
    pub explorer_url: Option<String>,
    /// ABI JSON replacing the embedded Fund Me interface
    pub abi_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub transport: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: STDIO_TRANSPORT.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.transport != STDIO_TRANSPORT {
            return Err(anyhow!(
                "Unsupported transport '{}'. Only '{}' is available",
                self.transport,
                STDIO_TRANSPORT
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut deployments = HashMap::new();

        deployments.insert(
            DEFAULT_NETWORK.to_string(),
            DeploymentConfig {
                address: abi::FUND_ME_ADDRESS.to_string(),
                chain_id: ANVIL_CHAIN_ID,
                explorer_url: None,
                abi_path: None,
            },
        );

        deployments.insert(
            "anvil-legacy".to_string(),
            DeploymentConfig {
                address: abi::FUND_ME_LEGACY_ADDRESS.to_string(),
                chain_id: ANVIL_CHAIN_ID,
                explorer_url: None,
                abi_path: None,
            },
        );

        deployments.insert(
            "zksync".to_string(),
            DeploymentConfig {
                address: abi::FUND_ME_ZKSYNC_ADDRESS.to_string(),
                chain_id: ZKSYNC_LOCAL_CHAIN_ID,
                explorer_url: None,
                abi_path: None,
            },
        );

        Self {
            deployments,
            default_network: default_network(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {:?}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path, e))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    anyhow!("Failed to create config directory {:?}: {}", parent, e)
                })?;
            }
        }

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {:?}: {}", path, e))?;

        Ok(())
    }

    /// Load the given file, or the built-in deployments when none is given.
    /// An explicit file that cannot be read or parsed is an error.
    pub async fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let path = path.as_ref();
                let config = Self::load_from_file(path).await?;
                tracing::info!("Loaded configuration from {:?}", path);
                config
            }
            None => {
                tracing::debug!("No config file given, using built-in deployments");
                Self::default()
            }
        };

        config.server.validate()?;
        Ok(config)
    }

    /// Add or replace a deployment
    pub fn add_deployment(&mut self, name: String, deployment: DeploymentConfig) {
        self.deployments.insert(name, deployment);
    }

    /// Point the default network at `address`, keeping its other settings
    pub fn override_address(&mut self, address: &str) {
        match self.deployments.get_mut(&self.default_network) {
            Some(deployment) => {
                tracing::debug!(
                    "Overriding {} address {} with {}",
                    self.default_network,
                    deployment.address,
                    address
                );
                deployment.address = address.to_string();
            }
            None => {
                tracing::warn!(
                    "Default network {} has no deployment, address override ignored",
                    self.default_network
                );
            }
        }
    }

    /// Apply network and address overrides (command line or `FUND_ME_*`
    /// environment). The network is switched first so the address lands on
    /// the deployment that ends up as the default.
    pub fn apply_overrides(&mut self, network: Option<String>, address: Option<String>) {
        if let Some(network) = network {
            tracing::info!("Default network overridden: {}", network);
            self.default_network = network;
        }

        if let Some(address) = address {
            self.override_address(&address);
        }
    }

    /// Get default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("fund-me-descriptor").join("config.toml"))
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        format!(
            r#"# Fund Me descriptor configuration file
# Each deployment pairs a contract address with the network it lives on.

# Deployment served when no network is specified
default_network = "{default_network}"

[deployments.anvil]
address = "{active}"
chain_id = {anvil_chain_id}

[deployments.anvil-legacy]
address = "{legacy}"
chain_id = {anvil_chain_id}

[deployments.zksync]
address = "{zksync}"
chain_id = {zksync_chain_id}
# explorer_url = "https://explorer.zksync.io"

# A redeployed contract with a changed interface can ship its own ABI,
# either a bare JSON array or a forge/hardhat artifact with an "abi" field:
# [deployments.sepolia]
# address = "0x..."
# chain_id = 11155111
# abi_path = "out/FundMe.sol/FundMe.json"

# Server configuration (stdio is the only transport)
[server]
transport = "stdio"

# Environment variables that can be used:
# FUND_ME_NETWORK - Overrides default_network
# FUND_ME_ADDRESS - Overrides the address of the default deployment
"#,
            default_network = DEFAULT_NETWORK,
            active = abi::FUND_ME_ADDRESS,
            legacy = abi::FUND_ME_LEGACY_ADDRESS,
            zksync = abi::FUND_ME_ZKSYNC_ADDRESS,
            anvil_chain_id = ANVIL_CHAIN_ID,
            zksync_chain_id = ZKSYNC_LOCAL_CHAIN_ID,
        )
    }
}
