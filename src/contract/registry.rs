use anyhow::{anyhow, Result};
use std::collections::HashMap;
use tracing::{debug, info};

use super::{abi, utils, ContractDescriptor};
use crate::config::{Config, DeploymentConfig};

/// Per-network contract descriptors built from configuration
#[derive(Debug)]
pub struct DescriptorRegistry {
    descriptors: HashMap<String, ContractDescriptor>,
    default_network: String,
}

impl DescriptorRegistry {
    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut descriptors = HashMap::new();

        for (network_name, deployment) in &config.deployments {
            let descriptor = Self::create_descriptor(network_name, deployment)
                .await
                .map_err(|e| anyhow!("Deployment '{}' is invalid: {}", network_name, e))?;
            descriptors.insert(network_name.clone(), descriptor);
        }

        if !descriptors.contains_key(&config.default_network) {
            let mut available: Vec<String> = descriptors.keys().cloned().collect();
            available.sort();
            return Err(anyhow!(
                "Default network '{}' has no deployment. Available networks: {}",
                config.default_network,
                available.join(", ")
            ));
        }

        info!(
            "Loaded {} deployment(s), default network: {}",
            descriptors.len(),
            config.default_network
        );

        Ok(Self {
            descriptors,
            default_network: config.default_network.clone(),
        })
    }

    async fn create_descriptor(
        network_name: &str,
        deployment: &DeploymentConfig,
    ) -> Result<ContractDescriptor> {
        let abi = match &deployment.abi_path {
            Some(path) => abi::load_abi_file(path).await?,
            None => abi::fund_me_abi().clone(),
        };

        let descriptor = ContractDescriptor {
            network: network_name.to_string(),
            chain_id: deployment.chain_id,
            address: deployment.address.clone(),
            explorer_url: deployment.explorer_url.clone(),
            abi,
        };
        descriptor.parsed_address()?;

        Ok(descriptor)
    }

    pub fn get(&self, network: Option<&str>) -> Result<&ContractDescriptor> {
        let network_name = network.unwrap_or(&self.default_network);
        debug!("Looking up descriptor for network {}", network_name);

        utils::validate_network(network_name, &self.available_networks())?;
        self.descriptors
            .get(network_name)
            .ok_or_else(|| anyhow!("Network '{}' not found", network_name))
    }

    pub fn default_network(&self) -> &str {
        &self.default_network
    }

    pub fn available_networks(&self) -> Vec<String> {
        let mut networks: Vec<String> = self.descriptors.keys().cloned().collect();
        networks.sort();
        networks
    }

    /// Register a deployment that is not part of the configuration
    pub fn add_descriptor(&mut self, descriptor: ContractDescriptor) {
        info!(
            "Added descriptor for {} on {}",
            descriptor.address, descriptor.network
        );
        self.descriptors.insert(descriptor.network.clone(), descriptor);
    }
}
