use anyhow::Result;
use rmcp::{
    model::{ServerCapabilities, ServerInfo},
    tool,
    transport::stdio,
    ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use crate::contract::{codec, registry::DescriptorRegistry};

#[derive(Debug, Clone)]
pub struct DescriptorServer {
    registry: Arc<DescriptorRegistry>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct DescriptorRequest {
    network: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct EncodeCallRequest {
    function_name: String,
    parameters: Value,
    value: Option<String>,
    network: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct DecodeOutputRequest {
    function_name: String,
    data: String,
    network: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct DecodeRevertRequest {
    data: String,
    network: Option<String>,
}

#[derive(Debug, Serialize)]
struct DeploymentSummary<'a> {
    network: &'a str,
    chain_id: u64,
    address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    explorer_url: Option<&'a str>,
    default: bool,
}

impl DescriptorServer {
    pub fn new(registry: DescriptorRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub async fn run(&self) -> Result<()> {
        info!("Starting Fund Me descriptor server");

        let service = self.clone().serve(stdio()).await?;

        info!("Fund Me descriptor server started successfully");
        let reason = service.waiting().await?;
        info!("Fund Me descriptor server stopped: {:?}", reason);
        Ok(())
    }

    fn describe(&self, network: Option<&str>) -> Result<String> {
        let descriptor = self.registry.get(network)?;
        Ok(serde_json::to_string_pretty(descriptor)?)
    }

    fn deployments(&self) -> Result<String> {
        let summaries = self
            .registry
            .available_networks()
            .iter()
            .map(|network| self.registry.get(Some(network.as_str())))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .map(|descriptor| DeploymentSummary {
                network: &descriptor.network,
                chain_id: descriptor.chain_id,
                address: &descriptor.address,
                explorer_url: descriptor.explorer_url.as_deref(),
                default: descriptor.network == self.registry.default_network(),
            })
            .collect::<Vec<_>>();

        Ok(serde_json::to_string_pretty(&summaries)?)
    }

    fn encode(&self, request: &EncodeCallRequest) -> Result<String> {
        let descriptor = self.registry.get(request.network.as_deref())?;
        let call = codec::encode_call(
            descriptor,
            &request.function_name,
            &request.parameters,
            request.value.as_deref(),
        )?;
        Ok(serde_json::to_string_pretty(&call)?)
    }

    fn decode_output_json(&self, request: &DecodeOutputRequest) -> Result<String> {
        let descriptor = self.registry.get(request.network.as_deref())?;
        let value = codec::decode_output(descriptor, &request.function_name, &request.data)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn decode_revert_json(&self, request: &DecodeRevertRequest) -> Result<String> {
        let descriptor = self.registry.get(request.network.as_deref())?;
        let revert = codec::decode_revert(descriptor, &request.data)?;
        Ok(serde_json::to_string_pretty(&revert)?)
    }
}

fn respond(operation: &str, result: Result<String>) -> String {
    match result {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to {}: {}", operation, e);
            format!("Error: {}", e)
        }
    }
}

#[tool(tool_box)]
impl DescriptorServer {
    #[tool(description = "Get the address and ABI of the Fund Me contract for a network")]
    async fn get_descriptor(&self, #[tool(aggr)] request: DescriptorRequest) -> String {
        respond("get descriptor", self.describe(request.network.as_deref()))
    }

    #[tool(description = "List known Fund Me deployments and the default network")]
    async fn list_deployments(&self) -> String {
        respond("list deployments", self.deployments())
    }

    #[tool(description = "Encode calldata for a Fund Me function call")]
    async fn encode_call(&self, #[tool(aggr)] request: EncodeCallRequest) -> String {
        respond("encode call", self.encode(&request))
    }

    #[tool(description = "Decode the return data of a Fund Me function call")]
    async fn decode_output(&self, #[tool(aggr)] request: DecodeOutputRequest) -> String {
        respond("decode output", self.decode_output_json(&request))
    }

    #[tool(description = "Decode revert data into a Fund Me custom error")]
    async fn decode_revert(&self, #[tool(aggr)] request: DecodeRevertRequest) -> String {
        respond("decode revert", self.decode_revert_json(&request))
    }
}

#[tool(tool_box)]
impl ServerHandler for DescriptorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Serves the Fund Me contract address and ABI per network, and encodes calls / decodes results and custom errors against it. Transactions are not signed or sent.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;

    async fn server() -> DescriptorServer {
        let registry = DescriptorRegistry::from_config(&Config::default())
            .await
            .unwrap();
        DescriptorServer::new(registry)
    }

    #[tokio::test]
    async fn test_describe_default() {
        let body = server().await.describe(None).unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(value["address"], "0xd0896c97b14158109c1def74c6547a1b732f011f");
        assert_eq!(value["network"], "anvil");
    }

    #[tokio::test]
    async fn test_deployments_listing() {
        let body = server().await.deployments().unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();
        let entries = value.as_array().unwrap();

        assert_eq!(entries.len(), 3);
        let defaults: Vec<_> = entries.iter().filter(|e| e["default"] == true).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0]["network"], "anvil");
    }

    #[tokio::test]
    async fn test_deployments_listing_explorer_url() {
        let mut config = Config::default();
        if let Some(zksync) = config.deployments.get_mut("zksync") {
            zksync.explorer_url = Some("https://explorer.zksync.io".to_string());
        }
        let registry = DescriptorRegistry::from_config(&config).await.unwrap();

        let body = DescriptorServer::new(registry).deployments().unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();
        let entries = value.as_array().unwrap();

        let zksync = entries.iter().find(|e| e["network"] == "zksync").unwrap();
        assert_eq!(zksync["explorer_url"], "https://explorer.zksync.io");
        let anvil = entries.iter().find(|e| e["network"] == "anvil").unwrap();
        assert!(anvil.get("explorer_url").is_none());
    }

    #[tokio::test]
    async fn test_encode_through_server() {
        let server = server().await;
        let body = server
            .encode(&EncodeCallRequest {
                function_name: "withdraw".to_string(),
                parameters: json!([]),
                value: None,
                network: Some("zksync".to_string()),
            })
            .unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(value["to"], "0x4B5DF730c2e6b28E17013A1485E5d9BC41Efe021");
        assert_eq!(value["data"], "0x3ccfd60b");
    }

    #[test]
    fn test_respond_formats_errors() {
        let reply = respond("encode call", Err(anyhow::anyhow!("boom")));
        assert_eq!(reply, "Error: boom");
        assert_eq!(respond("encode call", Ok("{}".to_string())), "{}");
    }
}
