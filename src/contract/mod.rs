pub mod abi;
pub mod codec;
pub mod registry;
pub mod utils;

use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::Address;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Network name of the active Fund Me deployment
pub const DEFAULT_NETWORK: &str = "anvil";

/// Chain id of a local anvil node
pub const ANVIL_CHAIN_ID: u64 = 31337;

/// Chain id of a local zkSync era node
pub const ZKSYNC_LOCAL_CHAIN_ID: u64 = 260;

/// Address and interface of one contract deployment.
///
/// Descriptors are built once and never mutated; a redeploy replaces the
/// whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDescriptor {
    pub network: String,
    pub chain_id: u64,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    pub abi: JsonAbi,
}

impl ContractDescriptor {
    /// Parsed form of `address`; malformed literals only fail here.
    pub fn parsed_address(&self) -> Result<Address> {
        utils::validate_address(&self.address)
    }

    /// Look up a function entry by name
    pub fn function(&self, name: &str) -> Result<&Function> {
        let overloads = self.abi.function(name).ok_or_else(|| {
            let available: Vec<&str> = self.abi.functions().map(|f| f.name.as_str()).collect();

            if available.is_empty() {
                anyhow!(
                    "Function '{}' not found. The contract ABI contains no functions.",
                    name
                )
            } else {
                anyhow!(
                    "Function '{}' not found in contract ABI. Available functions: {}",
                    name,
                    available.join(", ")
                )
            }
        })?;

        match overloads.as_slice() {
            [function] => Ok(function),
            _ => Err(anyhow!(
                "Function '{}' is overloaded {} times; lookups by name need a unique entry",
                name,
                overloads.len()
            )),
        }
    }
}

/// The active Fund Me deployment backed by the embedded ABI
pub fn fund_me() -> ContractDescriptor {
    ContractDescriptor {
        network: DEFAULT_NETWORK.to_string(),
        chain_id: ANVIL_CHAIN_ID,
        address: abi::FUND_ME_ADDRESS.to_string(),
        explorer_url: None,
        abi: abi::fund_me_abi().clone(),
    }
}

/// Calldata ready to hand to a wallet for signing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedCall {
    pub to: String,
    pub function_name: String,
    pub selector: String,
    pub data: String,
    pub value: String,
    pub payable: bool,
}

/// A revert payload matched against the ABI's custom errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedRevert {
    pub selector: String,
    pub name: Option<String>,
    pub arguments: serde_json::Value,
}
