use alloy::json_abi::JsonAbi;
use anyhow::{anyhow, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;
use tokio::fs;
use tracing::{debug, info};

/// Address of the active Fund Me deployment
pub const FUND_ME_ADDRESS: &str = "0xd0896c97b14158109c1def74c6547a1b732f011f";

/// Earlier local deployment, kept for the `anvil-legacy` network entry
pub const FUND_ME_LEGACY_ADDRESS: &str = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512";

/// zkSync deployment
pub const FUND_ME_ZKSYNC_ADDRESS: &str = "0x4B5DF730c2e6b28E17013A1485E5d9BC41Efe021";

/// Fund Me interface in Solidity ABI JSON form
pub const FUND_ME_ABI_JSON: &str = r#"[
  {
    "type": "constructor",
    "inputs": [{ "name": "priceFeed", "type": "address", "internalType": "address" }],
    "stateMutability": "nonpayable"
  },
  { "type": "fallback", "stateMutability": "payable" },
  { "type": "receive", "stateMutability": "payable" },
  {
    "type": "function",
    "name": "MINIMUM_USD",
    "inputs": [],
    "outputs": [{ "name": "", "type": "uint256", "internalType": "uint256" }],
    "stateMutability": "view"
  },
  {
    "type": "function",
    "name": "cheaperWithdraw",
    "inputs": [],
    "outputs": [],
    "stateMutability": "nonpayable"
  },
  {
    "type": "function",
    "name": "fund",
    "inputs": [],
    "outputs": [],
    "stateMutability": "payable"
  },
  {
    "type": "function",
    "name": "getAddressToAmountFunded",
    "inputs": [{ "name": "fundingAddress", "type": "address", "internalType": "address" }],
    "outputs": [{ "name": "", "type": "uint256", "internalType": "uint256" }],
    "stateMutability": "view"
  },
  {
    "type": "function",
    "name": "getFunder",
    "inputs": [{ "name": "index", "type": "uint256", "internalType": "uint256" }],
    "outputs": [{ "name": "", "type": "address", "internalType": "address" }],
    "stateMutability": "view"
  },
  {
    "type": "function",
    "name": "getOwner",
    "inputs": [],
    "outputs": [{ "name": "", "type": "address", "internalType": "address" }],
    "stateMutability": "view"
  },
  {
    "type": "function",
    "name": "getVersion",
    "inputs": [],
    "outputs": [{ "name": "", "type": "uint256", "internalType": "uint256" }],
    "stateMutability": "view"
  },
  {
    "type": "function",
    "name": "withdraw",
    "inputs": [],
    "outputs": [],
    "stateMutability": "nonpayable"
  },
  { "type": "error", "name": "FundMe__NotOwner", "inputs": [] }
]"#;

static FUND_ME_ABI: OnceLock<JsonAbi> = OnceLock::new();

/// The embedded Fund Me ABI, parsed on first access and shared for the
/// lifetime of the process.
pub fn fund_me_abi() -> &'static JsonAbi {
    FUND_ME_ABI.get_or_init(|| {
        // The literal is checked by the tests below; a parse failure here is a build defect.
        serde_json::from_str(FUND_ME_ABI_JSON).expect("embedded Fund Me ABI is valid JSON ABI")
    })
}

/// Parse ABI JSON that is either a bare entry array or a compiler artifact
/// carrying the array under `abi` (forge/hardhat output).
pub fn parse_abi(content: &str) -> Result<JsonAbi> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| anyhow!("Failed to parse ABI JSON: {}", e))?;

    let entries = match value {
        Value::Array(_) => value,
        Value::Object(mut obj) => obj
            .remove("abi")
            .ok_or_else(|| anyhow!("ABI artifact has no 'abi' field"))?,
        other => {
            return Err(anyhow!(
                "Unexpected ABI JSON: expected an array or an artifact object, got {}",
                other
            ))
        }
    };

    let abi: JsonAbi = serde_json::from_value(entries)
        .map_err(|e| anyhow!("Failed to parse ABI entries: {}", e))?;

    Ok(abi)
}

/// Load a replacement ABI from disk, used when a redeployed contract ships a
/// new interface.
pub async fn load_abi_file<P: AsRef<Path>>(path: P) -> Result<JsonAbi> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("Failed to read ABI file {:?}: {}", path, e))?;

    let abi = parse_abi(&content).map_err(|e| anyhow!("Invalid ABI file {:?}: {}", path, e))?;

    info!(
        "Loaded ABI from {:?} ({} functions, {} errors)",
        path,
        abi.functions().count(),
        abi.errors().count()
    );
    debug!("ABI file {:?} has constructor: {}", path, abi.constructor.is_some());
    Ok(abi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::utils;
    use alloy::json_abi::StateMutability;
    use tempfile::tempdir;

    #[test]
    fn test_active_address_format() {
        assert_eq!(FUND_ME_ADDRESS.len(), 42);
        assert!(FUND_ME_ADDRESS.starts_with("0x"));
        assert!(utils::validate_address(FUND_ME_ADDRESS).is_ok());
        assert!(utils::validate_address(FUND_ME_LEGACY_ADDRESS).is_ok());
        assert!(utils::validate_address(FUND_ME_ZKSYNC_ADDRESS).is_ok());
    }

    #[test]
    fn test_fund_is_payable_without_params() {
        let abi = fund_me_abi();
        let fund: Vec<_> = abi.functions().filter(|f| f.name == "fund").collect();

        assert_eq!(fund.len(), 1);
        assert_eq!(fund[0].state_mutability, StateMutability::Payable);
        assert!(fund[0].inputs.is_empty());
        assert!(fund[0].outputs.is_empty());
    }

    #[test]
    fn test_withdraw_is_nonpayable_without_params() {
        let abi = fund_me_abi();
        let withdraw: Vec<_> = abi.functions().filter(|f| f.name == "withdraw").collect();

        assert_eq!(withdraw.len(), 1);
        assert_eq!(withdraw[0].state_mutability, StateMutability::NonPayable);
        assert!(withdraw[0].inputs.is_empty());
        assert!(withdraw[0].outputs.is_empty());
    }

    #[test]
    fn test_not_owner_error() {
        let abi = fund_me_abi();
        let errors: Vec<_> = abi
            .errors()
            .filter(|e| e.name == "FundMe__NotOwner")
            .collect();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].inputs.is_empty());
        assert_eq!(abi.errors().count(), 1);
    }

    #[test]
    fn test_entry_kinds() {
        let abi = fund_me_abi();

        let constructor = abi.constructor.as_ref().unwrap();
        assert_eq!(constructor.inputs.len(), 1);
        assert_eq!(constructor.inputs[0].name, "priceFeed");
        assert_eq!(constructor.inputs[0].ty, "address");
        assert_eq!(constructor.state_mutability, StateMutability::NonPayable);

        assert_eq!(
            abi.fallback.as_ref().unwrap().state_mutability,
            StateMutability::Payable
        );
        assert_eq!(
            abi.receive.as_ref().unwrap().state_mutability,
            StateMutability::Payable
        );
        assert_eq!(abi.functions().count(), 8);
        assert_eq!(abi.events().count(), 0);
    }

    #[test]
    fn test_function_names_unique() {
        let abi = fund_me_abi();
        for (name, overloads) in &abi.functions {
            assert_eq!(overloads.len(), 1, "function {} is overloaded", name);
        }
    }

    #[test]
    fn test_view_functions() {
        let abi = fund_me_abi();
        let getter = abi.function("getAddressToAmountFunded").unwrap();

        assert_eq!(getter[0].state_mutability, StateMutability::View);
        assert_eq!(getter[0].inputs[0].name, "fundingAddress");
        assert_eq!(getter[0].inputs[0].ty, "address");
        assert_eq!(getter[0].outputs[0].ty, "uint256");

        let funder = abi.function("getFunder").unwrap();
        assert_eq!(funder[0].inputs[0].ty, "uint256");
        assert_eq!(funder[0].outputs[0].ty, "address");
    }

    #[test]
    fn test_load_is_idempotent() {
        let first: JsonAbi = serde_json::from_str(FUND_ME_ABI_JSON).unwrap();
        let second: JsonAbi = serde_json::from_str(FUND_ME_ABI_JSON).unwrap();
        assert_eq!(first, second);
        assert_eq!(&first, fund_me_abi());
        assert!(std::ptr::eq(fund_me_abi(), fund_me_abi()));
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(fund_me_abi()).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 12);

        let fund = entries
            .iter()
            .find(|e| e["name"] == "fund")
            .unwrap();
        assert_eq!(fund["type"], "function");
        assert_eq!(fund["stateMutability"], "payable");
        assert_eq!(fund["inputs"], serde_json::json!([]));
        assert_eq!(fund["outputs"], serde_json::json!([]));

        let error = entries
            .iter()
            .find(|e| e["type"] == "error")
            .unwrap();
        assert_eq!(error["name"], "FundMe__NotOwner");
    }

    #[test]
    fn test_parse_abi_artifact() {
        let artifact = format!(r#"{{"abi": {}, "bytecode": "0x00"}}"#, FUND_ME_ABI_JSON);
        let abi = parse_abi(&artifact).unwrap();
        assert_eq!(&abi, fund_me_abi());

        assert!(parse_abi("42").is_err());
        assert!(parse_abi(r#"{"bytecode": "0x00"}"#).is_err());
        assert!(parse_abi("not json").is_err());
    }

    #[tokio::test]
    async fn test_load_abi_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("FundMe.json");
        tokio::fs::write(&path, FUND_ME_ABI_JSON).await.unwrap();

        let abi = load_abi_file(&path).await.unwrap();
        assert_eq!(abi.functions().count(), 8);

        assert!(load_abi_file(temp_dir.path().join("missing.json"))
            .await
            .is_err());
    }
}
