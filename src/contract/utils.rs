use alloy::primitives::{Address, U256};
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Validates and normalizes an Ethereum address
pub fn validate_address(address: &str) -> Result<Address> {
    let address = address.trim();

    if address.is_empty() {
        return Err(anyhow!("Address cannot be empty"));
    }

    if !address.starts_with("0x") && !address.starts_with("0X") {
        return Err(anyhow!(
            "Invalid address format: '{}'. Contract addresses must start with '0x'",
            address
        ));
    }

    if address.len() != 42 {
        return Err(anyhow!(
            "Invalid address length: '{}'. Contract addresses must be exactly 42 characters (0x + 40 hex characters)",
            address
        ));
    }

    let hex_part = &address[2..];
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!(
            "Invalid address format: '{}'. Contains non-hexadecimal characters",
            address
        ));
    }

    Address::from_str(address)
        .map_err(|e| anyhow!("Invalid contract address: '{}'. Error: {}", address, e))
}

/// Validates a deployment network name against the configured ones
pub fn validate_network(network: &str, available_networks: &[String]) -> Result<()> {
    if network.is_empty() {
        return Err(anyhow!("Network name cannot be empty"));
    }

    if !available_networks.iter().any(|n| n == network) {
        return Err(anyhow!(
            "Unknown network: '{}'. Available networks: {}",
            network,
            available_networks.join(", ")
        ));
    }

    Ok(())
}

/// Validates that a name is a Solidity identifier
pub fn validate_function_name(function_name: &str) -> Result<()> {
    let first = function_name
        .chars()
        .next()
        .ok_or_else(|| anyhow!("Function name cannot be empty"))?;

    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(anyhow!(
            "Invalid function name: '{}'. Function names must start with a letter or underscore",
            function_name
        ));
    }

    if !function_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(anyhow!(
            "Invalid function name: '{}'. Function names can only contain letters, numbers, and underscores",
            function_name
        ));
    }

    Ok(())
}

/// Parses a wei amount given in decimal or `0x`-prefixed hex
pub fn validate_value(value_str: &str) -> Result<U256> {
    let value_str = value_str.trim();
    if value_str.is_empty() {
        return Err(anyhow!("Value cannot be empty"));
    }

    let value = if let Some(hex_digits) = value_str
        .strip_prefix("0x")
        .or_else(|| value_str.strip_prefix("0X"))
    {
        U256::from_str_radix(hex_digits, 16)
            .map_err(|_| anyhow!("Invalid hexadecimal value: '{}'", value_str))?
    } else {
        U256::from_str_radix(value_str, 10).map_err(|_| {
            anyhow!(
                "Invalid numeric value: '{}'. Use decimal format or '0x' prefixed hex",
                value_str
            )
        })?
    };

    Ok(value)
}

/// Decodes `0x`-prefixed (or bare) hex call/return data
pub fn decode_hex_data(data: &str) -> Result<Vec<u8>> {
    let data = data.trim();
    let digits = data
        .strip_prefix("0x")
        .or_else(|| data.strip_prefix("0X"))
        .unwrap_or(data);

    hex::decode(digits).map_err(|e| anyhow!("Invalid hex data '{}': {}", data, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address() {
        // Valid addresses
        assert!(validate_address("0xd0896c97b14158109c1def74c6547a1b732f011f").is_ok());
        assert!(validate_address("0x4B5DF730c2e6b28E17013A1485E5d9BC41Efe021").is_ok());
        assert!(validate_address("0x0000000000000000000000000000000000000000").is_ok());

        // Invalid addresses
        assert!(validate_address("").is_err());
        assert!(validate_address("not_an_address").is_err());
        assert!(validate_address("0x123").is_err()); // Too short
        assert!(validate_address("d0896c97b14158109c1def74c6547a1b732f011f").is_err()); // Missing 0x
        assert!(validate_address("0xgg896c97b14158109c1def74c6547a1b732f011f").is_err());
    }

    #[test]
    fn test_validate_network() {
        let networks = vec!["anvil".to_string(), "zksync".to_string()];

        assert!(validate_network("anvil", &networks).is_ok());
        assert!(validate_network("zksync", &networks).is_ok());
        assert!(validate_network("mainnet", &networks).is_err());
        assert!(validate_network("", &networks).is_err());
    }

    #[test]
    fn test_validate_function_name() {
        assert!(validate_function_name("fund").is_ok());
        assert!(validate_function_name("MINIMUM_USD").is_ok());
        assert!(validate_function_name("_internal").is_ok());

        assert!(validate_function_name("").is_err());
        assert!(validate_function_name("1withdraw").is_err());
        assert!(validate_function_name("cheaper-withdraw").is_err());
    }

    #[test]
    fn test_validate_value() {
        assert_eq!(validate_value("1000").unwrap(), U256::from(1000u64));
        assert_eq!(validate_value("0x10").unwrap(), U256::from(16u64));
        assert_eq!(validate_value(" 0 ").unwrap(), U256::ZERO);

        assert!(validate_value("").is_err());
        assert!(validate_value("0xzz").is_err());
        assert!(validate_value("1.5").is_err());
    }

    #[test]
    fn test_decode_hex_data() {
        assert_eq!(decode_hex_data("0xb60d4288").unwrap(), vec![0xb6, 0x0d, 0x42, 0x88]);
        assert_eq!(decode_hex_data("b60d4288").unwrap().len(), 4);
        assert!(decode_hex_data("0x").unwrap().is_empty());
        assert!(decode_hex_data("0x123").is_err());
    }
}
