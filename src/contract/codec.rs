use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt, Word},
    json_abi::{Function, StateMutability},
    primitives::{Address, I256, U256},
};
use anyhow::{anyhow, Result};
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

use super::{utils, ContractDescriptor, DecodedRevert, EncodedCall};

/// Encode a call to `function_name` on the descriptor's deployment.
///
/// Parameters are a positional array, an object keyed by input name, or
/// `null` for functions without inputs. `value` is the wei amount to attach.
pub fn encode_call(
    descriptor: &ContractDescriptor,
    function_name: &str,
    parameters: &Value,
    value: Option<&str>,
) -> Result<EncodedCall> {
    utils::validate_function_name(function_name)
        .map_err(|e| anyhow!("Invalid function name: {}", e))?;

    let function = descriptor.function(function_name)?;
    let payable = function.state_mutability == StateMutability::Payable;

    let value = match value {
        Some(value_str) => utils::validate_value(value_str)
            .map_err(|e| anyhow!("Invalid transaction value: {}", e))?,
        None => U256::ZERO,
    };

    if !value.is_zero() && !payable {
        return Err(anyhow!(
            "Function '{}' is not payable and cannot receive value (got {} wei)",
            function_name,
            value
        ));
    }

    let inputs = json_to_inputs(function, parameters)?;
    let encoded = function
        .abi_encode_input(&inputs)
        .map_err(|e| anyhow!("Failed to encode function inputs: {}", e))?;

    debug!(
        "Encoded {} for {} on {} ({} bytes)",
        function_name,
        descriptor.address,
        descriptor.network,
        encoded.len()
    );

    Ok(EncodedCall {
        to: descriptor.address.clone(),
        function_name: function_name.to_string(),
        selector: format!("0x{}", hex::encode(function.selector())),
        data: format!("0x{}", hex::encode(&encoded)),
        value: value.to_string(),
        payable,
    })
}

/// Decode return data of `function_name`
pub fn decode_output(
    descriptor: &ContractDescriptor,
    function_name: &str,
    data: &str,
) -> Result<Value> {
    let function = descriptor.function(function_name)?;
    let bytes = utils::decode_hex_data(data)?;

    if bytes.is_empty() {
        return Ok(Value::Null);
    }

    let decoded = function
        .abi_decode_output(&bytes, false)
        .map_err(|e| anyhow!("Failed to decode output of '{}': {}", function_name, e))?;

    dyn_sol_values_to_json(&decoded)
}

/// Match revert data against the custom errors of the descriptor's ABI
pub fn decode_revert(descriptor: &ContractDescriptor, data: &str) -> Result<DecodedRevert> {
    let bytes = utils::decode_hex_data(data)?;

    if bytes.len() < 4 {
        return Err(anyhow!(
            "Revert data too short: expected at least a 4-byte selector, got {} bytes",
            bytes.len()
        ));
    }

    let (selector, payload) = bytes.split_at(4);
    let selector_hex = format!("0x{}", hex::encode(selector));

    let Some(error) = descriptor
        .abi
        .errors()
        .find(|e| e.selector().as_slice() == selector)
    else {
        debug!("No custom error matches selector {}", selector_hex);
        return Ok(DecodedRevert {
            selector: selector_hex,
            name: None,
            arguments: Value::Null,
        });
    };

    let arguments = if error.inputs.is_empty() {
        Value::Array(Vec::new())
    } else {
        let decoded = error
            .abi_decode_input(payload, false)
            .map_err(|e| anyhow!("Failed to decode arguments of '{}': {}", error.name, e))?;
        Value::Array(
            decoded
                .iter()
                .map(dyn_sol_value_to_json)
                .collect::<Result<Vec<_>>>()?,
        )
    };

    Ok(DecodedRevert {
        selector: selector_hex,
        name: Some(error.name.clone()),
        arguments,
    })
}

fn json_to_inputs(function: &Function, parameters: &Value) -> Result<Vec<DynSolValue>> {
    match parameters {
        Value::Null if function.inputs.is_empty() => Ok(Vec::new()),
        Value::Array(params) => {
            if params.len() != function.inputs.len() {
                let expected_params: Vec<String> = function
                    .inputs
                    .iter()
                    .map(|input| format!("{} {}", input.ty, input.name))
                    .collect();

                return Err(anyhow!(
                    "Parameter count mismatch for function '{}': expected {} parameters, got {}.\nExpected parameters: [{}]",
                    function.name,
                    function.inputs.len(),
                    params.len(),
                    expected_params.join(", ")
                ));
            }

            params
                .iter()
                .zip(&function.inputs)
                .enumerate()
                .map(|(i, (param_value, input))| {
                    json_to_dyn_sol_value(param_value, &input.ty).map_err(|e| {
                        anyhow!(
                            "Invalid parameter #{} ('{}' of type '{}'): {}",
                            i + 1,
                            input.name,
                            input.ty,
                            e
                        )
                    })
                })
                .collect()
        }
        Value::Object(obj) => {
            let expected_params: Vec<String> = function
                .inputs
                .iter()
                .map(|input| format!("{}: {}", input.name, input.ty))
                .collect();

            function
                .inputs
                .iter()
                .map(|input| {
                    let param_value = obj.get(&input.name).ok_or_else(|| {
                        anyhow!(
                            "Missing required parameter '{}' of type '{}' for function '{}'.\nExpected parameters: {{{}}}",
                            input.name, input.ty, function.name, expected_params.join(", ")
                        )
                    })?;
                    json_to_dyn_sol_value(param_value, &input.ty).map_err(|e| {
                        anyhow!(
                            "Invalid parameter '{}' of type '{}': {}",
                            input.name,
                            input.ty,
                            e
                        )
                    })
                })
                .collect()
        }
        _ => {
            let expected_params: Vec<String> = function
                .inputs
                .iter()
                .map(|input| format!("{}: {}", input.name, input.ty))
                .collect();
            Err(anyhow!(
                "Invalid parameter format for function '{}'. Parameters must be provided as either:\n1. Array: [value1, value2, ...]\n2. Object: {{{}}}\nProvided: {}",
                function.name,
                expected_params.join(", "),
                parameters
            ))
        }
    }
}

fn type_bits(ty: &str, prefix: &str, default: usize) -> Result<usize> {
    let size = &ty[prefix.len()..];
    if size.is_empty() {
        return Ok(default);
    }
    size.parse()
        .map_err(|_| anyhow!("Invalid type size in '{}'", ty))
}

/// Bit width of an `intN`/`uintN` type; N is a multiple of 8 in 8..=256
fn integer_bits(ty: &str, prefix: &str) -> Result<usize> {
    let bits = type_bits(ty, prefix, 256)?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(anyhow!("Invalid integer type: {}", ty));
    }
    Ok(bits)
}

/// Convert a JSON value to a DynSolValue of the given Solidity type
fn json_to_dyn_sol_value(value: &Value, sol_type: &str) -> Result<DynSolValue> {
    match sol_type {
        "address" => {
            let addr_str = value
                .as_str()
                .ok_or_else(|| anyhow!("Address must be a string"))?;
            let address = Address::from_str(addr_str)
                .map_err(|e| anyhow!("Invalid address '{}': {}", addr_str, e))?;
            Ok(DynSolValue::Address(address))
        }
        ty if ty.ends_with("[]") => {
            let array = value
                .as_array()
                .ok_or_else(|| anyhow!("Array parameter must be an array"))?;
            let element_type = &ty[..ty.len() - 2];
            let elements = array
                .iter()
                .map(|element| json_to_dyn_sol_value(element, element_type))
                .collect::<Result<Vec<_>>>()?;
            Ok(DynSolValue::Array(elements))
        }
        ty if ty.starts_with("uint") => {
            let bits = integer_bits(ty, "uint")?;
            let num = match value {
                Value::Number(n) => n
                    .as_u64()
                    .map(U256::from)
                    .ok_or_else(|| anyhow!("Invalid uint value: {}", n))?,
                Value::String(s) => utils::validate_value(s)?,
                _ => return Err(anyhow!("Uint must be a number or string")),
            };
            if bits < 256 && num >= U256::from(1u64) << bits {
                return Err(anyhow!("Value {} does not fit in {}", num, ty));
            }
            Ok(DynSolValue::Uint(num, bits))
        }
        ty if ty.starts_with("int") => {
            let bits = integer_bits(ty, "int")?;
            let text = match value {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.trim().to_string(),
                _ => return Err(anyhow!("Int must be a number or string")),
            };
            let num = I256::from_dec_str(&text)
                .map_err(|_| anyhow!("Invalid int value: {}", text))?;
            if bits < 256 {
                // 2^(bits-1): first value past the positive range
                let bound = I256::from_raw(U256::from(1u64) << (bits - 1));
                if num >= bound || num < -bound {
                    return Err(anyhow!("Value {} does not fit in {}", num, ty));
                }
            }
            Ok(DynSolValue::Int(num, bits))
        }
        "string" => {
            let s = value
                .as_str()
                .ok_or_else(|| anyhow!("String parameter must be a string"))?;
            Ok(DynSolValue::String(s.to_string()))
        }
        "bool" => {
            let b = value
                .as_bool()
                .ok_or_else(|| anyhow!("Bool parameter must be a boolean"))?;
            Ok(DynSolValue::Bool(b))
        }
        "bytes" => {
            let hex_str = value
                .as_str()
                .ok_or_else(|| anyhow!("Bytes must be a hex string"))?;
            Ok(DynSolValue::Bytes(utils::decode_hex_data(hex_str)?))
        }
        ty if ty.starts_with("bytes") => {
            let size = type_bits(ty, "bytes", 32)?;
            if size == 0 || size > 32 {
                return Err(anyhow!("Invalid fixed bytes type: {}", ty));
            }
            let hex_str = value
                .as_str()
                .ok_or_else(|| anyhow!("Bytes must be a hex string"))?;
            let bytes = utils::decode_hex_data(hex_str)?;
            if bytes.len() > size {
                return Err(anyhow!(
                    "Value {} is {} bytes, longer than {}",
                    hex_str,
                    bytes.len(),
                    ty
                ));
            }

            let mut word_bytes = [0u8; 32];
            word_bytes[..bytes.len()].copy_from_slice(&bytes);
            Ok(DynSolValue::FixedBytes(Word::from(word_bytes), size))
        }
        _ => Err(anyhow!("Unsupported Solidity type: {}", sol_type)),
    }
}

/// Convert decoded outputs to JSON; a single output is unwrapped
fn dyn_sol_values_to_json(values: &[DynSolValue]) -> Result<Value> {
    match values {
        [single] => dyn_sol_value_to_json(single),
        _ => Ok(Value::Array(
            values
                .iter()
                .map(dyn_sol_value_to_json)
                .collect::<Result<Vec<_>>>()?,
        )),
    }
}

fn dyn_sol_value_to_json(value: &DynSolValue) -> Result<Value> {
    match value {
        DynSolValue::Address(addr) => Ok(Value::String(format!("0x{:x}", addr))),
        DynSolValue::Uint(num, _) => Ok(Value::String(num.to_string())),
        DynSolValue::Int(num, _) => Ok(Value::String(num.to_string())),
        DynSolValue::Bool(b) => Ok(Value::Bool(*b)),
        DynSolValue::String(s) => Ok(Value::String(s.clone())),
        DynSolValue::Bytes(bytes) => Ok(Value::String(format!("0x{}", hex::encode(bytes)))),
        DynSolValue::FixedBytes(word, size) => Ok(Value::String(format!(
            "0x{}",
            hex::encode(&word[..*size])
        ))),
        DynSolValue::Array(items)
        | DynSolValue::FixedArray(items)
        | DynSolValue::Tuple(items) => Ok(Value::Array(
            items
                .iter()
                .map(dyn_sol_value_to_json)
                .collect::<Result<Vec<_>>>()?,
        )),
        _ => Err(anyhow!("Unsupported DynSolValue type: {:?}", value)),
    }
}
