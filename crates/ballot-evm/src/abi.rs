use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{hex, Address, Bytes};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    #[error("abi has no function `{name}` taking {arity} argument(s)")]
    UnknownFunction { name: String, arity: usize },
    #[error("contract has no constructor but {0} constructor argument(s) were given")]
    NoConstructor(usize),
    #[error("contract bytecode is empty, nothing to deploy")]
    EmptyBytecode,
    #[error("abi encode failed: {0}")]
    Encode(String),
    #[error("abi decode of `{function}` output failed: {reason}")]
    Decode { function: String, reason: String },
}

/// The parts of a compiled contract needed to talk to it on chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractAbi {
    abi: JsonAbi,
}

impl ContractAbi {
    pub fn new(abi: JsonAbi) -> Self {
        Self { abi }
    }

    pub fn function(&self, name: &str, arity: usize) -> Result<&Function, AbiError> {
        self.abi
            .function(name)
            .and_then(|overloads| {
                overloads
                    .iter()
                    .find(|function| function.inputs.len() == arity)
            })
            .ok_or_else(|| AbiError::UnknownFunction {
                name: name.to_string(),
                arity,
            })
    }

    /// Creation payload: bytecode followed by the encoded constructor arguments.
    pub fn deploy_data(&self, bytecode: &Bytes, args: &[DynSolValue]) -> Result<Bytes, AbiError> {
        if bytecode.is_empty() {
            return Err(AbiError::EmptyBytecode);
        }
        let mut data = bytecode.to_vec();
        match &self.abi.constructor {
            Some(constructor) => {
                let encoded = constructor
                    .abi_encode_input(args)
                    .map_err(|error| AbiError::Encode(error.to_string()))?;
                data.extend_from_slice(&encoded);
            }
            None if args.is_empty() => {}
            None => return Err(AbiError::NoConstructor(args.len())),
        }
        Ok(Bytes::from(data))
    }

    pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> Result<Bytes, AbiError> {
        self.function(name, args.len())?
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|error| AbiError::Encode(error.to_string()))
    }

    pub fn decode_output(
        &self,
        name: &str,
        arity: usize,
        raw: &[u8],
    ) -> Result<Vec<DynSolValue>, AbiError> {
        self.function(name, arity)?
            .abi_decode_output(raw, true)
            .map_err(|error| AbiError::Decode {
                function: name.to_string(),
                reason: error.to_string(),
            })
    }
}

/// Address a CREATE from `deployer` with `nonce` lands at.
pub fn contract_address(deployer: Address, nonce: u64) -> Address {
    deployer.create(nonce)
}

pub fn dyn_value_to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(boolean) => Value::Bool(*boolean),
        DynSolValue::Int(number, _) => Value::String(number.to_string()),
        DynSolValue::Uint(number, _) => Value::String(number.to_string()),
        DynSolValue::FixedBytes(word, size) => {
            Value::String(format!("0x{}", hex::encode(&word[..*size])))
        }
        DynSolValue::Address(address) => Value::String(format!("{address:#x}")),
        DynSolValue::Function(function) => {
            Value::String(format!("0x{}", hex::encode(function.as_slice())))
        }
        DynSolValue::Bytes(bytes) => Value::String(format!("0x{}", hex::encode(bytes))),
        DynSolValue::String(text) => Value::String(text.clone()),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) | DynSolValue::Tuple(values) => {
            Value::Array(values.iter().map(dyn_value_to_json).collect())
        }
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}

#[cfg(test)]
#[path = "abi_test.rs"]
mod tests;
