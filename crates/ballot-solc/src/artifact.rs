use crate::diagnostics::SolcDiagnostic;
use crate::error::SolcError;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{hex, Bytes};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledContract {
    pub name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl CompiledContract {
    pub fn is_deployable(&self) -> bool {
        !self.bytecode.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    /// Keyed by the `source:Name` identifier solc reports.
    pub contracts: BTreeMap<String, CompiledContract>,
    pub diagnostics: Vec<SolcDiagnostic>,
}

impl CompileOutput {
    /// Finds `source:name`, falling back to the single contract called `name`.
    pub fn contract(&self, source: Option<&str>, name: &str) -> Result<&CompiledContract, SolcError> {
        if let Some(source) = source {
            if let Some(found) = self.contracts.get(format!("{source}:{name}").as_str()) {
                return Ok(found);
            }
        }
        let candidates = self
            .contracts
            .iter()
            .filter(|(_, contract)| contract.name == name)
            .collect::<Vec<_>>();
        match candidates.as_slice() {
            [(_, contract)] => Ok(contract),
            [] => Err(SolcError::ContractNotFound {
                name: name.to_string(),
                available: self.contracts.keys().cloned().collect::<Vec<_>>().join(","),
            }),
            many => Err(SolcError::AmbiguousContract {
                name: name.to_string(),
                candidates: many
                    .iter()
                    .map(|(key, _)| key.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            }),
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &SolcDiagnostic> {
        self.diagnostics.iter().filter(|diagnostic| !diagnostic.is_error())
    }
}

pub fn load_combined_json(path: &Path) -> Result<CompileOutput, SolcError> {
    let raw = fs::read(path).map_err(|source| SolcError::ReadArtifact {
        path: path.display().to_string(),
        source,
    })?;
    Ok(CompileOutput {
        contracts: parse_combined_json(&raw)?,
        diagnostics: Vec::new(),
    })
}

/// Parses `solc --combined-json abi,bin` output. Older compilers emit the abi
/// as an embedded JSON string, newer ones as an array; both are accepted.
pub fn parse_combined_json(stdout: &[u8]) -> Result<BTreeMap<String, CompiledContract>, SolcError> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    let output: Value =
        serde_json::from_slice(stdout).map_err(|error| SolcError::Malformed(error.to_string()))?;
    let contracts = output
        .get("contracts")
        .ok_or_else(|| SolcError::Malformed("no `contracts` key".to_string()))?
        .as_object()
        .ok_or_else(|| SolcError::Malformed("`contracts` is not an object".to_string()))?;

    let mut results = BTreeMap::new();
    for (full_name, contract_data) in contracts {
        let name = full_name
            .rsplit(':')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| SolcError::Malformed(format!("invalid contract id `{full_name}`")))?
            .to_string();

        let abi_value = contract_data
            .get("abi")
            .ok_or_else(|| SolcError::Malformed(format!("no abi for `{full_name}`")))?;
        let abi = match abi_value {
            Value::String(text) => serde_json::from_str::<JsonAbi>(text),
            other => serde_json::from_value::<JsonAbi>(other.clone()),
        }
        .map_err(|error| SolcError::Malformed(format!("abi for `{full_name}`: {error}")))?;

        let bin = contract_data
            .get("bin")
            .ok_or_else(|| SolcError::Malformed(format!("no bin for `{full_name}`")))?
            .as_str()
            .ok_or_else(|| SolcError::Malformed(format!("bin for `{full_name}` is not a string")))?;
        let bytecode = hex::decode(bin)
            .map(Bytes::from)
            .map_err(|error| SolcError::Malformed(format!("bin for `{full_name}`: {error}")))?;

        results.insert(
            full_name.clone(),
            CompiledContract {
                name,
                abi,
                bytecode,
            },
        );
    }

    Ok(results)
}

#[cfg(test)]
#[path = "artifact_test.rs"]
mod tests;
