use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvmRpcTransport {
    Http,
    Ws,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmRpcEndpoint {
    pub chain: String,
    pub rpc_url: String,
    pub timeout_ms: u64,
}

impl EvmRpcEndpoint {
    pub fn new(chain: impl Into<String>, rpc_url: impl Into<String>) -> Result<Self, ProviderError> {
        let endpoint = Self {
            chain: chain.into(),
            rpc_url: rpc_url.into(),
            timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
        };
        endpoint.validate()?;
        Ok(endpoint)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ProviderError> {
        self.timeout_ms = timeout_ms;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ProviderError> {
        self.chain_id()?;
        self.transport()?;
        if self.timeout_ms == 0 {
            return Err(ProviderError::InvalidTimeout(self.timeout_ms));
        }
        Ok(())
    }

    /// Numeric chain id from the `eip155:<id>` form.
    pub fn chain_id(&self) -> Result<u64, ProviderError> {
        parse_eip155_chain_id(self.chain.as_str())
    }

    pub fn transport(&self) -> Result<EvmRpcTransport, ProviderError> {
        if self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://") {
            return Ok(EvmRpcTransport::Http);
        }
        if self.rpc_url.starts_with("ws://") || self.rpc_url.starts_with("wss://") {
            return Ok(EvmRpcTransport::Ws);
        }
        Err(ProviderError::InvalidRpcUrl(self.rpc_url.clone()))
    }
}

pub fn parse_eip155_chain_id(chain: &str) -> Result<u64, ProviderError> {
    chain
        .strip_prefix("eip155:")
        .and_then(|id| id.parse::<u64>().ok())
        .ok_or_else(|| ProviderError::InvalidChain(chain.to_string()))
}

#[derive(Debug, Default)]
pub struct EvmProviderRegistry {
    endpoints: BTreeMap<String, EvmRpcEndpoint>,
}

impl EvmProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_endpoints(endpoints: Vec<EvmRpcEndpoint>) -> Result<Self, ProviderError> {
        let mut registry = Self::new();
        for endpoint in endpoints {
            registry.register_endpoint(endpoint)?;
        }
        Ok(registry)
    }

    pub fn register_endpoint(&mut self, endpoint: EvmRpcEndpoint) -> Result<(), ProviderError> {
        endpoint.validate()?;
        let chain = endpoint.chain.clone();
        if self.endpoints.contains_key(chain.as_str()) {
            return Err(ProviderError::DuplicateChain(chain));
        }
        self.endpoints.insert(chain, endpoint);
        Ok(())
    }

    pub fn endpoint(&self, chain: &str) -> Result<&EvmRpcEndpoint, ProviderError> {
        self.endpoints
            .get(chain)
            .ok_or_else(|| ProviderError::ChainNotConfigured(chain.to_string()))
    }

    /// Resolves the requested chain, or the only configured one when none is given.
    pub fn select(&self, chain: Option<&str>) -> Result<&EvmRpcEndpoint, ProviderError> {
        if let Some(chain) = chain {
            return self.endpoint(chain);
        }
        let mut endpoints = self.endpoints.values();
        match (endpoints.next(), endpoints.next()) {
            (Some(only), None) => Ok(only),
            (None, _) => Err(ProviderError::NoChains),
            (Some(_), Some(_)) => Err(ProviderError::AmbiguousChain(self.chains().join(","))),
        }
    }

    pub fn chains(&self) -> Vec<String> {
        self.endpoints.keys().cloned().collect()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderError {
    #[error("invalid chain, expected `eip155:<chain id>`: {0}")]
    InvalidChain(String),
    #[error("invalid rpc url, expected http(s) or ws(s): {0}")]
    InvalidRpcUrl(String),
    #[error("invalid timeout_ms, expected > 0: {0}")]
    InvalidTimeout(u64),
    #[error("duplicate chain endpoint configured: {0}")]
    DuplicateChain(String),
    #[error("chain endpoint not configured: {0}")]
    ChainNotConfigured(String),
    #[error("no chain endpoints configured")]
    NoChains,
    #[error("several chains configured ({0}), pass one explicitly")]
    AmbiguousChain(String),
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
