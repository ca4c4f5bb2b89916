mod abi;
mod client;
mod client_pool;
pub mod provider;
pub mod signer;
pub mod types;
mod utils;

pub use abi::{contract_address, dyn_value_to_json, AbiError, ContractAbi};
pub use client::{AlloyChainClient, DEFAULT_RECEIPT_TIMEOUT_MS};
pub use provider::{
    EvmProviderRegistry, EvmRpcEndpoint, EvmRpcTransport, ProviderError, DEFAULT_RPC_TIMEOUT_MS,
};
pub use signer::{LocalPrivateKeySigner, SignerError};
pub use types::{
    CallRequest, ChainClient, EvmError, TxOutcome, TxRequest, TxTarget, TRANSFER_GAS_LIMIT,
};
pub use utils::{format_ether, parse_address, parse_ether};

const LOG_TARGET: &str = "ballot::evm";
