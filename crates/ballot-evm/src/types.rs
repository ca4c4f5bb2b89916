use crate::signer::{LocalPrivateKeySigner, SignerError};
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::Serialize;

/// Gas for a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxTarget {
    Create,
    Call(Address),
}

#[derive(Debug, Clone)]
pub struct TxRequest {
    pub signer: LocalPrivateKeySigner,
    pub to: TxTarget,
    pub data: Bytes,
    pub value: U256,
    pub nonce: Option<u64>,
    pub gas_limit: Option<u64>,
    pub wait_for_receipt: bool,
}

impl TxRequest {
    pub fn new(signer: LocalPrivateKeySigner, to: TxTarget) -> Self {
        Self {
            signer,
            to,
            data: Bytes::new(),
            value: U256::ZERO,
            nonce: None,
            gas_limit: None,
            wait_for_receipt: true,
        }
    }

    pub fn from(&self) -> Address {
        self.signer.address()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxOutcome {
    pub tx_hash: B256,
    pub nonce: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
    /// `None` until a receipt was observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
}

impl TxOutcome {
    pub fn reverted(&self) -> bool {
        self.status == Some(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum EvmError {
    #[error("connect rpc `{rpc_url}` failed: {reason}")]
    Connect { rpc_url: String, reason: String },
    #[error("{operation} timeout after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },
    #[error("{operation} failed: {reason}")]
    Rpc {
        operation: &'static str,
        reason: String,
    },
    #[error("rpc runtime unavailable: {0}")]
    Runtime(String),
    #[error(transparent)]
    Signer(#[from] SignerError),
}

/// The chain operations a ballot run needs. Implementations block until the
/// request (and, when asked, its receipt) completes.
pub trait ChainClient: Send + Sync {
    fn chain_id(&self) -> Result<u64, EvmError>;
    /// Next nonce for `address`, counting transactions still in the pool.
    fn nonce(&self, address: Address) -> Result<u64, EvmError>;
    fn balance(&self, address: Address) -> Result<U256, EvmError>;
    fn send(&self, request: TxRequest) -> Result<TxOutcome, EvmError>;
    fn call(&self, request: CallRequest) -> Result<Bytes, EvmError>;
}
