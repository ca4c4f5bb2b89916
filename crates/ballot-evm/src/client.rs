use crate::client_pool::AlloyRpcClientPool;
use crate::provider::{EvmRpcEndpoint, ProviderError};
use crate::types::{CallRequest, ChainClient, EvmError, TxOutcome, TxRequest, TxTarget};
use crate::LOG_TARGET;
use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
};
use alloy_primitives::{Address, Bytes, U256};
use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 120_000;

/// [`ChainClient`] over an alloy JSON-RPC provider (http or ws).
pub struct AlloyChainClient {
    endpoint: EvmRpcEndpoint,
    chain_id: u64,
    receipt_timeout_ms: u64,
    pool: AlloyRpcClientPool,
}

impl AlloyChainClient {
    pub fn new(endpoint: EvmRpcEndpoint) -> Result<Self, EvmError> {
        let chain_id = endpoint.chain_id().map_err(provider_error)?;
        Ok(Self {
            endpoint,
            chain_id,
            receipt_timeout_ms: DEFAULT_RECEIPT_TIMEOUT_MS,
            pool: AlloyRpcClientPool::new()?,
        })
    }

    pub fn with_receipt_timeout_ms(mut self, receipt_timeout_ms: u64) -> Self {
        self.receipt_timeout_ms = receipt_timeout_ms;
        self
    }

    pub fn endpoint(&self) -> &EvmRpcEndpoint {
        &self.endpoint
    }

    fn rpc_client(
        &self,
    ) -> Result<alloy::rpc::client::RpcClient<alloy::transports::BoxTransport>, EvmError> {
        self.pool.client(
            self.endpoint.chain.as_str(),
            self.endpoint.rpc_url.as_str(),
            self.endpoint.timeout_ms,
        )
    }
}

impl ChainClient for AlloyChainClient {
    fn chain_id(&self) -> Result<u64, EvmError> {
        let client = self.rpc_client()?;
        let timeout_ms = self.endpoint.timeout_ms;
        self.pool.runtime.block_on(async move {
            let provider = ProviderBuilder::new().on_client(client);
            within("eth_chainId", timeout_ms, provider.get_chain_id()).await
        })
    }

    fn nonce(&self, address: Address) -> Result<u64, EvmError> {
        let client = self.rpc_client()?;
        let timeout_ms = self.endpoint.timeout_ms;
        self.pool.runtime.block_on(async move {
            let provider = ProviderBuilder::new().on_client(client);
            within(
                "eth_getTransactionCount",
                timeout_ms,
                provider.get_transaction_count(address).pending(),
            )
            .await
        })
    }

    fn balance(&self, address: Address) -> Result<U256, EvmError> {
        let client = self.rpc_client()?;
        let timeout_ms = self.endpoint.timeout_ms;
        self.pool.runtime.block_on(async move {
            let provider = ProviderBuilder::new().on_client(client);
            within("eth_getBalance", timeout_ms, provider.get_balance(address)).await
        })
    }

    fn call(&self, request: CallRequest) -> Result<Bytes, EvmError> {
        let client = self.rpc_client()?;
        let timeout_ms = self.endpoint.timeout_ms;
        self.pool.runtime.block_on(async move {
            let provider = ProviderBuilder::new().on_client(client);
            let mut tx = TransactionRequest::default()
                .with_to(request.to)
                .with_input(request.data);
            if let Some(from) = request.from {
                tx = tx.with_from(from);
            }
            within("eth_call", timeout_ms, provider.call(&tx)).await
        })
    }

    fn send(&self, request: TxRequest) -> Result<TxOutcome, EvmError> {
        let client = self.rpc_client()?;
        let timeout_ms = self.endpoint.timeout_ms;
        let receipt_timeout_ms = self.receipt_timeout_ms;
        let chain_id = self.chain_id;
        let from = request.from();
        let wallet = EthereumWallet::new(request.signer.to_alloy_signer()?);

        self.pool.runtime.block_on(async move {
            let provider = ProviderBuilder::new()
                .with_recommended_fillers()
                .wallet(wallet)
                .on_client(client);

            let nonce = match request.nonce {
                Some(nonce) => nonce,
                None => {
                    within(
                        "eth_getTransactionCount",
                        timeout_ms,
                        provider.get_transaction_count(from).pending(),
                    )
                    .await?
                }
            };

            let mut tx = TransactionRequest::default()
                .with_from(from)
                .with_chain_id(chain_id)
                .with_nonce(nonce)
                .with_value(request.value);
            tx = match request.to {
                TxTarget::Create => tx.with_deploy_code(request.data),
                TxTarget::Call(to) => tx.with_to(to).with_input(request.data),
            };
            if let Some(gas_limit) = request.gas_limit {
                tx = tx.with_gas_limit(gas_limit);
            }

            let pending = within("send transaction", timeout_ms, provider.send_transaction(tx)).await?;
            let tx_hash = *pending.tx_hash();
            info!(target: LOG_TARGET, %tx_hash, %from, nonce, "transaction submitted");

            if !request.wait_for_receipt {
                return Ok(TxOutcome {
                    tx_hash,
                    nonce,
                    contract_address: None,
                    status: None,
                    block_number: None,
                    gas_used: None,
                });
            }

            let receipt = within("get receipt", receipt_timeout_ms, pending.get_receipt()).await?;
            debug!(
                target: LOG_TARGET,
                %tx_hash,
                status = receipt.status(),
                block = ?receipt.block_number,
                "receipt observed"
            );
            Ok(TxOutcome {
                tx_hash,
                nonce,
                contract_address: receipt.contract_address,
                status: Some(receipt.status()),
                block_number: receipt.block_number,
                gas_used: u64::try_from(receipt.gas_used).ok(),
            })
        })
    }
}

async fn within<T, E, F>(operation: &'static str, timeout_ms: u64, future: F) -> Result<T, EvmError>
where
    E: Display,
    F: IntoFuture<Output = Result<T, E>>,
{
    tokio::time::timeout(Duration::from_millis(timeout_ms), future.into_future())
        .await
        .map_err(|_| EvmError::Timeout {
            operation,
            timeout_ms,
        })?
        .map_err(|error| EvmError::Rpc {
            operation,
            reason: error.to_string(),
        })
}

fn provider_error(error: ProviderError) -> EvmError {
    EvmError::Rpc {
        operation: "endpoint",
        reason: error.to_string(),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
