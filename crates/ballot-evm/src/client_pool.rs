use crate::types::EvmError;
use crate::LOG_TARGET;
use alloy::{
    rpc::client::{BuiltInConnectionString, ClientBuilder, RpcClient},
    transports::BoxTransport,
};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

pub(crate) struct AlloyRpcClientPool {
    pub(crate) runtime: tokio::runtime::Runtime,
    clients: Mutex<BTreeMap<String, CachedRpcClient>>,
}

#[derive(Clone)]
struct CachedRpcClient {
    rpc_url: String,
    timeout_ms: u64,
    client: RpcClient<BoxTransport>,
}

impl AlloyRpcClientPool {
    pub(crate) fn new() -> Result<Self, EvmError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| EvmError::Runtime(error.to_string()))?;
        Ok(Self {
            runtime,
            clients: Mutex::new(BTreeMap::new()),
        })
    }

    pub(crate) fn client(
        &self,
        chain: &str,
        rpc_url: &str,
        timeout_ms: u64,
    ) -> Result<RpcClient<BoxTransport>, EvmError> {
        if let Some(cached) = self.lock_clients()?.get(chain).cloned() {
            if cached.rpc_url == rpc_url && cached.timeout_ms == timeout_ms {
                return Ok(cached.client);
            }
        }
        let connect = rpc_url
            .parse::<BuiltInConnectionString>()
            .map_err(|error| EvmError::Connect {
                rpc_url: rpc_url.to_string(),
                reason: error.to_string(),
            })?;
        let timeout = Duration::from_millis(timeout_ms);
        debug!(target: LOG_TARGET, chain, rpc_url, "connecting rpc client");
        let connect_result = self.runtime.block_on(async move {
            tokio::time::timeout(timeout, ClientBuilder::default().connect_boxed(connect)).await
        });
        let client = match connect_result {
            Ok(Ok(client)) => client,
            Ok(Err(error)) => {
                return Err(EvmError::Connect {
                    rpc_url: rpc_url.to_string(),
                    reason: error.to_string(),
                });
            }
            Err(_) => {
                return Err(EvmError::Timeout {
                    operation: "connect rpc",
                    timeout_ms,
                });
            }
        };
        self.lock_clients()?.insert(
            chain.to_string(),
            CachedRpcClient {
                rpc_url: rpc_url.to_string(),
                timeout_ms,
                client: client.clone(),
            },
        );
        Ok(client)
    }

    fn lock_clients(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, CachedRpcClient>>, EvmError> {
        self.clients
            .lock()
            .map_err(|_| EvmError::Runtime("rpc client pool lock poisoned".to_string()))
    }
}
