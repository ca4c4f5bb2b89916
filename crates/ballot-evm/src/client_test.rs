use super::AlloyChainClient;
use crate::provider::EvmRpcEndpoint;
use crate::signer::LocalPrivateKeySigner;
use crate::types::{ChainClient, EvmError, TxRequest, TxTarget};
use alloy_primitives::Address;

fn unreachable_endpoint() -> EvmRpcEndpoint {
    // Port 9 (discard) is closed on test machines, so connecting fails fast.
    EvmRpcEndpoint::new("eip155:42", "http://127.0.0.1:9")
        .expect("endpoint")
        .with_timeout_ms(2_000)
        .expect("timeout")
}

#[test]
fn client_keeps_endpoint_and_chain_id() {
    let client = AlloyChainClient::new(unreachable_endpoint()).expect("client");
    assert_eq!(client.endpoint().chain, "eip155:42");
    assert_eq!(client.chain_id, 42);
}

#[test]
fn unreachable_node_surfaces_rpc_or_timeout_errors() {
    let client = AlloyChainClient::new(unreachable_endpoint()).expect("client");
    let error = client
        .balance(Address::repeat_byte(0x01))
        .expect_err("node is not running");
    assert!(matches!(
        error,
        EvmError::Rpc { .. } | EvmError::Timeout { .. } | EvmError::Connect { .. }
    ));

    let request = TxRequest::new(LocalPrivateKeySigner::random(), TxTarget::Create);
    assert!(client.send(request).is_err());
}
