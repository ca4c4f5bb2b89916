use super::{EvmProviderRegistry, EvmRpcEndpoint, EvmRpcTransport, ProviderError};

#[test]
fn registry_builds_for_configured_chain() {
    let endpoint = EvmRpcEndpoint::new("eip155:42", "https://testnet.example").expect("endpoint");
    let registry = EvmProviderRegistry::from_endpoints(vec![endpoint]).expect("registry");
    let loaded = registry.endpoint("eip155:42").expect("must resolve");
    assert_eq!(loaded.rpc_url, "https://testnet.example");
    assert_eq!(loaded.chain_id().expect("chain id"), 42);
}

#[test]
fn registry_rejects_duplicate_chain() {
    let duplicate = EvmProviderRegistry::from_endpoints(vec![
        EvmRpcEndpoint::new("eip155:1", "https://a.example").expect("endpoint"),
        EvmRpcEndpoint::new("eip155:1", "https://b.example").expect("endpoint"),
    ])
    .expect_err("must reject");
    assert!(matches!(duplicate, ProviderError::DuplicateChain(chain) if chain == "eip155:1"));
}

#[test]
fn endpoint_rejects_invalid_chain_url_or_timeout() {
    let chain_error = EvmRpcEndpoint::new("solana:mainnet", "https://eth.example")
        .expect_err("must reject chain");
    assert!(matches!(chain_error, ProviderError::InvalidChain(_)));

    let id_error = EvmRpcEndpoint::new("eip155:abc", "https://eth.example")
        .expect_err("must reject non numeric id");
    assert!(matches!(id_error, ProviderError::InvalidChain(_)));

    let url_error = EvmRpcEndpoint::new("eip155:1", "ftp://eth.example").expect_err("must reject url");
    assert!(matches!(url_error, ProviderError::InvalidRpcUrl(_)));

    let timeout_error = EvmRpcEndpoint::new("eip155:1", "https://eth.example")
        .expect("endpoint")
        .with_timeout_ms(0)
        .expect_err("must reject zero timeout");
    assert_eq!(timeout_error, ProviderError::InvalidTimeout(0));
}

#[test]
fn endpoint_accepts_ws_and_detects_transport() {
    let endpoint = EvmRpcEndpoint::new("eip155:42", "wss://hypothesis.example:30304").expect("wss endpoint");
    assert_eq!(endpoint.transport().expect("transport"), EvmRpcTransport::Ws);
}

#[test]
fn select_uses_single_chain_or_requires_explicit_choice() {
    let single = EvmProviderRegistry::from_endpoints(vec![
        EvmRpcEndpoint::new("eip155:42", "https://a.example").expect("endpoint"),
    ])
    .expect("registry");
    assert_eq!(single.select(None).expect("only chain").chain, "eip155:42");

    let many = EvmProviderRegistry::from_endpoints(vec![
        EvmRpcEndpoint::new("eip155:1", "https://a.example").expect("endpoint"),
        EvmRpcEndpoint::new("eip155:42", "https://b.example").expect("endpoint"),
    ])
    .expect("registry");
    assert!(matches!(many.select(None), Err(ProviderError::AmbiguousChain(_))));
    assert_eq!(many.select(Some("eip155:1")).expect("explicit").rpc_url, "https://a.example");
    assert_eq!(
        EvmProviderRegistry::new().select(None).expect_err("empty"),
        ProviderError::NoChains
    );
}
