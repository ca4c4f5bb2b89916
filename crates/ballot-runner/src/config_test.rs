use super::{
    build_provider_registry, build_signer, load_runner_config, validate_runner_config,
    RunnerConfigError, SignerConfig,
};
use alloy_primitives::U256;
use ballot_engine::ScenarioStep;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const OWNER_KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

#[test]
fn load_runner_config_parses_yaml_with_defaults() {
    let path = write_temp_file(
        "config-ok",
        &format!(
            r#"
schema: ballot-runner/0.0.1
solc:
  min_version: 0.8.4
contract:
  source: contracts/Ballot.sol
chains:
  eip155:42:
    rpc_url: wss://testnet.example:30304
    timeout_ms: 12000
    signer:
      type: evm_private_key
      private_key: {OWNER_KEY}
"#
        ),
    );

    let config = load_runner_config(path.as_path()).expect("config must load");
    assert_eq!(config.contract.name, "Ballot");
    assert_eq!(config.contract.proposals, vec!["proposal1", "proposal2"]);
    assert_eq!(config.scenario.block_interval_ms, 10_000);
    assert_eq!(config.scenario.fund_amount, "1");
    assert_eq!(config.scenario.vote_proposal, 1);
    assert_eq!(config.scenario.gas_limit, 20_000_000);
    assert_eq!(config.solc.binary, PathBuf::from("solc"));

    let source = config.contract.source.as_ref().expect("source");
    assert!(source.is_absolute() || source.starts_with(std::env::temp_dir()));
    assert!(source.ends_with("contracts/Ballot.sol"));

    let registry = build_provider_registry(&config).expect("registry must build");
    let endpoint = registry.select(None).expect("single chain");
    assert_eq!(endpoint.chain, "eip155:42");
    assert_eq!(endpoint.timeout_ms, 12_000);

    let chain = config.chains.get("eip155:42").expect("chain");
    let signer = build_signer("eip155:42", chain)
        .expect("signer must build")
        .expect("signer configured");
    assert_eq!(
        signer.address().to_string(),
        "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
    );

    let options = config.runner_options(chain);
    assert_eq!(options.block_interval, Duration::from_secs(10));
    assert!(options.wait_for_receipt);
}

#[test]
fn scenario_plan_uses_configured_amounts() {
    let path = write_temp_file(
        "config-plan",
        r#"{
  "schema": "ballot-runner/0.0.1",
  "contract": {"artifact": "ballot.json", "proposals": ["alpha", "beta", "gamma"]},
  "scenario": {"fund_amount": "0.5", "vote_proposal": 2, "block_interval_ms": 0},
  "chains": {"eip155:1337": {"rpc_url": "http://127.0.0.1:8545"}}
}"#,
    );

    let config = load_runner_config(path.as_path()).expect("config must load");
    let plan = config.scenario_plan().expect("plan");
    assert_eq!(plan.proposals().len(), 3);
    assert!(plan.steps.contains(&ScenarioStep::Vote {
        voter: ballot_engine::AccountRole::Voter,
        proposal: 2,
    }));
    let half_ether = U256::from(500_000_000_000_000_000u64);
    assert!(plan.steps.iter().any(|step| matches!(
        step,
        ScenarioStep::Fund { amount, .. } if *amount == half_ether
    )));
    assert!(config
        .runner_options(config.chains.get("eip155:1337").expect("chain"))
        .block_interval
        .is_zero());
}

#[test]
fn load_runner_config_reports_every_issue() {
    let path = write_temp_file(
        "config-invalid",
        r#"
schema: ballot-runner/9.9.9
solc:
  min_version: latest
contract:
  source: Ballot.sol
  artifact: ballot.json
  proposals:
    - this proposal name is far too long for bytes32
scenario:
  fund_amount: "0"
  vote_proposal: 4
chains:
  solana:mainnet:
    rpc_url: ftp://rpc.example
    timeout_ms: 0
"#,
    );

    let error = load_runner_config(path.as_path()).expect_err("must reject");
    let issues = match error {
        RunnerConfigError::Validation(issues) => issues,
        other => panic!("unexpected error: {other}"),
    };
    let references = issues
        .iter()
        .filter_map(|issue| issue.reference.as_deref())
        .collect::<Vec<_>>();
    for expected in [
        "runner.config.schema",
        "runner.config.solc.min_version",
        "runner.config.contract.input",
        "runner.config.contract.proposals",
        "runner.config.scenario.fund_amount",
        "runner.config.scenario.vote_proposal",
        "runner.config.chain.unsupported",
        "runner.config.rpc_url",
        "runner.config.timeout",
    ] {
        assert!(references.contains(&expected), "missing {expected}: {references:?}");
    }
    assert!(issues
        .iter()
        .any(|issue| issue.field_path.to_string() == "$.contract.proposals[0]"));
}

#[test]
fn validate_runner_config_requires_chains() {
    let config = serde_yaml::from_str::<super::RunnerConfig>(
        "contract:\n  artifact: ballot.json\n",
    )
    .expect("parse");
    let issues = validate_runner_config(&config);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field_path.to_string(), "$.chains");
}

#[test]
fn keystore_paths_resolve_next_to_config() {
    let path = write_temp_file(
        "config-keystore",
        r#"
contract:
  artifact: ballot.json
chains:
  eip155:42:
    rpc_url: https://rpc.example
    signer:
      type: evm_keystore
      path: keys/owner.json
      password: secret
"#,
    );

    let config = load_runner_config(path.as_path()).expect("config must load");
    let chain = config.chains.get("eip155:42").expect("chain");
    match &chain.signer {
        Some(SignerConfig::EvmKeystore { path: keystore, .. }) => {
            assert_eq!(keystore, &std::env::temp_dir().join("keys/owner.json"));
        }
        other => panic!("unexpected signer: {other:?}"),
    }
    let issue = build_signer("eip155:42", chain).expect_err("keystore file is missing");
    assert_eq!(issue.field_path.to_string(), "$.chains.eip155:42.signer");
}

#[test]
fn load_runner_config_expands_env_placeholders() {
    let env_key = format!("BALLOT_RUNNER_TEST_RPC_{}", std::process::id());
    let env_value = "https://rpc.env.example";
    std::env::set_var(env_key.as_str(), env_value);

    let path = write_temp_file(
        "config-env",
        format!(
            r#"
contract:
  artifact: ballot.json
chains:
  eip155:42:
    rpc_url: ${{{env_key}}}
"#
        )
        .as_str(),
    );

    let config = load_runner_config(path.as_path()).expect("config must load");
    assert_eq!(
        config.chains.get("eip155:42").expect("chain").rpc_url,
        env_value
    );
}

#[test]
fn load_runner_config_rejects_missing_env_var() {
    let path = write_temp_file(
        "config-env-missing",
        "contract:\n  artifact: x.json\nchains:\n  eip155:42:\n    rpc_url: ${BALLOT_RUNNER_SURELY_UNSET_VAR}\n",
    );
    let error = load_runner_config(path.as_path()).expect_err("must reject");
    assert!(error.to_string().contains("BALLOT_RUNNER_SURELY_UNSET_VAR"));
}

#[test]
fn load_runner_config_uses_placeholder_fallback() {
    let path = write_temp_file(
        "config-env-fallback",
        "contract:\n  artifact: x.json\nchains:\n  eip155:42:\n    rpc_url: ${BALLOT_RUNNER_SURELY_UNSET_RPC:-http://127.0.0.1:8545}\n",
    );
    let config = load_runner_config(path.as_path()).expect("config must load");
    assert_eq!(
        config.chains.get("eip155:42").expect("chain").rpc_url,
        "http://127.0.0.1:8545"
    );
}

fn write_temp_file(prefix: &str, content: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time must be monotonic")
        .as_nanos();
    path.push(format!(
        "ballot-runner-{prefix}-{}-{nanos}.tmp",
        std::process::id()
    ));
    fs::write(&path, content).expect("must write temp file");
    path
}
