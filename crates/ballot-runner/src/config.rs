use alloy_primitives::U256;
use ballot_core::{FieldPath, ProposalName, StructuredIssue};
use ballot_engine::{ReceivePoll, ScenarioPlan, ScenarioRunnerOptions};
use ballot_evm::{
    parse_ether, EvmProviderRegistry, EvmRpcEndpoint, LocalPrivateKeySigner,
    DEFAULT_RECEIPT_TIMEOUT_MS,
};
use ballot_evm::provider::parse_eip155_chain_id;
use ballot_solc::SolcVersion;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const RUNNER_CONFIG_SCHEMA_0_0_1: &str = "ballot-runner/0.0.1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_runner_schema")]
    pub schema: String,
    #[serde(default)]
    pub solc: SolcConfig,
    pub contract: ContractConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
    #[serde(default)]
    pub chains: BTreeMap<String, ChainConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolcConfig {
    #[serde(default = "default_solc_binary")]
    pub binary: PathBuf,
    #[serde(default)]
    pub min_version: Option<String>,
}

impl Default for SolcConfig {
    fn default() -> Self {
        Self {
            binary: default_solc_binary(),
            min_version: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Solidity source handed to solc.
    #[serde(default)]
    pub source: Option<PathBuf>,
    /// Precompiled `solc --combined-json abi,bin` output.
    #[serde(default)]
    pub artifact: Option<PathBuf>,
    #[serde(default = "default_contract_name")]
    pub name: String,
    #[serde(default = "default_proposals")]
    pub proposals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_block_interval_ms")]
    pub block_interval_ms: u64,
    /// Ether amount the owner sends the voter, as a decimal string.
    #[serde(default = "default_fund_amount")]
    pub fund_amount: String,
    #[serde(default = "default_vote_proposal")]
    pub vote_proposal: u64,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default)]
    pub receive_poll: PollConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            block_interval_ms: default_block_interval_ms(),
            fund_amount: default_fund_amount(),
            vote_proposal: default_vote_proposal(),
            gas_limit: default_gas_limit(),
            receive_poll: PollConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        let poll = ReceivePoll::default();
        Self {
            interval_ms: u64::try_from(poll.interval.as_millis()).unwrap_or(u64::MAX),
            max_attempts: poll.max_attempts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub wait_for_receipt: Option<bool>,
    #[serde(default)]
    pub receipt_timeout_ms: Option<u64>,
    #[serde(default)]
    pub signer: Option<SignerConfig>,
}

impl ChainConfig {
    pub fn receipt_timeout_ms(&self) -> u64 {
        self.receipt_timeout_ms.unwrap_or(DEFAULT_RECEIPT_TIMEOUT_MS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignerConfig {
    EvmPrivateKey { private_key: String },
    /// Web3 Secret Storage file.
    EvmKeystore { path: PathBuf, password: String },
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerConfigError {
    #[error("read runner config failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("runner config parse failed: {0}")]
    Parse(String),
    #[error("runner config validation failed: {}", StructuredIssue::join(.0))]
    Validation(Vec<StructuredIssue>),
}

pub fn load_runner_config(path: &Path) -> Result<RunnerConfig, RunnerConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| RunnerConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let expanded = expand_env_placeholders(raw.as_str()).map_err(RunnerConfigError::Parse)?;
    let mut config: RunnerConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(expanded.as_str()).map_err(|error| {
            RunnerConfigError::Parse(format!("json decode error: {error}"))
        })?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(expanded.as_str()).map_err(|error| {
            RunnerConfigError::Parse(format!("yaml decode error: {error}"))
        })?,
        _ => serde_yaml::from_str(expanded.as_str())
            .or_else(|_| serde_json::from_str(expanded.as_str()))
            .map_err(|error| RunnerConfigError::Parse(error.to_string()))?,
    };
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }

    let mut issues = validate_runner_config(&config);
    StructuredIssue::sort_stable(&mut issues);
    if !issues.is_empty() {
        return Err(RunnerConfigError::Validation(issues));
    }
    Ok(config)
}

pub fn validate_runner_config(config: &RunnerConfig) -> Vec<StructuredIssue> {
    let mut issues = Vec::<StructuredIssue>::new();
    if config.schema != RUNNER_CONFIG_SCHEMA_0_0_1 {
        issues.push(config_issue(
            "runner.config.schema",
            FieldPath::from_keys(["schema"]),
            format!(
                "unsupported runner config schema `{}` (expected `{RUNNER_CONFIG_SCHEMA_0_0_1}`)",
                config.schema
            ),
        ));
    }

    if let Some(min_version) = &config.solc.min_version {
        if min_version.parse::<SolcVersion>().is_err() {
            issues.push(config_issue(
                "runner.config.solc.min_version",
                FieldPath::from_keys(["solc", "min_version"]),
                format!("min_version `{min_version}` is not a semver triple"),
            ));
        }
    }

    validate_contract(&config.contract, &mut issues);
    validate_scenario_config(config, &mut issues);

    if config.chains.is_empty() {
        issues.push(config_issue(
            "runner.config.chains.non_empty",
            FieldPath::from_keys(["chains"]),
            "runner config must define at least one chain".to_string(),
        ));
    }
    for (chain, chain_config) in &config.chains {
        let path = chain_path(chain);
        if parse_eip155_chain_id(chain).is_err() {
            issues.push(config_issue(
                "runner.config.chain.unsupported",
                path.clone(),
                format!("unsupported chain id `{chain}` (expected `eip155:<id>`)"),
            ));
        }
        if !is_supported_rpc_url(chain_config.rpc_url.as_str()) {
            issues.push(config_issue(
                "runner.config.rpc_url",
                path.clone().key("rpc_url"),
                format!("rpc_url for `{chain}` must be http(s) or ws(s)"),
            ));
        }
        for (field, value) in [
            ("timeout_ms", chain_config.timeout_ms),
            ("receipt_timeout_ms", chain_config.receipt_timeout_ms),
        ] {
            if matches!(value, Some(0)) {
                issues.push(config_issue(
                    "runner.config.timeout",
                    path.clone().key(field),
                    format!("{field} for `{chain}` must be > 0"),
                ));
            }
        }
        match &chain_config.signer {
            Some(SignerConfig::EvmPrivateKey { private_key }) if private_key.trim().is_empty() => {
                issues.push(config_issue(
                    "runner.config.signer",
                    path.key("signer").key("private_key"),
                    format!("signer private_key for `{chain}` is empty"),
                ));
            }
            Some(SignerConfig::EvmKeystore { path: keystore, .. })
                if keystore.as_os_str().is_empty() =>
            {
                issues.push(config_issue(
                    "runner.config.signer",
                    path.key("signer").key("path"),
                    format!("signer keystore path for `{chain}` is empty"),
                ));
            }
            _ => {}
        }
    }

    issues
}

fn validate_contract(contract: &ContractConfig, issues: &mut Vec<StructuredIssue>) {
    if contract.source.is_some() == contract.artifact.is_some() {
        issues.push(config_issue(
            "runner.config.contract.input",
            FieldPath::from_keys(["contract"]),
            "contract needs exactly one of `source` or `artifact`".to_string(),
        ));
    }
    if contract.name.trim().is_empty() {
        issues.push(config_issue(
            "runner.config.contract.name",
            FieldPath::from_keys(["contract", "name"]),
            "contract name must not be empty".to_string(),
        ));
    }
    if contract.proposals.is_empty() {
        issues.push(config_issue(
            "runner.config.contract.proposals",
            FieldPath::from_keys(["contract", "proposals"]),
            "at least one proposal is required".to_string(),
        ));
    }
    for (index, proposal) in contract.proposals.iter().enumerate() {
        if let Err(error) = ProposalName::from_text(proposal) {
            issues.push(config_issue(
                "runner.config.contract.proposals",
                FieldPath::from_keys(["contract", "proposals"]).index(index),
                error.to_string(),
            ));
        }
    }
}

fn validate_scenario_config(config: &RunnerConfig, issues: &mut Vec<StructuredIssue>) {
    let scenario = &config.scenario;
    let proposal_count = config.contract.proposals.len();
    if !config.contract.proposals.is_empty() && scenario.vote_proposal as usize >= proposal_count {
        issues.push(config_issue(
            "runner.config.scenario.vote_proposal",
            FieldPath::from_keys(["scenario", "vote_proposal"]),
            format!(
                "vote_proposal {} out of range for {proposal_count} proposal(s)",
                scenario.vote_proposal
            ),
        ));
    }
    match parse_ether(scenario.fund_amount.as_str()) {
        Ok(amount) if amount.is_zero() => issues.push(config_issue(
            "runner.config.scenario.fund_amount",
            FieldPath::from_keys(["scenario", "fund_amount"]),
            "fund_amount must be > 0".to_string(),
        )),
        Ok(_) => {}
        Err(error) => issues.push(config_issue(
            "runner.config.scenario.fund_amount",
            FieldPath::from_keys(["scenario", "fund_amount"]),
            format!("fund_amount `{}` is not an ether amount: {error}", scenario.fund_amount),
        )),
    }
    if scenario.gas_limit == 0 {
        issues.push(config_issue(
            "runner.config.scenario.gas_limit",
            FieldPath::from_keys(["scenario", "gas_limit"]),
            "gas_limit must be > 0".to_string(),
        ));
    }
    if scenario.receive_poll.max_attempts == 0 {
        issues.push(config_issue(
            "runner.config.scenario.receive_poll",
            FieldPath::from_keys(["scenario", "receive_poll", "max_attempts"]),
            "receive_poll.max_attempts must be > 0".to_string(),
        ));
    }
}

impl RunnerConfig {
    /// Makes relative file paths relative to the config file's directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() && !path.as_os_str().is_empty() {
                *path = base.join(&*path);
            }
        };
        if let Some(source) = self.contract.source.as_mut() {
            resolve(source);
        }
        if let Some(artifact) = self.contract.artifact.as_mut() {
            resolve(artifact);
        }
        for chain in self.chains.values_mut() {
            if let Some(SignerConfig::EvmKeystore { path, .. }) = chain.signer.as_mut() {
                resolve(path);
            }
        }
    }

    pub fn proposal_names(&self) -> Result<Vec<ProposalName>, Vec<StructuredIssue>> {
        let mut issues = Vec::new();
        validate_contract(&self.contract, &mut issues);
        if !issues.is_empty() {
            return Err(issues);
        }
        self.contract
            .proposals
            .iter()
            .map(|proposal| ProposalName::from_text(proposal))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| {
                vec![config_issue(
                    "runner.config.contract.proposals",
                    FieldPath::from_keys(["contract", "proposals"]),
                    error.to_string(),
                )]
            })
    }

    pub fn fund_amount_wei(&self) -> Result<U256, StructuredIssue> {
        parse_ether(self.scenario.fund_amount.as_str()).map_err(|error| {
            config_issue(
                "runner.config.scenario.fund_amount",
                FieldPath::from_keys(["scenario", "fund_amount"]),
                error,
            )
        })
    }

    pub fn scenario_plan(&self) -> Result<ScenarioPlan, Vec<StructuredIssue>> {
        let proposals = self.proposal_names()?;
        let fund_amount = self.fund_amount_wei().map_err(|issue| vec![issue])?;
        Ok(ScenarioPlan::ballot_demo(
            proposals,
            fund_amount,
            self.scenario.vote_proposal,
        ))
    }

    pub fn runner_options(&self, chain: &ChainConfig) -> ScenarioRunnerOptions {
        ScenarioRunnerOptions {
            block_interval: Duration::from_millis(self.scenario.block_interval_ms),
            gas_limit: self.scenario.gas_limit,
            wait_for_receipt: chain.wait_for_receipt.unwrap_or(true),
            receive_poll: ReceivePoll {
                interval: Duration::from_millis(self.scenario.receive_poll.interval_ms),
                max_attempts: self.scenario.receive_poll.max_attempts,
            },
        }
    }
}

pub fn build_provider_registry(
    config: &RunnerConfig,
) -> Result<EvmProviderRegistry, Vec<StructuredIssue>> {
    let mut issues = validate_runner_config(config);
    if !issues.is_empty() {
        StructuredIssue::sort_stable(&mut issues);
        return Err(issues);
    }

    let mut endpoints = Vec::new();
    for (chain, chain_config) in &config.chains {
        match build_endpoint(chain, chain_config) {
            Ok(endpoint) => endpoints.push(endpoint),
            Err(issue) => issues.push(issue),
        }
    }
    if !issues.is_empty() {
        StructuredIssue::sort_stable(&mut issues);
        return Err(issues);
    }
    EvmProviderRegistry::from_endpoints(endpoints).map_err(|error| {
        vec![config_issue(
            "runner.config.evm.registry",
            FieldPath::from_keys(["chains"]),
            format!("build evm provider registry failed: {error}"),
        )]
    })
}

fn build_endpoint(chain: &str, chain_config: &ChainConfig) -> Result<EvmRpcEndpoint, StructuredIssue> {
    let mut endpoint = EvmRpcEndpoint::new(chain.to_string(), chain_config.rpc_url.clone())
        .map_err(|error| {
            chain_issue(chain, "runner.config.evm.endpoint", format!("invalid evm endpoint: {error}"))
        })?;
    if let Some(timeout_ms) = chain_config.timeout_ms {
        endpoint = endpoint.with_timeout_ms(timeout_ms).map_err(|error| {
            chain_issue(chain, "runner.config.evm.endpoint", format!("invalid evm timeout: {error}"))
        })?;
    }
    Ok(endpoint)
}

/// Loads the configured signer of `chain`, decrypting a keystore if needed.
pub fn build_signer(
    chain: &str,
    chain_config: &ChainConfig,
) -> Result<Option<LocalPrivateKeySigner>, StructuredIssue> {
    let signer = match &chain_config.signer {
        None => return Ok(None),
        Some(SignerConfig::EvmPrivateKey { private_key }) => {
            LocalPrivateKeySigner::from_hex(private_key.as_str())
        }
        Some(SignerConfig::EvmKeystore { path, password }) => {
            LocalPrivateKeySigner::from_keystore(path, password.as_str())
        }
    };
    signer.map(Some).map_err(|error| {
        config_issue(
            "runner.config.evm.signer",
            chain_path(chain).key("signer"),
            format!("invalid evm signer: {error}"),
        )
    })
}

fn chain_path(chain: &str) -> FieldPath {
    FieldPath::from_keys(["chains", chain])
}

fn chain_issue(chain: &str, reference: &str, message: String) -> StructuredIssue {
    config_issue(reference, chain_path(chain), message)
}

fn config_issue(reference: &str, path: FieldPath, message: String) -> StructuredIssue {
    StructuredIssue::error("runner_config_error", reference, path, message)
}

fn default_runner_schema() -> String {
    RUNNER_CONFIG_SCHEMA_0_0_1.to_string()
}

fn default_solc_binary() -> PathBuf {
    PathBuf::from(ballot_solc::DEFAULT_SOLC_BINARY)
}

fn default_contract_name() -> String {
    "Ballot".to_string()
}

fn default_proposals() -> Vec<String> {
    vec!["proposal1".to_string(), "proposal2".to_string()]
}

fn default_block_interval_ms() -> u64 {
    u64::try_from(ballot_engine::DEFAULT_BLOCK_INTERVAL.as_millis()).unwrap_or(10_000)
}

fn default_fund_amount() -> String {
    "1".to_string()
}

fn default_vote_proposal() -> u64 {
    1
}

fn default_gas_limit() -> u64 {
    ballot_engine::DEFAULT_CALL_GAS_LIMIT
}

fn is_supported_rpc_url(value: &str) -> bool {
    value.starts_with("http://")
        || value.starts_with("https://")
        || value.starts_with("ws://")
        || value.starts_with("wss://")
}

/// Expands `${NAME}` and `${NAME:-fallback}` from the process environment.
fn expand_env_placeholders(input: &str) -> Result<String, String> {
    let pattern = Regex::new(r"\$\{([^}:]*)(?::-([^}]*))?\}")
        .map_err(|error| format!("env placeholder pattern: {error}"))?;
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;
    for captures in pattern.captures_iter(input) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        out.push_str(&input[cursor..whole.start()]);
        let key = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        if key.is_empty() {
            return Err("empty env placeholder `${}`".to_string());
        }
        match (std::env::var(key), captures.get(2)) {
            (Ok(value), _) => out.push_str(value.as_str()),
            (Err(_), Some(fallback)) => out.push_str(fallback.as_str()),
            (Err(_), None) => {
                return Err(format!("env var `{key}` is not set"));
            }
        }
        cursor = whole.end();
    }
    let rest = &input[cursor..];
    if rest.contains("${") {
        return Err("unterminated env placeholder `${...`".to_string());
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
