use crate::cli::{AccountNewCommand, CompileCommand, OutputFormat, RunCommand, WinnerCommand};
use crate::config::{build_provider_registry, build_signer, load_runner_config, RunnerConfig};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::Address;
use ballot_core::{
    encode_event_jsonl_line, redact_value, RedactMode, RunEventRecord, RunEventType,
    StructuredIssue,
};
use ballot_engine::{
    decode_winner, validate_scenario, ScenarioAccounts, ScenarioContract, ScenarioError,
    ScenarioOutcome, ScenarioPlan, ScenarioRunner,
};
use ballot_evm::{
    dyn_value_to_json, format_ether, parse_address, AbiError, AlloyChainClient, CallRequest,
    ChainClient, ContractAbi, EvmError, LocalPrivateKeySigner, ProviderError,
};
use ballot_solc::{
    load_combined_json, CompileOutput, CompiledContract, SolcCompiler, SolcError, SolcVersion,
};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

const LOG_TARGET: &str = "ballot::runner";

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("runner config load failed: {0}")]
    ConfigLoad(String),
    #[error("runner config invalid: {}", StructuredIssue::join(.0))]
    ConfigInvalid(Vec<StructuredIssue>),
    #[error("compile requires `--config <file>` or `--source <file> --contract <name>`")]
    MissingCompileInput,
    #[error(transparent)]
    Solc(#[from] SolcError),
    #[error("contract `{name}` has no creation bytecode (abstract or interface?)")]
    Undeployable { name: String },
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Evm(#[from] EvmError),
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error("chain `{chain}` has no signer configured; `run` needs one to deploy")]
    MissingSigner { chain: String },
    #[error("invalid contract address `{input}`: {reason}")]
    InvalidAddress { input: String, reason: String },
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("write events JSONL failed: {0}")]
    EventsIo(String),
    #[error("write trace JSONL failed: {0}")]
    TraceIo(String),
    #[error("json encode failed: {0}")]
    JsonEncode(#[from] serde_json::Error),
}

pub fn execute_run(command: &RunCommand) -> Result<String, RunnerError> {
    let config = load_config(command.config.as_path())?;
    let contract = load_contract(&config)?;
    let plan = config.scenario_plan().map_err(RunnerError::ConfigInvalid)?;
    let issues = validate_scenario(&plan);
    if !issues.is_empty() {
        return Err(RunnerError::ConfigInvalid(issues));
    }

    let registry = build_provider_registry(&config).map_err(RunnerError::ConfigInvalid)?;
    let endpoint = registry.select(command.chain.as_deref())?.clone();
    let chain_config = config
        .chains
        .get(endpoint.chain.as_str())
        .ok_or_else(|| ProviderError::ChainNotConfigured(endpoint.chain.clone()))?;
    let owner = build_signer(endpoint.chain.as_str(), chain_config)
        .map_err(|issue| RunnerError::ConfigInvalid(vec![issue]))?;
    let run_id = run_id(&plan, endpoint.chain.as_str())?;

    let abi = ContractAbi::new(contract.abi.clone());
    if command.dry_run {
        let proposals = plan
            .proposals()
            .iter()
            .map(|proposal| DynSolValue::FixedBytes(proposal.as_word(), 32))
            .collect::<Vec<_>>();
        let deploy_data = abi.deploy_data(&contract.bytecode, &[DynSolValue::Array(proposals)])?;
        info!(target: LOG_TARGET, run_id = %run_id, "dry run, network untouched");
        return render_dry_run(
            command,
            &DryRunSummary {
                run_id: run_id.as_str(),
                chain: endpoint.chain.as_str(),
                contract: &contract,
                deploy_data_bytes: deploy_data.len(),
                fund_amount: describe_fund_amount(&config),
                owner: owner.as_ref().map(LocalPrivateKeySigner::address),
            },
            &plan,
        );
    }

    let owner = owner.ok_or_else(|| RunnerError::MissingSigner {
        chain: endpoint.chain.clone(),
    })?;
    let voter = LocalPrivateKeySigner::random();
    info!(
        target: LOG_TARGET,
        run_id = %run_id,
        chain = %endpoint.chain,
        owner = %owner.address(),
        voter = %voter.address(),
        "starting ballot scenario"
    );

    let client = AlloyChainClient::new(endpoint)?
        .with_receipt_timeout_ms(chain_config.receipt_timeout_ms());
    let mut runner = ScenarioRunner::new(
        run_id,
        &client,
        ScenarioContract {
            abi,
            bytecode: contract.bytecode.clone(),
        },
        ScenarioAccounts::new(owner, voter),
    )
    .with_options(config.runner_options(chain_config));
    let result = runner.run(&plan);

    write_event_sinks(command, runner.events(), result.is_err(), &mut io::stdout().lock())?;
    let outcome = result?;
    render_run_output(command, &outcome)
}

pub fn execute_compile(command: &CompileCommand) -> Result<String, RunnerError> {
    let (output, name) = match (&command.config, &command.source, &command.contract) {
        (Some(config_path), _, _) => {
            let config = load_config(config_path.as_path())?;
            (compile_or_load(&config)?, config.contract.name)
        }
        (None, Some(source), Some(name)) => {
            let compiler = SolcCompiler::new(command.solc.clone());
            (compiler.compile_files(&[source.clone()])?, name.clone())
        }
        _ => return Err(RunnerError::MissingCompileInput),
    };
    let contract = output.contract(None, name.as_str())?;
    let functions = contract
        .abi
        .functions()
        .map(|function| function.signature())
        .collect::<Vec<_>>();
    let warnings = output
        .warnings()
        .map(|warning| warning.message.clone())
        .collect::<Vec<_>>();

    let rendered = match command.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "schema": "ballot-runner-compile/0.0.1",
            "contract": contract.name,
            "deployable": contract.is_deployable(),
            "bytecode_bytes": contract.bytecode.len(),
            "functions": functions,
            "warnings": warnings,
        }))?,
        OutputFormat::Text => format!(
            "Ballot compile\ncontract: {}\ndeployable: {}\nbytecode_bytes: {}\nfunctions: {}\nwarnings: {}",
            contract.name,
            contract.is_deployable(),
            contract.bytecode.len(),
            functions.join(","),
            warnings.len()
        ),
    };
    Ok(rendered)
}

pub fn execute_account_new(command: &AccountNewCommand) -> Result<String, RunnerError> {
    let signer = LocalPrivateKeySigner::random();
    let rendered = match command.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "schema": "ballot-runner-account/0.0.1",
            "address": signer.address().to_string(),
            "private_key": signer.private_key_hex(),
        }))?,
        OutputFormat::Text => format!(
            "Ballot account\naddress: {}\nprivate_key: {}",
            signer.address(),
            signer.private_key_hex()
        ),
    };
    Ok(rendered)
}

pub fn execute_winner(command: &WinnerCommand) -> Result<String, RunnerError> {
    let config = load_config(command.config.as_path())?;
    let contract_address =
        parse_address(command.contract_address.as_str()).map_err(|reason| {
            RunnerError::InvalidAddress {
                input: command.contract_address.clone(),
                reason,
            }
        })?;
    let contract = load_contract(&config)?;
    let abi = ContractAbi::new(contract.abi.clone());

    let registry = build_provider_registry(&config).map_err(RunnerError::ConfigInvalid)?;
    let endpoint = registry.select(command.chain.as_deref())?.clone();
    let from = match config.chains.get(endpoint.chain.as_str()) {
        Some(chain_config) => build_signer(endpoint.chain.as_str(), chain_config)
            .map_err(|issue| RunnerError::ConfigInvalid(vec![issue]))?
            .map(|signer| signer.address()),
        None => None,
    };
    let chain = endpoint.chain.clone();
    let client = AlloyChainClient::new(endpoint)?;
    let raw = client.call(CallRequest {
        from,
        to: contract_address,
        data: abi.encode_call("winnerName", &[])?,
    })?;
    let winner = decode_winner(&abi, &raw).map_err(|kind| ScenarioError {
        step_id: "query_winner".to_string(),
        kind,
    })?;
    let outputs = abi
        .decode_output("winnerName", 0, &raw)?
        .iter()
        .map(dyn_value_to_json)
        .collect::<Vec<_>>();

    let rendered = match command.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "schema": "ballot-runner-winner/0.0.1",
            "chain": chain,
            "contract_address": contract_address.to_string(),
            "winner": winner.to_text(),
            "outputs": outputs,
        }))?,
        OutputFormat::Text => format!(
            "Ballot winner\nchain: {chain}\ncontract: {contract_address}\nwinner: {winner}"
        ),
    };
    Ok(rendered)
}

fn load_config(path: &Path) -> Result<RunnerConfig, RunnerError> {
    load_runner_config(path).map_err(|error| RunnerError::ConfigLoad(error.to_string()))
}

/// Compiles the configured source (after the version gate) or reads the artifact.
fn compile_or_load(config: &RunnerConfig) -> Result<CompileOutput, RunnerError> {
    if let Some(artifact) = &config.contract.artifact {
        debug!(target: LOG_TARGET, artifact = %artifact.display(), "loading contract artifact");
        return Ok(load_combined_json(artifact)?);
    }
    let Some(source) = &config.contract.source else {
        return Err(RunnerError::MissingCompileInput);
    };
    let compiler = SolcCompiler::new(config.solc.binary.clone());
    if let Some(min_version) = &config.solc.min_version {
        let required = min_version.parse::<SolcVersion>()?;
        compiler.ensure_min_version(required)?;
    }
    Ok(compiler.compile_files(&[source.clone()])?)
}

fn load_contract(config: &RunnerConfig) -> Result<CompiledContract, RunnerError> {
    let output = compile_or_load(config)?;
    let source = config
        .contract
        .source
        .as_ref()
        .map(|path| path.display().to_string());
    let contract = output
        .contract(source.as_deref(), config.contract.name.as_str())?
        .clone();
    if !contract.is_deployable() {
        return Err(RunnerError::Undeployable {
            name: contract.name,
        });
    }
    Ok(contract)
}

struct DryRunSummary<'a> {
    run_id: &'a str,
    chain: &'a str,
    contract: &'a CompiledContract,
    deploy_data_bytes: usize,
    fund_amount: String,
    owner: Option<Address>,
}

fn render_dry_run(
    command: &RunCommand,
    summary: &DryRunSummary<'_>,
    plan: &ScenarioPlan,
) -> Result<String, RunnerError> {
    let steps = plan
        .steps
        .iter()
        .map(|step| step.id())
        .collect::<Vec<_>>();
    let owner = summary.owner.map(|address| address.to_string());
    let output = match command.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "schema": "ballot-runner-run/0.0.1",
            "status": "dry_run",
            "run_id": summary.run_id,
            "chain": summary.chain,
            "contract": summary.contract.name,
            "deploy_data_bytes": summary.deploy_data_bytes,
            "fund_amount": summary.fund_amount,
            "owner": owner,
            "plan": plan,
        }))?,
        OutputFormat::Text => format!(
            "Ballot dry run\nrun_id: {}\nchain: {}\ncontract: {}\ndeploy_data_bytes: {}\nfund_amount: {}\nowner: {}\nsteps: {}",
            summary.run_id,
            summary.chain,
            summary.contract.name,
            summary.deploy_data_bytes,
            summary.fund_amount,
            owner.unwrap_or_else(|| "none".to_string()),
            steps.join(",")
        ),
    };
    Ok(output)
}

fn render_run_output(command: &RunCommand, outcome: &ScenarioOutcome) -> Result<String, RunnerError> {
    if command.events_jsonl.as_deref() == Some("-") {
        let mut out = String::new();
        for event in &outcome.events {
            out.push_str(
                encode_event_jsonl_line(event)
                    .map_err(|error| RunnerError::EventsIo(error.to_string()))?
                    .as_str(),
            );
        }
        return Ok(out);
    }

    let contract_address = outcome
        .contract_address
        .map(|address| address.to_string())
        .unwrap_or_else(|| "none".to_string());
    let winner = outcome
        .winner
        .map(|winner| winner.to_text())
        .unwrap_or_else(|| "none".to_string());
    let funded = outcome
        .steps
        .iter()
        .find(|step| step.id == "fund")
        .and_then(|step| step.tx.as_ref())
        .map(|tx| tx.tx_hash.to_string())
        .unwrap_or_else(|| "none".to_string());
    let waited_ms = outcome.steps.iter().map(|step| step.waited_ms).sum::<u64>();

    let output = match command.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "schema": "ballot-runner-run/0.0.1",
            "status": "completed",
            "run_id": outcome.run_id,
            "chain_id": outcome.chain_id,
            "owner": outcome.owner.to_string(),
            "voter": outcome.voter.to_string(),
            "contract_address": outcome.contract_address.map(|address| address.to_string()),
            "winner": outcome.winner.map(|winner| winner.to_text()),
            "steps": outcome.steps,
            "waited_ms": waited_ms,
            "events_emitted": outcome.events.len(),
        }))?,
        OutputFormat::Text => format!(
            "Ballot run\nstatus: completed\nrun_id: {}\nchain_id: {}\nowner: {}\nvoter: {}\ncontract: {contract_address}\nfund_tx: {funded}\nwaited_ms: {waited_ms}\nwinner: {winner}\nevents: {}",
            outcome.run_id,
            outcome.chain_id,
            outcome.owner,
            outcome.voter,
            outcome.events.len()
        ),
    };
    Ok(output)
}

/// Writes events to the configured sinks. A successful run renders `-` events
/// as its output, a failed one streams them to `stdout` here.
fn write_event_sinks(
    command: &RunCommand,
    events: &[RunEventRecord],
    run_failed: bool,
    stdout: &mut dyn Write,
) -> Result<(), RunnerError> {
    if command.verbose {
        write_verbose_events(events);
    }

    match command.events_jsonl.as_deref() {
        Some("-") if run_failed => write_event_lines(stdout, events)?,
        Some("-") | None => {}
        Some(target) => {
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(target)
                .map_err(|error| RunnerError::EventsIo(error.to_string()))?;
            write_event_lines(&mut file, events)?;
        }
    }

    if let Some(path) = &command.trace {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|error| RunnerError::TraceIo(error.to_string()))?;
        let mode = RedactMode::from(command.trace_redact);
        for event in events {
            let line = encode_trace_jsonl_line(event, mode)?;
            file.write_all(line.as_bytes())
                .map_err(|error| RunnerError::TraceIo(error.to_string()))?;
        }
    }

    Ok(())
}

fn write_event_lines(out: &mut dyn Write, events: &[RunEventRecord]) -> Result<(), RunnerError> {
    for event in events {
        let line = encode_event_jsonl_line(event)
            .map_err(|error| RunnerError::EventsIo(error.to_string()))?;
        out.write_all(line.as_bytes())
            .map_err(|error| RunnerError::EventsIo(error.to_string()))?;
    }
    out.flush()
        .map_err(|error| RunnerError::EventsIo(error.to_string()))
}

fn encode_trace_jsonl_line(record: &RunEventRecord, mode: RedactMode) -> Result<String, RunnerError> {
    let redacted = redact_value(&serde_json::to_value(record)?, mode);
    let mut line = serde_json::to_string(&redacted)?;
    line.push('\n');
    Ok(line)
}

fn write_verbose_events(events: &[RunEventRecord]) {
    for record in events {
        let step_id = record.event.step_id.as_deref().unwrap_or("-");
        let tx_hash = record
            .event
            .data
            .get("tx_hash")
            .and_then(Value::as_str)
            .unwrap_or("-");
        eprintln!(
            "[event seq={} type={} step={} tx={}]",
            record.seq,
            record.event.event_type.as_str(),
            step_id,
            tx_hash
        );
        if record.event.event_type == RunEventType::Error {
            if let Ok(detail) = serde_json::to_string(&record.event.data) {
                eprintln!("[event detail seq={}] {}", record.seq, detail);
            }
        }
    }
}

/// Short id tying events of one run together: plan, chain and start time hashed.
fn run_id(plan: &ScenarioPlan, chain: &str) -> Result<String, RunnerError> {
    let started_ns = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or(0);
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(plan)?);
    hasher.update(chain.as_bytes());
    hasher.update(started_ns.to_le_bytes());
    let digest = hasher.finalize();
    Ok(digest[..8].iter().map(|b| format!("{b:02x}")).collect::<String>())
}

fn describe_fund_amount(config: &RunnerConfig) -> String {
    config
        .fund_amount_wei()
        .map(|wei| format!("{} ether", format_ether(wei)))
        .unwrap_or_else(|_| config.scenario.fund_amount.clone())
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
