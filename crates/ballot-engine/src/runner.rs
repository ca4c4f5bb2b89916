use crate::pacer::{BlockPacer, Sleeper, ThreadSleeper, DEFAULT_BLOCK_INTERVAL};
use crate::scenario::{validate_scenario, AccountRole, ScenarioAccounts, ScenarioPlan, ScenarioStep};
use crate::LOG_TARGET;
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, B256, U256};
use ballot_core::{ProposalName, RunEvent, RunEventRecord, RunEventStream, RunEventType, StructuredIssue};
use ballot_evm::{
    contract_address, AbiError, CallRequest, ChainClient, ContractAbi, EvmError, TxOutcome,
    TxRequest, TxTarget, TRANSFER_GAS_LIMIT,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Gas limit for deployment and contract calls.
pub const DEFAULT_CALL_GAS_LIMIT: u64 = 20_000_000;

const WINNER_FUNCTION: &str = "winnerName";

/// Compiled ballot contract: abi plus creation bytecode.
#[derive(Debug, Clone)]
pub struct ScenarioContract {
    pub abi: ContractAbi,
    pub bytecode: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceivePoll {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for ReceivePoll {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioRunnerOptions {
    pub block_interval: Duration,
    pub gas_limit: u64,
    pub wait_for_receipt: bool,
    pub receive_poll: ReceivePoll,
}

impl Default for ScenarioRunnerOptions {
    fn default() -> Self {
        Self {
            block_interval: DEFAULT_BLOCK_INTERVAL,
            gas_limit: DEFAULT_CALL_GAS_LIMIT,
            wait_for_receipt: true,
            receive_poll: ReceivePoll::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx: Option<TxOutcome>,
    pub waited_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioOutcome {
    pub run_id: String,
    pub chain_id: u64,
    pub owner: Address,
    pub voter: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<ProposalName>,
    pub steps: Vec<StepReport>,
    pub events: Vec<RunEventRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioErrorKind {
    #[error("invalid scenario: {0}")]
    Invalid(String),
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error(transparent)]
    Chain(#[from] EvmError),
    #[error("transaction {tx_hash} reverted")]
    StepReverted { tx_hash: B256 },
    #[error("contract deployed at {actual}, expected {expected}")]
    ContractAddressMismatch { expected: Address, actual: Address },
    #[error("contract is not deployed yet")]
    MissingContract,
    #[error("{account} balance {balance} stayed below {required} after {attempts} poll(s)")]
    ReceiveTimeout {
        account: Address,
        balance: U256,
        required: U256,
        attempts: u32,
    },
    #[error("unexpected `winnerName` output: {0}")]
    UnexpectedWinner(String),
}

#[derive(Debug, thiserror::Error)]
#[error("step `{step_id}` failed: {kind}")]
pub struct ScenarioError {
    pub step_id: String,
    #[source]
    pub kind: ScenarioErrorKind,
}

impl ScenarioError {
    fn new(step_id: impl Into<String>, kind: impl Into<ScenarioErrorKind>) -> Self {
        Self {
            step_id: step_id.into(),
            kind: kind.into(),
        }
    }
}

/// Drives a [`ScenarioPlan`] against a chain, one step at a time.
pub struct ScenarioRunner<'a> {
    client: &'a dyn ChainClient,
    sleeper: &'a dyn Sleeper,
    contract: ScenarioContract,
    accounts: ScenarioAccounts,
    options: ScenarioRunnerOptions,
    pacer: BlockPacer,
    stream: RunEventStream,
    events: Vec<RunEventRecord>,
    next_nonce: HashMap<Address, u64>,
    contract_address: Option<Address>,
    winner: Option<ProposalName>,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(
        run_id: impl Into<String>,
        client: &'a dyn ChainClient,
        contract: ScenarioContract,
        accounts: ScenarioAccounts,
    ) -> Self {
        let options = ScenarioRunnerOptions::default();
        Self {
            client,
            sleeper: &ThreadSleeper,
            contract,
            accounts,
            pacer: BlockPacer::new(options.block_interval),
            options,
            stream: RunEventStream::new(run_id),
            events: Vec::new(),
            next_nonce: HashMap::new(),
            contract_address: None,
            winner: None,
        }
    }

    pub fn with_options(mut self, options: ScenarioRunnerOptions) -> Self {
        self.pacer = BlockPacer::new(options.block_interval);
        self.options = options;
        self
    }

    pub fn with_sleeper(mut self, sleeper: &'a dyn Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Events emitted so far, including those of a failed run.
    pub fn events(&self) -> &[RunEventRecord] {
        &self.events
    }

    pub fn run(&mut self, plan: &ScenarioPlan) -> Result<ScenarioOutcome, ScenarioError> {
        let issues = validate_scenario(plan);
        if !issues.is_empty() {
            let error = ScenarioError::new("plan", ScenarioErrorKind::Invalid(StructuredIssue::join(&issues)));
            self.emit_error(&error);
            return Err(error);
        }

        let chain_id = match self.client.chain_id() {
            Ok(chain_id) => chain_id,
            Err(error) => {
                let error = ScenarioError::new("connect", error);
                self.emit_error(&error);
                return Err(error);
            }
        };
        let owner = self.accounts.address(AccountRole::Owner);
        let voter = self.accounts.address(AccountRole::Voter);
        info!(target: LOG_TARGET, chain_id, %owner, %voter, steps = plan.steps.len(), "scenario ready");
        self.emit(
            RunEvent::new(RunEventType::ScenarioReady)
                .with("chain_id", chain_id)
                .with("owner", owner.to_string())
                .with("voter", voter.to_string())
                .with("steps", plan.steps.len()),
        );

        let mut steps = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            let step_id = step.id();
            info!(target: LOG_TARGET, step = step_id, "step started");
            self.emit(RunEvent::for_step(RunEventType::StepStarted, step_id));
            match self.execute_step(step) {
                Ok(report) => {
                    let mut completed = RunEvent::for_step(RunEventType::StepCompleted, step_id);
                    if let Some(tx) = &report.tx {
                        completed = completed.with("tx_hash", tx.tx_hash.to_string());
                    }
                    self.emit(completed);
                    steps.push(report);
                }
                Err(kind) => {
                    let error = ScenarioError::new(step_id, kind);
                    self.emit_error(&error);
                    return Err(error);
                }
            }
        }

        let mut completed = RunEvent::new(RunEventType::ScenarioCompleted);
        if let Some(address) = self.contract_address {
            completed = completed.with("contract_address", address.to_string());
        }
        if let Some(winner) = self.winner {
            completed = completed.with("winner", winner.to_text());
        }
        self.emit(completed);
        info!(target: LOG_TARGET, "scenario completed");

        Ok(ScenarioOutcome {
            run_id: self.stream.run_id().to_string(),
            chain_id,
            owner,
            voter,
            contract_address: self.contract_address,
            winner: self.winner,
            steps,
            events: self.events.clone(),
        })
    }

    fn execute_step(&mut self, step: &ScenarioStep) -> Result<StepReport, ScenarioErrorKind> {
        let step_id = step.id();
        match step {
            ScenarioStep::Deploy { proposals } => self.deploy(step_id, proposals),
            ScenarioStep::GiveRightToVote { voter } => {
                let voter = self.accounts.address(*voter);
                self.call_contract(
                    step_id,
                    AccountRole::Owner,
                    "giveRightToVote",
                    vec![DynSolValue::Address(voter)],
                )
            }
            ScenarioStep::Delegate { from, to } => {
                let to = self.accounts.address(*to);
                self.call_contract(step_id, *from, "delegate", vec![DynSolValue::Address(to)])
            }
            ScenarioStep::Vote { voter, proposal } => self.call_contract(
                step_id,
                *voter,
                "vote",
                vec![DynSolValue::Uint(U256::from(*proposal), 256)],
            ),
            ScenarioStep::Fund { from, to, amount } => {
                let mut request = TxRequest::new(
                    self.accounts.signer(*from).clone(),
                    TxTarget::Call(self.accounts.address(*to)),
                );
                request.value = *amount;
                request.gas_limit = Some(TRANSFER_GAS_LIMIT);
                self.submit(step_id, request)
            }
            ScenarioStep::Receive {
                account,
                min_balance,
            } => self.receive(step_id, *account, *min_balance),
            ScenarioStep::QueryWinner { from } => self.query_winner(step_id, *from),
        }
    }

    fn deploy(
        &mut self,
        step_id: &str,
        proposals: &[ProposalName],
    ) -> Result<StepReport, ScenarioErrorKind> {
        let owner = self.accounts.signer(AccountRole::Owner).clone();
        let nonce = self.nonce_for(owner.address())?;
        let names = proposals
            .iter()
            .map(|proposal| DynSolValue::FixedBytes(proposal.as_word(), 32))
            .collect::<Vec<_>>();
        let data = self
            .contract
            .abi
            .deploy_data(&self.contract.bytecode, &[DynSolValue::Array(names)])?;
        let expected = contract_address(owner.address(), nonce);

        let mut request = TxRequest::new(owner, TxTarget::Create);
        request.data = data;
        request.nonce = Some(nonce);
        let report = self.submit(step_id, request)?;

        if let Some(actual) = report.tx.as_ref().and_then(|tx| tx.contract_address) {
            if actual != expected {
                return Err(ScenarioErrorKind::ContractAddressMismatch { expected, actual });
            }
        }
        info!(target: LOG_TARGET, contract = %expected, nonce, "contract deployed");
        self.contract_address = Some(expected);
        Ok(report)
    }

    fn call_contract(
        &mut self,
        step_id: &str,
        sender: AccountRole,
        function: &str,
        args: Vec<DynSolValue>,
    ) -> Result<StepReport, ScenarioErrorKind> {
        let contract = self
            .contract_address
            .ok_or(ScenarioErrorKind::MissingContract)?;
        let mut request = TxRequest::new(
            self.accounts.signer(sender).clone(),
            TxTarget::Call(contract),
        );
        request.data = self.contract.abi.encode_call(function, &args)?;
        self.submit(step_id, request)
    }

    /// Paces, sends and checks a transaction. Gas defaults to the configured limit.
    fn submit(
        &mut self,
        step_id: &str,
        mut request: TxRequest,
    ) -> Result<StepReport, ScenarioErrorKind> {
        let sender = request.from();
        if request.gas_limit.is_none() {
            request.gas_limit = Some(self.options.gas_limit);
        }
        request.wait_for_receipt = self.options.wait_for_receipt;
        if request.nonce.is_none() {
            request.nonce = Some(self.nonce_for(sender)?);
        }

        let remaining = self.pacer.remaining(sender, Instant::now());
        if !remaining.is_zero() {
            self.emit(
                RunEvent::for_step(RunEventType::BlockWaiting, step_id)
                    .with("account", sender.to_string())
                    .with("wait_ms", duration_ms(remaining)),
            );
        }
        let waited = self.pacer.wait(sender, self.sleeper);

        let outcome = self.client.send(request)?;
        self.pacer.record(sender, Instant::now());
        self.next_nonce.insert(sender, outcome.nonce + 1);
        self.emit(
            RunEvent::for_step(RunEventType::TxSent, step_id)
                .with("tx_hash", outcome.tx_hash.to_string())
                .with("from", sender.to_string())
                .with("nonce", outcome.nonce),
        );
        if let Some(status) = outcome.status {
            let mut confirmed = RunEvent::for_step(RunEventType::TxConfirmed, step_id)
                .with("tx_hash", outcome.tx_hash.to_string())
                .with("status", status);
            if let Some(block_number) = outcome.block_number {
                confirmed = confirmed.with("block_number", block_number);
            }
            if let Some(gas_used) = outcome.gas_used {
                confirmed = confirmed.with("gas_used", gas_used);
            }
            self.emit(confirmed);
        }
        if outcome.reverted() {
            return Err(ScenarioErrorKind::StepReverted {
                tx_hash: outcome.tx_hash,
            });
        }

        Ok(StepReport {
            id: step_id.to_string(),
            tx: Some(outcome),
            waited_ms: duration_ms(waited),
        })
    }

    /// Nonces are handed out locally after the first lookup, so back to back
    /// sends do not depend on the node having seen the previous one.
    fn nonce_for(&mut self, sender: Address) -> Result<u64, EvmError> {
        if let Some(nonce) = self.next_nonce.get(&sender) {
            return Ok(*nonce);
        }
        let nonce = self.client.nonce(sender)?;
        self.next_nonce.insert(sender, nonce);
        Ok(nonce)
    }

    fn receive(
        &mut self,
        step_id: &str,
        account: AccountRole,
        min_balance: U256,
    ) -> Result<StepReport, ScenarioErrorKind> {
        let address = self.accounts.address(account);
        let poll = self.options.receive_poll;
        let attempts = poll.max_attempts.max(1);
        let mut waited = Duration::ZERO;
        let mut balance = U256::ZERO;
        for attempt in 1..=attempts {
            balance = self.client.balance(address)?;
            self.emit(
                RunEvent::for_step(RunEventType::BalancePolled, step_id)
                    .with("account", address.to_string())
                    .with("attempt", attempt)
                    .with("balance", balance.to_string()),
            );
            if balance >= min_balance {
                return Ok(StepReport {
                    id: step_id.to_string(),
                    tx: None,
                    waited_ms: duration_ms(waited),
                });
            }
            if attempt < attempts {
                self.sleeper.sleep(poll.interval);
                waited += poll.interval;
            }
        }
        Err(ScenarioErrorKind::ReceiveTimeout {
            account: address,
            balance,
            required: min_balance,
            attempts,
        })
    }

    fn query_winner(
        &mut self,
        step_id: &str,
        from: AccountRole,
    ) -> Result<StepReport, ScenarioErrorKind> {
        let contract = self
            .contract_address
            .ok_or(ScenarioErrorKind::MissingContract)?;
        let data = self.contract.abi.encode_call(WINNER_FUNCTION, &[])?;
        let raw = self.client.call(CallRequest {
            from: Some(self.accounts.address(from)),
            to: contract,
            data,
        })?;
        let winner = decode_winner(&self.contract.abi, &raw)?;
        info!(target: LOG_TARGET, winner = %winner, "winning proposal");
        self.emit(
            RunEvent::for_step(RunEventType::QueryResult, step_id)
                .with("function", WINNER_FUNCTION)
                .with("winner", winner.to_text()),
        );
        self.winner = Some(winner);
        Ok(StepReport {
            id: step_id.to_string(),
            tx: None,
            waited_ms: 0,
        })
    }

    fn emit(&mut self, event: RunEvent) {
        let record = self.stream.next_record(now_ms(), event);
        self.events.push(record);
    }

    fn emit_error(&mut self, error: &ScenarioError) {
        warn!(target: LOG_TARGET, step = %error.step_id, error = %error.kind, "scenario failed");
        self.emit(
            RunEvent::for_step(RunEventType::Error, error.step_id.clone())
                .with("message", Value::String(error.kind.to_string())),
        );
    }
}

/// Decodes the `bytes32` returned by `winnerName()`.
pub fn decode_winner(abi: &ContractAbi, raw: &[u8]) -> Result<ProposalName, ScenarioErrorKind> {
    let values = abi.decode_output(WINNER_FUNCTION, 0, raw)?;
    match values.as_slice() {
        [DynSolValue::FixedBytes(word, 32)] => Ok(ProposalName::from_word(*word)),
        other => Err(ScenarioErrorKind::UnexpectedWinner(format!("{other:?}"))),
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_ms)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
