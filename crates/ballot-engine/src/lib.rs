//! Scenario model and execution for the ballot lifecycle:
//! deploy, give right to vote, delegate, fund, receive, vote, query the winner.

pub mod pacer;
pub mod runner;
pub mod scenario;

pub use pacer::{BlockPacer, Sleeper, ThreadSleeper, DEFAULT_BLOCK_INTERVAL};
pub use runner::{
    decode_winner, ReceivePoll, ScenarioContract, ScenarioError, ScenarioErrorKind, ScenarioOutcome,
    ScenarioRunner, ScenarioRunnerOptions, StepReport, DEFAULT_CALL_GAS_LIMIT,
};
pub use scenario::{validate_scenario, AccountRole, ScenarioAccounts, ScenarioPlan, ScenarioStep};

const LOG_TARGET: &str = "ballot::engine";
