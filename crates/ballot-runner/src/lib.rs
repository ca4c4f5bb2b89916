mod cli;
mod config;
mod logging;
mod run;

pub use cli::{
    AccountCommand, AccountNewCommand, Cli, Commands, CompileCommand, OutputFormat, RunCommand,
    TraceRedact, WinnerCommand,
};
pub use config::{
    build_provider_registry, build_signer, load_runner_config, validate_runner_config,
    ChainConfig, ContractConfig, PollConfig, RunnerConfig, RunnerConfigError, ScenarioConfig,
    SignerConfig, SolcConfig, RUNNER_CONFIG_SCHEMA_0_0_1,
};
pub use logging::{default_log_directive, init_tracing};
pub use run::{execute_account_new, execute_compile, execute_run, execute_winner, RunnerError};
