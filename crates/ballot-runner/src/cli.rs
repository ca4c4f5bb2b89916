use ballot_core::RedactMode;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ballot-runner")]
#[command(about = "Compile, deploy and drive a ballot contract through its voting lifecycle")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the full scenario: deploy, give right to vote, delegate, fund, receive, vote, query.
    Run(RunCommand),
    /// Compile the contract and summarize the artifact.
    Compile(CompileCommand),
    #[command(subcommand)]
    Account(AccountCommand),
    /// Query `winnerName()` of an already deployed ballot.
    Winner(WinnerCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum AccountCommand {
    /// Generate a fresh random account.
    New(AccountNewCommand),
}

#[derive(Debug, Clone, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RunCommand {
    #[arg(long)]
    pub config: PathBuf,
    /// CAIP-2 chain id; optional when the config has a single chain.
    #[arg(long)]
    pub chain: Option<String>,
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
    /// File to append events to, or `-` for stdout.
    #[arg(long)]
    pub events_jsonl: Option<String>,
    /// File to append redacted events to.
    #[arg(long)]
    pub trace: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = TraceRedact::Default)]
    pub trace_redact: TraceRedact,
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TraceRedact {
    Default,
    Audit,
    Off,
}

impl From<TraceRedact> for RedactMode {
    fn from(value: TraceRedact) -> Self {
        match value {
            TraceRedact::Default => RedactMode::Default,
            TraceRedact::Audit => RedactMode::Audit,
            TraceRedact::Off => RedactMode::Off,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct CompileCommand {
    #[arg(long, conflicts_with_all = ["source", "contract"])]
    pub config: Option<PathBuf>,
    #[arg(long, requires = "contract")]
    pub source: Option<PathBuf>,
    #[arg(long, requires = "source")]
    pub contract: Option<String>,
    #[arg(long, default_value = ballot_solc::DEFAULT_SOLC_BINARY)]
    pub solc: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, clap::Args)]
pub struct AccountNewCommand {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, clap::Args)]
pub struct WinnerCommand {
    #[arg(long)]
    pub config: PathBuf,
    #[arg(long)]
    pub contract_address: String,
    #[arg(long)]
    pub chain: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
