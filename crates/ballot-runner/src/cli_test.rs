use super::{AccountCommand, Cli, Commands, OutputFormat};
use clap::{CommandFactory, Parser};

#[test]
fn cli_help_includes_top_level_commands() {
    let mut command = Cli::command();
    let help = command.render_long_help().to_string();
    assert!(help.contains("run"));
    assert!(help.contains("compile"));
    assert!(help.contains("account"));
    assert!(help.contains("winner"));
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn cli_parses_run_with_sinks() {
    let cli = Cli::try_parse_from([
        "ballot-runner",
        "run",
        "--config",
        "ballot-runner.yaml",
        "--chain",
        "eip155:42",
        "--dry-run",
        "--events-jsonl",
        "-",
        "--format",
        "json",
    ])
    .expect("run must parse");
    match cli.command {
        Commands::Run(command) => {
            assert!(command.dry_run);
            assert!(!command.verbose);
            assert_eq!(command.chain.as_deref(), Some("eip155:42"));
            assert_eq!(command.events_jsonl.as_deref(), Some("-"));
            assert_eq!(command.format, OutputFormat::Json);
        }
        _ => panic!("expected run"),
    }
}

#[test]
fn cli_run_requires_config() {
    assert!(Cli::try_parse_from(["ballot-runner", "run", "--dry-run"]).is_err());
}

#[test]
fn cli_parses_compile_from_source() {
    let cli = Cli::try_parse_from([
        "ballot-runner",
        "compile",
        "--source",
        "contracts/Ballot.sol",
        "--contract",
        "Ballot",
    ])
    .expect("compile must parse");
    match cli.command {
        Commands::Compile(command) => {
            assert!(command.config.is_none());
            assert_eq!(command.contract.as_deref(), Some("Ballot"));
            assert_eq!(command.solc, std::path::PathBuf::from("solc"));
        }
        _ => panic!("expected compile"),
    }
}

#[test]
fn cli_compile_source_requires_contract() {
    assert!(Cli::try_parse_from([
        "ballot-runner",
        "compile",
        "--source",
        "contracts/Ballot.sol"
    ])
    .is_err());
    assert!(Cli::try_parse_from([
        "ballot-runner",
        "compile",
        "--config",
        "ballot-runner.yaml",
        "--contract",
        "Ballot"
    ])
    .is_err());
}

#[test]
fn cli_parses_account_new_and_winner() {
    let cli = Cli::try_parse_from(["ballot-runner", "account", "new", "--format", "json"])
        .expect("account new must parse");
    match cli.command {
        Commands::Account(AccountCommand::New(command)) => {
            assert_eq!(command.format, OutputFormat::Json);
        }
        _ => panic!("expected account new"),
    }

    let cli = Cli::try_parse_from([
        "ballot-runner",
        "winner",
        "--config",
        "ballot-runner.yaml",
        "--contract-address",
        "0x5FbDB2315678afecb367f032d93F642f64180aa3",
    ])
    .expect("winner must parse");
    match cli.command {
        Commands::Winner(command) => {
            assert!(command.chain.is_none());
            assert_eq!(
                command.contract_address,
                "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            );
        }
        _ => panic!("expected winner"),
    }
}
