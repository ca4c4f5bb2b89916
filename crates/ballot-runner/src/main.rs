use ballot_runner::{
    execute_account_new, execute_compile, execute_run, execute_winner, init_tracing,
    AccountCommand, Cli, Commands,
};
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    let verbose = matches!(&cli.command, Commands::Run(command) if command.verbose);
    init_tracing(verbose);

    let result = match cli.command {
        Commands::Run(command) => execute_run(&command),
        Commands::Compile(command) => execute_compile(&command),
        Commands::Account(AccountCommand::New(command)) => execute_account_new(&command),
        Commands::Winner(command) => execute_winner(&command),
    };

    match result {
        Ok(output) => {
            println!("{output}");
        }
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}
