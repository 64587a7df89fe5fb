//! Memkeep CLI entry point.

use clap::Parser;
use memkeep::cli::{Cli, Commands, commands};
use memkeep::error::Error;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    // JSON mode: explicit flag or non-TTY stdout (piped consumers).
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info,reqwest=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

async fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    match &cli.command {
        Commands::Init { force } => commands::init::execute(*force, cli.db.as_ref(), json),
        Commands::Add(args) => commands::add::execute(args, cli.db.as_ref(), json).await,
        Commands::List(args) => commands::list::execute(args, cli.db.as_ref(), json),
        Commands::Rm { id } => commands::rm::execute(*id, cli.db.as_ref(), json).await,
        Commands::Clear { yes } => {
            commands::rm::execute_clear(*yes, cli.db.as_ref(), json).await
        }
        Commands::Export { output } => {
            commands::backup::execute_export(output.as_ref(), cli.db.as_ref(), json)
        }
        Commands::Import { file } => {
            commands::backup::execute_import(file, cli.db.as_ref(), json).await
        }
        Commands::Sync => commands::sync::execute(cli.db.as_ref(), json).await,
        Commands::Watch => commands::sync::execute_watch(cli.db.as_ref(), json).await,
        Commands::Status => commands::status::execute(cli.db.as_ref(), json),
        Commands::Completions { shell } => commands::completions::execute(*shell),
        Commands::Version => commands::version::execute(json),
    }
}
