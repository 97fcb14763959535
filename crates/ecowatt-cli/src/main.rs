//! EcoWatt CLI - Command-line dashboard for EcoWatt Cloud device administration.
//!
//! Gives terminal access to register readings, stored records, device
//! configuration, the command queue and firmware images, for scripting and
//! headless use.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::Context;
use error::{exit_codes, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Logs go to stderr so stdout stays clean for results.
fn init_tracing(cli: &Cli) {
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        Commands::Registers => commands::run_registers(&ctx).await,
        Commands::Records(args) => commands::run_records(args, &ctx).await,
        Commands::Query(args) => commands::run_query(args, &ctx).await,
        Commands::Count(args) => commands::run_count(args, &ctx).await,
        Commands::Config(args) => commands::run_config(args, &ctx).await,
        Commands::Queue(args) => commands::run_queue(args, &ctx).await,
        Commands::Firmware(args) => commands::run_firmware(args, &ctx).await,
        Commands::Settings(args) => commands::run_settings(args, &ctx).await,
    }
}
