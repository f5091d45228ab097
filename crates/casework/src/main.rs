mod commands;
mod context;
mod error;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use casework_operations::CaseworkConfig;
use casework_operations::config::DEFAULT_CONFIG_FILE;
use clap::Parser;
use tracing::debug;

use crate::commands::Commands;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "casework")]
#[command(version)]
#[command(about = "Compensate failed case workflows and triage their failures", long_about = None)]
struct Cli {
    /// Configuration file (default: ./casework.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = match CaseworkConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            print_error(&CliError::from(e));
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.logging.level);
    debug!(path = %config_path.display(), "configuration loaded");

    if let Err(e) = cli.command.execute(&config).await {
        print_error(&e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}
