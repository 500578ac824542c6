mod cli;
mod commands;
mod error;
mod metadata;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

/// Exit code when the command ran but no market data came back.
const NO_MARKET_DATA_EXIT: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    let (envelope, no_data) = commands::run(&cli).await?;
    output::render(&envelope, cli.pretty)?;

    if no_data {
        Ok(ExitCode::from(NO_MARKET_DATA_EXIT))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn init_tracing(directive: Option<&str>) -> Result<(), CliError> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive).map_err(|error| CliError::LogFilter {
            directive: directive.to_owned(),
            reason: error.to_string(),
        })?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}
