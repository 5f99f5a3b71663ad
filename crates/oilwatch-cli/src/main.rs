mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::error::CliError;
use crate::logging::LoggingConfig;

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

    let config = commands::resolve_config(&cli, |key| std::env::var(key).ok());
    let log_filter = config
        .as_ref()
        .ok()
        .and_then(|config| config.log_filter.clone());
    logging::init_logging(&LoggingConfig::resolve(
        cli.log_level.as_deref(),
        log_filter.as_deref(),
        std::env::var("RUST_LOG").ok(),
    ))?;

    let output = commands::run(&cli, config).await?;
    output::render(&output, cli.format, cli.pretty)?;

    if cli.strict && (output.dropped_records > 0 || output.discrepancies > 0) {
        return Err(CliError::StrictModeViolation {
            dropped_records: output.dropped_records,
            discrepancies: output.discrepancies,
        });
    }

    if !output.envelope.errors.is_empty() {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}
