use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::CliError;

const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub filter: String,
}

impl LoggingConfig {
    /// `--log-level` wins over `OILWATCH_LOG`, which wins over `RUST_LOG`.
    pub fn resolve(
        flag: Option<&str>,
        configured: Option<&str>,
        rust_log: Option<String>,
    ) -> Self {
        let filter = flag
            .or(configured)
            .map(str::to_owned)
            .or(rust_log)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_FILTER));
        Self { filter }
    }
}

/// Installs the global subscriber. Logs go to stderr so stdout stays
/// machine-readable.
pub fn init_logging(config: &LoggingConfig) -> Result<(), CliError> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|error| CliError::Logging(format!("invalid filter '{}': {error}", config.filter)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|error| CliError::Logging(error.to_string()))
}
