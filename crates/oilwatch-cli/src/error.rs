use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] oilwatch_core::ValidationError),

    #[error(transparent)]
    Config(#[from] oilwatch_core::ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("strict mode failed: dropped_records={dropped_records}, discrepancies={discrepancies}")]
    StrictModeViolation {
        dropped_records: usize,
        discrepancies: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::StrictModeViolation { .. } => 5,
            Self::Serialization(_) => 10,
            Self::Logging(_) => 10,
        }
    }
}
