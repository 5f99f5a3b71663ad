//! Runtime configuration from environment variables, overridable by callers.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `OILWATCH_API_URL` | Base URL serving `/api/prices`, `/api/events`, `/api/results` |
//! | `OILWATCH_DATA_DIR` | Directory holding `prices`, `events`, `results` as `.json` or `.csv` |
//! | `OILWATCH_TIMEOUT_MS` | Per-request timeout for the HTTP source (default 3000) |
//! | `OILWATCH_LOG` | Log filter directive, e.g. `oilwatch_core=debug` |

use std::path::PathBuf;

use thiserror::Error;

use crate::source::{DashboardSource, FileSource, HttpSource};
use crate::DateWindow;

pub const API_URL_VAR: &str = "OILWATCH_API_URL";
pub const DATA_DIR_VAR: &str = "OILWATCH_DATA_DIR";
pub const TIMEOUT_VAR: &str = "OILWATCH_TIMEOUT_MS";
pub const LOG_VAR: &str = "OILWATCH_LOG";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api base url must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },
    #[error("{key} must be a whole number of milliseconds: '{value}'")]
    InvalidTimeout { key: &'static str, value: String },
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("no data source configured: set --api-url (OILWATCH_API_URL) or --data-dir (OILWATCH_DATA_DIR)")]
    NoSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub api_base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub timeout_ms: u64,
    pub log_filter: Option<String>,
    /// Overall bound the date inputs are clamped to.
    pub bounds: DateWindow,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            data_dir: None,
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            log_filter: None,
            bounds: DateWindow::dashboard_bounds(),
        }
    }
}

impl DashboardConfig {
    pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup. Blank values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let timeout_ms = match read(TIMEOUT_VAR) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidTimeout {
                key: TIMEOUT_VAR,
                value,
            })?,
            None => Self::DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            api_base_url: read(API_URL_VAR),
            data_dir: read(DATA_DIR_VAR).map(PathBuf::from),
            timeout_ms,
            log_filter: read(LOG_VAR),
            ..Self::default()
        })
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        match (&self.api_base_url, &self.data_dir) {
            (Some(url), _) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                Err(ConfigError::InvalidBaseUrl { value: url.clone() })
            }
            (None, None) => Err(ConfigError::NoSource),
            _ => Ok(()),
        }
    }

    /// Builds the configured source. The HTTP source wins when both are set.
    pub fn source(&self) -> Result<Box<dyn DashboardSource>, ConfigError> {
        self.validate()?;

        if let Some(url) = &self.api_base_url {
            return Ok(Box::new(
                HttpSource::new(url.as_str()).with_timeout_ms(self.timeout_ms),
            ));
        }

        match &self.data_dir {
            Some(dir) => Ok(Box::new(FileSource::from_dir(dir))),
            None => Err(ConfigError::NoSource),
        }
    }
}
