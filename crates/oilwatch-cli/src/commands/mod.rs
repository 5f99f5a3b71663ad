mod categories;
mod correlate;
mod verify;
mod view;

use std::collections::BTreeMap;
use std::time::Instant;

use oilwatch_core::config::TIMEOUT_VAR;
use oilwatch_core::{
    AppState, CorrelationResult, DashboardConfig, DroppedRecord, Envelope, EnvelopeError,
    EnvelopeMeta, Feed, LoadError,
};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    /// Rows for the change-point table, when the command has one.
    pub rows: Option<Vec<CorrelationResult>>,
    pub discrepancies: usize,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            rows: None,
            discrepancies: 0,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_rows(mut self, rows: Vec<CorrelationResult>) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn with_discrepancies(mut self, discrepancies: usize) -> Self {
        self.discrepancies = discrepancies;
        self
    }
}

/// What the renderer and the strict-mode check need after a command ran.
pub struct CommandOutput {
    pub envelope: Envelope<Value>,
    pub rows: Option<Vec<CorrelationResult>>,
    pub dropped_records: usize,
    pub discrepancies: usize,
}

/// Configuration from `lookup` (the process environment in production) with
/// the CLI flags layered on top. A `--timeout-ms` flag shadows the
/// environment value, which is then never parsed.
pub fn resolve_config(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<DashboardConfig, CliError> {
    let mut config = DashboardConfig::from_lookup(|key: &str| {
        if key == TIMEOUT_VAR && cli.timeout_ms.is_some() {
            None
        } else {
            lookup(key)
        }
    })?;

    if let Some(url) = &cli.api_url {
        config = config.with_api_base_url(url.as_str());
    }
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir.as_path());
        if cli.api_url.is_none() {
            config.api_base_url = None;
        }
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }

    Ok(config)
}

/// `categories` needs no data source, so a broken configuration only fails
/// the commands that load.
pub async fn run(
    cli: &Cli,
    config: Result<DashboardConfig, CliError>,
) -> Result<CommandOutput, CliError> {
    if let Command::Categories = cli.command {
        let result = categories::run()?;
        return finish(result, String::from("builtin"), 0, &[]);
    }

    let config = config?;
    let source = config.source()?;
    let location = format!("{} {}", source.kind(), source.location());
    let started = Instant::now();
    let loaded = AppState::load(source.as_ref()).await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let state = match loaded {
        Ok(state) => state,
        Err(error) => return load_failure(&error, location, latency_ms),
    };
    info!(
        source = %location,
        latency_ms,
        prices = state.prices.len(),
        events = state.events.len(),
        change_points = state.change_points.len(),
        "dashboard data loaded"
    );

    let result = match &cli.command {
        Command::View(args) => view::run(args, &state, &config.bounds)?,
        Command::Correlate(args) => correlate::run(args, &state)?,
        Command::Verify(args) => verify::run(args, &state)?,
        Command::Categories => categories::run()?,
    };

    finish(result, location, latency_ms, &state.dropped)
}

/// Error envelope with one entry per failed feed and no data.
fn load_failure(
    error: &LoadError,
    source: String,
    latency_ms: u64,
) -> Result<CommandOutput, CliError> {
    let meta = EnvelopeMeta::new(Uuid::new_v4().to_string(), source, latency_ms, 0)?;
    let errors = error
        .failures
        .iter()
        .map(|failure| {
            EnvelopeError::new(
                failure.error.code(),
                format!("{}: {}", failure.feed, failure.error.message()),
            )
            .map(|envelope_error| envelope_error.with_retryable(failure.error.retryable()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CommandOutput {
        envelope: Envelope::with_errors(meta, Value::Null, errors)?,
        rows: None,
        dropped_records: 0,
        discrepancies: 0,
    })
}

fn finish(
    result: CommandResult,
    source: String,
    latency_ms: u64,
    dropped: &[DroppedRecord],
) -> Result<CommandOutput, CliError> {
    let CommandResult {
        data,
        warnings,
        rows,
        discrepancies,
    } = result;

    let mut meta = EnvelopeMeta::new(
        Uuid::new_v4().to_string(),
        source,
        latency_ms,
        dropped.len(),
    )?;

    for warning in dropped_warnings(dropped) {
        meta.push_warning(warning);
    }
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok(CommandOutput {
        envelope: Envelope::success(meta, data),
        rows,
        dropped_records: dropped.len(),
        discrepancies,
    })
}

/// One summary line per feed, first reason included.
fn dropped_warnings(dropped: &[DroppedRecord]) -> Vec<String> {
    let mut by_feed: BTreeMap<&'static str, (usize, &DroppedRecord)> = BTreeMap::new();
    for record in dropped {
        by_feed
            .entry(record.feed.as_str())
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, record));
    }

    Feed::ALL
        .iter()
        .filter_map(|feed| by_feed.get(feed.as_str()))
        .map(|(count, first)| {
            format!(
                "{}: {count} malformed record(s) dropped, first at index {}: {}",
                first.feed, first.index, first.reason
            )
        })
        .collect()
}
