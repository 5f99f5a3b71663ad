//! CLI argument definitions for oilwatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// oilwatch aligns a commodity price series with real-world events and
/// upstream-detected change points.
///
/// Data comes from an HTTP backend (`/api/prices`, `/api/events`,
/// `/api/results`) or from a directory of JSON/CSV files.
///
/// # Output
///
/// All commands emit a JSON envelope with `meta`, `data`, and `errors`.
/// Use `--format table` for a human-readable rendering.
#[derive(Debug, Parser)]
#[command(
    name = "oilwatch",
    author,
    version,
    about = "Align commodity price change points with real-world events",
    propagate_version = true
)]
pub struct Cli {
    /// Output format for command results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Fail with exit code 5 if records were dropped or verification found discrepancies.
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Backend base URL. Overrides OILWATCH_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory with prices, events and results as .json or .csv. Overrides OILWATCH_DATA_DIR.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Per-request HTTP timeout in milliseconds. Overrides OILWATCH_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log filter written to stderr, e.g. `debug` or `oilwatch_core=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Newline-delimited JSON (one object per line).
    Ndjson,
    /// Plain-text table for terminal display.
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Derive the full view for a date window and category.
    ///
    /// Returns the windowed prices and events, one correlation row per
    /// change point and the chart annotations.
    ///
    /// # Examples
    ///
    ///   oilwatch view --start 2019-01-01 --end 2021-12-31
    ///   oilwatch view --category "OPEC Policy" --format table
    View(ViewArgs),

    /// Change-point results table only.
    ///
    /// # Examples
    ///
    ///   oilwatch correlate --category Conflict --format table
    Correlate(CorrelateArgs),

    /// Recompute the pre-joined results feed and report disagreements.
    ///
    /// # Examples
    ///
    ///   oilwatch verify --tolerance 0.05 --strict
    Verify(VerifyArgs),

    /// List the category selector options.
    Categories,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// First day of the window (inclusive).
    #[arg(long, default_value = "2012-01-01")]
    pub start: String,

    /// Last day of the window (inclusive).
    #[arg(long, default_value = "2022-12-31")]
    pub end: String,

    /// `All` or one of Conflict, Economic, "OPEC Policy", Sanctions, Health.
    #[arg(long, default_value = "All")]
    pub category: String,

    /// `neighbor` or `segment-mean`.
    #[arg(long, default_value = "neighbor")]
    pub delta_method: String,
}

#[derive(Debug, Args)]
pub struct CorrelateArgs {
    /// `All` or one of Conflict, Economic, "OPEC Policy", Sanctions, Health.
    #[arg(long, default_value = "All")]
    pub category: String,

    /// `neighbor` or `segment-mean`.
    #[arg(long, default_value = "neighbor")]
    pub delta_method: String,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Absolute tolerance for price and percentage comparisons.
    #[arg(long, default_value_t = 0.01)]
    pub tolerance: f64,

    /// `neighbor` or `segment-mean`.
    #[arg(long, default_value = "neighbor")]
    pub delta_method: String,
}
