use oilwatch_core::{CorrelationResult, Envelope};
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::commands::CommandOutput;
use crate::error::CliError;

const EMPTY_TABLE: &str = "No change point results available";
const NO_EVENT: &str = "no matching event";
const UNAVAILABLE: &str = "n/a";
const HEADERS: [&str; 6] = [
    "Change Point",
    "Price Before ($)",
    "Price After ($)",
    "Price Change (%)",
    "Closest Event",
    "Event Type",
];

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&output.envelope)?
            } else {
                serde_json::to_string(&output.envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Ndjson => {
            let payload = serde_json::to_string(&output.envelope)?;
            println!("{payload}");
        }
        OutputFormat::Table => render_table(&output.envelope, output.rows.as_deref())?,
    }

    Ok(())
}

fn render_table(
    envelope: &Envelope<Value>,
    rows: Option<&[CorrelationResult]>,
) -> Result<(), CliError> {
    println!("request_id  : {}", envelope.meta.request_id);
    println!("schema      : {}", envelope.meta.schema_version);
    println!("generated_at: {}", envelope.meta.generated_at);
    println!("source      : {}", envelope.meta.source);
    println!("latency_ms  : {}", envelope.meta.latency_ms);
    println!("dropped     : {}", envelope.meta.dropped_records);

    if !envelope.meta.warnings.is_empty() {
        println!("warnings:");
        for warning in &envelope.meta.warnings {
            println!("  - {warning}");
        }
    }

    match rows {
        Some(rows) => print!("{}", format_table(rows)),
        None if envelope.data.is_null() => {}
        None => {
            println!("data:");
            let pretty_data = serde_json::to_string_pretty(&envelope.data)?;
            for line in pretty_data.lines() {
                println!("  {line}");
            }
        }
    }

    if !envelope.errors.is_empty() {
        println!("errors:");
        for error in &envelope.errors {
            println!("  - {}: {}", error.code, error.message);
        }
    }

    Ok(())
}

/// Change-point table with left-aligned, space-padded columns.
pub fn format_table(rows: &[CorrelationResult]) -> String {
    if rows.is_empty() {
        return format!("{EMPTY_TABLE}\n");
    }

    let cells: Vec<[String; 6]> = rows.iter().map(row_cells).collect();
    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, HEADERS.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize; 6]) {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn row_cells(row: &CorrelationResult) -> [String; 6] {
    [
        row.change_point_date.to_string(),
        format_amount(row.price_before),
        format_amount(row.price_after),
        format_amount(row.percent_change),
        row.closest_event_description
            .clone()
            .unwrap_or_else(|| String::from(NO_EVENT)),
        row.closest_event_category
            .map(|category| category.as_str().to_owned())
            .unwrap_or_else(|| String::from(UNAVAILABLE)),
    ]
}

/// Two decimals, `n/a` when unavailable.
pub fn format_amount(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.2}"),
        None => String::from(UNAVAILABLE),
    }
}
