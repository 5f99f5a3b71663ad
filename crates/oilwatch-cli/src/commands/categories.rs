use oilwatch_core::CategoryFilter;
use serde_json::json;

use crate::error::CliError;

use super::CommandResult;

pub fn run() -> Result<CommandResult, CliError> {
    let options: Vec<&str> = CategoryFilter::OPTIONS
        .iter()
        .map(|option| option.as_str())
        .collect();

    Ok(CommandResult::ok(json!({ "categories": options })))
}
