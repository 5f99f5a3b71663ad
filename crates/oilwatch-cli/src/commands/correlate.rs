use oilwatch_core::{correlate_change_points, AppState, CategoryFilter, DeltaMethod};
use serde_json::json;

use crate::cli::CorrelateArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &CorrelateArgs, state: &AppState) -> Result<CommandResult, CliError> {
    let category: CategoryFilter = args.category.parse()?;
    let delta_method: DeltaMethod = args.delta_method.parse()?;

    let rows = correlate_change_points(state, category, delta_method);
    let data = json!({
        "category": category,
        "delta_method": delta_method,
        "correlations": rows,
    });

    Ok(CommandResult::ok(data).with_rows(rows))
}
