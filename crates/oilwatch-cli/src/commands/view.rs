use oilwatch_core::{
    derive_view, AppState, CategoryFilter, DateWindow, DeltaMethod, TradingDate, ViewRequest,
};

use crate::cli::ViewArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(
    args: &ViewArgs,
    state: &AppState,
    bounds: &DateWindow,
) -> Result<CommandResult, CliError> {
    let requested = DateWindow::new(
        TradingDate::parse(&args.start)?,
        TradingDate::parse(&args.end)?,
    );
    let category: CategoryFilter = args.category.parse()?;
    let delta_method: DeltaMethod = args.delta_method.parse()?;

    let window = requested.clamp_to(bounds);
    let mut warnings = Vec::new();
    if window != requested {
        warnings.push(format!(
            "window {}..{} clamped to {}..{}",
            requested.start, requested.end, window.start, window.end
        ));
    }
    if window.is_inverted() {
        warnings.push(format!(
            "start {} is after end {}; no prices or events are shown",
            window.start, window.end
        ));
    }

    let view = derive_view(
        state,
        &ViewRequest::new(window, category).with_delta_method(delta_method),
    );
    let rows = view.correlations.clone();

    let mut result = CommandResult::ok(serde_json::to_value(view)?).with_rows(rows);
    for warning in warnings {
        result = result.with_warning(warning);
    }
    Ok(result)
}
