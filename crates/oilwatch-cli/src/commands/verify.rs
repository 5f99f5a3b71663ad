use oilwatch_core::{verify_upstream, AppState, DeltaMethod, VerifyOptions};

use crate::cli::VerifyArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &VerifyArgs, state: &AppState) -> Result<CommandResult, CliError> {
    let delta_method: DeltaMethod = args.delta_method.parse()?;
    let options = VerifyOptions::new(args.tolerance)?.with_delta_method(delta_method);

    let report = verify_upstream(state, &options);
    let discrepancies = report.discrepancies.len();

    let mut result = CommandResult::ok(serde_json::to_value(&report)?)
        .with_discrepancies(discrepancies);
    if report.checked == 0 {
        result = result.with_warning("results feed carries no upstream values to verify");
    }
    if !report.is_consistent() {
        result = result.with_warning(format!(
            "{discrepancies} upstream value(s) disagree with the recomputation"
        ));
    }
    Ok(result)
}
