//! Cross-check of the pre-joined results feed against a local recomputation.
//!
//! The results feed may already carry before/after prices and the closest
//! event for each change point. Those values are recomputed here with
//! category `All` and compared field by field.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::delta::DeltaMethod;
use crate::pipeline::correlate_change_points;
use crate::state::AppState;
use crate::{
    CategoryFilter, ChangePoint, CorrelationResult, EventCategory, TradingDate, ValidationError,
};

pub const PRICE_BEFORE_KEY: &str = "Price_Before";
pub const PRICE_AFTER_KEY: &str = "Price_After";
pub const PERCENT_CHANGE_KEY: &str = "Price_Change_Percent";
pub const EVENT_DESCRIPTION_KEY: &str = "Closest_Event_Description";
pub const EVENT_TYPE_KEY: &str = "Closest_Event_Type";

const UPSTREAM_KEYS: [&str; 5] = [
    PRICE_BEFORE_KEY,
    PRICE_AFTER_KEY,
    PERCENT_CHANGE_KEY,
    EVENT_DESCRIPTION_KEY,
    EVENT_TYPE_KEY,
];

/// Upstream column being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifiedField {
    PriceBefore,
    PriceAfter,
    PercentChange,
    ClosestEventDescription,
    ClosestEventType,
}

impl VerifiedField {
    pub const fn upstream_key(self) -> &'static str {
        match self {
            Self::PriceBefore => PRICE_BEFORE_KEY,
            Self::PriceAfter => PRICE_AFTER_KEY,
            Self::PercentChange => PERCENT_CHANGE_KEY,
            Self::ClosestEventDescription => EVENT_DESCRIPTION_KEY,
            Self::ClosestEventType => EVENT_TYPE_KEY,
        }
    }
}

impl Display for VerifiedField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.upstream_key())
    }
}

/// An upstream value that the recomputation does not reproduce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub change_point_date: TradingDate,
    pub field: VerifiedField,
    pub upstream: String,
    /// `None` when the recomputation has no value for this field.
    pub recomputed: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerifyOptions {
    tolerance: f64,
    delta_method: DeltaMethod,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            delta_method: DeltaMethod::default(),
        }
    }
}

impl VerifyOptions {
    /// `tolerance` is an absolute bound applied to every numeric field.
    pub fn new(tolerance: f64) -> Result<Self, ValidationError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ValidationError::InvalidTolerance);
        }
        Ok(Self {
            tolerance,
            ..Self::default()
        })
    }

    pub fn with_delta_method(mut self, delta_method: DeltaMethod) -> Self {
        self.delta_method = delta_method;
        self
    }

    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub const fn delta_method(&self) -> DeltaMethod {
        self.delta_method
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub delta_method: DeltaMethod,
    pub tolerance: f64,
    /// Change points carrying at least one upstream value.
    pub checked: usize,
    /// Change points with no upstream values at all.
    pub skipped: usize,
    pub discrepancies: Vec<Discrepancy>,
}

impl VerificationReport {
    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

pub fn verify_upstream(state: &AppState, options: &VerifyOptions) -> VerificationReport {
    let rows = correlate_change_points(state, CategoryFilter::All, options.delta_method);
    let mut report = VerificationReport {
        delta_method: options.delta_method,
        tolerance: options.tolerance,
        checked: 0,
        skipped: 0,
        discrepancies: Vec::new(),
    };

    for (change_point, row) in state.change_points.iter().zip(&rows) {
        if !UPSTREAM_KEYS
            .iter()
            .any(|key| change_point.metadata.contains_key(*key))
        {
            report.skipped += 1;
            continue;
        }
        report.checked += 1;
        compare_row(change_point, row, options.tolerance, &mut report.discrepancies);
    }

    debug!(
        checked = report.checked,
        skipped = report.skipped,
        discrepancies = report.discrepancies.len(),
        "upstream results verified"
    );
    report
}

fn compare_row(
    change_point: &ChangePoint,
    row: &CorrelationResult,
    tolerance: f64,
    out: &mut Vec<Discrepancy>,
) {
    let numeric = [
        (VerifiedField::PriceBefore, row.price_before),
        (VerifiedField::PriceAfter, row.price_after),
        (VerifiedField::PercentChange, row.percent_change),
    ];
    for (field, recomputed) in numeric {
        let Some(upstream) = change_point.metadata_f64(field.upstream_key()) else {
            continue;
        };
        let matches = recomputed.is_some_and(|value| (value - upstream).abs() <= tolerance);
        if !matches {
            out.push(Discrepancy {
                change_point_date: change_point.date,
                field,
                upstream: upstream.to_string(),
                recomputed: recomputed.map(|value| value.to_string()),
            });
        }
    }

    if let Some(upstream) = change_point.metadata_str(EVENT_DESCRIPTION_KEY) {
        let recomputed = row.closest_event_description.as_deref();
        if recomputed.map(str::trim) != Some(upstream.trim()) {
            out.push(Discrepancy {
                change_point_date: change_point.date,
                field: VerifiedField::ClosestEventDescription,
                upstream: upstream.to_owned(),
                recomputed: recomputed.map(str::to_owned),
            });
        }
    }

    if let Some(upstream) = change_point.metadata_str(EVENT_TYPE_KEY) {
        let recomputed = row.closest_event_category;
        let matches = match upstream.parse::<EventCategory>() {
            Ok(category) => recomputed == Some(category),
            Err(_) => false,
        };
        if !matches {
            out.push(Discrepancy {
                change_point_date: change_point.date,
                field: VerifiedField::ClosestEventType,
                upstream: upstream.to_owned(),
                recomputed: recomputed.map(|category| category.as_str().to_owned()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_or_non_finite_tolerance() {
        assert_eq!(VerifyOptions::new(-0.1), Err(ValidationError::InvalidTolerance));
        assert_eq!(VerifyOptions::new(f64::INFINITY), Err(ValidationError::InvalidTolerance));
        assert_eq!(VerifyOptions::new(0.0).map(|o| o.tolerance()), Ok(0.0));
    }

    #[test]
    fn fields_map_to_upstream_columns() {
        assert_eq!(VerifiedField::PercentChange.upstream_key(), "Price_Change_Percent");
        assert_eq!(VerifiedField::ClosestEventType.to_string(), "Closest_Event_Type");
    }
}
