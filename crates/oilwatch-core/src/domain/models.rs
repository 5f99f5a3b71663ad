use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{EventCategory, TradingDate, ValidationError};

/// Daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: TradingDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: TradingDate, price: f64) -> Result<Self, ValidationError> {
        if !price.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "price" });
        }
        if price <= 0.0 {
            return Err(ValidationError::NonPositiveValue { field: "price" });
        }

        Ok(Self { date, price })
    }
}

/// Curated real-world event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub date: TradingDate,
    pub category: EventCategory,
    pub description: String,
}

impl Event {
    pub fn new(
        date: TradingDate,
        category: EventCategory,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ValidationError::BlankField {
                field: "description",
            });
        }

        Ok(Self {
            date,
            category,
            description,
        })
    }
}

/// Change point detected upstream.
///
/// Every field of the upstream record other than the date is kept verbatim in
/// `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint {
    pub date: TradingDate,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl ChangePoint {
    pub fn new(date: TradingDate) -> Self {
        Self {
            date,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// Inclusive `[start, end]` range of calendar dates.
///
/// Construction never fails; an inverted window (`start > end`) simply
/// contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: TradingDate,
    pub end: TradingDate,
}

impl DateWindow {
    pub const fn new(start: TradingDate, end: TradingDate) -> Self {
        Self { start, end }
    }

    /// Overall bound of the dashboard's date inputs, 2012-01-01 to 2022-12-31.
    pub fn dashboard_bounds() -> Self {
        Self::new(
            TradingDate::from_date(time::macros::date!(2012 - 01 - 01)),
            TradingDate::from_date(time::macros::date!(2022 - 12 - 31)),
        )
    }

    pub fn contains(&self, date: TradingDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Clamps both ends into `bounds`. The result may still be inverted.
    pub fn clamp_to(self, bounds: &Self) -> Self {
        Self {
            start: self.start.clamp(bounds.start, bounds.end.max(bounds.start)),
            end: self.end.clamp(bounds.start, bounds.end.max(bounds.start)),
        }
    }
}

/// One row of the change-point table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub change_point_date: TradingDate,
    pub price_before: Option<f64>,
    pub price_after: Option<f64>,
    pub percent_change: Option<f64>,
    pub closest_event_description: Option<String>,
    pub closest_event_category: Option<EventCategory>,
    pub closest_event_date: Option<TradingDate>,
    pub distance_days: Option<i64>,
}

/// Kind of vertical marker drawn over the price chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    ChangePoint,
    Event,
}

/// Renderer-agnostic chart annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartAnnotation {
    pub date: TradingDate,
    pub kind: AnnotationKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;

    use super::*;

    fn day(date: time::Date) -> TradingDate {
        TradingDate::from_date(date)
    }

    #[test]
    fn rejects_non_positive_and_non_finite_prices() {
        let date = day(date!(2020 - 01 - 01));
        assert!(matches!(
            PricePoint::new(date, 0.0),
            Err(ValidationError::NonPositiveValue { field: "price" })
        ));
        assert!(matches!(
            PricePoint::new(date, f64::NAN),
            Err(ValidationError::NonFiniteValue { field: "price" })
        ));
        assert!(PricePoint::new(date, 61.25).is_ok());
    }

    #[test]
    fn rejects_blank_event_description() {
        let err = Event::new(day(date!(2020 - 01 - 01)), EventCategory::Health, "  ")
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::BlankField { .. }));
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let window = DateWindow::new(day(date!(2020 - 01 - 02)), day(date!(2020 - 01 - 09)));
        assert!(window.contains(day(date!(2020 - 01 - 02))));
        assert!(window.contains(day(date!(2020 - 01 - 09))));
        assert!(!window.contains(day(date!(2020 - 01 - 01))));
        assert!(!window.contains(day(date!(2020 - 01 - 10))));
    }

    #[test]
    fn inverted_window_contains_nothing() {
        let window = DateWindow::new(day(date!(2020 - 01 - 09)), day(date!(2020 - 01 - 02)));
        assert!(window.is_inverted());
        assert!(!window.contains(day(date!(2020 - 01 - 05))));
    }

    #[test]
    fn clamps_into_dashboard_bounds() {
        let window = DateWindow::new(day(date!(2001 - 06 - 01)), day(date!(2030 - 01 - 01)));
        assert_eq!(window.clamp_to(&DateWindow::dashboard_bounds()), DateWindow::dashboard_bounds());
    }

    #[test]
    fn change_point_metadata_reads_numbers_and_numeric_strings() {
        let point = ChangePoint::new(day(date!(2020 - 03 - 09)))
            .with_metadata("Price_Before", json!(51.3))
            .with_metadata("Price_After", json!("33.1"))
            .with_metadata("Closest_Event_Type", json!("Economic"));

        assert_eq!(point.metadata_f64("Price_Before"), Some(51.3));
        assert_eq!(point.metadata_f64("Price_After"), Some(33.1));
        assert_eq!(point.metadata_str("Closest_Event_Type"), Some("Economic"));
        assert_eq!(point.metadata_f64("Missing"), None);
    }
}
