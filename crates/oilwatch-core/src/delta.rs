//! Before/after price deltas around a change point.
//!
//! `prices` must be ordered by date ascending, which is what
//! [`normalize_prices`](crate::wire::normalize_prices) produces.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DateWindow, PricePoint, TradingDate, ValidationError};

/// Prices on either side of a change point and the relative move between them.
///
/// All values are full precision; rounding is left to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceDelta {
    pub price_before: Option<f64>,
    pub price_after: Option<f64>,
    pub percent_change: Option<f64>,
}

impl PriceDelta {
    pub const fn unavailable() -> Self {
        Self {
            price_before: None,
            price_after: None,
            percent_change: None,
        }
    }

    fn between(before: f64, after: f64) -> Self {
        Self {
            price_before: Some(before),
            price_after: Some(after),
            percent_change: percent_change(before, after),
        }
    }
}

/// How the "before" and "after" prices are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeltaMethod {
    /// Last price strictly before the date against the first price on or after it.
    #[default]
    Neighbor,
    /// Mean of the prices before the date against the mean of the prices on or
    /// after it, both taken inside the dashboard bounds.
    SegmentMean,
}

impl DeltaMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neighbor => "neighbor",
            Self::SegmentMean => "segment-mean",
        }
    }

    pub fn compute(self, date: TradingDate, prices: &[PricePoint]) -> PriceDelta {
        match self {
            Self::Neighbor => compute_delta(date, prices),
            Self::SegmentMean => {
                compute_segment_delta(date, prices, &DateWindow::dashboard_bounds())
            }
        }
    }
}

impl Display for DeltaMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeltaMethod {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "neighbor" => Ok(Self::Neighbor),
            "segment-mean" | "segment_mean" => Ok(Self::SegmentMean),
            _ => Err(ValidationError::InvalidDeltaMethod {
                value: value.to_owned(),
            }),
        }
    }
}

/// Neighbor delta. A price dated exactly on `date` counts as "after".
pub fn compute_delta(date: TradingDate, prices: &[PricePoint]) -> PriceDelta {
    let (before, after) = split_at_date(date, prices);
    match (before.last(), after.first()) {
        (Some(before), Some(after)) => PriceDelta::between(before.price, after.price),
        _ => PriceDelta::unavailable(),
    }
}

/// Segment-mean delta. Only prices inside `bounds` contribute to either mean.
pub fn compute_segment_delta(
    date: TradingDate,
    prices: &[PricePoint],
    bounds: &DateWindow,
) -> PriceDelta {
    let (before, after) = split_at_date(date, within(prices, bounds));
    match (mean_price(before), mean_price(after)) {
        (Some(before), Some(after)) => PriceDelta::between(before, after),
        _ => PriceDelta::unavailable(),
    }
}

/// `(after - before) / before * 100`, undefined for a zero base.
pub fn percent_change(before: f64, after: f64) -> Option<f64> {
    if before == 0.0 {
        return None;
    }
    let change = (after - before) / before * 100.0;
    change.is_finite().then_some(change)
}

fn split_at_date(date: TradingDate, prices: &[PricePoint]) -> (&[PricePoint], &[PricePoint]) {
    let split = prices.partition_point(|point| point.date < date);
    prices.split_at(split)
}

fn within<'a>(prices: &'a [PricePoint], bounds: &DateWindow) -> &'a [PricePoint] {
    let start = prices.partition_point(|point| point.date < bounds.start);
    let end = prices.partition_point(|point| point.date <= bounds.end).max(start);
    &prices[start..end]
}

fn mean_price(prices: &[PricePoint]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().map(|point| point.price).sum::<f64>() / prices.len() as f64)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn day(date: time::Date) -> TradingDate {
        TradingDate::from_date(date)
    }

    fn point(date: time::Date, price: f64) -> PricePoint {
        PricePoint::new(day(date), price).expect("valid point")
    }

    fn two_points() -> Vec<PricePoint> {
        vec![point(date!(2020 - 01 - 01), 50.0), point(date!(2020 - 01 - 10), 60.0)]
    }

    #[test]
    fn neighbors_around_a_gap() {
        let delta = compute_delta(day(date!(2020 - 01 - 05)), &two_points());

        assert_eq!(delta.price_before, Some(50.0));
        assert_eq!(delta.price_after, Some(60.0));
        let change = delta.percent_change.expect("defined");
        assert!((change - 20.0).abs() < 1e-9);
    }

    #[test]
    fn exact_match_counts_as_after() {
        let prices = vec![
            point(date!(2020 - 01 - 01), 50.0),
            point(date!(2020 - 01 - 05), 55.0),
            point(date!(2020 - 01 - 10), 60.0),
        ];

        let delta = compute_delta(day(date!(2020 - 01 - 05)), &prices);

        assert_eq!(delta.price_before, Some(50.0));
        assert_eq!(delta.price_after, Some(55.0));
    }

    #[test]
    fn change_point_before_series_is_unavailable() {
        let delta = compute_delta(day(date!(2019 - 12 - 31)), &two_points());
        assert_eq!(delta, PriceDelta::unavailable());
    }

    #[test]
    fn change_point_after_series_has_no_after_price() {
        let delta = compute_delta(day(date!(2020 - 02 - 01)), &two_points());
        assert_eq!(delta.price_after, None);
        assert_eq!(delta, PriceDelta::unavailable());
    }

    #[test]
    fn change_point_on_first_point_has_no_before_price() {
        let delta = compute_delta(day(date!(2020 - 01 - 01)), &two_points());
        assert_eq!(delta, PriceDelta::unavailable());
    }

    #[test]
    fn empty_series_is_unavailable() {
        assert_eq!(compute_delta(day(date!(2020 - 01 - 01)), &[]), PriceDelta::unavailable());
    }

    #[test]
    fn zero_base_leaves_percent_change_undefined() {
        assert_eq!(percent_change(0.0, 10.0), None);
        assert_eq!(percent_change(40.0, 30.0), Some(-25.0));
    }

    #[test]
    fn segment_mean_averages_each_side() {
        let prices = vec![
            point(date!(2020 - 01 - 01), 40.0),
            point(date!(2020 - 01 - 02), 60.0),
            point(date!(2020 - 01 - 05), 90.0),
            point(date!(2020 - 01 - 06), 110.0),
        ];

        let delta = compute_segment_delta(
            day(date!(2020 - 01 - 05)),
            &prices,
            &DateWindow::dashboard_bounds(),
        );

        assert_eq!(delta.price_before, Some(50.0));
        assert_eq!(delta.price_after, Some(100.0));
        assert_eq!(delta.percent_change, Some(100.0));
    }

    #[test]
    fn segment_mean_ignores_prices_outside_the_bounds() {
        let prices = vec![
            point(date!(1987 - 05 - 20), 18.0),
            point(date!(2012 - 01 - 03), 100.0),
            point(date!(2012 - 01 - 05), 120.0),
            point(date!(2023 - 01 - 03), 80.0),
        ];

        let delta = DeltaMethod::SegmentMean.compute(day(date!(2012 - 01 - 05)), &prices);

        assert_eq!(delta.price_before, Some(100.0));
        assert_eq!(delta.price_after, Some(120.0));
        assert_eq!(delta.percent_change, Some(20.0));
    }

    #[test]
    fn segment_mean_outside_the_bounds_is_unavailable() {
        let prices = vec![
            point(date!(2011 - 12 - 01), 90.0),
            point(date!(2011 - 12 - 20), 95.0),
        ];

        let delta = DeltaMethod::SegmentMean.compute(day(date!(2011 - 12 - 10)), &prices);

        assert_eq!(delta, PriceDelta::unavailable());
    }

    #[test]
    fn parses_method_names() {
        assert_eq!("segment-mean".parse::<DeltaMethod>(), Ok(DeltaMethod::SegmentMean));
        assert_eq!("Neighbor".parse::<DeltaMethod>(), Ok(DeltaMethod::Neighbor));
        assert!("median".parse::<DeltaMethod>().is_err());
    }
}
