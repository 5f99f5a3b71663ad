//! Session state: the three collections, loaded once and never mutated.

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::source::{DashboardSource, SourceError};
use crate::wire::{
    normalize_change_points, normalize_events, normalize_prices, DroppedRecord, Feed,
};
use crate::{ChangePoint, Event, PricePoint};

/// One feed that could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub feed: Feed,
    pub error: SourceError,
}

/// Aggregate load failure. Nothing is loaded when any feed fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load data: {}", summarize(.failures))]
pub struct LoadError {
    pub failures: Vec<FetchFailure>,
}

fn summarize(failures: &[FetchFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{}: {}", failure.feed, failure.error.message()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Prices, events and change points for one session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    /// Ordered by date ascending.
    pub prices: Vec<PricePoint>,
    /// In delivery order.
    pub events: Vec<Event>,
    pub change_points: Vec<ChangePoint>,
    /// Rows skipped during normalization.
    pub dropped: Vec<DroppedRecord>,
}

impl AppState {
    pub fn new(
        mut prices: Vec<PricePoint>,
        events: Vec<Event>,
        change_points: Vec<ChangePoint>,
    ) -> Self {
        prices.sort_by_key(|point| point.date);
        Self {
            prices,
            events,
            change_points,
            dropped: Vec::new(),
        }
    }

    /// Builds state from raw feed rows, dropping malformed rows.
    pub fn from_rows(prices: Vec<Value>, events: Vec<Value>, results: Vec<Value>) -> Self {
        let prices = normalize_prices(prices);
        let events = normalize_events(events);
        let change_points = normalize_change_points(results);

        let mut dropped = prices.dropped;
        dropped.extend(events.dropped);
        dropped.extend(change_points.dropped);
        if !dropped.is_empty() {
            warn!(count = dropped.len(), "malformed records dropped during load");
        }

        Self {
            prices: prices.items,
            events: events.items,
            change_points: change_points.items,
            dropped,
        }
    }

    /// Fetches all three feeds concurrently and normalizes them.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] naming every feed that failed; no partial state
    /// is produced.
    pub async fn load(source: &dyn DashboardSource) -> Result<Self, LoadError> {
        info!(source = source.kind(), location = %source.location(), "loading feeds");

        let (prices, events, results) = tokio::join!(
            source.fetch(Feed::Prices),
            source.fetch(Feed::Events),
            source.fetch(Feed::Results),
        );

        match (prices, events, results) {
            (Ok(prices), Ok(events), Ok(results)) => {
                let state = Self::from_rows(prices, events, results);
                info!(
                    prices = state.prices.len(),
                    events = state.events.len(),
                    change_points = state.change_points.len(),
                    dropped = state.dropped.len(),
                    "feeds loaded"
                );
                Ok(state)
            }
            (prices, events, results) => {
                let failures: Vec<_> = [
                    (Feed::Prices, prices.err()),
                    (Feed::Events, events.err()),
                    (Feed::Results, results.err()),
                ]
                .into_iter()
                .filter_map(|(feed, error)| error.map(|error| FetchFailure { feed, error }))
                .collect();
                let error = LoadError { failures };
                warn!(%error, "load failed");
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_rows_collects_dropped_records_across_feeds() {
        let state = AppState::from_rows(
            vec![json!({"Date": "2020-01-01", "Price": 50.0}), json!({"Date": "?", "Price": 1})],
            vec![json!({"Date": "2020-01-01", "Type": "Unknown", "Event": "x"})],
            vec![json!({"Change_Point_Date": "2020-01-05"})],
        );

        assert_eq!(state.prices.len(), 1);
        assert!(state.events.is_empty());
        assert_eq!(state.change_points.len(), 1);
        let feeds: Vec<_> = state.dropped.iter().map(|d| d.feed).collect();
        assert_eq!(feeds, [Feed::Prices, Feed::Events]);
    }

    #[test]
    fn load_error_lists_every_failed_feed() {
        let error = LoadError {
            failures: vec![
                FetchFailure {
                    feed: Feed::Prices,
                    error: SourceError::unavailable("prices feed returned HTTP 503"),
                },
                FetchFailure {
                    feed: Feed::Results,
                    error: SourceError::timeout("results feed: request timed out"),
                },
            ],
        };

        assert_eq!(
            error.to_string(),
            "failed to load data: prices: prices feed returned HTTP 503; results: results feed: request timed out"
        );
    }
}
