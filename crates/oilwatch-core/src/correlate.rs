//! Nearest-event matching for change points.

use serde::{Deserialize, Serialize};

use crate::{CategoryFilter, ChangePoint, Event, TradingDate};

/// Closest event to a change point, if any candidate exists.
///
/// `event` and `distance_days` are either both present or both absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventMatch {
    pub event: Option<Event>,
    pub distance_days: Option<i64>,
}

impl EventMatch {
    pub const fn none() -> Self {
        Self {
            event: None,
            distance_days: None,
        }
    }

    pub const fn is_none(&self) -> bool {
        self.event.is_none()
    }
}

/// Finds the event closest in time to `change_point` among the events that
/// pass `filter`.
///
/// Distance is measured in whole days. Among equidistant events the one that
/// appears first in `events` wins.
pub fn correlate(change_point: &ChangePoint, events: &[Event], filter: CategoryFilter) -> EventMatch {
    match nearest_event(change_point.date, events, filter) {
        Some((event, distance)) => EventMatch {
            event: Some(event.clone()),
            distance_days: Some(distance),
        },
        None => EventMatch::none(),
    }
}

/// Borrowing variant of [`correlate`] keyed by date.
pub fn nearest_event(
    date: TradingDate,
    events: &[Event],
    filter: CategoryFilter,
) -> Option<(&Event, i64)> {
    events
        .iter()
        .filter(|event| filter.matches(event.category))
        .map(|event| (event, date.distance_days(event.date)))
        .fold(None, |best, candidate| match best {
            Some((_, best_distance)) if best_distance <= candidate.1 => best,
            _ => Some(candidate),
        })
}
