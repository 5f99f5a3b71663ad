//! Re-derivation of everything the presentation layer shows.
//!
//! The window only affects what the chart shows; the change-point table is
//! always computed against the complete event and price history so that it
//! stays stable while the window moves.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::correlate::nearest_event;
use crate::delta::DeltaMethod;
use crate::state::AppState;
use crate::window::filter_window;
use crate::{
    AnnotationKind, CategoryFilter, ChangePoint, ChartAnnotation, CorrelationResult, DateWindow,
    Event, PricePoint,
};

/// Label drawn on change-point annotations.
pub const CHANGE_POINT_LABEL: &str = "Change Point";

/// Current state of the dashboard controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRequest {
    pub window: DateWindow,
    pub category: CategoryFilter,
    #[serde(default)]
    pub delta_method: DeltaMethod,
}

impl ViewRequest {
    pub fn new(window: DateWindow, category: CategoryFilter) -> Self {
        Self {
            window,
            category,
            delta_method: DeltaMethod::default(),
        }
    }

    pub fn with_delta_method(mut self, delta_method: DeltaMethod) -> Self {
        self.delta_method = delta_method;
        self
    }
}

/// Everything derived for one control state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView {
    pub window: DateWindow,
    pub category: CategoryFilter,
    pub delta_method: DeltaMethod,
    pub filtered_prices: Vec<PricePoint>,
    pub filtered_events: Vec<Event>,
    pub correlations: Vec<CorrelationResult>,
    pub annotations: Vec<ChartAnnotation>,
}

/// Derives prices, events, correlation rows and chart annotations.
pub fn derive_view(state: &AppState, request: &ViewRequest) -> DerivedView {
    let filtered_prices = filter_window(&state.prices, &request.window);
    let filtered_events: Vec<Event> = filter_window(&state.events, &request.window)
        .into_iter()
        .filter(|event| request.category.matches(event.category))
        .collect();
    let correlations = correlate_change_points(state, request.category, request.delta_method);
    let annotations = annotations(&state.change_points, &filtered_events);

    debug!(
        start = %request.window.start,
        end = %request.window.end,
        category = %request.category,
        prices = filtered_prices.len(),
        events = filtered_events.len(),
        rows = correlations.len(),
        "view derived"
    );

    DerivedView {
        window: request.window,
        category: request.category,
        delta_method: request.delta_method,
        filtered_prices,
        filtered_events,
        correlations,
        annotations,
    }
}

/// One table row per change point, in change-point order.
pub fn correlate_change_points(
    state: &AppState,
    category: CategoryFilter,
    delta_method: DeltaMethod,
) -> Vec<CorrelationResult> {
    state
        .change_points
        .iter()
        .map(|change_point| correlation_row(state, change_point, category, delta_method))
        .collect()
}

fn correlation_row(
    state: &AppState,
    change_point: &ChangePoint,
    category: CategoryFilter,
    delta_method: DeltaMethod,
) -> CorrelationResult {
    let delta = delta_method.compute(change_point.date, &state.prices);
    let nearest = nearest_event(change_point.date, &state.events, category);

    CorrelationResult {
        change_point_date: change_point.date,
        price_before: delta.price_before,
        price_after: delta.price_after,
        percent_change: delta.percent_change,
        closest_event_description: nearest.map(|(event, _)| event.description.clone()),
        closest_event_category: nearest.map(|(event, _)| event.category),
        closest_event_date: nearest.map(|(event, _)| event.date),
        distance_days: nearest.map(|(_, distance)| distance),
    }
}

fn annotations(change_points: &[ChangePoint], events: &[Event]) -> Vec<ChartAnnotation> {
    let change_point_marks = change_points.iter().map(|change_point| ChartAnnotation {
        date: change_point.date,
        kind: AnnotationKind::ChangePoint,
        label: String::from(CHANGE_POINT_LABEL),
        category: None,
    });
    let event_marks = events.iter().map(|event| ChartAnnotation {
        date: event.date,
        kind: AnnotationKind::Event,
        label: event.description.clone(),
        category: Some(event.category),
    });

    change_point_marks.chain(event_marks).collect()
}
