//! # Domain Models
//!
//! Canonical types shared by the filtering, correlation and delta stages.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TradingDate`] | Calendar date with whole-day granularity |
//! | [`EventCategory`] | Event taxonomy (Conflict, Economic, OPEC Policy, Sanctions, Health) |
//! | [`CategoryFilter`] | `All` or a single category |
//! | [`PricePoint`] | Daily price |
//! | [`Event`] | Curated real-world event |
//! | [`ChangePoint`] | Upstream change point with opaque metadata |
//! | [`DateWindow`] | Inclusive date range |
//! | [`CorrelationResult`] | One row of the change-point table |
//! | [`ChartAnnotation`] | Marker for a chart renderer |
//!
//! Construction validates invariants; collections of these values are never
//! mutated after loading.

mod category;
mod date;
mod models;

pub use category::{CategoryFilter, EventCategory};
pub use date::TradingDate;
pub use models::{
    AnnotationKind, ChangePoint, ChartAnnotation, CorrelationResult, DateWindow, Event,
    PricePoint,
};
