//! # oilwatch core
//!
//! Temporal alignment of a commodity price series with curated real-world
//! events and upstream-detected change points.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Dates, categories, prices, events, change points, windows |
//! | [`wire`] | Feed records and their normalization (malformed rows are dropped) |
//! | [`window`] | Inclusive date-window filtering |
//! | [`correlate`] | Nearest event per change point |
//! | [`delta`] | Before/after prices and percentage change |
//! | [`pipeline`] | `derive_view`: everything the presentation layer shows |
//! | [`state`] | Session state and the all-or-nothing `load` |
//! | [`source`] | HTTP and file feed sources |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`config`] | Environment-driven configuration |
//! | [`verify`] | Cross-check of pre-joined upstream results |
//! | [`envelope`] | Output envelope with metadata |
//!
//! ## Data flow
//!
//! ```text
//! source ──fetch×3──▶ wire::normalize_* ──▶ AppState
//!                                              │
//!                  ViewRequest ──▶ pipeline::derive_view
//!                                   ├─ window::filter_window   (prices, events)
//!                                   ├─ correlate::nearest_event (all change points, all events)
//!                                   └─ delta::DeltaMethod       (all prices)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use oilwatch_core::{derive_view, AppState, CategoryFilter, DateWindow, FileSource, ViewRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::load(&FileSource::from_dir("data")).await?;
//!     let request = ViewRequest::new(DateWindow::dashboard_bounds(), CategoryFilter::All);
//!     for row in derive_view(&state, &request).correlations {
//!         println!("{} {:?}", row.change_point_date, row.closest_event_description);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod correlate;
pub mod delta;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod pipeline;
pub mod source;
pub mod state;
pub mod verify;
pub mod window;
pub mod wire;

pub use config::{ConfigError, DashboardConfig};
pub use correlate::{correlate, nearest_event, EventMatch};
pub use delta::{compute_delta, compute_segment_delta, percent_change, DeltaMethod, PriceDelta};
pub use domain::{
    AnnotationKind, CategoryFilter, ChangePoint, ChartAnnotation, CorrelationResult, DateWindow,
    Event, EventCategory, PricePoint, TradingDate,
};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};
pub use error::ValidationError;
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use pipeline::{correlate_change_points, derive_view, DerivedView, ViewRequest};
pub use source::{DashboardSource, FileSource, HttpSource, SourceError, SourceErrorKind};
pub use state::{AppState, FetchFailure, LoadError};
pub use verify::{verify_upstream, Discrepancy, VerificationReport, VerifiedField, VerifyOptions};
pub use window::{filter_window, Dated};
pub use wire::{DroppedRecord, Feed};
