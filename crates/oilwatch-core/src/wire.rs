//! Records exactly as the three feeds deliver them, and their normalization
//! into domain values.
//!
//! Normalization never fails as a whole: a row that cannot be turned into a
//! domain value is dropped and reported as a [`DroppedRecord`].

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::window::Dated;
use crate::{ChangePoint, Event, EventCategory, PricePoint, TradingDate, ValidationError};

/// One of the three read-only collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Prices,
    Events,
    Results,
}

impl Feed {
    pub const ALL: [Self; 3] = [Self::Prices, Self::Events, Self::Results];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prices => "prices",
            Self::Events => "events",
            Self::Results => "results",
        }
    }

    /// Path of the feed below the API base URL.
    pub const fn api_path(self) -> &'static str {
        match self {
            Self::Prices => "/api/prices",
            Self::Events => "/api/events",
            Self::Results => "/api/results",
        }
    }
}

impl Display for Feed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric field that may arrive as a JSON number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    pub fn to_f64(&self, field: &'static str) -> Result<f64, ValidationError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| ValidationError::NotANumber {
                    field,
                    value: text.clone(),
                }),
        }
    }
}

/// `{Date, Price}` row of the prices feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Price")]
    pub price: RawNumber,
}

impl PriceRecord {
    pub fn normalize(self) -> Result<PricePoint, ValidationError> {
        let date = TradingDate::parse(&self.date)?;
        PricePoint::new(date, self.price.to_f64("price")?)
    }
}

/// `{Date, Type, Event}` row of the events feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Type")]
    pub category: String,
    #[serde(rename = "Event", alias = "Description")]
    pub description: String,
}

impl EventRecord {
    pub fn normalize(self) -> Result<Event, ValidationError> {
        let date = TradingDate::parse(&self.date)?;
        let category: EventCategory = self.category.parse()?;
        Event::new(date, category, self.description.trim())
    }
}

/// Row of the results feed. Only the change-point date is required; every
/// other column is carried through as metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "Change_Point_Date")]
    pub change_point_date: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ResultRecord {
    pub fn normalize(self) -> Result<ChangePoint, ValidationError> {
        let date = TradingDate::parse(&self.change_point_date)?;
        Ok(ChangePoint {
            date,
            metadata: self.extra,
        })
    }
}

impl Dated for PriceRecord {
    fn trading_date(&self) -> Option<TradingDate> {
        TradingDate::parse(&self.date).ok()
    }
}

impl Dated for EventRecord {
    fn trading_date(&self) -> Option<TradingDate> {
        TradingDate::parse(&self.date).ok()
    }
}

/// A row that was skipped during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedRecord {
    pub feed: Feed,
    pub index: usize,
    pub reason: String,
}

/// Outcome of normalizing one feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub items: Vec<T>,
    pub dropped: Vec<DroppedRecord>,
}

/// Normalizes price rows and orders them by date.
pub fn normalize_prices(rows: Vec<Value>) -> Normalized<PricePoint> {
    let mut normalized = normalize_rows(Feed::Prices, rows, PriceRecord::normalize);
    if !normalized
        .items
        .windows(2)
        .all(|pair| pair[0].date <= pair[1].date)
    {
        debug!(count = normalized.items.len(), "sorting prices by date");
        normalized.items.sort_by_key(|point| point.date);
    }
    normalized
}

/// Normalizes event rows, keeping delivery order.
pub fn normalize_events(rows: Vec<Value>) -> Normalized<Event> {
    normalize_rows(Feed::Events, rows, EventRecord::normalize)
}

pub fn normalize_change_points(rows: Vec<Value>) -> Normalized<ChangePoint> {
    normalize_rows(Feed::Results, rows, ResultRecord::normalize)
}

fn normalize_rows<R, T>(
    feed: Feed,
    rows: Vec<Value>,
    convert: impl Fn(R) -> Result<T, ValidationError>,
) -> Normalized<T>
where
    R: DeserializeOwned,
{
    let mut items = Vec::with_capacity(rows.len());
    let mut dropped = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        let outcome = serde_json::from_value::<R>(row)
            .map_err(|error| error.to_string())
            .and_then(|record| convert(record).map_err(|error| error.to_string()));

        match outcome {
            Ok(item) => items.push(item),
            Err(reason) => {
                warn!(%feed, index, %reason, "dropping malformed record");
                dropped.push(DroppedRecord {
                    feed,
                    index,
                    reason,
                });
            }
        }
    }

    Normalized { items, dropped }
}

/// Reads a headed CSV document into JSON rows keyed by column name.
///
/// Empty cells become `null` and every other cell stays text. Prices and
/// metadata accept numeric text, so no type is guessed here.
pub fn rows_from_csv<R: std::io::Read>(input: R) -> Result<Vec<Value>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_owned(), csv_cell(cell)))
            .collect();
        rows.push(Value::Object(row));
    }

    Ok(rows)
}

fn csv_cell(cell: &str) -> Value {
    if cell.is_empty() {
        Value::Null
    } else {
        Value::String(cell.to_owned())
    }
}
