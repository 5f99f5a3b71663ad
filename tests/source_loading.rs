//! Behavior-driven tests for loading the three feeds
//!
//! These tests verify how a session gets its data: the all-or-nothing fan-out
//! load, HTTP status and payload handling, file fixtures in JSON and CSV, and
//! how malformed rows are reported without aborting the load.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use oilwatch_core::{
    AppState, DashboardSource, EventCategory, Feed, FileSource, HttpClient, HttpError,
    HttpRequest, HttpResponse, HttpSource, SourceErrorKind, TradingDate,
};
use time::macros::date;

/// Serves canned responses keyed by URL and records every request.
#[derive(Default)]
struct FakeHttpClient {
    responses: HashMap<String, Result<HttpResponse, HttpError>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeHttpClient {
    fn respond(mut self, url: &str, response: Result<HttpResponse, HttpError>) -> Self {
        self.responses.insert(url.to_owned(), response);
        self
    }

    fn requested_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .requests
            .lock()
            .expect("lock")
            .iter()
            .map(|request| request.url.clone())
            .collect();
        urls.sort();
        urls
    }
}

impl HttpClient for FakeHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.responses.get(&request.url).cloned().unwrap_or_else(|| {
                Ok(HttpResponse {
                    status: 404,
                    body: String::new(),
                })
            });
            self.requests.lock().expect("lock").push(request);
            response
        })
    }
}

const BASE: &str = "http://dashboard.test";

fn healthy_backend() -> FakeHttpClient {
    FakeHttpClient::default()
        .respond(
            "http://dashboard.test/api/prices",
            Ok(HttpResponse::ok_json(
                r#"[{"Date":"2020-03-06","Price":45.27},{"Date":"2020-03-10","Price":"37.22"}]"#,
            )),
        )
        .respond(
            "http://dashboard.test/api/events",
            Ok(HttpResponse::ok_json(
                r#"[{"Date":"2020-03-08","Type":"OPEC Policy","Event":"OPEC+ talks collapse"}]"#,
            )),
        )
        .respond(
            "http://dashboard.test/api/results",
            Ok(HttpResponse::ok_json(r#"[{"Change_Point_Date":"2020-03-09"}]"#)),
        )
}

fn day(date: time::Date) -> TradingDate {
    TradingDate::from_date(date)
}

// =============================================================================
// HTTP source
// =============================================================================

#[tokio::test]
async fn when_all_feeds_answer_the_session_holds_every_collection() {
    // Given: a backend serving all three feeds
    let client = Arc::new(healthy_backend());
    let source = HttpSource::with_client(BASE, client.clone());

    // When: the session loads
    let state = AppState::load(&source).await.expect("load succeeds");

    // Then: each feed was requested once and normalized
    assert_eq!(
        client.requested_urls(),
        vec![
            "http://dashboard.test/api/events",
            "http://dashboard.test/api/prices",
            "http://dashboard.test/api/results",
        ]
    );
    assert_eq!(state.prices.len(), 2);
    assert_eq!(state.prices[1].price, 37.22);
    assert_eq!(state.events[0].category, EventCategory::OpecPolicy);
    assert_eq!(state.change_points[0].date, day(date!(2020 - 03 - 09)));
    assert!(state.dropped.is_empty());
}

#[tokio::test]
async fn when_one_feed_fails_nothing_is_loaded() {
    // Given: the events endpoint answers with a server error
    let client = healthy_backend().respond(
        "http://dashboard.test/api/events",
        Ok(HttpResponse {
            status: 500,
            body: String::from("boom"),
        }),
    );
    let source = HttpSource::with_client(BASE, Arc::new(client));

    // When: the session loads
    let error = AppState::load(&source).await.expect_err("load must fail");

    // Then: a single error names the failed feed
    assert_eq!(error.failures.len(), 1);
    assert_eq!(error.failures[0].feed, Feed::Events);
    assert_eq!(error.failures[0].error.kind(), SourceErrorKind::Unavailable);
    assert!(error.to_string().contains("events"));
}

#[tokio::test]
async fn when_several_feeds_fail_every_failure_is_reported() {
    // Given: prices time out and results are missing
    let client = healthy_backend()
        .respond(
            "http://dashboard.test/api/prices",
            Err(HttpError::timeout("request timed out")),
        )
        .respond(
            "http://dashboard.test/api/results",
            Ok(HttpResponse {
                status: 404,
                body: String::new(),
            }),
        );
    let source = HttpSource::with_client(BASE, Arc::new(client));

    // When: the session loads
    let error = AppState::load(&source).await.expect_err("load must fail");

    // Then: both failures are listed in feed order with their kinds
    let kinds: Vec<(Feed, SourceErrorKind)> = error
        .failures
        .iter()
        .map(|failure| (failure.feed, failure.error.kind()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (Feed::Prices, SourceErrorKind::Timeout),
            (Feed::Results, SourceErrorKind::NotFound),
        ]
    );
    assert!(error.failures[0].error.retryable());
}

#[tokio::test]
async fn when_a_feed_is_not_a_json_array_the_payload_is_rejected() {
    // Given: the prices endpoint returns an object
    let client = healthy_backend().respond(
        "http://dashboard.test/api/prices",
        Ok(HttpResponse::ok_json(r#"{"error":"maintenance"}"#)),
    );
    let source = HttpSource::with_client(BASE, Arc::new(client));

    // When: fetching prices directly
    let error = source.fetch(Feed::Prices).await.expect_err("must fail");

    // Then: the failure is an invalid payload
    assert_eq!(error.kind(), SourceErrorKind::InvalidPayload);
    assert_eq!(error.code(), "source.invalid_payload");
}

#[tokio::test]
async fn when_rows_are_malformed_they_are_dropped_and_reported() {
    // Given: one bad price, one unknown category and one bad change-point date
    let client = FakeHttpClient::default()
        .respond(
            "http://dashboard.test/api/prices",
            Ok(HttpResponse::ok_json(
                r#"[{"Date":"2020-03-06","Price":45.27},{"Date":"2020-03-07","Price":"n/a"}]"#,
            )),
        )
        .respond(
            "http://dashboard.test/api/events",
            Ok(HttpResponse::ok_json(
                r#"[{"Date":"2020-03-08","Type":"Weather","Event":"Hurricane"}]"#,
            )),
        )
        .respond(
            "http://dashboard.test/api/results",
            Ok(HttpResponse::ok_json(
                r#"[{"Change_Point_Date":"someday"},{"Change_Point_Date":"2020-03-09"}]"#,
            )),
        );
    let source = HttpSource::with_client(BASE, Arc::new(client));

    // When: the session loads
    let state = AppState::load(&source).await.expect("load succeeds");

    // Then: valid rows are kept and each dropped row is recorded
    assert_eq!(state.prices.len(), 1);
    assert!(state.events.is_empty());
    assert_eq!(state.change_points.len(), 1);

    let dropped: Vec<(Feed, usize)> = state
        .dropped
        .iter()
        .map(|record| (record.feed, record.index))
        .collect();
    assert_eq!(
        dropped,
        vec![(Feed::Prices, 1), (Feed::Events, 0), (Feed::Results, 0)]
    );
}

// =============================================================================
// File source
// =============================================================================

#[tokio::test]
async fn when_files_use_the_brent_csv_formats_they_load() {
    // Given: a directory with Brent-style CSV prices, a CSV event list and JSON results
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join("prices.csv"),
        "Date,Price\n20-May-87,18.63\n\"Apr 22, 2020\",13.77\n21-Apr-20,17.36\n",
    )
    .expect("write prices");
    std::fs::write(
        dir.path().join("events.csv"),
        "Date,Type,Description\n\
         2020-04-20,Economic,WTI futures turn negative\n\
         2020-04-21,Economic,1973\n",
    )
    .expect("write events");
    std::fs::write(
        dir.path().join("results.json"),
        r#"[{"Change_Point_Date":"2020-04-21T00:00:00","Confidence":0.8}]"#,
    )
    .expect("write results");

    // When: the session loads from the directory
    let state = AppState::load(&FileSource::from_dir(dir.path()))
        .await
        .expect("load succeeds");

    // Then: dates are parsed from every format and prices are in date order
    let dates: Vec<TradingDate> = state.prices.iter().map(|point| point.date).collect();
    assert_eq!(
        dates,
        vec![
            day(date!(1987 - 05 - 20)),
            day(date!(2020 - 04 - 21)),
            day(date!(2020 - 04 - 22)),
        ]
    );
    assert_eq!(state.events[0].description, "WTI futures turn negative");
    assert_eq!(state.events[1].description, "1973");
    assert!(state.dropped.is_empty(), "{:?}", state.dropped);
    assert_eq!(state.change_points[0].date, day(date!(2020 - 04 - 21)));
    assert_eq!(state.change_points[0].metadata_f64("Confidence"), Some(0.8));
}

#[tokio::test]
async fn when_a_feed_file_is_missing_the_load_fails() {
    // Given: a directory with prices and events only
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("prices.json"), r#"[{"Date":"2020-01-01","Price":61.0}]"#)
        .expect("write prices");
    std::fs::write(dir.path().join("events.json"), "[]").expect("write events");

    // When: the session loads
    let error = AppState::load(&FileSource::from_dir(dir.path()))
        .await
        .expect_err("load must fail");

    // Then: the results feed is reported as not found
    assert_eq!(error.failures.len(), 1);
    assert_eq!(error.failures[0].feed, Feed::Results);
    assert_eq!(error.failures[0].error.kind(), SourceErrorKind::NotFound);
}

#[tokio::test]
async fn when_an_explicit_path_is_given_it_overrides_the_directory() {
    // Given: results stored under a custom name
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("prices.json"), "[]").expect("write prices");
    std::fs::write(dir.path().join("events.json"), "[]").expect("write events");
    let custom = dir.path().join("change_points_2022.json");
    std::fs::write(&custom, r#"[{"Change_Point_Date":"2022-02-24"}]"#).expect("write results");

    // When: the source points the results feed at that file
    let source = FileSource::from_dir(dir.path()).with_path(Feed::Results, &custom);
    let state = AppState::load(&source).await.expect("load succeeds");

    // Then: the change point is read from it
    assert_eq!(state.change_points[0].date, day(date!(2022 - 02 - 24)));
}
