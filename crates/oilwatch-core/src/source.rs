//! Read-only feed sources.
//!
//! A [`DashboardSource`] hands back each feed as raw JSON rows; turning rows
//! into domain values (and dropping malformed ones) is the job of
//! [`wire`](crate::wire).

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::wire::{rows_from_csv, Feed};

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    Timeout,
    InvalidPayload,
    NotFound,
}

/// Failure to obtain one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidPayload,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::InvalidPayload => "source.invalid_payload",
            SourceErrorKind::NotFound => "source.not_found",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Provider of the three feeds.
pub trait DashboardSource: Send + Sync {
    /// Short label for metadata, e.g. `http` or `file`.
    fn kind(&self) -> &'static str;

    /// Human-readable location (base URL or directory).
    fn location(&self) -> String;

    /// Fetches one complete feed as raw rows.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the feed cannot be obtained or is not a
    /// list of rows. Individual malformed rows are not an error here.
    fn fetch<'a>(
        &'a self,
        feed: Feed,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Value>, SourceError>> + Send + 'a>>;
}

/// Feeds served over HTTP at `{base_url}/api/{prices,events,results}`.
#[derive(Clone)]
pub struct HttpSource {
    base_url: String,
    client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Arc::new(ReqwestHttpClient::default()))
    }

    pub fn with_client(base_url: impl Into<String>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
            timeout_ms: 3_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn feed_url(&self, feed: Feed) -> String {
        format!("{}{}", self.base_url, feed.api_path())
    }
}

impl DashboardSource for HttpSource {
    fn kind(&self) -> &'static str {
        "http"
    }

    fn location(&self) -> String {
        self.base_url.clone()
    }

    fn fetch<'a>(
        &'a self,
        feed: Feed,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Value>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.feed_url(feed))
                .with_header("accept", "application/json")
                .with_timeout_ms(self.timeout_ms);
            debug!(%feed, url = %request.url, "fetching feed");

            let response = self.client.execute(request).await.map_err(|error| {
                if error.timed_out() {
                    SourceError::timeout(format!("{feed} feed: {error}"))
                } else {
                    SourceError::unavailable(format!("{feed} feed: {error}"))
                }
            })?;

            if !response.is_success() {
                let message = format!("{feed} feed returned HTTP {}", response.status);
                return Err(if response.status == 404 {
                    SourceError::not_found(message)
                } else {
                    SourceError::unavailable(message)
                });
            }

            parse_json_rows(feed, &response.body)
        })
    }
}

/// Feeds read from local files.
///
/// For each feed the source looks for `<dir>/<feed>.json` (a JSON array),
/// then `<dir>/<feed>.csv` (headed CSV). Explicit paths take precedence.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    dir: Option<PathBuf>,
    paths: HashMap<Feed, PathBuf>,
}

impl FileSource {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            paths: HashMap::new(),
        }
    }

    pub fn with_path(mut self, feed: Feed, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(feed, path.into());
        self
    }

    async fn resolve(&self, feed: Feed) -> Result<PathBuf, SourceError> {
        if let Some(path) = self.paths.get(&feed) {
            return Ok(path.clone());
        }

        let Some(dir) = &self.dir else {
            return Err(SourceError::not_found(format!(
                "{feed} feed: no file configured"
            )));
        };

        for extension in ["json", "csv"] {
            let candidate = dir.join(format!("{}.{extension}", feed.as_str()));
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Ok(candidate);
            }
        }

        Err(SourceError::not_found(format!(
            "{feed} feed: neither {feed}.json nor {feed}.csv found in {}",
            dir.display()
        )))
    }
}

impl DashboardSource for FileSource {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn location(&self) -> String {
        self.dir
            .as_deref()
            .map_or_else(|| String::from("<explicit paths>"), |dir| dir.display().to_string())
    }

    fn fetch<'a>(
        &'a self,
        feed: Feed,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Value>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let path = self.resolve(feed).await?;
            debug!(%feed, path = %path.display(), "reading feed file");

            let body = tokio::fs::read_to_string(&path).await.map_err(|error| {
                SourceError::unavailable(format!(
                    "{feed} feed: cannot read {}: {error}",
                    path.display()
                ))
            })?;

            if is_csv(&path) {
                rows_from_csv(body.as_bytes()).map_err(|error| {
                    SourceError::invalid_payload(format!("{feed} feed: invalid CSV: {error}"))
                })
            } else {
                parse_json_rows(feed, &body)
            }
        })
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("csv"))
}

fn parse_json_rows(feed: Feed, body: &str) -> Result<Vec<Value>, SourceError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(rows)) => Ok(rows),
        Ok(_) => Err(SourceError::invalid_payload(format!(
            "{feed} feed is not a JSON array"
        ))),
        Err(error) => Err(SourceError::invalid_payload(format!(
            "{feed} feed is not valid JSON: {error}"
        ))),
    }
}
