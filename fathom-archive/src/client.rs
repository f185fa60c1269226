//! Archive client wrapper around plain HTTP calls.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use enum_dispatch::enum_dispatch;
use futures::TryStreamExt;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap};
use tracing::{debug, instrument};

use crate::config::ArchiveClientConfig;
use crate::error::{ArchiveApiError, check_status};
use crate::types::{
    AvailabilityResponse,
    ByteStream,
    CatalogDescriptor,
    CatalogListing,
    CatalogSummary,
    TimeRange,
};

/// Either a client for a real archive, or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ArchiveApi)]
pub enum Client {
    Http(ArchiveClient),
    Mock(MockClient),
}

/// The archive API surface the mount adapter depends on.
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ArchiveApi {
    /// Validate the configured access token against the session endpoint.
    async fn sign_in(&self) -> Result<(), ArchiveApiError>;

    /// List the child catalogs directly under `path`.
    async fn children(&self, path: &str) -> Result<Vec<CatalogSummary>, ArchiveApiError>;

    /// Fetch the full description of the catalog at `path`.
    async fn catalog(&self, path: &str) -> Result<CatalogDescriptor, ArchiveApiError>;

    /// Availability fractions for `[begin, end)`, split into `buckets`
    /// granularity buckets.
    async fn availability(
        &self,
        path: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        buckets: NonZeroU32,
    ) -> Result<Vec<f64>, ArchiveApiError>;

    /// The recorded time range of the catalog at `path`.
    async fn time_range(&self, path: &str) -> Result<TimeRange, ArchiveApiError>;

    /// Open a byte stream for one resource over `[begin, end)`.
    async fn open_stream(
        &self,
        resource: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ByteStream, ArchiveApiError>;
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// A client for the archive API of a running fathom instance.
pub struct ArchiveClient {
    http: reqwest::Client,
    config: ArchiveClientConfig,
}

impl Debug for ArchiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl ArchiveClient {
    /// Create a new archive client from configuration.
    pub fn new(config: ArchiveClientConfig) -> Result<Self, ArchiveApiError> {
        let http = build_http_client(&config)?;
        Ok(Self { http, config })
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/v1/{name}", self.config.base_url.trim_end_matches('/'))
    }
}

impl ArchiveApi for ArchiveClient {
    #[instrument(skip_all)]
    async fn sign_in(&self) -> Result<(), ArchiveApiError> {
        let body = serde_json::json!({ "token": self.config.access_token });
        let resp = self
            .http
            .post(self.endpoint("session"))
            .json(&body)
            .send()
            .await
            .map_err(ArchiveApiError::Communication)?;
        check_status(resp).await?;
        debug!("archive session established");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn children(&self, path: &str) -> Result<Vec<CatalogSummary>, ArchiveApiError> {
        let resp = self
            .http
            .get(self.endpoint("catalogs"))
            .query(&[("parent", path)])
            .send()
            .await
            .map_err(ArchiveApiError::Communication)?;
        let listing: CatalogListing = check_status(resp)
            .await?
            .json()
            .await
            .map_err(ArchiveApiError::InvalidResponsePayload)?;
        debug!(n_children = listing.items.len(), "received catalog listing");
        Ok(listing.items)
    }

    #[instrument(skip(self))]
    async fn catalog(&self, path: &str) -> Result<CatalogDescriptor, ArchiveApiError> {
        let resp = self
            .http
            .get(self.endpoint("catalog"))
            .query(&[("path", path)])
            .send()
            .await
            .map_err(ArchiveApiError::Communication)?;
        check_status(resp)
            .await?
            .json()
            .await
            .map_err(ArchiveApiError::InvalidResponsePayload)
    }

    #[instrument(skip(self))]
    async fn availability(
        &self,
        path: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        buckets: NonZeroU32,
    ) -> Result<Vec<f64>, ArchiveApiError> {
        let resp = self
            .http
            .get(self.endpoint("availability"))
            .query(&[
                ("path", path.to_string()),
                ("begin", rfc3339(begin)),
                ("end", rfc3339(end)),
                ("buckets", buckets.to_string()),
            ])
            .send()
            .await
            .map_err(ArchiveApiError::Communication)?;
        let availability: AvailabilityResponse = check_status(resp)
            .await?
            .json()
            .await
            .map_err(ArchiveApiError::InvalidResponsePayload)?;
        Ok(availability.items)
    }

    #[instrument(skip(self))]
    async fn time_range(&self, path: &str) -> Result<TimeRange, ArchiveApiError> {
        let resp = self
            .http
            .get(self.endpoint("range"))
            .query(&[("path", path)])
            .send()
            .await
            .map_err(ArchiveApiError::Communication)?;
        check_status(resp)
            .await?
            .json()
            .await
            .map_err(ArchiveApiError::InvalidResponsePayload)
    }

    #[instrument(skip(self))]
    async fn open_stream(
        &self,
        resource: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ByteStream, ArchiveApiError> {
        let resp = self
            .http
            .get(self.endpoint("data"))
            .query(&[
                ("resource", resource.to_string()),
                ("begin", rfc3339(begin)),
                ("end", rfc3339(end)),
            ])
            .send()
            .await
            .map_err(ArchiveApiError::Communication)?;
        let resp = check_status(resp).await?;
        debug!(resource, "opened data stream");
        Ok(ByteStream::new(
            resp.bytes_stream().map_err(ArchiveApiError::Communication),
        ))
    }
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// ---------------------------------------------------------------------------
// Mock client
// ---------------------------------------------------------------------------

// Arc allows pushing responses into the client after it has been handed to a
// mount; Mutex shares it across threads under tokio.
type MockField<T> = Arc<Mutex<T>>;

/// Canned responses a [`MockClient`] serves in FIFO order.
#[derive(Debug)]
pub enum MockResponse {
    SignIn,
    Children(Vec<CatalogSummary>),
    Catalog(CatalogDescriptor),
    Availability(Vec<f64>),
    TimeRange(TimeRange),
    Stream(Vec<Bytes>),
    Error { status: u16, detail: String },
}

/// An archive client that can be seeded with mock responses.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    pub mock_responses: MockField<VecDeque<MockResponse>>,
    /// Paths the mock was queried with, in call order.
    pub seen_paths: MockField<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, resp: MockResponse) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .push_back(resp);
    }

    pub fn push_sign_in_response(&self) {
        self.push(MockResponse::SignIn);
    }

    pub fn push_children_response(&self, children: Vec<CatalogSummary>) {
        self.push(MockResponse::Children(children));
    }

    pub fn push_catalog_response(&self, descriptor: CatalogDescriptor) {
        self.push(MockResponse::Catalog(descriptor));
    }

    pub fn push_availability_response(&self, fractions: Vec<f64>) {
        self.push(MockResponse::Availability(fractions));
    }

    pub fn push_time_range_response(&self, range: TimeRange) {
        self.push(MockResponse::TimeRange(range));
    }

    pub fn push_stream_response(&self, chunks: Vec<Bytes>) {
        self.push(MockResponse::Stream(chunks));
    }

    pub fn push_error_response(&self, status: u16, detail: &str) {
        self.push(MockResponse::Error {
            status,
            detail: detail.to_string(),
        });
    }

    /// Paths seen so far, for call-order assertions.
    pub fn seen_paths(&self) -> Vec<String> {
        self.seen_paths
            .lock()
            .expect("couldn't acquire mock lock")
            .clone()
    }

    fn record_path(&self, path: &str) {
        self.seen_paths
            .lock()
            .expect("couldn't acquire mock lock")
            .push(path.to_string());
    }

    fn pop(&self, operation: &str) -> Result<MockResponse, ArchiveApiError> {
        let resp = self
            .mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .pop_front()
            .unwrap_or_else(|| panic!("no mock response seeded for {operation}"));
        if let MockResponse::Error { status, detail } = resp {
            return Err(ArchiveApiError::ErrorResponse {
                status: StatusCode::from_u16(status).expect("invalid mock status code"),
                detail,
            });
        }
        Ok(resp)
    }
}

impl ArchiveApi for MockClient {
    async fn sign_in(&self) -> Result<(), ArchiveApiError> {
        match self.pop("sign_in")? {
            MockResponse::SignIn => Ok(()),
            other => panic!("unexpected mock response for sign_in: {other:?}"),
        }
    }

    async fn children(&self, path: &str) -> Result<Vec<CatalogSummary>, ArchiveApiError> {
        self.record_path(path);
        match self.pop("children")? {
            MockResponse::Children(items) => Ok(items),
            other => panic!("unexpected mock response for children: {other:?}"),
        }
    }

    async fn catalog(&self, path: &str) -> Result<CatalogDescriptor, ArchiveApiError> {
        self.record_path(path);
        match self.pop("catalog")? {
            MockResponse::Catalog(descriptor) => Ok(descriptor),
            other => panic!("unexpected mock response for catalog: {other:?}"),
        }
    }

    async fn availability(
        &self,
        path: &str,
        _begin: DateTime<Utc>,
        _end: DateTime<Utc>,
        _buckets: NonZeroU32,
    ) -> Result<Vec<f64>, ArchiveApiError> {
        self.record_path(path);
        match self.pop("availability")? {
            MockResponse::Availability(fractions) => Ok(fractions),
            other => panic!("unexpected mock response for availability: {other:?}"),
        }
    }

    async fn time_range(&self, path: &str) -> Result<TimeRange, ArchiveApiError> {
        self.record_path(path);
        match self.pop("time_range")? {
            MockResponse::TimeRange(range) => Ok(range),
            other => panic!("unexpected mock response for time_range: {other:?}"),
        }
    }

    async fn open_stream(
        &self,
        resource: &str,
        _begin: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<ByteStream, ArchiveApiError> {
        self.record_path(resource);
        match self.pop("open_stream")? {
            MockResponse::Stream(chunks) => Ok(ByteStream::from_chunks(chunks)),
            other => panic!("unexpected mock response for open_stream: {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

/// Build the HTTP client with bearer token auth for the archive API.
fn build_http_client(config: &ArchiveClientConfig) -> Result<reqwest::Client, ArchiveApiError> {
    let mut headers = HeaderMap::new();

    if let Some(token) = &config.access_token {
        headers.insert(
            header::HeaderName::from_static("authorization"),
            header::HeaderValue::from_str(&format!("bearer {token}"))
                .map_err(|e| ArchiveApiError::Other(e.to_string()))?,
        );
    }

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key)
                .map_err(|e: header::InvalidHeaderName| ArchiveApiError::Other(e.to_string()))?,
            header::HeaderValue::from_str(value)
                .map_err(|e: header::InvalidHeaderValue| ArchiveApiError::Other(e.to_string()))?,
        );
    }

    debug!(
        base_url = %config.base_url,
        has_token = config.access_token.is_some(),
        extra_headers = config.extra_headers.len(),
        "building archive HTTP client"
    );

    // Connect timeout only: data streams are long-lived, so no overall
    // request deadline.
    let client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(15));

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder
        .build()
        .map_err(|e| ArchiveApiError::Other(e.to_string()))
}
