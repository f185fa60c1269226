//! Wire types for the fathom archive API.
//!
//! These mirror the JSON bodies of the archive endpoints. The mount adapter
//! maps them into its own catalog model; nothing here is handed to the host
//! framework directly.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::pin::Pin;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::ArchiveApiError;

/// One child catalog as returned by the catalog listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    /// Absolute catalog id in the archive's own namespace.
    pub id: String,
    /// Human readable title shown by catalog browsers.
    pub title: String,
}

/// Listing envelope for `GET catalogs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogListing {
    pub items: Vec<CatalogSummary>,
}

/// Full description of a single catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// One addressable data stream within a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// Closed set of resource kinds the archive serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Scalar,
    Waveform,
    Image,
}

/// Recorded time range of a catalog, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Availability envelope for `GET availability`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// One fraction in `[0, 1]` per requested granularity bucket.
    pub items: Vec<f64>,
}

/// A byte stream for one resource over a time window.
///
/// Chunk sizes are whatever the transport delivers; consumers accumulate
/// partial chunks themselves.
pub struct ByteStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, ArchiveApiError>> + Send>>,
}

impl ByteStream {
    pub fn new(
        inner: impl Stream<Item = Result<Bytes, ArchiveApiError>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Box::pin(inner),
        }
    }

    /// A stream over fixed in-memory chunks, for mocks and tests.
    pub fn from_chunks(chunks: Vec<Bytes>) -> Self {
        Self::new(stream::iter(chunks.into_iter().map(Ok)))
    }

    /// Next chunk, or `None` once the stream is exhausted.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, ArchiveApiError> {
        self.inner.next().await.transpose()
    }
}

impl Debug for ByteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStream").finish_non_exhaustive()
    }
}
