//! The remote mount forwarder.
//!
//! Maps externally visible catalog paths into the upstream namespace, issues
//! the corresponding archive calls, and rewrites returned catalog ids back
//! into the external namespace. Data reads are streamed through verbatim.

use std::future::Future;
use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use fathom_archive::types::TimeRange;
use fathom_archive::{ArchiveApi, ArchiveApiError, ArchiveClient, ArchiveClientConfig, Client};
use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::config::MountConfig;
use crate::error::MountError;
use crate::model::{Catalog, CatalogRegistration};
use crate::path::PathMapper;

/// Availability is always requested for the whole window at once.
const SINGLE_BUCKET: NonZeroU32 = NonZeroU32::new(1).unwrap();

/// Status value marking a sample range as fully available.
pub const STATUS_AVAILABLE: u8 = 1;

/// One read target: a fully-qualified resource path plus the caller-owned
/// destination and status buffers.
#[derive(Debug)]
pub struct ReadRequest<'a> {
    /// External resource path, e.g. `/mnt/CATALOG/channel`.
    pub resource: String,
    /// Destination buffer; filled completely on success.
    pub data: &'a mut [u8],
    /// Per-sample status; every element is set to [`STATUS_AVAILABLE`] once
    /// `data` is full.
    pub status: &'a mut [u8],
}

/// A remote archive subtree mounted under a local path prefix.
///
/// All state is fixed at construction and read-only afterwards, so one mount
/// can serve arbitrarily many concurrent calls.
#[derive(Debug)]
pub struct RemoteMount {
    client: Client,
    mapper: PathMapper,
    include: Option<Regex>,
}

impl RemoteMount {
    /// Connect to the upstream archive and sign in.
    pub async fn connect(config: MountConfig) -> Result<Self, MountError> {
        let client_config = ArchiveClientConfig {
            base_url: config.base_url.to_string(),
            access_token: Some(config.access_token.clone()),
            extra_headers: Default::default(),
            user_agent: None,
        };
        let client = Client::Http(ArchiveClient::new(client_config)?);
        let mount = Self::with_client(&config, client);
        mount.client.sign_in().await?;
        Ok(mount)
    }

    /// Build a mount over an existing client. Used with a mock client in
    /// tests; [`RemoteMount::connect`] is the production path.
    pub fn with_client(config: &MountConfig, client: Client) -> Self {
        Self {
            client,
            mapper: PathMapper::new(config.mount_point.as_deref(), config.source_path.as_deref()),
            include: config.include.clone(),
        }
    }

    pub fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    /// Child catalogs of `external_path`, as transient registrations.
    ///
    /// Children are filtered by the include pattern against their *source*
    /// id, then rewritten into the external namespace. Upstream order is
    /// preserved.
    #[instrument(skip(self, cancel))]
    pub async fn registrations(
        &self,
        external_path: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogRegistration>, MountError> {
        let external_path = self.mapper.canonical_external(external_path);
        let source_path = self.mapper.to_source(&external_path)?;
        let children = guarded(cancel, self.client.children(&source_path)).await?;

        let mut registrations = Vec::with_capacity(children.len());
        for child in children {
            if !self.included(&child.id) {
                continue;
            }
            registrations.push(CatalogRegistration {
                id: self.mapper.to_external(&child.id)?,
                title: child.title,
                transient: true,
            });
        }
        debug!(n_registrations = registrations.len(), "mapped child catalogs");
        Ok(registrations)
    }

    /// Description of the catalog at `external_id`, merged onto `base` when
    /// the host already holds a placeholder for it.
    ///
    /// Only the identity is rewritten; resources and attributes pass through
    /// unchanged.
    #[instrument(skip(self, base, cancel))]
    pub async fn catalog(
        &self,
        external_id: &str,
        base: Option<Catalog>,
        cancel: &CancellationToken,
    ) -> Result<Catalog, MountError> {
        let external_id = self.mapper.canonical_external(external_id);
        let source_id = self.mapper.to_source(&external_id)?;
        let descriptor = guarded(cancel, self.client.catalog(&source_id)).await?;

        let mut fetched = Catalog::from_descriptor(descriptor);
        fetched.id = external_id;
        Ok(match base {
            Some(base) => base.merged(fetched),
            None => fetched,
        })
    }

    /// Fraction of `[begin, end)` for which data exists, as one number.
    #[instrument(skip(self, cancel))]
    pub async fn availability(
        &self,
        external_id: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<f64, MountError> {
        let source_id = self
            .mapper
            .to_source(&self.mapper.canonical_external(external_id))?;
        let fractions = guarded(
            cancel,
            self.client.availability(&source_id, begin, end, SINGLE_BUCKET),
        )
        .await?;
        fractions
            .first()
            .copied()
            .ok_or(MountError::MissingAvailability { path: source_id })
    }

    /// Recorded time range of the catalog at `external_id`, as-is.
    #[instrument(skip(self, cancel))]
    pub async fn time_range(
        &self,
        external_id: &str,
        cancel: &CancellationToken,
    ) -> Result<TimeRange, MountError> {
        let source_id = self
            .mapper
            .to_source(&self.mapper.canonical_external(external_id))?;
        Ok(guarded(cancel, self.client.time_range(&source_id)).await?)
    }

    /// Fill every request's destination buffer from its upstream stream.
    ///
    /// Requests are processed strictly one at a time, in array order; each
    /// stream is dropped before the next request starts. The first failure
    /// aborts the batch, leaving the faulting buffer partial and its status
    /// unmarked.
    #[instrument(skip_all, fields(n_requests = requests.len()))]
    pub async fn read(
        &self,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        requests: &mut [ReadRequest<'_>],
        cancel: &CancellationToken,
    ) -> Result<(), MountError> {
        for request in requests.iter_mut() {
            let source = self.mapper.to_source(&request.resource)?;
            let mut stream = guarded(cancel, self.client.open_stream(&source, begin, end)).await?;

            let mut filled = 0;
            while filled < request.data.len() {
                let chunk = guarded(cancel, stream.next_chunk()).await?;
                let Some(chunk) = chunk else {
                    return Err(MountError::StreamEnded {
                        resource: request.resource.clone(),
                        expected: request.data.len(),
                        got: filled,
                    });
                };
                // Surplus bytes past the end of the buffer are dropped.
                let take = chunk.len().min(request.data.len() - filled);
                request.data[filled..filled + take].copy_from_slice(&chunk[..take]);
                filled += take;
            }
            request.status.fill(STATUS_AVAILABLE);
            debug!(resource = %request.resource, bytes = filled, "request filled");
        }
        Ok(())
    }

    fn included(&self, source_id: &str) -> bool {
        self.include.as_ref().is_none_or(|re| re.is_match(source_id))
    }
}

/// Await `op`, aborting promptly when `cancel` fires.
async fn guarded<T>(
    cancel: &CancellationToken,
    op: impl Future<Output = Result<T, ArchiveApiError>>,
) -> Result<T, MountError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(MountError::Cancelled),
        res = op => Ok(res?),
    }
}
