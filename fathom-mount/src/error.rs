//! Error taxonomy for the mount adapter.
//!
//! Upstream failures pass through unchanged; this layer performs no retries
//! and no suppression. Logging and presentation are the host framework's
//! concern.

use fathom_archive::ArchiveApiError;
use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::path::PathError;

#[derive(Debug, Error)]
pub enum MountError {
    /// Setup-time configuration failure; the adapter is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The caller fed an id outside the mounted subtree. No silent
    /// correction.
    #[error(transparent)]
    Path(#[from] PathError),
    /// Upstream failure, propagated unchanged.
    #[error(transparent)]
    Api(#[from] ArchiveApiError),
    /// The archive answered an availability query with no buckets.
    #[error("archive returned no availability data for {path}")]
    MissingAvailability { path: String },
    /// The upstream data stream ended before the destination buffer was
    /// full.
    #[error("data stream for {resource} ended after {got} of {expected} bytes")]
    StreamEnded {
        resource: String,
        expected: usize,
        got: usize,
    },
    /// The operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,
}
