//! Error handling for archive API operations.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Common error type for archive API operations.
///
/// Transport and response failures surface as-is; this layer performs no
/// retries and attaches no additional context.
#[derive(Debug, Error)]
pub enum ArchiveApiError {
    /// The archive answered with the error body it documents
    /// (`{"detail": …}`).
    #[error("{status}: {detail}")]
    ErrorResponse { status: StatusCode, detail: String },
    /// A non-success response whose body did not parse as an error body.
    #[error("unexpected response from archive: {status}")]
    UnexpectedResponse { status: StatusCode },
    /// The request never completed (connect failure, broken stream).
    #[error("archive request failed")]
    Communication(#[source] reqwest::Error),
    /// A success response whose body did not match the expected schema.
    #[error("invalid response payload")]
    InvalidResponsePayload(#[source] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

/// Error body shape the archive uses for non-success responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Pass a successful response through; parse anything else into
/// [`ArchiveApiError`].
///
/// Bodies that don't match the documented error shape (HTML from a proxy,
/// empty bodies) become [`ArchiveApiError::UnexpectedResponse`] with the bare
/// status.
pub(crate) async fn check_status(
    resp: reqwest::Response,
) -> Result<reqwest::Response, ArchiveApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    match resp.json::<ErrorBody>().await {
        Ok(body) => Err(ArchiveApiError::ErrorResponse {
            status,
            detail: body.detail,
        }),
        Err(_) => Err(ArchiveApiError::UnexpectedResponse { status }),
    }
}
