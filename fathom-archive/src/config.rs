//! Configuration types for archive client construction.

use std::collections::BTreeMap;

/// Configuration for archive client construction.
#[derive(Debug, Clone, Default)]
pub struct ArchiveClientConfig {
    /// Base URL of the archive API.
    pub base_url: String,
    /// Optional bearer token, attached to every request.
    pub access_token: Option<String>,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional user agent string.
    pub user_agent: Option<String>,
}
