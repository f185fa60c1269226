//! Mount configuration, supplied once by the host framework at setup.

use std::collections::BTreeMap;

use regex::Regex;
use thiserror::Error;
use url::Url;

/// Option keys understood by the adapter.
pub const OPT_ACCESS_TOKEN: &str = "access-token";
pub const OPT_SOURCE_PATH: &str = "source-path";
pub const OPT_MOUNT_POINT: &str = "mount-point";
pub const OPT_INCLUDE_PATTERN: &str = "include-pattern";

/// Raw configuration as handed over by the host framework: the resource
/// locator of the upstream archive plus free-form option keys.
#[derive(Debug, Clone, Default)]
pub struct MountSettings {
    pub locator: Option<String>,
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no upstream archive locator configured")]
    MissingLocator,
    #[error("invalid upstream archive locator")]
    InvalidLocator(#[source] url::ParseError),
    #[error("no access token configured ({OPT_ACCESS_TOKEN})")]
    MissingAccessToken,
    #[error("invalid include pattern")]
    InvalidIncludePattern(#[source] regex::Error),
}

/// Validated mount configuration.
///
/// Built once at setup and immutable afterwards; there is no
/// reinitialization path.
#[derive(Debug, Clone)]
pub struct MountConfig {
    /// Base URL of the upstream archive API.
    pub base_url: Url,
    /// Bearer token for the upstream archive.
    pub access_token: String,
    /// Upstream-side prefix corresponding to the mount point. Defaults to
    /// the root when unset.
    pub source_path: Option<String>,
    /// Externally visible prefix under which the remote tree is exposed.
    /// Defaults to the root when unset.
    pub mount_point: Option<String>,
    /// Only upstream catalogs whose source id matches are surfaced. `None`
    /// matches everything.
    pub include: Option<Regex>,
}

impl MountConfig {
    pub fn from_settings(settings: &MountSettings) -> Result<Self, ConfigError> {
        let locator = settings
            .locator
            .as_deref()
            .ok_or(ConfigError::MissingLocator)?;
        let base_url = Url::parse(locator).map_err(ConfigError::InvalidLocator)?;
        let access_token = settings
            .options
            .get(OPT_ACCESS_TOKEN)
            .cloned()
            .ok_or(ConfigError::MissingAccessToken)?;
        let include = settings
            .options
            .get(OPT_INCLUDE_PATTERN)
            .map(|pattern| Regex::new(pattern))
            .transpose()
            .map_err(ConfigError::InvalidIncludePattern)?;

        Ok(Self {
            base_url,
            access_token,
            source_path: settings.options.get(OPT_SOURCE_PATH).cloned(),
            mount_point: settings.options.get(OPT_MOUNT_POINT).cloned(),
            include,
        })
    }
}
