//! HTTP client bindings for the fathom archive API.
//!
//! This crate provides:
//! - HTTP client construction with bearer token authentication
//! - The [`ArchiveApi`] trait the mount adapter is written against
//! - A seedable [`MockClient`] for tests
//! - Wire types for the archive endpoints
//!
//! ## Usage
//!
//! ```ignore
//! use fathom_archive::{ArchiveApi, ArchiveClient, ArchiveClientConfig, Client};
//!
//! let config = ArchiveClientConfig {
//!     base_url: "https://archive.example".to_string(),
//!     access_token: Some(token),
//!     extra_headers: BTreeMap::new(),
//!     user_agent: None,
//! };
//!
//! let client = Client::Http(ArchiveClient::new(config)?);
//! client.sign_in().await?;
//! let children = client.children("/").await?;
//! ```

mod client;
mod config;
mod error;
pub mod types;

pub use client::{ArchiveApi, ArchiveClient, Client, MockClient, MockResponse};
pub use config::ArchiveClientConfig;
pub use error::ArchiveApiError;
