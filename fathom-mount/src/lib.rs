//! Remote mount adapter for the fathom data catalog.
//!
//! A [`RemoteMount`] exposes the catalog tree of a remote fathom archive
//! under a local mount point. Catalog ids are rewritten between the
//! externally visible namespace and the upstream source namespace; requests
//! are forwarded to the upstream archive and results streamed back unchanged.
//!
//! The adapter is stateless between calls: the only state is the immutable
//! configuration (mount point, source path, include pattern, upstream client)
//! fixed once at setup.

pub mod config;
pub mod error;
pub mod model;
pub mod mount;
pub mod path;

pub use config::{MountConfig, MountSettings};
pub use error::MountError;
pub use model::{Catalog, CatalogRegistration, Resource, ResourceKind};
pub use mount::{ReadRequest, RemoteMount, STATUS_AVAILABLE};
pub use path::PathMapper;
