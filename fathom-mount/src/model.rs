//! Native catalog model of the host system.
//!
//! The archive's wire descriptors are mapped into these types field by
//! field, so shape and enum compatibility is checked at compile time instead
//! of being assumed across serialization.

use std::collections::BTreeMap;

use fathom_archive::types::{
    CatalogDescriptor,
    ResourceDescriptor,
    ResourceKind as WireResourceKind,
};
use serde::{Deserialize, Serialize};

/// A named, hierarchical grouping of data resources with metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Absolute, slash-delimited catalog id.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// An individually addressable data stream within a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Scalar,
    Waveform,
    Image,
}

/// A catalog offered to the host framework's browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRegistration {
    pub id: String,
    pub title: String,
    /// Transient registrations are re-queried per request instead of being
    /// cached locally. Remote mounts only produce transient registrations.
    pub transient: bool,
}

impl Catalog {
    /// Map an archive descriptor into the native model, field by field.
    ///
    /// The id is carried over unchanged; callers rewrite it into the
    /// external namespace afterwards.
    pub fn from_descriptor(descriptor: CatalogDescriptor) -> Self {
        Self {
            id: descriptor.id,
            title: descriptor.title,
            resources: descriptor
                .resources
                .into_iter()
                .map(Resource::from_descriptor)
                .collect(),
            attributes: descriptor.attributes,
        }
    }

    /// Merge a freshly fetched catalog onto `self`.
    ///
    /// Fetched data wins: id and title are taken from `fetched` (a missing
    /// fetched title keeps the base title), attributes are unioned per key
    /// with fetched values winning, and a fetched resource replaces a base
    /// resource of the same name wholesale. Base-only resources and
    /// attributes survive.
    pub fn merged(mut self, fetched: Catalog) -> Self {
        self.id = fetched.id;
        if fetched.title.is_some() {
            self.title = fetched.title;
        }
        for resource in fetched.resources {
            match self.resources.iter_mut().find(|r| r.name == resource.name) {
                Some(existing) => *existing = resource,
                None => self.resources.push(resource),
            }
        }
        self.attributes.extend(fetched.attributes);
        self
    }
}

impl Resource {
    fn from_descriptor(descriptor: ResourceDescriptor) -> Self {
        Self {
            name: descriptor.name,
            kind: descriptor.kind.into(),
            unit: descriptor.unit,
            attributes: descriptor.attributes,
        }
    }
}

impl From<WireResourceKind> for ResourceKind {
    fn from(kind: WireResourceKind) -> Self {
        match kind {
            WireResourceKind::Scalar => ResourceKind::Scalar,
            WireResourceKind::Waveform => ResourceKind::Waveform,
            WireResourceKind::Image => ResourceKind::Image,
        }
    }
}
