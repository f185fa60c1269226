//! Bidirectional catalog-id mapping between the mount-point and source
//! namespaces.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The caller fed an id outside the mounted subtree.
    #[error("catalog id {id:?} is outside the mount point {mount_point:?}")]
    OutsideMountPoint { id: String, mount_point: String },
    /// An upstream id outside the configured source subtree.
    #[error("catalog id {id:?} is outside the source path {source_path:?}")]
    OutsideSourcePath { id: String, source_path: String },
}

/// Lossless mapping between external catalog ids (under the mount point) and
/// source catalog ids (under the source path on the upstream archive).
///
/// Both prefixes are normalized on construction: a single leading slash, no
/// trailing slash unless the whole prefix is the root `/`. For every external
/// id `x` under the mount point, `to_external(to_source(x)) == x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    mount_point: String,
    source_path: String,
}

impl PathMapper {
    /// Build a mapper from raw configuration values; unset values default to
    /// the root.
    pub fn new(mount_point: Option<&str>, source_path: Option<&str>) -> Self {
        Self {
            mount_point: normalize_prefix(mount_point.unwrap_or("/")),
            source_path: normalize_prefix(source_path.unwrap_or("/")),
        }
    }

    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Canonical form of an externally supplied path: the root refers to the
    /// mount point itself, and a single trailing slash is dropped.
    pub fn canonical_external(&self, path: &str) -> String {
        if path == "/" {
            self.mount_point.clone()
        } else {
            path.strip_suffix('/').unwrap_or(path).to_string()
        }
    }

    /// Rewrite an external catalog id into the source namespace.
    pub fn to_source(&self, external_id: &str) -> Result<String, PathError> {
        let remainder = strip_prefix(external_id, &self.mount_point).ok_or_else(|| {
            PathError::OutsideMountPoint {
                id: external_id.to_string(),
                mount_point: self.mount_point.clone(),
            }
        })?;
        Ok(join(&self.source_path, remainder))
    }

    /// Rewrite a source catalog id back into the external namespace.
    pub fn to_external(&self, source_id: &str) -> Result<String, PathError> {
        let remainder = strip_prefix(source_id, &self.source_path).ok_or_else(|| {
            PathError::OutsideSourcePath {
                id: source_id.to_string(),
                source_path: self.source_path.clone(),
            }
        })?;
        Ok(join(&self.mount_point, remainder))
    }
}

/// Trim surrounding slashes and re-prefix a single leading slash; empty input
/// collapses to the root.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// The part of `id` below `prefix`, without a leading slash.
///
/// `None` if `id` is neither `prefix` itself nor nested under it on a path
/// boundary (`/mnt` does not cover `/mntx`).
fn strip_prefix<'a>(id: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix == "/" {
        return id.strip_prefix('/');
    }
    match id.strip_prefix(prefix)? {
        "" => Some(""),
        rest => rest.strip_prefix('/'),
    }
}

/// Exactly one slash between prefix and remainder; an empty remainder yields
/// the prefix itself.
fn join(prefix: &str, remainder: &str) -> String {
    if remainder.is_empty() {
        prefix.to_string()
    } else if prefix == "/" {
        format!("/{remainder}")
    } else {
        format!("{prefix}/{remainder}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn prefixes_are_normalized() {
        let mapper = PathMapper::new(Some("mnt/"), Some("//src/nested//"));
        assert_eq!(mapper.mount_point(), "/mnt");
        assert_eq!(mapper.source_path(), "/src/nested");

        let defaulted = PathMapper::new(None, Some(""));
        assert_eq!(defaulted.mount_point(), "/");
        assert_eq!(defaulted.source_path(), "/");
    }

    #[test]
    fn to_source_strips_mount_point_and_prepends_source_path() {
        let mapper = PathMapper::new(Some("/mnt"), Some("/src"));
        assert_eq!(mapper.to_source("/mnt/TEST_CATALOG").unwrap(), "/src/TEST_CATALOG");
        assert_eq!(mapper.to_source("/mnt/a/b").unwrap(), "/src/a/b");
        // Empty remainder maps to the source path itself.
        assert_eq!(mapper.to_source("/mnt").unwrap(), "/src");
    }

    #[test]
    fn to_source_with_root_mount_point() {
        let mapper = PathMapper::new(None, Some("/src"));
        assert_eq!(mapper.to_source("/TEST_CATALOG").unwrap(), "/src/TEST_CATALOG");
        assert_eq!(mapper.to_source("/").unwrap(), "/src");
    }

    #[test]
    fn to_external_is_the_inverse() {
        let mapper = PathMapper::new(Some("/mnt"), Some("/src"));
        assert_eq!(mapper.to_external("/src/TEST_CATALOG").unwrap(), "/mnt/TEST_CATALOG");
        assert_eq!(mapper.to_external("/src").unwrap(), "/mnt");

        let root_source = PathMapper::new(Some("/mnt"), None);
        assert_eq!(root_source.to_external("/TEST_CATALOG").unwrap(), "/mnt/TEST_CATALOG");
    }

    #[test]
    fn prefix_match_respects_path_boundaries() {
        let mapper = PathMapper::new(Some("/mnt"), Some("/src"));
        assert_eq!(mapper.to_source("/mntx"), Err(PathError::OutsideMountPoint {
            id: "/mntx".to_string(),
            mount_point: "/mnt".to_string(),
        }));
        assert!(mapper.to_source("/other/TEST").is_err());
        assert!(mapper.to_external("/srcfoo").is_err());
    }

    #[test]
    fn canonical_external_substitutes_root_and_trims_trailing_slash() {
        let mapper = PathMapper::new(Some("/mnt"), Some("/src"));
        assert_eq!(mapper.canonical_external("/"), "/mnt");
        assert_eq!(mapper.canonical_external("/mnt/"), "/mnt");
        assert_eq!(mapper.canonical_external("/mnt/a"), "/mnt/a");
    }

    fn prefix_strategy() -> impl Strategy<Value = String> {
        proptest::collection::vec("[A-Za-z0-9_]{1,8}", 0..3).prop_map(|segments| segments.join("/"))
    }

    proptest! {
        /// to_external(to_source(x)) == x for every external id under the
        /// mount point, and the mapped id always carries the source prefix.
        #[test]
        fn round_trip_external_ids(
            mount in prefix_strategy(),
            source in prefix_strategy(),
            segments in proptest::collection::vec("[A-Za-z0-9_]{1,8}", 0..4),
        ) {
            let mapper = PathMapper::new(Some(&mount), Some(&source));
            let external = if segments.is_empty() {
                mapper.mount_point().to_string()
            } else if mapper.mount_point() == "/" {
                format!("/{}", segments.join("/"))
            } else {
                format!("{}/{}", mapper.mount_point(), segments.join("/"))
            };

            let source_id = mapper.to_source(&external).unwrap();
            prop_assert!(source_id.starts_with(mapper.source_path()));
            prop_assert_eq!(mapper.to_external(&source_id).unwrap(), external);
        }
    }
}
