//! Document-store snapshot envelope.
//!
//! The snapshot is the portable, versioned export of the full entity set. It
//! is what the document store holds on disk and what `import` / `export`
//! exchange. The `metadata.version` field is semver; readers accept any
//! version matching [`SUPPORTED_VERSIONS`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::entities::{AttributeMap, Entity};

/// Version written by this build.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Version range this build can read.
pub const SUPPORTED_VERSIONS: &str = "^1";

/// One entity inside a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SnapshotEntity {
    /// Relational id at export time. Informational only; imports match by name.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl From<&Entity> for SnapshotEntity {
    fn from(entity: &Entity) -> Self {
        Self {
            id: Some(entity.id),
            name: entity.name.clone(),
            attributes: entity.attributes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SnapshotMetadata {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub entity_count: usize,
}

/// Top-level document-store object.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Snapshot {
    pub entities: Vec<SnapshotEntity>,
    pub metadata: SnapshotMetadata,
}

/// Name -> attributes view used to compare entity sets by content.
pub type EntityContent = BTreeMap<String, AttributeMap>;

impl Snapshot {
    /// Build a snapshot of `entities` stamped with the current version.
    #[must_use]
    pub fn from_entities(entities: &[Entity], exported_at: DateTime<Utc>) -> Self {
        Self {
            entities: entities.iter().map(SnapshotEntity::from).collect(),
            metadata: SnapshotMetadata {
                version: SNAPSHOT_VERSION.to_string(),
                exported_at,
                entity_count: entities.len(),
            },
        }
    }

    /// Whether this build can read the snapshot's declared version.
    #[must_use]
    pub fn is_supported_version(&self) -> bool {
        is_supported_version(&self.metadata.version)
    }

    /// Content view of the snapshot (ids and timestamps ignored).
    #[must_use]
    pub fn content(&self) -> EntityContent {
        self.entities
            .iter()
            .map(|e| (e.name.clone(), e.attributes.clone()))
            .collect()
    }
}

/// Content view of a slice of stored entities.
#[must_use]
pub fn content_of(entities: &[Entity]) -> EntityContent {
    entities
        .iter()
        .map(|e| (e.name.clone(), e.attributes.clone()))
        .collect()
}

/// Whether a declared snapshot version is readable by this build.
///
/// Unparseable versions are never supported.
#[must_use]
pub fn is_supported_version(version: &str) -> bool {
    let Ok(req) = VersionReq::parse(SUPPORTED_VERSIONS) else {
        return false;
    };
    Version::parse(version.trim()).is_ok_and(|v| req.matches(&v))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1.0.0", true)]
    #[case("1.4.2", true)]
    #[case(" 1.0.0 ", true)]
    #[case("2.0.0", false)]
    #[case("0.9.0", false)]
    #[case("1.0", false)]
    #[case("banana", false)]
    fn version_compatibility(#[case] version: &str, #[case] supported: bool) {
        assert_eq!(is_supported_version(version), supported);
    }

    #[test]
    fn snapshot_counts_entities() {
        let now = Utc::now();
        let entity = Entity {
            id: 7,
            name: "Alice".into(),
            attributes: AttributeMap::from([("hair".into(), Some("brown".into()))]),
            created_at: now,
            updated_at: now,
        };
        let snapshot = Snapshot::from_entities(&[entity.clone()], now);
        assert_eq!(snapshot.metadata.entity_count, 1);
        assert_eq!(snapshot.metadata.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.entities[0].id, Some(7));
        assert_eq!(snapshot.content(), content_of(&[entity]));
    }

    #[test]
    fn missing_fields_deserialize_with_defaults() {
        let json = r#"{"entities":[{"name":"Bob"},{}],"metadata":{"version":"1.0.0","exported_at":"2026-01-01T00:00:00Z","entity_count":2}}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.entities[0].name, "Bob");
        assert!(snapshot.entities[0].attributes.is_empty());
        assert!(snapshot.entities[1].name.is_empty());
        assert_eq!(snapshot.entities[1].id, None);
    }
}
