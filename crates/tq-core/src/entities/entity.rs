use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::attributes::normalize_value;

/// Attribute name to categorical value. `None` means unknown / not applicable.
pub type AttributeMap = BTreeMap<String, Option<String>>;

/// A candidate the game can guess.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Entity {
    pub id: i64,
    pub name: String,
    pub attributes: AttributeMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// The normalized value of `attribute`, if the entity has a non-null one.
    #[must_use]
    pub fn value_of(&self, attribute: &str) -> Option<String> {
        self.attributes
            .get(attribute)
            .and_then(Option::as_deref)
            .map(normalize_value)
    }

    /// Whether the entity has `attribute == value` (both sides normalized).
    ///
    /// Absent and null attributes never match.
    #[must_use]
    pub fn matches(&self, attribute: &str, value: &str) -> bool {
        self.value_of(attribute)
            .is_some_and(|own| own == normalize_value(value))
    }
}

/// Input for registering a new entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewEntity {
    pub name: String,
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl NewEntity {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: AttributeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(attribute.into(), Some(value.into()));
        self
    }
}

/// Changes to an existing entity. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EntityUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Merged into the stored map; a `None` value marks the attribute unknown.
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl EntityUpdate {
    #[must_use]
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(attribute.into(), Some(value.into()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.attributes.is_empty()
    }
}
