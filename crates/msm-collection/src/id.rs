//! Identifiers for collection items and their owning parents
//!
//! Backends key hosts by address, conditions by name and metrics by numeric
//! id, so both [`ItemId`] and [`ParentId`] are string-backed and accept
//! numeric keys on the way in.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Display, Formatter};

/// Raw JSON key: either a string or a number
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawKey> for String {
    fn from(raw: RawKey) -> Self {
        match raw {
            RawKey::Text(s) => s,
            RawKey::Number(n) => n.to_string(),
        }
    }
}

/// Opaque identifier of an item that may belong to a collection
///
/// # Examples
/// - `"10.0.0.4"` (a host address assigned to a worker-manager)
/// - `"cpu-over-90"` (a condition attached to a rule)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create item id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawKey::deserialize(deserializer).map(|raw| Self(raw.into()))
    }
}

/// Durable identifier of a parent entity (worker-manager, rule, app, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ParentId(String);

impl ParentId {
    /// Create parent id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ParentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ParentId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for ParentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawKey::deserialize(deserializer).map(|raw| Self(raw.into()))
    }
}

/// Lifecycle of the entity owning a collection
///
/// A parent being created in a form has no id yet; nothing can be confirmed
/// against the backend until it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "id")]
pub enum ParentEntity {
    /// Being created, no durable id
    #[default]
    Unsaved,
    /// Stored by the backend under this id
    Persisted(ParentId),
}

impl ParentEntity {
    /// Persisted parent with given id
    #[inline]
    #[must_use]
    pub fn persisted(id: impl Into<ParentId>) -> Self {
        Self::Persisted(id.into())
    }

    /// Durable id, if any
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&ParentId> {
        match self {
            Self::Unsaved => None,
            Self::Persisted(id) => Some(id),
        }
    }

    /// Check if parent is still unsaved
    #[inline]
    #[must_use]
    pub fn is_unsaved(&self) -> bool {
        matches!(self, Self::Unsaved)
    }
}

impl From<Option<ParentId>> for ParentEntity {
    fn from(id: Option<ParentId>) -> Self {
        id.map_or(Self::Unsaved, Self::Persisted)
    }
}

impl Display for ParentEntity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsaved => f.write_str("<unsaved>"),
            Self::Persisted(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_from_numeric_json() {
        let ids: Vec<ItemId> = serde_json::from_str(r#"["hostA", 42, 7]"#).unwrap();
        assert_eq!(ids, vec![ItemId::from("hostA"), ItemId::from(42), ItemId::from(7)]);
    }

    #[test]
    fn item_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&vec![ItemId::from("10.0.0.1")]).unwrap();
        assert_eq!(json, r#"["10.0.0.1"]"#);
    }

    #[test]
    fn parent_entity_from_option() {
        assert!(ParentEntity::from(None).is_unsaved());

        let parent = ParentEntity::from(Some(ParentId::from(42)));
        assert_eq!(parent.id(), Some(&ParentId::new("42")));
        assert_eq!(parent.to_string(), "42");
    }
}
