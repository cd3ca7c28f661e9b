//! Addressing of parent-owned sub-collections

use msm_collection::ParentId;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Location of a sub-collection under its parent resource
///
/// Renders as `/<parent-collection>/<parentId>/<subresource>`.
///
/// # Examples
/// - `worker-managers` + `assigned-hosts` → `/worker-managers/42/assigned-hosts`
/// - `rules/hosts` + `conditions` → `/rules/hosts/7/conditions`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionPath {
    parent_collection: String,
    subresource: String,
}

impl CollectionPath {
    /// Create path, trimming stray slashes from both segments
    #[must_use]
    pub fn new(parent_collection: impl AsRef<str>, subresource: impl AsRef<str>) -> Self {
        Self {
            parent_collection: parent_collection.as_ref().trim_matches('/').to_string(),
            subresource: subresource.as_ref().trim_matches('/').to_string(),
        }
    }

    /// Parent resource collection (e.g. `worker-managers`)
    #[inline]
    #[must_use]
    pub fn parent_collection(&self) -> &str {
        &self.parent_collection
    }

    /// Sub-collection name (e.g. `assigned-hosts`)
    #[inline]
    #[must_use]
    pub fn subresource(&self) -> &str {
        &self.subresource
    }

    /// Request path for a concrete parent
    #[must_use]
    pub fn for_parent(&self, parent: &ParentId) -> String {
        format!(
            "/{}/{}/{}",
            self.parent_collection,
            encode_segment(parent.as_str()),
            self.subresource
        )
    }
}

impl Display for CollectionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{{id}}/{}", self.parent_collection, self.subresource)
    }
}

/// Encode all but RFC 3986 unreserved characters and `:`
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b':');

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_parent_path() {
        let path = CollectionPath::new("/worker-managers/", "assigned-hosts");
        assert_eq!(path.for_parent(&ParentId::from(42)), "/worker-managers/42/assigned-hosts");
        assert_eq!(path.to_string(), "/worker-managers/{id}/assigned-hosts");
    }

    #[test]
    fn nested_parent_collection() {
        let path = CollectionPath::new("rules/hosts", "conditions");
        assert_eq!(path.for_parent(&ParentId::from("cpu")), "/rules/hosts/cpu/conditions");
    }

    #[test]
    fn parent_id_is_encoded() {
        let path = CollectionPath::new("apps", "services");
        assert_eq!(path.for_parent(&ParentId::from("a b/c")), "/apps/a%20b%2Fc/services");
    }
}
